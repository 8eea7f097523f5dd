//! Relay core library: configuration, the upstream reply translator, and the HTTP gateway
//! used by the `relay` binary.

pub mod config;
pub mod gateway;
pub mod llm;
