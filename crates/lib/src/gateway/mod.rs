//! Gateway: the inbound HTTP surface.
//!
//! `POST /chat` takes `{"message": ...}`, hands it to a [`ReplyBackend`](crate::llm::ReplyBackend)
//! and answers with one of four fixed response shapes.

mod protocol;
mod server;

pub use protocol::{
    message_from_body, BodyError, ChatReply, ErrorReply, GENERIC_FAILURE_REPLY,
    INTERNAL_ERROR_REPLY, NO_MESSAGE_ERROR,
};
pub use server::{build_client, router, run_gateway, GatewayState};
