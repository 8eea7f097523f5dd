//! Upstream generative-text client and the reply translation it performs.
//!
//! Builds the outbound payload, makes one call, and maps the result to an [`Outcome`].

mod gemini;

pub use gemini::{
    extract_reply, Candidate, Content, GeminiClient, GenerateContentRequest,
    GenerateContentResponse, Outcome, Part, ReplyBackend, TranslateError,
};
