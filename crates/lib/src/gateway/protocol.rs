//! Gateway HTTP wire types for `/chat`.

use serde::Serialize;

/// Reply text sent to the client when the translator fails.
pub const GENERIC_FAILURE_REPLY: &str =
    "Sorry, something went wrong while processing your request.";

/// Reply text for an unreadable request or an error inside the handler itself.
pub const INTERNAL_ERROR_REPLY: &str = "Internal server error";

/// Error text when the request has no usable message.
pub const NO_MESSAGE_ERROR: &str = "No message provided";

/// Success and 500 body: `{ "response": ... }`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub response: String,
}

impl ChatReply {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

/// 400 body: `{ "error": ... }`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReply {
    pub error: String,
}

/// Request body could not be read as a JSON object.
#[derive(Debug, thiserror::Error)]
pub enum BodyError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("request body is not a json object")]
    NotObject,
}

/// Parse a `/chat` body. `Ok(None)` when `message` is missing, null, empty, or not a string.
/// The message is returned verbatim (no trimming).
pub fn message_from_body(body: &[u8]) -> Result<Option<String>, BodyError> {
    let data: serde_json::Value = serde_json::from_slice(body)?;
    let fields = data.as_object().ok_or(BodyError::NotObject)?;
    Ok(fields
        .get("message")
        .and_then(|v| v.as_str())
        .filter(|m| !m.is_empty())
        .map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_kept_verbatim() {
        let m = message_from_body(br#"{"message":"  hello \n"}"#).unwrap();
        assert_eq!(m.as_deref(), Some("  hello \n"));
    }

    #[test]
    fn missing_or_unusable_message_is_none() {
        for body in [
            r#"{}"#,
            r#"{"message":""}"#,
            r#"{"message":null}"#,
            r#"{"message":42}"#,
            r#"{"message":["hi"]}"#,
            r#"{"text":"hi"}"#,
        ] {
            assert!(
                message_from_body(body.as_bytes()).unwrap().is_none(),
                "expected no message for {}",
                body
            );
        }
    }

    #[test]
    fn non_object_bodies_are_errors() {
        assert!(matches!(message_from_body(b""), Err(BodyError::Json(_))));
        assert!(matches!(message_from_body(b"{oops"), Err(BodyError::Json(_))));
        assert!(matches!(message_from_body(b"null"), Err(BodyError::NotObject)));
        assert!(matches!(message_from_body(b"[\"hi\"]"), Err(BodyError::NotObject)));
        assert!(matches!(message_from_body(b"\"hi\""), Err(BodyError::NotObject)));
    }

    #[test]
    fn reply_shapes() {
        assert_eq!(
            serde_json::to_string(&ChatReply::new("hi there")).unwrap(),
            r#"{"response":"hi there"}"#
        );
        assert_eq!(
            serde_json::to_string(&ErrorReply {
                error: NO_MESSAGE_ERROR.to_string()
            })
            .unwrap(),
            r#"{"error":"No message provided"}"#
        );
    }
}
