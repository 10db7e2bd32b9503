//! Oracle abstraction for docreview.
//!
//! The pipeline treats the language model as an opaque text-completion
//! service: a sequence of role-tagged messages in, a single text out.
//! Tool calling, retries, and model selection are the implementation's
//! concern and invisible to callers.

mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use docreview_shared::Result;

pub use openai::OpenAiOracle;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single message sent to the oracle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(rename = "content")]
    pub text: String,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            text: text.into(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }
}

/// Opaque text-completion service consumed by the review pipeline.
///
/// Implementations must be callable concurrently across runs; the pipeline
/// itself never issues parallel calls within a single run.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Send the message sequence and return the model's text response.
    async fn invoke(&self, messages: &[ChatMessage]) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_with_openai_field_names() {
        let msg = ChatMessage::system("be terse");
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"role":"system","content":"be terse"}"#);
    }

    #[test]
    fn roles_serialize_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Assistant).unwrap(), r#""assistant""#);
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), r#""user""#);
    }
}
