//! Message types exchanged with the language model.
//!
//! A query is always a two-message exchange: the fixed system instruction
//! followed by the user's question. There is no conversation history.

use serde::{Deserialize, Serialize};

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person asking about the ledger
    User,
    /// The language model
    Assistant,
    /// System instructions (schema and response contract)
    System,
}

/// A single message sent to or received from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("¿Cuánto gastó Salud en 2022?");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "¿Cuánto gastó Salud en 2022?");
    }

    #[test]
    fn message_serializes_role_and_content_only() {
        let json = serde_json::to_value(Message::system("esquema")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "system", "content": "esquema"}));
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }
}
