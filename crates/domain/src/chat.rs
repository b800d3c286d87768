use serde::{Deserialize, Serialize};

/// A message in the locally held conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self { role: Role::System, content: text.into() }
    }
    pub fn user(text: impl Into<String>) -> Self {
        Self { role: Role::User, content: text.into() }
    }
    pub fn assistant(text: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: text.into() }
    }
}

/// The `history` field of a round payload.
///
/// A session starts with locally held role/content messages.  The first
/// `tool_call_request` hands back a backend-owned token which *fully
/// replaces* the local history; from then on the token is forwarded
/// verbatim — the orchestrator never mutates or merges it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum History {
    Messages(Vec<ChatMessage>),
    Token(serde_json::Value),
}

impl History {
    pub fn is_token(&self) -> bool {
        matches!(self, History::Token(_))
    }
}

impl Default for History {
    fn default() -> Self {
        History::Messages(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_history_serializes_as_message_array() {
        let history = History::Messages(vec![ChatMessage::user("list failing pods")]);
        let json = serde_json::to_value(&history).unwrap();
        assert_eq!(json[0]["role"], "user");
        assert_eq!(json[0]["content"], "list failing pods");
    }

    #[test]
    fn token_serializes_verbatim() {
        let token = serde_json::json!({"t": "opaque-state", "n": 3});
        let history = History::Token(token.clone());
        assert_eq!(serde_json::to_value(&history).unwrap(), token);
    }
}
