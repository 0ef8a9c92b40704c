//! Core data models shared by the agent and the HTTP layer

use serde::{Deserialize, Serialize};

//
// ================= Chat =================
//

/// One prior message of the conversation, as sent by the chat front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Request and response body of the chat endpoint.
///
/// The response carries the agent's reply in `message` and echoes the
/// caller's history unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatExchange {
    pub message: String,
    #[serde(default)]
    pub chat_history: Vec<ChatTurn>,
}

//
// ================= Tool I/O =================
//

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub success: bool,
    pub data: serde_json::Value,
    pub error: Option<String>,
}

impl ToolOutput {
    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            data: serde_json::json!({ "error": message }),
            error: Some(message),
        }
    }
}
