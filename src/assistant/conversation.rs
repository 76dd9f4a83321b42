use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assistant::{AssistantMode, answer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push(&mut self, role: Role, text: impl Into<String>) {
        self.messages.push(Message {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        });
    }

    pub fn ask(&mut self, query: &str, plain_text: &str, mode: AssistantMode) -> Option<&str> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }
        self.push(Role::User, query);
        self.push(Role::Assistant, answer(query, plain_text, mode).text());
        self.messages.last().map(|m| m.text.as_str())
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
