//! Chat transcript
//!
//! Append-only record of the messages exchanged in one session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single chat message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    /// May contain lightweight markdown emphasis
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Ordered messages for the current session. Never mutated or trimmed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// All messages, oldest first
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Up to `count` most recent messages, newest first
    pub fn recent(&self, count: usize) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().rev().take(count)
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Plain-text rendering for terminals and logs
    pub fn render(&self) -> String {
        let mut out = String::new();

        for msg in &self.messages {
            let role_str = match msg.role {
                Role::User => "You",
                Role::Assistant => "Advisor",
            };

            out.push_str(&format!(
                "[{}] {}: {}\n",
                msg.timestamp.format("%H:%M:%S"),
                role_str,
                msg.content
            ));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = ChatMessage::user("What are ETFs?");
        assert_eq!(msg.role, Role::User);
        assert_ne!(msg.id, ChatMessage::user("What are ETFs?").id);
    }

    #[test]
    fn test_transcript_order() {
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::assistant("Hello!"));
        transcript.push(ChatMessage::user("hi"));
        transcript.push(ChatMessage::assistant("Hello again!"));

        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.last().unwrap().content, "Hello again!");

        let recent: Vec<&str> = transcript.recent(2).map(|m| m.content.as_str()).collect();
        assert_eq!(recent, vec!["Hello again!", "hi"]);
    }

    #[test]
    fn test_render() {
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::user("What is a bond?"));

        let rendered = transcript.render();
        assert!(rendered.contains("You: What is a bond?"));
    }
}
