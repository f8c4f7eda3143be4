//! The chat relay: owns the session transcript, prepares outbound message
//! sequences, and commits streamed replies.
//!
//! The transcript is append-only and lives for one session. A turn commits
//! exactly one user entry up front and exactly one assistant entry when the
//! stream ends with content; a failed turn leaves only the user entry.

use crate::api::ChatMessage;
use crate::core::message::Message;

/// How many recent transcript entries accompany each request.
pub const HISTORY_WINDOW: usize = 10;

pub struct Conversation {
    messages: Vec<Message>,
    current_response: String,
    system_prompt: String,
}

impl Conversation {
    pub fn new(system_prompt: String) -> Self {
        Self {
            messages: Vec::new(),
            current_response: String::new(),
            system_prompt,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Entries that belong to the conversation proper, excluding
    /// app-authored transcript messages.
    pub fn api_entries(&self) -> impl Iterator<Item = &Message> {
        self.messages
            .iter()
            .filter(|m| m.role.to_api_role().is_some())
    }

    /// Append the new user entry and build the outbound sequence: the
    /// system prompt followed by the most recent conversation entries,
    /// including the entry just appended.
    pub fn add_user_message(&mut self, content: &str) -> Vec<ChatMessage> {
        self.messages.push(Message::user(content));
        self.current_response.clear();

        let mut api_messages = Vec::new();
        if !self.system_prompt.is_empty() {
            api_messages.push(ChatMessage {
                role: "system".to_string(),
                content: self.system_prompt.clone(),
            });
        }

        let history: Vec<&Message> = self.api_entries().collect();
        let start = history.len().saturating_sub(HISTORY_WINDOW);
        for msg in &history[start..] {
            if let Some(role) = msg.role.to_api_role() {
                api_messages.push(ChatMessage {
                    role: role.to_string(),
                    content: msg.content.clone(),
                });
            }
        }

        api_messages
    }

    pub fn append_to_response(&mut self, fragment: &str) {
        self.current_response.push_str(fragment);
    }

    pub fn current_response(&self) -> &str {
        &self.current_response
    }

    /// Commit the accumulated reply as one assistant entry. Returns false
    /// without committing when the stream produced no content.
    pub fn finalize_response(&mut self) -> bool {
        if self.current_response.trim().is_empty() {
            self.current_response.clear();
            return false;
        }

        let content = std::mem::take(&mut self.current_response);
        self.messages.push(Message::assistant(content));
        true
    }

    /// Discard the partial reply after a failed turn.
    pub fn abort_response(&mut self) {
        self.current_response.clear();
    }

    pub fn add_app_info(&mut self, content: impl Into<String>) {
        self.messages.push(Message::app_info(content));
    }

    pub fn add_app_error(&mut self, content: impl Into<String>) {
        self.messages.push(Message::app_error(content));
    }
}
