use async_trait::async_trait;
use crate::models::chat::{ ChatMessage, Conversation, Role };
use crate::history::HistoryStore;
use log::debug;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Process-lifetime history, one ordered message list per session id.
#[derive(Default)]
pub struct InMemoryHistoryStore {
    sessions: RwLock<HashMap<String, Vec<ChatMessage>>>,
}

impl InMemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistoryStore {
    async fn add_message(&self, conversation_id: &str, role: Role, content: &str) {
        let mut sessions = self.sessions.write().await;
        let messages = sessions.entry(conversation_id.to_string()).or_default();
        messages.push(ChatMessage::new(role, content));
        debug!("Session {} now holds {} messages", conversation_id, messages.len());
    }

    async fn get_conversation(&self, conversation_id: &str) -> Conversation {
        let sessions = self.sessions.read().await;
        Conversation {
            id: conversation_id.to_string(),
            messages: sessions.get(conversation_id).cloned().unwrap_or_default(),
        }
    }
}
