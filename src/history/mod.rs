mod memory;

use async_trait::async_trait;
use log::info;
use std::sync::Arc;
use crate::models::chat::{ ChatMessage, Conversation, Role };

pub use memory::InMemoryHistoryStore;

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Appends one turn to the end of a session's history.
    async fn add_message(&self, conversation_id: &str, role: Role, content: &str);

    /// Returns the full history of a session in insertion order.
    async fn get_conversation(&self, conversation_id: &str) -> Conversation;

    async fn append_user_turn(&self, conversation_id: &str, content: &str) {
        self.add_message(conversation_id, Role::User, content).await
    }

    async fn append_assistant_turn(&self, conversation_id: &str, content: &str) {
        self.add_message(conversation_id, Role::Assistant, content).await
    }
}

pub fn initialize_history_store() -> Arc<dyn HistoryStore> {
    info!("Chat history is kept in process memory, keyed by session id");
    Arc::new(InMemoryHistoryStore::new())
}

/// The outbound message list: the system prompt followed by the whole history.
pub fn build_request_payload(system_prompt: ChatMessage, conversation: &Conversation) -> Vec<ChatMessage> {
    let mut payload = Vec::with_capacity(conversation.messages.len() + 1);
    payload.push(system_prompt);
    payload.extend(conversation.messages.iter().cloned());
    payload
}
