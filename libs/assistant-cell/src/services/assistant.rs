use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::error::AssistantError;
use crate::models::{ChatMessage, ChatResponse};
use crate::services::conversation::SessionStore;
use crate::services::dispatch::Dispatcher;
use crate::services::llm::LanguageModel;

/// Chat sessions wired to a model and a dispatcher.
pub struct AssistantService {
    model: Arc<dyn LanguageModel>,
    dispatcher: Dispatcher,
    sessions: SessionStore,
}

impl AssistantService {
    pub fn new(model: Arc<dyn LanguageModel>, dispatcher: Dispatcher, sessions: SessionStore) -> Self {
        Self {
            model,
            dispatcher,
            sessions,
        }
    }

    pub async fn chat(&self, session_id: Option<Uuid>, message: &str) -> Result<ChatResponse, AssistantError> {
        let (session_id, conversation) = self.sessions.open(session_id).await?;
        debug!("Chat turn for session {}", session_id);

        let mut conversation = conversation.lock().await;
        let reply = conversation
            .turn(message, self.model.as_ref(), &self.dispatcher)
            .await?;

        Ok(ChatResponse { session_id, reply })
    }

    pub async fn transcript(&self, session_id: Uuid) -> Option<Vec<ChatMessage>> {
        let conversation = self.sessions.get(session_id).await?;
        let conversation = conversation.lock().await;
        Some(conversation.transcript())
    }
}
