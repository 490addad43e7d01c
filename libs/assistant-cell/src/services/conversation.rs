use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, error, info};
use uuid::Uuid;

use shared_config::AppConfig;

use crate::error::AssistantError;
use crate::models::{ChatMessage, Role};
use crate::services::dispatch::{Capability, Dispatcher};
use crate::services::llm::{LanguageModel, ModelReply};

pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant for booking an appointment with a doctor.
Wherever required, call the respective functions provided to get the data.
Ensure you collect the following details before booking an appointment:
    - patient name
    - doctor name
    - appointment date
    - appointment time
Once the appointment details are gathered, save the appointment details. Confirm the appointment only after it has been saved.
Be clear and precise in your responses.";

/// A linear transcript that starts with the system prompt.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self { messages: vec![ChatMessage::system(SYSTEM_PROMPT)] }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// User and assistant turns only.
    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .filter(|message| message.role != Role::System)
            .cloned()
            .collect()
    }

    /// One user turn: ask the model once, run at most one capability, and
    /// append the reply. A failed model call leaves the transcript unchanged.
    pub async fn turn(
        &mut self,
        user_text: &str,
        model: &dyn LanguageModel,
        dispatcher: &Dispatcher,
    ) -> Result<String, AssistantError> {
        self.messages.push(ChatMessage::user(user_text));

        let reply = match model.complete(&self.messages, &Capability::schemas()).await {
            Ok(reply) => reply,
            Err(e) => {
                error!("Model call failed, dropping user turn: {}", e);
                self.messages.pop();
                return Err(e);
            }
        };

        let content = match reply {
            ModelReply::Message(text) => text,
            ModelReply::Call { name, arguments } => {
                debug!("Model called {} with {}", name, arguments);
                dispatcher.dispatch_call(&name, &arguments).await
            }
        };

        self.messages.push(ChatMessage::assistant(content.clone()));
        Ok(content)
    }
}

struct Session {
    conversation: Arc<Mutex<Conversation>>,
    last_active: Instant,
}

/// Conversations by session id. Each one sits behind its own mutex so turns
/// of a session run one at a time.
///
/// Sessions idle for longer than `idle_timeout` are dropped, and at most
/// `max_sessions` are kept; the least recently active one makes room for a
/// new session. Ids are only ever minted here.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

impl SessionStore {
    pub fn new(max_sessions: usize, idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
            idle_timeout,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.max_sessions,
            Duration::from_secs(config.session_idle_minutes.saturating_mul(60)),
        )
    }

    /// Resume `session_id`, or start a session under a fresh id for `None`.
    /// Unknown and expired ids are refused.
    pub async fn open(&self, session_id: Option<Uuid>) -> Result<(Uuid, Arc<Mutex<Conversation>>), AssistantError> {
        match session_id {
            Some(id) => self.resume(id).await.map(|conversation| (id, conversation)),
            None => Ok(self.create().await),
        }
    }

    pub async fn create(&self) -> (Uuid, Arc<Mutex<Conversation>>) {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        self.evict(&mut sessions, now);

        let id = Uuid::new_v4();
        let conversation = Arc::new(Mutex::new(Conversation::new()));
        sessions.insert(id, Session { conversation: conversation.clone(), last_active: now });
        info!("Starting conversation {} ({} active)", id, sessions.len());

        (id, conversation)
    }

    /// A live conversation, with its idle timer reset.
    pub async fn resume(&self, session_id: Uuid) -> Result<Arc<Mutex<Conversation>>, AssistantError> {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;

        if let Some(session) = sessions.get_mut(&session_id) {
            if now.duration_since(session.last_active) < self.idle_timeout {
                session.last_active = now;
                return Ok(session.conversation.clone());
            }
        }

        if sessions.remove(&session_id).is_some() {
            info!("Conversation {} expired", session_id);
        }
        Err(AssistantError::UnknownSession(session_id))
    }

    /// Read-only lookup; does not count as activity.
    pub async fn get(&self, session_id: Uuid) -> Option<Arc<Mutex<Conversation>>> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&session_id)
            .filter(|session| session.last_active.elapsed() < self.idle_timeout)
            .map(|session| session.conversation.clone())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    // Drops idle sessions, then the least recently active until one slot is free.
    fn evict(&self, sessions: &mut HashMap<Uuid, Session>, now: Instant) {
        let before = sessions.len();
        sessions.retain(|_, session| now.duration_since(session.last_active) < self.idle_timeout);

        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, session)| session.last_active)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                }
                None => break,
            }
        }

        if sessions.len() < before {
            debug!("Evicted {} conversations", before - sessions.len());
        }
    }
}
