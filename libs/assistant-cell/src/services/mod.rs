pub mod assistant;
pub mod conversation;
pub mod dispatch;
pub mod llm;

pub use assistant::AssistantService;
pub use conversation::{Conversation, SessionStore};
pub use dispatch::{Capability, CapabilitySchema, Dispatcher};
pub use llm::{LanguageModel, ModelReply, OpenAiChatModel};
