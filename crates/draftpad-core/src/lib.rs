pub mod ai;
pub mod config;
pub mod document;
pub mod error;
pub mod input;
pub mod prompt;
pub mod provider;
pub mod session;
pub mod state;

// Re-export main types for convenience
pub use ai::{create_generator, ClaudeClient, GeminiClient, OllamaClient, TextGenerator};
pub use config::{Config, GenerationParams};
pub use document::{Document, DocumentSnapshot, Position};
pub use error::{AssistError, ConfigError};
pub use input::InputLine;
pub use provider::Provider;
pub use session::{AssistSession, RejectReason, SessionState, Submission, FALLBACK_REPLY};
pub use state::{ChatMessage, ChatRole, Transcript};
