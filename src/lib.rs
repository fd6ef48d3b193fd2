pub mod ai;
pub mod config;
pub mod error;
pub mod knowledge;
pub mod logging;
pub mod orchestrator;
pub mod prompt;
pub mod state;

// Re-export main types for convenience
pub use ai::{GeminiClient, ModelClient};
pub use config::Config;
pub use error::ModelError;
pub use knowledge::KnowledgeDocument;
pub use orchestrator::{Action, BusyKind, InFlight, Orchestrator, OrchestratorState, PendingRequest};
pub use prompt::{build_prompt, Intent};
pub use state::{ChatMessage, Sender, Transcript};
