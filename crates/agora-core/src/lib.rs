//! Scripted multi-persona conversations driven by a remote language model.
//!
//! Two conversation shapes are supported. A debate rotates N personas through
//! a number of iterations, each persona answering the one before it. A mock
//! criminal trial walks a prosecutor and a defense counsel through a fixed
//! script before a judge delivers a verdict. Both share the same building
//! blocks:
//!
//! - **Sessions**: validated run parameters; an invalid session never starts
//! - **Conversation history**: append-only turns resent in full on every call
//! - **Turn schedulers**: explicit run state advanced one inference call at a time
//! - **Inference**: the `LLM` trait, with a Gemini `generateContent` client
//! - **Presentation**: a sink receiving statuses, turns and the verdict
//! - **Configuration and credentials**: YAML settings and a stored API key

pub mod config;
pub mod core_types;
pub mod credentials;
pub mod errors;
pub mod history;
pub mod llm;
pub mod orchestrator;
pub mod presentation;
pub mod session;

pub use config::*;
pub use core_types::{Role, TranscriptEntry, Turn};
pub use credentials::{resolve_credential, CredentialStore};
pub use errors::{AgoraError, ConfigurationError, RemoteError};
pub use history::ConversationHistory;
pub use llm::LLM;
pub use orchestrator::{
    DebateOrchestrator, RunKind, RunReport, RunStatus, TrialOrchestrator,
};
pub use presentation::{PresentationSink, RecordingSink};
pub use session::{DebateSession, TrialSession};

#[cfg(test)]
pub mod test_utils;
