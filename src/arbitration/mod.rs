//! Arbitration between retrieved candidates.
//!
//! The reasoning backend either picks one candidate (with a confidence), rejects all
//! of them, or fails. Anything it returns outside the decision schema is treated as a
//! failed call, never as a match.

pub mod backend;
pub mod config;
mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod prompt;
pub mod selector;
pub mod types;


pub use backend::{ArbitrationBackend, GenaiArbiter};
pub use config::ArbitrationConfig;
pub use error::ArbitrationError;
#[cfg(any(test, feature = "mock"))]
pub use mock::ScriptedArbiter;
pub use prompt::ArbitrationPrompt;
pub use selector::{ArbitrationSelector, embedding_only_outcome};
pub use types::{ArbitrationOutcome, MatchMethod, MatchResult};
