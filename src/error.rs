//! Error types shared by the controller and its collaborators

use thiserror::Error;

/// Failures reported by the store, the wake scheduler or the clock.
///
/// None of these are fatal: the controller always falls back to `Wake`.
#[derive(Debug, Error)]
pub enum NapError {
    /// The scheduler refused to register a new wake request
    #[error("wake request denied: {0}")]
    ScheduleDenied(String),

    /// Wall-clock time moved backwards between two events
    #[error("clock went backwards by {0}s")]
    ClockWentBackwards(i64),

    /// A persisted record could not be read or written
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// A persisted record exists but does not decode
    #[error("corrupt record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

impl NapError {
    /// Short text shown to the user by the presentation layer
    pub fn user_message(&self) -> String {
        match self {
            NapError::ScheduleDenied(_) | NapError::ClockWentBackwards(_) => {
                "Could not schedule wake-up, nap not started".to_string()
            }
            NapError::Storage(_) | NapError::Corrupt(_) => {
                "Could not save nap state, nap not started".to_string()
            }
        }
    }
}

pub type NapResult<T> = Result<T, NapError>;
