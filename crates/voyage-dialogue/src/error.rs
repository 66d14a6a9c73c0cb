//! Error types for the dialogue layer

use thiserror::Error;

/// Errors that can occur while handling a dialogue turn
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DialogueError {
    /// Message log could not be read or written
    #[error("Message log error: {0}")]
    Log(String),
}
