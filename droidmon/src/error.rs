//! Error taxonomy shared by the session core and its collaborators.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    /// Local input check failed before anything was sent.
    #[error("invalid input: {0}")]
    Validation(String),

    /// Lifecycle call attempted from a state that does not allow it.
    #[error("cannot {op} while {state}")]
    PreconditionFailed { op: &'static str, state: &'static str },

    /// The backend answered `success: false`.
    #[error("backend refused: {0}")]
    BackendRejected(String),

    #[error("connection problem: {0}")]
    Transport(String),

    #[error("malformed sample: {0}")]
    MalformedSample(String),

    #[error("no data to export")]
    NothingToExport,

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for SessionError {
    fn from(e: reqwest::Error) -> Self {
        SessionError::Transport(e.to_string())
    }
}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;
