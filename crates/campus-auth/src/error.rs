//! Error types for authentication operations

/// Errors from authentication operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A pipeline error from an auth endpoint call, re-raised unchanged.
    #[error(transparent)]
    Api(#[from] campus_gateway::Error),

    /// Local credential storage failed (I/O or serialization).
    #[error("credential storage: {0}")]
    Storage(String),
}

/// Result alias for auth operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Normalize this failure into a single display string.
    ///
    /// API errors delegate to the pipeline's normalization; local storage
    /// failures are never surfaced verbatim to a user.
    pub fn user_message(&self) -> String {
        match self {
            Error::Api(e) => e.user_message(),
            Error::Storage(_) => "An unexpected error occurred".to_owned(),
        }
    }
}
