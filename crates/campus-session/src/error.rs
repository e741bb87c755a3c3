//! Error types for session operations

/// Errors from session operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// `refresh()` was invoked with no refresh token in the session.
    /// Fails fast instead of issuing a doomed network call.
    #[error("no refresh token available")]
    NoRefreshToken,

    /// An auth operation failed, re-raised from the auth layer.
    #[error(transparent)]
    Auth(#[from] campus_auth::Error),
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Normalize this failure into a single display string.
    pub fn user_message(&self) -> String {
        match self {
            Error::NoRefreshToken => self.to_string(),
            Error::Auth(e) => e.user_message(),
        }
    }
}
