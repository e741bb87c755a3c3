//! Error taxonomy for outbound API calls
//!
//! The pipeline never recovers errors, it only classifies and re-raises
//! them. Classification by HTTP status: 401 is an authentication failure
//! (drives forced logout via the session layer's refresh path), other 4xx
//! carry a server-supplied `detail` verbatim, 5xx are server failures.
//! Transport errors (no response at all) are `Network`.

/// Errors from the request pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("network error: {0}")]
    Network(String),

    #[error("authentication failed: {detail}")]
    Auth { detail: String },

    #[error("request rejected ({status}): {detail}")]
    Validation { status: u16, detail: String },

    #[error("server error ({status}): {detail}")]
    Server { status: u16, detail: String },

    #[error("payload error: {0}")]
    Decode(String),
}

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Classify a non-success HTTP status into an error variant.
    ///
    /// `detail` is the human-readable message extracted from the error
    /// body, when the server supplied one.
    pub fn from_status(status: u16, detail: Option<String>) -> Self {
        let detail = detail.unwrap_or_default();
        match status {
            401 => Error::Auth { detail },
            400..=499 => Error::Validation { status, detail },
            _ => Error::Server { status, detail },
        }
    }

    /// HTTP status associated with this error, if a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Auth { .. } => Some(401),
            Error::Validation { status, .. } | Error::Server { status, .. } => Some(*status),
            Error::Network(_) | Error::Decode(_) => None,
        }
    }

    /// Short classification label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Network(_) => "network",
            Error::Auth { .. } => "auth",
            Error::Validation { .. } => "validation",
            Error::Server { .. } => "server",
            Error::Decode(_) => "decode",
        }
    }

    /// Normalize any failure into a single display string.
    ///
    /// Preference order: server-supplied detail, then the transport-level
    /// message, then a generic fallback. Consuming views show this string
    /// and never branch on error internals.
    pub fn user_message(&self) -> String {
        const FALLBACK: &str = "An unexpected error occurred";
        let message = match self {
            Error::Auth { detail } => detail,
            Error::Validation { detail, .. } => detail,
            Error::Server { detail, .. } => detail,
            Error::Network(message) => message,
            Error::Decode(_) => "",
        };
        if message.is_empty() {
            FALLBACK.to_owned()
        } else {
            message.to_string()
        }
    }
}
