//! Error types used throughout the client

use thiserror::Error;

/// Failure of a single HTTP exchange, raised by transport strategies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request carried no `User-Agent` header. Caller bug, checked before
    /// any network activity.
    #[error("User agent is required")]
    MissingUserAgent,

    /// No response could be obtained at all.
    #[error("Unexpected HTTP call failure: {0}")]
    CallFailed(String),

    /// A response arrived without a usable status code.
    #[error("Unexpected empty response http code")]
    NoStatus,

    /// The client could not be prepared (unreadable certificate, invalid
    /// header, ...).
    #[error("HTTP client setup failed: {0}")]
    Setup(String),
}

impl TransportError {
    /// HTTP-equivalent code attached to this failure, if any.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::MissingUserAgent => Some(400),
            Self::CallFailed(_) => Some(500),
            Self::NoStatus | Self::Setup(_) => None,
        }
    }
}

/// Main error type for the LAPI client
#[derive(Error, Debug)]
pub enum LapiError {
    #[error("Invalid configuration for \"{option}\": {reason}")]
    Configuration { option: String, reason: String },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Method ({0}) is not allowed.")]
    MethodNotAllowed(String),

    #[error("Body response is not a valid json: {0}")]
    InvalidBody(String),

    #[error("Unexpected response status code: {status}. Body was: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("Login response does not contain required token.")]
    MissingToken,

    #[error("Token is required.")]
    TokenRequired,

    #[error("Login failed after {attempts} attempts: {source}")]
    LoginRetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<LapiError>,
    },

    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl LapiError {
    /// Shorthand for a configuration error on `option`.
    pub fn configuration(option: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration { option: option.into(), reason: reason.into() }
    }

    /// HTTP-equivalent code attached to this error, if any.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transport(err) => err.status_code(),
            Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::MissingToken | Self::TokenRequired | Self::LoginRetriesExhausted { .. } => {
                Some(401)
            }
            _ => None,
        }
    }

    /// True for the 401 class of errors that trigger a fresh login.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status_code(), Some(401))
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, LapiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_class() {
        assert_eq!(LapiError::from(TransportError::MissingUserAgent).status_code(), Some(400));
        assert_eq!(LapiError::from(TransportError::CallFailed("boom".into())).status_code(), Some(500));
        assert_eq!(LapiError::from(TransportError::NoStatus).status_code(), None);
        assert_eq!(
            LapiError::UnexpectedStatus { status: 403, body: String::new() }.status_code(),
            Some(403)
        );
        assert_eq!(LapiError::MissingToken.status_code(), Some(401));
        assert_eq!(LapiError::InvalidBody("x".into()).status_code(), None);
    }

    #[test]
    fn unauthorized_class_is_exactly_401() {
        assert!(LapiError::UnexpectedStatus { status: 401, body: String::new() }.is_unauthorized());
        assert!(LapiError::TokenRequired.is_unauthorized());
        assert!(LapiError::MissingToken.is_unauthorized());
        assert!(!LapiError::UnexpectedStatus { status: 403, body: String::new() }.is_unauthorized());
        assert!(!LapiError::MethodNotAllowed("PUT".into()).is_unauthorized());
        assert!(!LapiError::from(TransportError::MissingUserAgent).is_unauthorized());
    }

    #[test]
    fn exhausted_login_names_attempts_and_cause() {
        let err = LapiError::LoginRetriesExhausted {
            attempts: 2,
            source: Box::new(LapiError::UnexpectedStatus {
                status: 401,
                body: "{\"message\":\"access forbidden\"}".into(),
            }),
        };

        let message = err.to_string();
        assert!(message.contains("2 attempts"));
        assert!(message.contains("401"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn messages_match_wire_expectations() {
        assert_eq!(LapiError::MethodNotAllowed("PUT".into()).to_string(), "Method (PUT) is not allowed.");
        assert_eq!(
            LapiError::configuration("scenarios", "must be configured").to_string(),
            "Invalid configuration for \"scenarios\": must be configured"
        );
        assert_eq!(
            LapiError::UnexpectedStatus { status: 500, body: "oops".into() }.to_string(),
            "Unexpected response status code: 500. Body was: oops"
        );
    }
}
