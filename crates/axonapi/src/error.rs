//! Error types for AxonOps API operations.
//!
//! Transport and parse failures never surface here from [`crate::ApiClient::request`];
//! they are folded into [`crate::ApiResponse`]. The errors below are raised by the
//! CRUD handlers, by login, and by configuration validation.

use crate::kind::ResourceKind;

/// Result type alias for AxonOps API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of API errors for user feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection refused, timeout, DNS, or a 5xx from the server.
    Network,
    /// Credentials missing or rejected.
    Auth,
    /// The addressed entity or endpoint does not exist.
    NotFound,
    /// The server refused the request body.
    Rejected,
    /// Local configuration is incomplete or invalid.
    Config,
    /// Response could not be interpreted.
    Format,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "AxonOps API unreachable",
            Self::Auth => "Authentication failed",
            Self::NotFound => "Not found on the AxonOps server",
            Self::Rejected => "Request rejected by the AxonOps server",
            Self::Config => "Invalid configuration",
            Self::Format => "Unexpected API response",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check the base URL and that the AxonOps server is reachable, then re-run",
            Self::Auth => "Check api_key/organization or token, or username/password for login",
            Self::NotFound => "Verify the base URL and deployment_mode point at the right server",
            Self::Rejected => "Check the declared fields against the server's error message",
            Self::Config => "Fix the configuration file and run 'axonctl check'",
            Self::Format => "The server may be a different AxonOps version than expected",
        }
    }
}

/// Errors that can occur during AxonOps API operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The HTTP exchange itself failed (no status code was received).
    #[error("request to {url} failed: {message}")]
    Transport {
        /// Full request URL.
        url: String,
        /// Underlying error message.
        message: String,
    },

    /// A CRUD operation returned a non-2xx status.
    #[error("Failed to {action}: {message}")]
    Api {
        /// Entity kind the operation targeted.
        kind: ResourceKind,
        /// Human-readable operation, e.g. "create alert rule".
        action: String,
        /// Server-provided error, or "Unknown error".
        message: String,
        /// HTTP status, `0` when the transport failed.
        status: u16,
    },

    /// Exchanging username/password for a token failed.
    #[error("login failed: {0}")]
    Login(String),

    /// A required setting is absent.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    /// A declared entity failed validation.
    #[error("invalid {kind} '{name}': {message}")]
    Invalid {
        /// Entity kind.
        kind: ResourceKind,
        /// Entity name.
        name: String,
        /// What is wrong with it.
        message: String,
    },

    /// The server answered with a payload we could not use.
    #[error("invalid API response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Create a validation error for a declared entity.
    pub fn invalid(kind: ResourceKind, name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            kind,
            name: name.into(),
            message: message.into(),
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Transport { .. } => ErrorCategory::Network,
            Error::Api { status, .. } => match *status {
                0 => ErrorCategory::Network,
                401 | 403 => ErrorCategory::Auth,
                404 => ErrorCategory::NotFound,
                s if s >= 500 => ErrorCategory::Network,
                _ => ErrorCategory::Rejected,
            },
            Error::Login(_) => ErrorCategory::Auth,
            Error::MissingConfig(_) | Error::Invalid { .. } => ErrorCategory::Config,
            Error::InvalidResponse(_) => ErrorCategory::Format,
        }
    }
}
