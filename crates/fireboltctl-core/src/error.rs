//! Error taxonomy for fireboltctl-core
//!
//! Every failure surfaced by the [`Client`](crate::Client) falls into one of
//! four kinds. Callers that need to branch on a failure (the CLI maps them to
//! exit codes) should use [`FireboltError::kind`] and, for request failures,
//! the client/server classification on [`RequestError`].
//!
//! # Example
//!
//! ```rust
//! use fireboltctl_core::{ErrorKind, FireboltError, RequestError};
//! use reqwest::{Method, StatusCode};
//!
//! let url = "https://api.app.firebolt.io/core/v1/account/engines/abc".parse().unwrap();
//! let err: FireboltError =
//!     RequestError::new(Method::GET, url, StatusCode::NOT_FOUND, "not found").into();
//!
//! assert_eq!(err.kind(), ErrorKind::Request);
//! assert!(err.is_client_error());
//! assert!(err.is_not_found());
//! ```

use reqwest::{Method, StatusCode};
use thiserror::Error;
use url::Url;

use crate::engine::{Engine, EngineStatus};

/// Core error type for all client operations
#[derive(Error, Debug)]
pub enum FireboltError {
    /// The credential exchange failed. Carries the email that was used, never
    /// the password.
    #[error("authentication error with {email} and password: {reason}")]
    Authentication { email: String, reason: String },

    /// An authenticated call came back with a 4xx or 5xx status
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The poller ran out of attempts before the engine reached the status
    #[error(
        "engine '{}' is {} after polling, wanted {desired_status}",
        .engine.name,
        .engine.current_status
    )]
    EngineWrongStatus {
        engine: Box<Engine>,
        desired_status: EngineStatus,
    },

    /// Anything else: transport failures, malformed responses, bad URLs
    #[error(transparent)]
    Unknown(#[from] UnknownError),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, FireboltError>;

/// The four failure kinds callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    Request,
    EngineWrongStatus,
    Unknown,
}

impl FireboltError {
    /// Which of the four kinds this error belongs to
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            FireboltError::Authentication { .. } => ErrorKind::Authentication,
            FireboltError::Request(_) => ErrorKind::Request,
            FireboltError::EngineWrongStatus { .. } => ErrorKind::EngineWrongStatus,
            FireboltError::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// Build an [`UnknownError::Other`] from a message
    pub fn unknown(message: impl Into<String>) -> Self {
        FireboltError::Unknown(UnknownError::Other(message.into()))
    }

    /// HTTP status of the failed call, if this is a request error
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            FireboltError::Request(e) => Some(e.status_code()),
            _ => None,
        }
    }

    /// Returns true if this is a request error with a 4xx status
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, FireboltError::Request(e) if e.is_client_error())
    }

    /// Returns true if this is a request error with a 5xx status
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, FireboltError::Request(e) if e.is_server_error())
    }

    /// Returns true if this is a "not found" error (404)
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(StatusCode::NOT_FOUND)
    }
}

impl From<reqwest::Error> for FireboltError {
    fn from(err: reqwest::Error) -> Self {
        FireboltError::Unknown(UnknownError::Transport(err))
    }
}

/// An authenticated call returned a status code of 400 or above.
///
/// Keeps the originating request line and the response status and body so
/// the failure can be reported and classified after the response is gone.
#[derive(Error, Debug, Clone)]
#[error("{method} {url}: {status}: {body}")]
pub struct RequestError {
    method: Method,
    url: Url,
    status: StatusCode,
    body: String,
}

impl RequestError {
    pub fn new(method: Method, url: Url, status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            method,
            url,
            status,
            body: body.into(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Raw response body text
    pub fn body(&self) -> &str {
        &self.body
    }

    /// True for statuses in [400, 500): the caller is at fault
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status.is_client_error()
    }

    /// True for statuses in [500, 600): the service is at fault
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }
}

/// Failures that are neither authentication, request nor polling errors
#[derive(Error, Debug)]
pub enum UnknownError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response from {context}: {source}")]
    Malformed {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{0}")]
    Other(String),
}
