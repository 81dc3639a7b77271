//! Client error types

use serde_json::Value;
use thiserror::Error;

/// Message used when neither the server nor the transport supplied one
pub const DEFAULT_FAILURE_MESSAGE: &str = "request failed";

/// Message shown when the backend rejects the session
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired, please log in again";

/// Uniform failure surfaced to callers of the request pipeline
#[derive(Debug, Error)]
pub enum ClientError {
    /// A request interceptor rejected the request before it was sent
    #[error("Request preparation failed: {0}")]
    Preparation(String),

    /// Network failure, timeout, or non-2xx status other than 401
    #[error("{message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// The backend answered 401
    #[error("{message}")]
    SessionExpired { message: String },

    /// 2xx transport status with a failure-shaped body
    #[error("{message}")]
    Application { message: String, body: Value },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The session token store failed
    #[error("Session store error: {0}")]
    Session(#[from] smartbi_core::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Human-readable message, as shown to the user
    pub fn message(&self) -> String {
        match self {
            Self::Transport { message, .. }
            | Self::SessionExpired { message }
            | Self::Application { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status, when the failure came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::SessionExpired { .. } => Some(401),
            _ => None,
        }
    }

    /// Check if this error means the session token was rejected
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::SessionExpired { .. })
    }

    /// Whether the pipeline already notified the user about this failure
    pub fn is_notified(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::SessionExpired { .. } | Self::Application { .. }
        )
    }
}
