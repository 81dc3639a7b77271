//! Pipeline stages
//!
//! Outbound stages transform a built request before it is sent. Inbound
//! stages turn a 2xx body or a transport failure into the caller's result,
//! emitting the user notification and session side effects on the way.

use super::envelope::{ApiResponse, ResponseEnvelope, message_field};
use super::error::{ClientError, DEFAULT_FAILURE_MESSAGE, SESSION_EXPIRED_MESSAGE};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Request, StatusCode};
use serde_json::Value;
use smartbi_core::{Navigator, Notification, Notifier, SessionToken, TokenStore};
use std::sync::Arc;

/// Outbound stage applied to every request before it is sent
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, request: Request) -> Result<Request, ClientError>;
}

/// Attaches `Authorization: Bearer <token>` when a session exists
pub struct BearerAuth {
    tokens: Arc<dyn TokenStore>,
}

impl BearerAuth {
    pub fn new(tokens: Arc<dyn TokenStore>) -> Self {
        Self { tokens }
    }
}

impl RequestInterceptor for BearerAuth {
    fn intercept(&self, mut request: Request) -> Result<Request, ClientError> {
        if let Some(token) = self.tokens.read().filter(|token| !token.is_empty()) {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
                .map_err(|e| ClientError::Preparation(format!("invalid session token: {e}")))?;
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        Ok(request)
    }
}

/// Token a prepared request carries, if any.
///
/// Header values may hold any UTF-8 the store accepted, so the raw bytes are
/// decoded rather than going through the visible-ASCII `to_str`.
pub fn bearer_token(request: &Request) -> Option<SessionToken> {
    let value = request.headers().get(AUTHORIZATION)?;
    let value = std::str::from_utf8(value.as_bytes()).ok()?;
    value
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .map(SessionToken::new)
}

/// Inbound stage for 2xx responses
pub struct EnvelopeNormalizer {
    notifier: Arc<dyn Notifier>,
}

impl EnvelopeNormalizer {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    pub fn normalize(&self, body: Value) -> Result<ApiResponse, ClientError> {
        match ResponseEnvelope::classify(body).into_result() {
            Ok(response) => Ok(response),
            Err((message, body)) => {
                warn!(%message, "Backend reported failure");
                self.notifier.notify(Notification::error(message.clone()));
                Err(ClientError::Application { message, body })
            }
        }
    }
}

/// Non-2xx response or network-level failure
#[derive(Debug, Clone, PartialEq)]
pub struct TransportFailure {
    pub status: Option<u16>,
    /// Parsed error body, when the server sent JSON
    pub body: Option<Value>,
    /// Transport-level description of the failure
    pub message: Option<String>,
}

impl TransportFailure {
    pub fn from_status(status: StatusCode, body: Option<Value>) -> Self {
        Self {
            status: Some(status.as_u16()),
            body,
            message: Some(format!("Request failed with status code {}", status.as_u16())),
        }
    }

    pub fn from_error(error: &reqwest::Error) -> Self {
        Self {
            status: error.status().map(|s| s.as_u16()),
            body: None,
            message: Some(error.to_string()).filter(|m| !m.is_empty()),
        }
    }

    /// Server `message`, then server `detail`, then the transport message,
    /// then the generic default
    pub fn resolve_message(&self) -> String {
        let body = self.body.as_ref();
        body.and_then(|b| message_field(b.get("message")))
            .or_else(|| body.and_then(|b| detail_message(b.get("detail"))))
            .or_else(|| self.message.clone())
            .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string())
    }
}

/// `detail` is a string for handled errors and a list of `{msg}` entries for
/// validation errors
fn detail_message(detail: Option<&Value>) -> Option<String> {
    match detail? {
        Value::Array(items) => items
            .iter()
            .find_map(|item| message_field(item.get("msg"))),
        other => message_field(Some(other)),
    }
}

/// Inbound stage for transport failures
pub struct FailureTranslator {
    tokens: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    login_path: String,
}

impl FailureTranslator {
    pub fn new(
        tokens: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            tokens,
            notifier,
            navigator,
            login_path: login_path.into(),
        }
    }

    /// Notify, apply session side effects, and build the caller's error.
    ///
    /// `sent` is the token the failed request carried. On 401 the store is
    /// cleared only while it still holds that token.
    pub fn translate(&self, failure: TransportFailure, sent: Option<&SessionToken>) -> ClientError {
        if failure.status == Some(StatusCode::UNAUTHORIZED.as_u16()) {
            warn!("Session rejected by backend");
            self.notifier.notify(Notification::error(SESSION_EXPIRED_MESSAGE));

            match self.tokens.clear_if(sent) {
                Ok(true) => info!("Session token cleared"),
                Ok(false) => info!("Session token replaced since request was sent, keeping it"),
                Err(e) => error!(error = %e, "Failed to clear session token"),
            }

            self.navigator.navigate(&self.login_path);
            return ClientError::SessionExpired {
                message: SESSION_EXPIRED_MESSAGE.to_string(),
            };
        }

        let message = failure.resolve_message();
        warn!(status = ?failure.status, %message, "Request failed");
        self.notifier.notify(Notification::error(message.clone()));
        ClientError::Transport {
            status: failure.status,
            message,
        }
    }
}
