//! Response envelope normalization
//!
//! The backend answers in one of three shapes. Discriminators are checked
//! in a fixed order: `code == 1`, then `success == true`, else failure.

use super::error::{ClientError, DEFAULT_FAILURE_MESSAGE};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use smartbi_core::SessionToken;

/// A 2xx response body, classified
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseEnvelope {
    /// `{code: 1, ...}`, passed through unchanged
    Coded(Value),
    /// `{success: true, data, message}`
    Success { data: Value, message: Value },
    /// Any other body, including `{success: false, ...}` and non-objects
    Failure(Value),
}

impl ResponseEnvelope {
    pub fn classify(body: Value) -> Self {
        if body.get("code").and_then(Value::as_f64) == Some(1.0) {
            return Self::Coded(body);
        }

        if body.get("success") == Some(&Value::Bool(true)) {
            let mut body = body;
            let data = body.get_mut("data").map(Value::take).unwrap_or(Value::Null);
            let message = body.get_mut("message").map(Value::take).unwrap_or(Value::Null);
            return Self::Success { data, message };
        }

        Self::Failure(body)
    }

    /// Collapse into what the caller receives, or the failure message and body
    pub fn into_result(self) -> Result<ApiResponse, (String, Value)> {
        match self {
            Self::Coded(body) => Ok(ApiResponse::Raw(body)),
            Self::Success { data, message } => Ok(ApiResponse::Unwrapped { data, message }),
            Self::Failure(body) => {
                let message = message_field(body.get("message"))
                    .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
                Err((message, body))
            }
        }
    }
}

/// A message field if it is set to something non-empty
pub(crate) fn message_field(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::String(_) | Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

/// Successful pipeline result
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    /// Body of a `{code: 1}` response, untouched
    Raw(Value),
    /// `data` and `message` lifted out of a `{success: true}` envelope
    Unwrapped { data: Value, message: Value },
}

impl ApiResponse {
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Raw(body) => body.get("data"),
            Self::Unwrapped { data, .. } => Some(data),
        }
    }

    /// `message`, or the backend's `msg` on coded responses
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Raw(body) => body
                .get("message")
                .or_else(|| body.get("msg"))
                .and_then(Value::as_str),
            Self::Unwrapped { message, .. } => message.as_str(),
        }
    }

    /// Session token carried by a login or register response
    pub fn token(&self) -> Option<SessionToken> {
        let top_level = match self {
            Self::Raw(body) => body.get("token"),
            Self::Unwrapped { .. } => None,
        };
        top_level
            .or_else(|| self.data().and_then(|data| data.get("token")))
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(SessionToken::new)
    }

    /// Deserialize the `data` payload
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        let data = self.data().cloned().unwrap_or(Value::Null);
        Ok(serde_json::from_value(data)?)
    }

    pub fn into_value(self) -> Value {
        match self {
            Self::Raw(body) => body,
            Self::Unwrapped { data, message } => json!({ "data": data, "message": message }),
        }
    }
}
