//! Wire types for the `/api/auth` endpoints

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role assigned to every self-registered account
pub const DEFAULT_USER_ROLE: &str = "user";

/// Body of `POST /api/auth/register`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub user_account: String,
    pub user_password: String,
    pub user_name: String,
    pub user_role: String,
}

impl RegisterRequest {
    /// The account name doubles as the display name; the role is always `user`
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        let username = username.into();
        Self {
            user_name: username.clone(),
            user_account: username,
            user_password: password.into(),
            user_role: DEFAULT_USER_ROLE.to_string(),
        }
    }
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("user_account", &self.user_account)
            .field("user_password", &"<redacted>")
            .field("user_name", &self.user_name)
            .field("user_role", &self.user_role)
            .finish()
    }
}

/// Body of `POST /api/auth/login`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_account: String,
    pub user_password: String,
}

impl LoginRequest {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user_account: username.into(),
            user_password: password.into(),
        }
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("user_account", &self.user_account)
            .field("user_password", &"<redacted>")
            .finish()
    }
}

/// Account details returned by login, register and current-user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub user_account: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_avatar: Option<String>,
    pub user_role: String,
    #[serde(default)]
    pub create_time: Option<String>,
}
