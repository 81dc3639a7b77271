//! Authentication API client methods

use super::envelope::ApiResponse;
use super::{ClientError, SmartBiClient};
use crate::types::{LoginRequest, RegisterRequest};
use smartbi_core::TokenStore;

pub const REGISTER_PATH: &str = "/api/auth/register";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const CURRENT_USER_PATH: &str = "/api/auth/current-user";

impl SmartBiClient {
    /// Register an account. The display name is the account name and the
    /// role is always `user`.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<ApiResponse, ClientError> {
        self.post(REGISTER_PATH, &RegisterRequest::new(username, password))
            .await
    }

    /// Log in. Storing the returned token is up to the caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<ApiResponse, ClientError> {
        self.post(LOGIN_PATH, &LoginRequest::new(username, password))
            .await
    }

    /// Fetch the owner of the current session (requires authentication)
    pub async fn current_user(&self) -> Result<ApiResponse, ClientError> {
        self.get(CURRENT_USER_PATH).await
    }

    /// Drop the local session. The backend keeps no session state to revoke.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.token_store().clear()?;
        info!("Logged out");
        Ok(())
    }
}
