//! Navigation guard
//!
//! Runs before every route transition and resolves it synchronously to one
//! of three outcomes based on the target's `requires_auth` flag and whether
//! a session token is present.

use crate::notify::{Notification, Notifier};
use crate::routes::{ResolvedRoute, normalize_path};
use crate::token::TokenStore;
use std::sync::Arc;
use tracing::debug;

pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_HOME_PATH: &str = "/";
pub const LOGIN_REQUIRED_MESSAGE: &str = "Please log in first";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Allow,
    /// Protected target without a session
    RedirectToLogin,
    /// Authenticated user heading to the login page
    RedirectToHome,
}

pub struct NavigationGuard {
    tokens: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
    login_path: String,
    home_path: String,
}

impl NavigationGuard {
    pub fn new(tokens: Arc<dyn TokenStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            tokens,
            notifier,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            home_path: DEFAULT_HOME_PATH.to_string(),
        }
    }

    pub fn with_paths(mut self, login_path: &str, home_path: &str) -> Self {
        self.login_path = normalize_path(login_path);
        self.home_path = normalize_path(home_path);
        self
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    /// Decide a transition to `to`. The "please log in" notification is
    /// emitted here; redirects are not errors.
    pub fn check(&self, to: &ResolvedRoute, from: Option<&ResolvedRoute>) -> GuardOutcome {
        let authenticated = self.tokens.is_authenticated();
        debug!(
            to = %to.path,
            from = from.map(|r| r.path.as_str()).unwrap_or("-"),
            requires_auth = to.requires_auth(),
            authenticated,
            "Route guard triggered"
        );

        if to.requires_auth() {
            if authenticated {
                GuardOutcome::Allow
            } else {
                self.notifier.notify(Notification::warning(LOGIN_REQUIRED_MESSAGE));
                GuardOutcome::RedirectToLogin
            }
        } else if authenticated && to.path == self.login_path {
            GuardOutcome::RedirectToHome
        } else {
            GuardOutcome::Allow
        }
    }

    /// Path a redirect outcome sends the user to
    pub fn redirect_target(&self, outcome: GuardOutcome) -> Option<&str> {
        match outcome {
            GuardOutcome::Allow => None,
            GuardOutcome::RedirectToLogin => Some(&self.login_path),
            GuardOutcome::RedirectToHome => Some(&self.home_path),
        }
    }
}
