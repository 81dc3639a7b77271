//! Client-side navigation
//!
//! [`Router`] resolves locations against the route table and runs every
//! transition through the [`NavigationGuard`], following its redirects.

use crate::guard::{GuardOutcome, NavigationGuard};
use crate::routes::{ResolvedRoute, RouteTable, normalize_path};
use crate::{Error, Result};
use std::sync::RwLock;
use tracing::{info, warn};

/// Upper bound on guard redirects followed for a single navigation
const MAX_REDIRECTS: usize = 3;

/// Side-effecting navigation, as requested by the request pipeline on 401
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Result of a completed navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Normalized path that was asked for
    pub requested: String,
    /// Where the user ended up after redirects
    pub location: ResolvedRoute,
    /// Guard decision for the requested route
    pub outcome: GuardOutcome,
}

impl Navigation {
    pub fn was_redirected(&self) -> bool {
        self.outcome != GuardOutcome::Allow
    }
}

pub struct Router {
    table: RouteTable,
    guard: NavigationGuard,
    current: RwLock<Option<ResolvedRoute>>,
}

impl Router {
    pub fn new(table: RouteTable, guard: NavigationGuard) -> Self {
        Self {
            table,
            guard,
            current: RwLock::new(None),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    /// Current location, `None` before the first navigation
    pub fn current(&self) -> Option<ResolvedRoute> {
        self.current.read().ok().and_then(|current| current.clone())
    }

    /// Navigate to `path`, applying the guard
    pub fn push(&self, path: &str) -> Result<Navigation> {
        let requested = normalize_path(path);
        let from = self.current();
        let mut target = self.resolve(&requested)?;
        let mut first_outcome = None;

        for _ in 0..=MAX_REDIRECTS {
            let outcome = self.guard.check(&target, from.as_ref());
            let outcome_for_request = *first_outcome.get_or_insert(outcome);

            let Some(next) = self.guard.redirect_target(outcome) else {
                if let Ok(mut current) = self.current.write() {
                    *current = Some(target.clone());
                }
                return Ok(Navigation {
                    requested,
                    location: target,
                    outcome: outcome_for_request,
                });
            };

            info!(from = %target.path, to = %next, "Route guard redirect");
            target = self.resolve(next)?;
        }

        Err(Error::RedirectLoop(requested))
    }

    fn resolve(&self, path: &str) -> Result<ResolvedRoute> {
        self.table
            .resolve(path)
            .ok_or_else(|| Error::UnknownRoute(path.to_string()))
    }
}

impl Navigator for Router {
    fn navigate(&self, path: &str) {
        if let Err(e) = self.push(path) {
            warn!(path, error = %e, "Navigation failed");
        }
    }
}
