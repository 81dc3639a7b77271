//! SmartBI client core
//!
//! Session state shared by the request pipeline and the navigation guard:
//! the token store, the notification and navigation seams, the route table
//! and the guard that consults both.

pub mod config;
pub mod error;
pub mod guard;
pub mod navigation;
pub mod notify;
pub mod routes;
pub mod token;

#[cfg(any(test, feature = "tests"))]
pub mod tests;

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use guard::{GuardOutcome, NavigationGuard};
pub use navigation::{Navigation, Navigator, Router};
pub use notify::{Notification, NotificationLevel, Notifier, TracingNotifier};
pub use routes::{ResolvedRoute, RouteDescriptor, RouteMeta, RouteTable};
pub use token::{FileTokenStore, MemoryTokenStore, SessionToken, TokenStore};

#[cfg(target_arch = "wasm32")]
pub use token::LocalStorageTokenStore;
