//! SmartBI HTTP client
//!
//! Wraps every backend call in a pipeline that attaches the session token,
//! normalizes the backend's response envelopes and turns failures into a
//! single [`ClientError`] after notifying the user.

#[macro_use]
extern crate tracing;

pub mod client;
pub mod types;

pub use client::envelope::{ApiResponse, ResponseEnvelope};
pub use client::error::ClientError;
pub use client::{SmartBiClient, SmartBiClientBuilder};
pub use types::{LoginRequest, RegisterRequest, UserInfo};
