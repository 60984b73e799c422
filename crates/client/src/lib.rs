//! Typed HTTP client for the Nordetect sensor API.
//!
//! [`ReadingsClient`] wraps the `/api/v1/readings` endpoints and keeps a
//! [`QueryCache`] of recent query results. Writes made through the client
//! invalidate or patch the affected cache entries, so a dashboard polling
//! through it sees its own submissions immediately.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod model;

pub use cache::{CacheKey, QueryCache};
pub use client::ReadingsClient;
pub use config::ClientConfig;
pub use error::ClientError;
