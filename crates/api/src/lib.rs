//! Nordetect sensor API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes) so
//! integration tests, the server binary and the seed binary share them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod seed;
pub mod state;
pub mod telemetry;
