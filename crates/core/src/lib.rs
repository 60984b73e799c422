//! Domain logic for the Nordetect sensor service.
//!
//! Everything in this crate is pure: validation of inbound readings and
//! list queries, the alert evaluator, and the presentation helpers the
//! dashboard shares with the server. Persistence lives in `nordetect-db`.

pub mod alert;
pub mod error;
pub mod query;
pub mod reading;
pub mod time;
pub mod types;
