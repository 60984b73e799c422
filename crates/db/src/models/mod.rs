//! Row models.
//!
//! Each submodule holds a `FromRow` + `Serialize` struct matching a table
//! row, plus any aggregate views read from that table. Insert DTOs are the
//! validated types from `nordetect_core`.

pub mod reading;
