//! Bracket server library: HTTP API, configuration, logging, and metrics.
//!
//! The binary in `main.rs` wires these modules to a PostgreSQL-backed
//! [`BracketManager`](open_bracket::BracketManager); integration tests drive
//! the same router against the in-memory store.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
