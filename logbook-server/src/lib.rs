//! Flight logbook server.
//!
//! Turns four wall-clock entries (OUT, OFF, ON, IN) into a chronologically
//! consistent set of UTC instants, derives block and flight time, applies
//! the logbook's validation rules and stores the result.

pub mod config;
pub mod domain;
pub mod import;
pub mod logbook;
pub mod stats;
pub mod store;
pub mod web;
