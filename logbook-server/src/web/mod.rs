//! Web layer for the flight logbook.
//!
//! A JSON API over the time engine and the stored logbook.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
