//! Web layer for the fleet service.
//!
//! Provides HTTP endpoints for fleet search, live positions, arrival
//! estimates and location ingest.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
