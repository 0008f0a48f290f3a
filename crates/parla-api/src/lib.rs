//! Parla API crate - axum HTTP relay and session endpoints.
//!
//! Exposes the stateless chat/translate relay used by simple clients and
//! the session endpoints that run the full dialogue flow server-side.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::{create_router, start_server};
pub use state::AppState;
