// API layer - the HTTP adapter in front of the assistant core.

#[path = "api_error.rs"]
pub mod error;

#[path = "routes.rs"]
pub mod routes;

pub use routes::{build_router, AppState};
