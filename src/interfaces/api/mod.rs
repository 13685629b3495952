//! HTTP API for rent predictions

pub mod error;
pub mod extract;
pub mod health;
pub mod prediction;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::create_router;
pub use state::AppState;
