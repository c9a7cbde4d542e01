//! Kindred Server - HTTP API for family trees
//!
//! Exposes tree creation, passcode verification, member and relationship
//! management, and relationship path lookups as a JSON API.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use handlers::AppState;
pub use router::{create_router, run_server};
