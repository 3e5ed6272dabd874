//! # HTTP Server Module
//!
//! Axum server exposing the users API.
//!
//! # Endpoints
//!
//! - `/health` - Health check (includes a database ping)
//! - `/users/*` - User CRUD, optionally under a configured prefix

pub mod config;
pub mod errors;
pub mod middleware;
pub mod observability_routes;
pub mod server;
pub mod user_routes;

pub use config::HttpServerConfig;
pub use errors::{ApiError, ApiResult, ErrorResponse};
pub use server::HttpServer;
pub use user_routes::{user_routes, MessageResponse, UsersState};
