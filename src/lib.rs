//! userbase - users and profiles over a small JSON HTTP API
//!
//! Layers, bottom-up:
//! - `store`: SQLite schema, migrations, user/profile persistence
//! - `http_server`: axum routes mapping requests onto the store
//! - `cli`: config loading and the `serve`/`migrate`/`rollback` commands

pub mod cli;
pub mod clock;
pub mod http_server;
pub mod observability;
pub mod store;
