//! # Record Store
//!
//! SQLite persistence for users and their profiles.
//!
//! - `users`: id, name (≤100), email (≤100, unique), timestamps
//! - `profiles`: id, user_id → users.id ON DELETE CASCADE, bio, timestamps
//!
//! The database enforces uniqueness, lengths and the cascade. This module
//! only classifies the resulting errors (see [`StoreError`]).

pub mod config;
pub mod errors;
pub mod models;
pub mod pool;
pub mod profiles;
pub mod users;

pub use config::DatabaseConfig;
pub use errors::{StoreError, StoreResult};
pub use models::{NewProfile, NewUser, Profile, User, UserChanges, UserWithBio};
pub use pool::{Database, MIGRATOR};
pub use profiles::ProfileStore;
pub use users::UserStore;
