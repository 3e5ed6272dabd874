//! Profile store
//!
//! Profiles are not writable over HTTP. This store seeds them and reads
//! them back; the filtered user listing joins against the same table.

use std::sync::Arc;

use crate::clock::Clock;

use super::errors::StoreResult;
use super::models::{NewProfile, Profile};
use super::pool::Database;

#[derive(Clone)]
pub struct ProfileStore {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl ProfileStore {
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Attach a profile to an existing user
    ///
    /// A `user_id` with no matching user fails with `Validation`.
    pub async fn create(&self, profile: NewProfile) -> StoreResult<Profile> {
        let now = self.clock.timestamp();
        let created = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, bio, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, user_id, bio, created_at, updated_at
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.bio)
        .bind(now)
        .bind(now)
        .fetch_one(self.db.inner())
        .await?;
        Ok(created)
    }

    pub async fn all(&self) -> StoreResult<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT id, user_id, bio, created_at, updated_at FROM profiles ORDER BY id",
        )
        .fetch_all(self.db.inner())
        .await?;
        Ok(profiles)
    }

    pub async fn for_user(&self, user_id: i64) -> StoreResult<Vec<Profile>> {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, user_id, bio, created_at, updated_at
            FROM profiles WHERE user_id = ? ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(self.db.inner())
        .await?;
        Ok(profiles)
    }
}
