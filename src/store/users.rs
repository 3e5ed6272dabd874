//! # User Store
//!
//! Explicit, parameterized SQL for the `users` table. Every write binds
//! only the allow-listed columns (`name`, `email`) plus store-managed
//! timestamps taken from the injected [`Clock`].

use std::sync::Arc;

use crate::clock::Clock;

use super::errors::{StoreError, StoreResult};
use super::models::{NewUser, User, UserChanges, UserWithBio};
use super::pool::Database;

/// Record store for users
#[derive(Clone)]
pub struct UserStore {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl UserStore {
    pub fn new(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Underlying database handle
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Every user, oldest id first
    pub async fn all(&self) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at, updated_at FROM users ORDER BY id",
        )
        .fetch_all(self.db.inner())
        .await?;
        Ok(users)
    }

    /// Look up a user by primary key
    pub async fn find(&self, id: i64) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at, updated_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.db.inner())
        .await?;
        Ok(user)
    }

    /// Users whose name equals `name` exactly, joined with their profiles
    ///
    /// This is an INNER JOIN: a matching user without a profile is not
    /// returned, and a user with several profiles yields one row per profile.
    pub async fn filter_by_name(&self, name: &str) -> StoreResult<Vec<UserWithBio>> {
        let rows = sqlx::query_as::<_, UserWithBio>(
            r#"
            SELECT users.id, users.name, users.email, users.created_at, users.updated_at,
                   profiles.bio
            FROM users
            INNER JOIN profiles ON users.id = profiles.user_id
            WHERE users.name = ?
            ORDER BY users.id, profiles.id
            "#,
        )
        .bind(name)
        .fetch_all(self.db.inner())
        .await?;
        Ok(rows)
    }

    /// Insert a user; `created_at` and `updated_at` are the same instant
    pub async fn create(&self, new_user: NewUser) -> StoreResult<User> {
        let now = self.clock.timestamp();
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, created_at, updated_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(now)
        .bind(now)
        .fetch_one(self.db.inner())
        .await?;
        Ok(user)
    }

    /// Apply `changes` to user `id`
    ///
    /// Fails with `NotFound` if the row does not exist. `updated_at` moves
    /// only when a column actually changes. The read and the write happen in
    /// one statement, so concurrent updates of the same row serialize on the
    /// database write lock and the last one wins.
    pub async fn update(&self, id: i64, changes: UserChanges) -> StoreResult<User> {
        if changes.is_empty() {
            return self.find(id).await?.ok_or(StoreError::NotFound);
        }

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET updated_at = CASE
                    WHEN COALESCE(?1, name) <> name OR COALESCE(?2, email) <> email THEN ?3
                    ELSE updated_at
                END,
                name = COALESCE(?1, name),
                email = COALESCE(?2, email)
            WHERE id = ?4
            RETURNING id, name, email, created_at, updated_at
            "#,
        )
        .bind(changes.name)
        .bind(changes.email)
        .bind(self.clock.timestamp())
        .bind(id)
        .fetch_optional(self.db.inner())
        .await?
        .ok_or(StoreError::NotFound)?;

        Ok(user)
    }

    /// Delete user `id`; its profiles go with it through the foreign key
    pub async fn delete(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(self.db.inner())
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    /// Delete every user and reset the id counter, returning the row count
    pub async fn truncate(&self) -> StoreResult<u64> {
        let mut tx = self.db.inner().begin().await?;

        let result = sqlx::query("DELETE FROM users").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'users'")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected())
    }
}
