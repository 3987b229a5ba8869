//! User queries for the taskmax server.

use taskmax_core::db::unix_timestamp;

use super::db::{Database, DatabaseError};
use super::models::User;

impl Database {
    /// Create a user keyed on `max_id`, or refresh username/timezone when the
    /// key already exists. Single conflict-clause statement, so concurrent
    /// upserts of the same key cannot race. `created_at` is preserved on
    /// conflict.
    pub async fn upsert_user(
        &self,
        max_id: i64,
        username: &str,
        timezone: &str,
    ) -> Result<User, DatabaseError> {
        let now = unix_timestamp();

        let user = sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (max_id, username, timezone, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(max_id) DO UPDATE SET
                username = excluded.username,
                timezone = excluded.timezone,
                updated_at = excluded.updated_at
            RETURNING *
            ",
        )
        .bind(max_id)
        .bind(username)
        .bind(timezone)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool())
        .await?;

        Ok(user)
    }

    /// Look up a user by the platform identifier.
    pub async fn get_user_by_max_id(&self, max_id: i64) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE max_id = ?")
            .bind(max_id)
            .fetch_optional(self.pool())
            .await?;

        Ok(user)
    }

    /// Look up a user by the surrogate primary key.
    pub async fn get_user_by_id(&self, id: i64) -> Result<Option<User>, DatabaseError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(user)
    }

    /// Update a user's timezone. Returns `None` when the user does not exist.
    pub async fn update_user_timezone(
        &self,
        max_id: i64,
        timezone: &str,
    ) -> Result<Option<User>, DatabaseError> {
        let now = unix_timestamp();

        let user = sqlx::query_as::<_, User>(
            "UPDATE users SET timezone = ?, updated_at = ? WHERE max_id = ? RETURNING *",
        )
        .bind(timezone)
        .bind(now)
        .bind(max_id)
        .fetch_optional(self.pool())
        .await?;

        Ok(user)
    }

    /// List all users, newest first.
    pub async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let users =
            sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC, id DESC")
                .fetch_all(self.pool())
                .await?;

        Ok(users)
    }

    /// Delete a user by `max_id`. Owned tasks are removed by the cascade.
    /// Returns whether a row was removed.
    pub async fn delete_user(&self, max_id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE max_id = ?")
            .bind(max_id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
