//! Derived statistics queries for the taskmax server.

use taskmax_core::db::unix_timestamp;

use super::db::{Database, DatabaseError};
use super::models::{Task, UserStats};

impl Database {
    /// Aggregate task counts for one user in a single query. Every count is
    /// zero when the user has no tasks (or does not exist).
    pub async fn get_user_stats(&self, max_id: i64) -> Result<UserStats, DatabaseError> {
        let now = unix_timestamp();

        let stats = sqlx::query_as::<_, UserStats>(
            r"
            SELECT
                COUNT(t.id) AS total_tasks,
                COUNT(CASE WHEN t.status_in_work = 1 THEN 1 END) AS active_tasks,
                COUNT(CASE WHEN t.status_in_work = 0 THEN 1 END) AS completed_tasks,
                COUNT(CASE WHEN t.priority = 2 THEN 1 END) AS high_priority_tasks,
                COUNT(CASE WHEN t.priority = 1 THEN 1 END) AS medium_priority_tasks,
                COUNT(CASE WHEN t.priority = 0 THEN 1 END) AS low_priority_tasks,
                COUNT(CASE WHEN t.due_date < ? AND t.status_in_work = 1 THEN 1 END) AS overdue_tasks
            FROM tasks t
            JOIN users u ON t.user_id = u.id
            WHERE u.max_id = ?
            ",
        )
        .bind(now)
        .bind(max_id)
        .fetch_one(self.pool())
        .await?;

        Ok(stats)
    }

    /// The user's most recently created tasks, capped at `limit`.
    pub async fn get_recent_tasks(
        &self,
        max_id: i64,
        limit: u32,
    ) -> Result<Vec<Task>, DatabaseError> {
        let tasks = sqlx::query_as::<_, Task>(
            r"
            SELECT t.* FROM tasks t
            JOIN users u ON t.user_id = u.id
            WHERE u.max_id = ?
            ORDER BY t.created_at DESC, t.id DESC
            LIMIT ?
            ",
        )
        .bind(max_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::{PRIORITY_HIGH, PRIORITY_LOW, PRIORITY_MEDIUM};

    const MAX_ID: i64 = 123_456_789;

    async fn setup() -> Database {
        let db = Database::open_in_memory().await.unwrap();
        db.upsert_user(MAX_ID, "demo_user", "UTC+3").await.unwrap();
        db
    }

    #[tokio::test]
    async fn stats_all_zero_without_tasks() {
        let db = setup().await;

        let stats = db.get_user_stats(MAX_ID).await.unwrap();
        assert_eq!(stats.total_tasks, 0);
        assert_eq!(stats.active_tasks, 0);
        assert_eq!(stats.completed_tasks, 0);
        assert_eq!(stats.overdue_tasks, 0);
    }

    #[tokio::test]
    async fn stats_all_zero_for_unknown_user() {
        let db = Database::open_in_memory().await.unwrap();

        let stats = db.get_user_stats(404).await.unwrap();
        assert_eq!(stats.total_tasks, 0);
    }

    #[tokio::test]
    async fn stats_count_buckets() {
        let db = setup().await;
        let now = unix_timestamp();

        db.create_task(MAX_ID, "a", None, PRIORITY_HIGH, true, None).await.unwrap();
        db.create_task(MAX_ID, "b", None, PRIORITY_MEDIUM, false, None).await.unwrap();
        db.create_task(MAX_ID, "c", None, PRIORITY_LOW, true, Some(now - 60)).await.unwrap();

        let stats = db.get_user_stats(MAX_ID).await.unwrap();
        assert_eq!(stats.total_tasks, 3);
        assert_eq!(stats.active_tasks, 2);
        assert_eq!(stats.completed_tasks, 1);
        assert_eq!(stats.high_priority_tasks, 1);
        assert_eq!(stats.medium_priority_tasks, 1);
        assert_eq!(stats.low_priority_tasks, 1);
        assert_eq!(stats.overdue_tasks, 1);
    }

    #[tokio::test]
    async fn recent_tasks_capped_and_newest_first() {
        let db = setup().await;
        for i in 0..7 {
            db.create_task(MAX_ID, &format!("task-{i}"), None, 0, true, None)
                .await
                .unwrap();
        }

        let recent = db.get_recent_tasks(MAX_ID, 5).await.unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].title, "task-6");
        assert_eq!(recent[4].title, "task-2");
    }
}
