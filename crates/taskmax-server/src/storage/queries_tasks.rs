//! Task queries for the taskmax server.

use taskmax_core::db::unix_timestamp;

use super::db::{Database, DatabaseError};
use super::models::{Task, TaskPatch, TaskUpdate};

impl Database {
    /// Create a task owned by the user with the given `max_id`.
    ///
    /// The owner is resolved and the row inserted inside one transaction;
    /// a missing owner fails with `NotFound` and leaves no row behind.
    pub async fn create_task(
        &self,
        max_id: i64,
        title: &str,
        description: Option<&str>,
        priority: i64,
        status_in_work: bool,
        due_date: Option<i64>,
    ) -> Result<Task, DatabaseError> {
        let now = unix_timestamp();

        let mut tx = self.pool().begin().await?;

        let owner: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE max_id = ?")
            .bind(max_id)
            .fetch_optional(&mut *tx)
            .await?;

        // Dropping the open transaction rolls it back.
        let Some((user_id,)) = owner else {
            return Err(DatabaseError::NotFound(format!("User with max_id {max_id}")));
        };

        let task = sqlx::query_as::<_, Task>(
            r"
            INSERT INTO tasks (user_id, title, description, priority, status_in_work, due_date, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            ",
        )
        .bind(user_id)
        .bind(title)
        .bind(description)
        .bind(priority)
        .bind(status_in_work)
        .bind(due_date)
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(task)
    }

    /// List a user's tasks, optionally filtered by status. Most urgent first,
    /// then newest.
    pub async fn get_user_tasks(
        &self,
        max_id: i64,
        status_in_work: Option<bool>,
    ) -> Result<Vec<Task>, DatabaseError> {
        let tasks = if let Some(status) = status_in_work {
            sqlx::query_as::<_, Task>(
                r"
                SELECT t.* FROM tasks t
                JOIN users u ON t.user_id = u.id
                WHERE u.max_id = ? AND t.status_in_work = ?
                ORDER BY t.priority DESC, t.created_at DESC, t.id DESC
                ",
            )
            .bind(max_id)
            .bind(status)
            .fetch_all(self.pool())
            .await?
        } else {
            sqlx::query_as::<_, Task>(
                r"
                SELECT t.* FROM tasks t
                JOIN users u ON t.user_id = u.id
                WHERE u.max_id = ?
                ORDER BY t.priority DESC, t.created_at DESC, t.id DESC
                ",
            )
            .bind(max_id)
            .fetch_all(self.pool())
            .await?
        };

        Ok(tasks)
    }

    /// Get a task by id.
    pub async fn get_task_by_id(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        let task = sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        Ok(task)
    }

    /// Set a task's open/completed status. Returns `None` for an unknown id.
    pub async fn update_task_status(
        &self,
        id: i64,
        status_in_work: bool,
    ) -> Result<Option<Task>, DatabaseError> {
        let now = unix_timestamp();

        let task = sqlx::query_as::<_, Task>(
            "UPDATE tasks SET status_in_work = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(status_in_work)
        .bind(now)
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(task)
    }

    /// Set a task's priority bucket. Returns `None` for an unknown id.
    pub async fn update_task_priority(
        &self,
        id: i64,
        priority: i64,
    ) -> Result<Option<Task>, DatabaseError> {
        let now = unix_timestamp();

        let task = sqlx::query_as::<_, Task>(
            "UPDATE tasks SET priority = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(priority)
        .bind(now)
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(task)
    }

    /// Partially update a task. Only fields set in the patch are modified;
    /// an empty patch returns `Unchanged` without touching the row.
    pub async fn update_task(
        &self,
        id: i64,
        patch: &TaskPatch,
    ) -> Result<TaskUpdate, DatabaseError> {
        if patch.is_empty() {
            return Ok(TaskUpdate::Unchanged);
        }

        let now = unix_timestamp();

        let task = sqlx::query_as::<_, Task>(
            r"
            UPDATE tasks SET
                title = COALESCE(?, title),
                description = COALESCE(?, description),
                priority = COALESCE(?, priority),
                due_date = COALESCE(?, due_date),
                updated_at = ?
            WHERE id = ?
            RETURNING *
            ",
        )
        .bind(patch.title.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.priority)
        .bind(patch.due_date)
        .bind(now)
        .bind(id)
        .fetch_optional(self.pool())
        .await?;

        Ok(task.map_or(TaskUpdate::NotFound, TaskUpdate::Updated))
    }

    /// Delete a task. Returns whether a row was removed.
    pub async fn delete_task(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// List a user's tasks in one priority bucket, newest first.
    pub async fn get_tasks_by_priority(
        &self,
        max_id: i64,
        priority: i64,
    ) -> Result<Vec<Task>, DatabaseError> {
        let tasks = sqlx::query_as::<_, Task>(
            r"
            SELECT t.* FROM tasks t
            JOIN users u ON t.user_id = u.id
            WHERE u.max_id = ? AND t.priority = ?
            ORDER BY t.created_at DESC, t.id DESC
            ",
        )
        .bind(max_id)
        .bind(priority)
        .fetch_all(self.pool())
        .await?;

        Ok(tasks)
    }

    /// List a user's open tasks whose due date has passed, earliest due first.
    pub async fn get_overdue_tasks(&self, max_id: i64) -> Result<Vec<Task>, DatabaseError> {
        let now = unix_timestamp();

        let tasks = sqlx::query_as::<_, Task>(
            r"
            SELECT t.* FROM tasks t
            JOIN users u ON t.user_id = u.id
            WHERE u.max_id = ? AND t.due_date < ? AND t.status_in_work = 1
            ORDER BY t.due_date ASC, t.id ASC
            ",
        )
        .bind(max_id)
        .bind(now)
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
    async fn create_task_defaults() {
        let db = setup().await;

        let task = db
            .create_task(MAX_ID, "Test Task", Some("Test Description"), PRIORITY_HIGH, true, None)
            .await
            .unwrap();

        assert_eq!(task.title, "Test Task");
        assert_eq!(task.description.as_deref(), Some("Test Description"));
        assert_eq!(task.priority, PRIORITY_HIGH);
        assert!(task.status_in_work);
        assert!(task.due_date.is_none());
    }

    #[tokio::test]
    async fn create_task_unknown_owner_fails_without_row() {
        let db = Database::open_in_memory().await.unwrap();

        let err = db
            .create_task(404, "orphan", None, PRIORITY_LOW, true, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::NotFound(_)));

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn tasks_ordered_by_priority_then_newest() {
        let db = setup().await;
        db.create_task(MAX_ID, "low", None, PRIORITY_LOW, true, None).await.unwrap();
        db.create_task(MAX_ID, "high", None, PRIORITY_HIGH, true, None).await.unwrap();
        db.create_task(MAX_ID, "medium", None, PRIORITY_MEDIUM, true, None).await.unwrap();

        let tasks = db.get_user_tasks(MAX_ID, None).await.unwrap();
        let priorities: Vec<i64> = tasks.iter().map(|t| t.priority).collect();
        assert_eq!(priorities, vec![PRIORITY_HIGH, PRIORITY_MEDIUM, PRIORITY_LOW]);
    }

    #[tokio::test]
    async fn status_filter() {
        let db = setup().await;
        let open = db.create_task(MAX_ID, "open", None, 0, true, None).await.unwrap();
        let done = db.create_task(MAX_ID, "done", None, 0, false, None).await.unwrap();

        let active = db.get_user_tasks(MAX_ID, Some(true)).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, open.id);

        let completed = db.get_user_tasks(MAX_ID, Some(false)).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].id, done.id);
    }

    #[tokio::test]
    async fn update_status_and_priority() {
        let db = setup().await;
        let task = db.create_task(MAX_ID, "t", None, 0, true, None).await.unwrap();

        let toggled = db.update_task_status(task.id, false).await.unwrap().unwrap();
        assert!(!toggled.status_in_work);

        let bumped = db.update_task_priority(task.id, PRIORITY_HIGH).await.unwrap().unwrap();
        assert_eq!(bumped.priority, PRIORITY_HIGH);

        assert!(db.update_task_status(9999, true).await.unwrap().is_none());
        assert!(db.update_task_priority(9999, 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn partial_update_touches_only_supplied_fields() {
        let db = setup().await;
        let task = db
            .create_task(MAX_ID, "orig", Some("desc"), PRIORITY_LOW, true, None)
            .await
            .unwrap();

        let patch = TaskPatch {
            title: Some("renamed".into()),
            priority: Some(PRIORITY_MEDIUM),
            ..TaskPatch::default()
        };
        let outcome = db.update_task(task.id, &patch).await.unwrap();

        let TaskUpdate::Updated(updated) = outcome else {
            panic!("expected Updated outcome");
        };
        assert_eq!(updated.title, "renamed");
        assert_eq!(updated.priority, PRIORITY_MEDIUM);
        assert_eq!(updated.description.as_deref(), Some("desc"));
    }

    #[tokio::test]
    async fn empty_patch_is_a_no_op() {
        let db = setup().await;
        let task = db.create_task(MAX_ID, "t", None, 0, true, None).await.unwrap();

        let outcome = db.update_task(task.id, &TaskPatch::default()).await.unwrap();
        assert!(matches!(outcome, TaskUpdate::Unchanged));

        let unchanged = db.get_task_by_id(task.id).await.unwrap().unwrap();
        assert_eq!(unchanged.updated_at, task.updated_at);
        assert_eq!(unchanged.title, task.title);
    }

    #[tokio::test]
    async fn partial_update_unknown_id() {
        let db = setup().await;
        let patch = TaskPatch {
            title: Some("x".into()),
            ..TaskPatch::default()
        };
        let outcome = db.update_task(9999, &patch).await.unwrap();
        assert!(matches!(outcome, TaskUpdate::NotFound));
    }

    #[tokio::test]
    async fn delete_task_returns_whether_removed() {
        let db = setup().await;
        let task = db.create_task(MAX_ID, "t", None, 0, true, None).await.unwrap();

        assert!(db.delete_task(task.id).await.unwrap());
        assert!(!db.delete_task(task.id).await.unwrap());
    }

    #[tokio::test]
    async fn tasks_by_priority() {
        let db = setup().await;
        db.create_task(MAX_ID, "a", None, PRIORITY_HIGH, true, None).await.unwrap();
        db.create_task(MAX_ID, "b", None, PRIORITY_LOW, true, None).await.unwrap();
        db.create_task(MAX_ID, "c", None, PRIORITY_HIGH, true, None).await.unwrap();

        let high = db.get_tasks_by_priority(MAX_ID, PRIORITY_HIGH).await.unwrap();
        assert_eq!(high.len(), 2);
        // Newest first.
        assert_eq!(high[0].title, "c");
        assert_eq!(high[1].title, "a");
    }

    #[tokio::test]
    async fn overdue_excludes_completed_and_future() {
        let db = setup().await;
        let now = unix_timestamp();

        db.create_task(MAX_ID, "overdue", None, 0, true, Some(now - 3600)).await.unwrap();
        db.create_task(MAX_ID, "done late", None, 0, false, Some(now - 3600)).await.unwrap();
        db.create_task(MAX_ID, "future", None, 0, true, Some(now + 3600)).await.unwrap();
        db.create_task(MAX_ID, "no due date", None, 0, true, None).await.unwrap();

        let overdue = db.get_overdue_tasks(MAX_ID).await.unwrap();
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].title, "overdue");
    }

    #[tokio::test]
    async fn overdue_earliest_due_first() {
        let db = setup().await;
        let now = unix_timestamp();

        db.create_task(MAX_ID, "late", None, 0, true, Some(now - 100)).await.unwrap();
        db.create_task(MAX_ID, "later", None, 0, true, Some(now - 5000)).await.unwrap();

        let overdue = db.get_overdue_tasks(MAX_ID).await.unwrap();
        assert_eq!(overdue.len(), 2);
        assert_eq!(overdue[0].title, "later");
        assert_eq!(overdue[1].title, "late");
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_tasks() {
        let db = setup().await;
        db.create_task(MAX_ID, "one", None, 0, true, None).await.unwrap();
        db.create_task(MAX_ID, "two", None, 0, true, None).await.unwrap();

        assert!(db.delete_user(MAX_ID).await.unwrap());

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 0);

        let tasks = db.get_user_tasks(MAX_ID, None).await.unwrap();
        assert!(tasks.is_empty());
    }
}
