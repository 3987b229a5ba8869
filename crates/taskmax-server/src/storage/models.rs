//! Database models for the taskmax server.

use serde::{Deserialize, Serialize};

/// User record from the database.
///
/// `max_id` is the platform-issued identifier and the natural key; the
/// surrogate `id` exists for join efficiency.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub max_id: i64,
    pub username: String,
    pub timezone: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Task record from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub priority: i64,
    pub status_in_work: bool,
    pub due_date: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Timezone catalog record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Timezone {
    pub id: i64,
    pub name: String,
    pub utc_offset: i64,
}

/// Aggregate task counts for one user. All counts are zero when the user
/// has no tasks.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserStats {
    pub total_tasks: i64,
    pub active_tasks: i64,
    pub completed_tasks: i64,
    pub high_priority_tasks: i64,
    pub medium_priority_tasks: i64,
    pub low_priority_tasks: i64,
    pub overdue_tasks: i64,
}

/// Partial update for a task. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<i64>,
    pub due_date: Option<i64>,
}

impl TaskPatch {
    /// True when no field is set; such a patch is a no-op.
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}

/// Outcome of a partial task update.
#[derive(Debug, Clone)]
pub enum TaskUpdate {
    /// The row was modified and re-read.
    Updated(Task),
    /// No task with the given id exists.
    NotFound,
    /// Empty patch; the row (including `updated_at`) was left untouched.
    Unchanged,
}

/// Task priority buckets: 0 = low, 1 = medium, 2 = high.
pub const PRIORITY_LOW: i64 = 0;
pub const PRIORITY_MEDIUM: i64 = 1;
pub const PRIORITY_HIGH: i64 = 2;

/// Human-readable label for a priority bucket.
pub const fn priority_label(priority: i64) -> &'static str {
    match priority {
        PRIORITY_HIGH => "high",
        PRIORITY_MEDIUM => "medium",
        _ => "low",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_is_empty() {
        assert!(TaskPatch::default().is_empty());
    }

    #[test]
    fn patch_with_field_is_not_empty() {
        let patch = TaskPatch {
            title: Some("new title".into()),
            ..TaskPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn priority_labels() {
        assert_eq!(priority_label(PRIORITY_LOW), "low");
        assert_eq!(priority_label(PRIORITY_MEDIUM), "medium");
        assert_eq!(priority_label(PRIORITY_HIGH), "high");
        // Out-of-range values collapse to "low"; the layer does not reject them.
        assert_eq!(priority_label(99), "low");
    }
}
