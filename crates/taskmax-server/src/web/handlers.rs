//! Request handlers for the web dashboard.

use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::storage::{DatabaseError, Task, priority_label};

use super::AppState;

/// Handler-level error: maps storage failures to HTTP statuses.
pub struct WebError(DatabaseError);

impl From<DatabaseError> for WebError {
    fn from(e: DatabaseError) -> Self {
        Self(e)
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DatabaseError::NotFound(_) => StatusCode::NOT_FOUND,
            DatabaseError::Constraint(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!(error = %self.0, "request failed");
        (status, self.0.to_string()).into_response()
    }
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}

/// Dashboard: user, aggregate stats, recent tasks.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, WebError> {
    let user = state.db.get_user_by_max_id(state.demo_max_id).await?;
    let stats = state.db.get_user_stats(state.demo_max_id).await?;
    let recent = state.db.get_recent_tasks(state.demo_max_id, 5).await?;

    let username = user.map_or_else(|| "unknown".to_string(), |u| u.username);

    let mut recent_rows = String::new();
    for task in &recent {
        recent_rows.push_str(&format!(
            "<li>{} <small>[{}]</small></li>",
            escape(&task.title),
            priority_label(task.priority),
        ));
    }

    let body = format!(
        r#"<h1>Tasks of {username}</h1>
<ul>
  <li>Total: {total}</li>
  <li>Active: {active}</li>
  <li>Completed: {completed}</li>
  <li>Overdue: {overdue}</li>
</ul>
<h2>Recent</h2>
<ul>{recent_rows}</ul>
<p><a href="/tasks">All tasks</a> | <a href="/tasks/new">New task</a></p>"#,
        username = escape(&username),
        total = stats.total_tasks,
        active = stats.active_tasks,
        completed = stats.completed_tasks,
        overdue = stats.overdue_tasks,
    );

    Ok(Html(page("Dashboard", &body)))
}

#[derive(Debug, Deserialize)]
pub struct TaskListParams {
    pub status: Option<String>,
}

/// Filterable task list.
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<TaskListParams>,
) -> Result<Html<String>, WebError> {
    let filter = params.status.as_deref().unwrap_or("all");
    let status = match filter {
        "active" => Some(true),
        "completed" => Some(false),
        _ => None,
    };

    let tasks = state.db.get_user_tasks(state.demo_max_id, status).await?;

    let mut rows = String::new();
    for task in &tasks {
        rows.push_str(&task_row(task));
    }

    let body = format!(
        r#"<h1>Tasks ({filter})</h1>
<p>
  <a href="/tasks">all</a> |
  <a href="/tasks?status=active">active</a> |
  <a href="/tasks?status=completed">completed</a> |
  <a href="/tasks/new">new task</a>
</p>
<table border="1" cellpadding="4">
<tr><th>Title</th><th>Priority</th><th>Status</th><th>Actions</th></tr>
{rows}
</table>
<p><a href="/">Dashboard</a></p>"#,
    );

    Ok(Html(page("Tasks", &body)))
}

fn task_row(task: &Task) -> String {
    let status = if task.status_in_work { "open" } else { "done" };
    format!(
        r#"<tr>
<td>{title}</td>
<td>{priority}</td>
<td>{status}</td>
<td>
  <form method="post" action="/tasks/{id}/toggle" style="display:inline"><button>toggle</button></form>
  <form method="post" action="/tasks/{id}/priority" style="display:inline">
    <select name="priority"><option value="0">low</option><option value="1">medium</option><option value="2">high</option></select>
    <button>set</button>
  </form>
  <form method="post" action="/tasks/{id}/delete" style="display:inline"><button>delete</button></form>
</td>
</tr>"#,
        title = escape(&task.title),
        priority = priority_label(task.priority),
        id = task.id,
    )
}

/// Task creation form.
pub async fn new_task_form() -> Html<String> {
    let body = r#"<h1>New task</h1>
<form method="post" action="/tasks">
  <p><input name="title" placeholder="Title" required></p>
  <p><textarea name="description" placeholder="Description"></textarea></p>
  <p><select name="priority"><option value="0">low</option><option value="1">medium</option><option value="2">high</option></select></p>
  <p><input name="due_date" type="date"></p>
  <p><button>Create</button></p>
</form>
<p><a href="/tasks">Back</a></p>"#;

    Html(page("New task", body))
}

#[derive(Debug, Deserialize)]
pub struct CreateTaskForm {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: i64,
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Create a task for the demo user and bounce back to the list.
pub async fn create_task(
    State(state): State<AppState>,
    Form(form): Form<CreateTaskForm>,
) -> Result<Redirect, WebError> {
    let title = form.title.trim();
    if title.is_empty() {
        // Title is required; bounce back to the form.
        return Ok(Redirect::to("/tasks/new"));
    }

    let description = form
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    let priority = form.priority.clamp(0, 2);
    let due_date = form.due_date.as_deref().and_then(parse_due_date);

    state
        .db
        .create_task(state.demo_max_id, title, description, priority, true, due_date)
        .await?;

    Ok(Redirect::to("/tasks"))
}

/// Flip a task between open and completed.
pub async fn toggle_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, WebError> {
    if let Some(task) = state.db.get_task_by_id(id).await? {
        state.db.update_task_status(id, !task.status_in_work).await?;
    }
    Ok(Redirect::to("/tasks"))
}

#[derive(Debug, Deserialize)]
pub struct PriorityForm {
    pub priority: i64,
}

/// Move a task to another priority bucket.
pub async fn update_priority(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<PriorityForm>,
) -> Result<Redirect, WebError> {
    state
        .db
        .update_task_priority(id, form.priority.clamp(0, 2))
        .await?;
    Ok(Redirect::to("/tasks"))
}

/// Remove a task.
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Redirect, WebError> {
    state.db.delete_task(id).await?;
    Ok(Redirect::to("/tasks"))
}

/// Parse a `YYYY-MM-DD` form value into an end-of-day unix timestamp.
fn parse_due_date(value: &str) -> Option<i64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(date.and_hms_opt(23, 59, 59)?.and_utc().timestamp())
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>taskmax - {title}</title></head>
<body>
{body}
</body>
</html>"#,
    )
}

fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_due_date_accepts_iso_dates() {
        let ts = parse_due_date("2026-03-01").unwrap();
        // 2026-03-01T23:59:59Z
        assert_eq!(ts, 1_772_409_599);
    }

    #[test]
    fn parse_due_date_rejects_garbage() {
        assert!(parse_due_date("").is_none());
        assert!(parse_due_date("   ").is_none());
        assert!(parse_due_date("tomorrow").is_none());
        assert!(parse_due_date("2026-13-01").is_none());
    }

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(escape("<b>&\"x\""), "&lt;b&gt;&amp;&quot;x&quot;");
    }
}
