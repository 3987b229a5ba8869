//! Web dashboard for the taskmax server.
//!
//! A thin axum presentation layer over the storage reads/writes. All pages
//! are scoped to the demo user, matching the single-user deployment model.

mod handlers;

use std::net::SocketAddr;

use axum::Router;
use axum::routing::{get, post};
use tracing::info;

use crate::storage::{Database, DatabaseError};

/// Platform id of the built-in demo user.
pub const DEMO_MAX_ID: i64 = 123_456_789;

/// Shared application state passed to axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub demo_max_id: i64,
}

/// Errors from starting the web server.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Build the axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route("/tasks/new", get(handlers::new_task_form))
        .route("/tasks/{id}/toggle", post(handlers::toggle_task))
        .route("/tasks/{id}/priority", post(handlers::update_priority))
        .route("/tasks/{id}/delete", post(handlers::delete_task))
        .with_state(state)
}

/// Seed the demo user and the timezone catalog if they are missing.
async fn seed_demo_data(db: &Database, demo_max_id: i64) -> Result<(), DatabaseError> {
    if db.get_user_by_max_id(demo_max_id).await?.is_none() {
        db.upsert_user(demo_max_id, "demo_user", "UTC+3").await?;
        info!(max_id = demo_max_id, "demo user created");
    }
    if db.get_all_timezones().await?.is_empty() {
        let inserted = db.populate_timezones().await?;
        info!(inserted, "timezone catalog populated");
    }
    Ok(())
}

/// Bind the listener and serve the dashboard until shutdown.
pub async fn serve(addr: SocketAddr, db: Database) -> Result<(), ServeError> {
    seed_demo_data(&db, DEMO_MAX_ID).await?;

    let state = AppState {
        db,
        demo_max_id: DEMO_MAX_ID,
    };
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "taskmax web server started");

    axum::serve(listener, router).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seed_is_idempotent() {
        let db = Database::open_in_memory().await.unwrap();

        seed_demo_data(&db, DEMO_MAX_ID).await.unwrap();
        seed_demo_data(&db, DEMO_MAX_ID).await.unwrap();

        assert_eq!(db.list_users().await.unwrap().len(), 1);
        assert_eq!(db.get_all_timezones().await.unwrap().len(), 27);
    }

    #[tokio::test]
    async fn router_builds() {
        let db = Database::open_in_memory().await.unwrap();
        let state = AppState {
            db,
            demo_max_id: DEMO_MAX_ID,
        };
        let _router = build_router(state);
    }
}
