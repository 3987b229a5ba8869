//! `SQLite` storage for the taskmax server.
//!
//! Provides persistence for users, tasks, and the timezone catalog, plus
//! derived per-user statistics.

mod db;
mod models;
mod queries_stats;
mod queries_tasks;
mod queries_timezones;
mod queries_users;

pub use db::{Database, DatabaseError};
pub use models::*;
