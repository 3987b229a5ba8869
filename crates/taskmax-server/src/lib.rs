//! taskmax Server Library
//!
//! Core functionality for the taskmax server:
//! - SQLite storage for users, tasks, and the timezone catalog
//! - MAX Bot API client for messaging and uploads
//! - Axum web dashboard over the stored task data

pub mod max;
pub mod storage;
pub mod web;
