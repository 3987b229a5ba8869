//! `taskmax` Core Library
//!
//! Shared functionality for taskmax components:
//! - Configuration resolution (env-sourced, validated at startup)
//! - Database pool helpers and shared error types
//! - Tracing/logging initialization

pub mod config;
pub mod db;
pub mod error;
pub mod tracing_init;

pub use config::BotConfig;
pub use error::{Error, Result};
