//! MAX Bot API integration.
//!
//! Provides a reqwest-based client for the MAX messenger Bot API,
//! covering messages, long-poll updates, file uploads, chats, and
//! webhook subscriptions.

mod client;
pub mod types;


pub use client::{MaxClient, MaxError};
pub use types::{BotInfo, SendMessageOptions, UploadEndpoint, UploadType};
