//! MAX Bot API request and response types.
//!
//! Serialization structs matching the MAX Bot API JSON shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Bot command descriptor attached to the bot profile.
#[derive(Debug, Clone, Deserialize)]
pub struct BotCommand {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Bot identity returned by `GET /me`.
#[derive(Debug, Clone, Deserialize)]
pub struct BotInfo {
    pub user_id: i64,
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    pub is_bot: bool,
    pub last_activity_time: i64,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub full_avatar_url: Option<String>,
    #[serde(default)]
    pub commands: Vec<BotCommand>,
}

/// Text formatting mode for outgoing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageFormat {
    Markdown,
    Html,
}

/// Request payload for `POST /messages`.
#[derive(Debug, Clone, Serialize)]
pub struct NewMessageBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub attachments: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<Value>,
    pub notify: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<MessageFormat>,
}

/// Targeting and delivery options for `send_message`.
///
/// Exactly one of `chat_id`/`user_id` must be set.
#[derive(Debug, Clone)]
pub struct SendMessageOptions {
    pub chat_id: Option<i64>,
    pub user_id: Option<i64>,
    pub attachments: Vec<Value>,
    pub format: Option<MessageFormat>,
    pub notify: bool,
    pub disable_link_preview: bool,
}

impl Default for SendMessageOptions {
    fn default() -> Self {
        Self {
            chat_id: None,
            user_id: None,
            attachments: Vec::new(),
            format: None,
            notify: true,
            disable_link_preview: false,
        }
    }
}

impl SendMessageOptions {
    /// Target a chat.
    pub fn to_chat(chat_id: i64) -> Self {
        Self {
            chat_id: Some(chat_id),
            ..Self::default()
        }
    }

    /// Target a user directly.
    pub fn to_user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    /// Attach media payloads to the message.
    #[must_use]
    pub fn with_attachments(mut self, attachments: Vec<Value>) -> Self {
        self.attachments = attachments;
        self
    }
}

/// Kind of file being uploaded via `POST /uploads`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadType {
    Image,
    Video,
    Audio,
    File,
}

impl UploadType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Video => "video",
            Self::Audio => "audio",
            Self::File => "file",
        }
    }
}

impl std::fmt::Display for UploadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for UploadType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "image" => Ok(Self::Image),
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "file" => Ok(Self::File),
            other => Err(format!("invalid upload type: {other:?}")),
        }
    }
}

/// Pre-authorized upload endpoint returned by `POST /uploads`.
///
/// Video and audio uploads return the attachment `token` here; image
/// uploads return tokens in the upload response instead.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadEndpoint {
    pub url: String,
    #[serde(default)]
    pub token: Option<String>,
}
