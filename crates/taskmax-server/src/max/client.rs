//! MAX Bot API client.
//!
//! Uses reqwest to call the MAX platform endpoints. Authentication is an
//! `access_token` query parameter on every API request, per the platform's
//! auth scheme; pre-authorized upload URLs are posted to directly without
//! the token.

use std::path::Path;

use reqwest::{Method, multipart};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::debug;

use taskmax_core::config::BotConfig;

use super::types::{BotInfo, NewMessageBody, SendMessageOptions, UploadEndpoint, UploadType};

/// MAX API client errors.
#[derive(Debug, Error)]
pub enum MaxError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("MAX API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// MAX Bot API client bound to one access token.
#[derive(Debug)]
pub struct MaxClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl MaxClient {
    /// Create a new MAX API client.
    pub fn new(config: &BotConfig) -> Result<Self, MaxError> {
        if config.base_url.trim().is_empty() {
            return Err(MaxError::Config("base_url is empty".into()));
        }
        let token = config.access_token.trim();
        if token.is_empty() {
            return Err(MaxError::Config("access token is empty".into()));
        }

        let http = reqwest::Client::builder().build()?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self {
            http,
            base_url,
            access_token: token.to_string(),
        })
    }

    /// Join the base endpoint and a relative path with exactly one slash,
    /// regardless of how either side spells its edges.
    pub(crate) fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Start an API request with the access token injected as a query
    /// parameter.
    pub(crate) fn api_request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = self.endpoint_url(path);
        self.http
            .request(method, url)
            .query(&[("access_token", self.access_token.as_str())])
    }

    /// Send a request, surfacing non-2xx responses with status and body.
    async fn execute(req: reqwest::RequestBuilder) -> Result<Value, MaxError> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MaxError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }

    // =========================================================================
    // Bot identity
    // =========================================================================

    /// `GET /me` -- bot identity and profile metadata.
    pub async fn get_me(&self) -> Result<BotInfo, MaxError> {
        let value = Self::execute(self.api_request(Method::GET, "/me")).await?;
        Ok(serde_json::from_value(value)?)
    }

    // =========================================================================
    // Messages
    // =========================================================================

    /// `POST /messages` -- send a message to exactly one chat or user.
    ///
    /// The target check runs before any network I/O.
    pub async fn send_message(
        &self,
        text: &str,
        options: &SendMessageOptions,
    ) -> Result<Value, MaxError> {
        match (options.chat_id, options.user_id) {
            (Some(_), Some(_)) | (None, None) => {
                return Err(MaxError::Validation(
                    "exactly one of chat_id or user_id must be set".into(),
                ));
            }
            _ => {}
        }

        let body = NewMessageBody {
            text: Some(text.to_string()),
            attachments: options.attachments.clone(),
            link: None,
            notify: options.notify,
            format: options.format,
        };

        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(chat_id) = options.chat_id {
            params.push(("chat_id", chat_id.to_string()));
        }
        if let Some(user_id) = options.user_id {
            params.push(("user_id", user_id.to_string()));
        }
        if options.disable_link_preview {
            params.push(("disable_link_preview", "true".to_string()));
        }

        debug!(chat_id = ?options.chat_id, user_id = ?options.user_id, "sending message");

        Self::execute(
            self.api_request(Method::POST, "/messages")
                .query(&params)
                .json(&body),
        )
        .await
    }

    /// `GET /updates` -- long-poll fetch of pending updates. `types` filters
    /// update kinds and is sent as one comma-joined parameter.
    pub async fn get_updates(
        &self,
        limit: u32,
        timeout: u32,
        marker: Option<i64>,
        types: &[String],
    ) -> Result<Value, MaxError> {
        let mut params: Vec<(&str, String)> = vec![
            ("limit", limit.to_string()),
            ("timeout", timeout.to_string()),
        ];
        if let Some(marker) = marker {
            params.push(("marker", marker.to_string()));
        }
        if !types.is_empty() {
            params.push(("types", types.join(",")));
        }

        Self::execute(self.api_request(Method::GET, "/updates").query(&params)).await
    }

    // =========================================================================
    // Uploads
    // =========================================================================

    /// `POST /uploads` -- request a pre-authorized upload URL for the given
    /// file kind.
    pub async fn get_upload_url(&self, file_type: UploadType) -> Result<UploadEndpoint, MaxError> {
        let value = Self::execute(
            self.api_request(Method::POST, "/uploads")
                .query(&[("type", file_type.as_str())]),
        )
        .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Upload a file to a pre-authorized URL obtained from `get_upload_url`.
    /// The URL is already scoped, so no token is injected.
    pub async fn upload_file(&self, upload_url: &str, file_path: &Path) -> Result<Value, MaxError> {
        let bytes = tokio::fs::read(file_path).await?;
        let file_name = file_path
            .file_name()
            .map_or_else(|| "data".to_string(), |n| n.to_string_lossy().into_owned());

        let form =
            multipart::Form::new().part("data", multipart::Part::bytes(bytes).file_name(file_name));

        let resp = self.http.post(upload_url).multipart(form).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MaxError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp.json().await?)
    }

    /// Upload a photo and send it to a chat in one call.
    ///
    /// Image uploads return attachment tokens in the upload response, keyed
    /// by size; the `orig` size is preferred, falling back to the mapping's
    /// first entry.
    pub async fn send_photo(
        &self,
        chat_id: i64,
        file_path: &Path,
        caption: &str,
    ) -> Result<Value, MaxError> {
        let endpoint = self.get_upload_url(UploadType::Image).await?;
        let upload = self.upload_file(&endpoint.url, file_path).await?;

        let photos = upload
            .get("photos")
            .and_then(Value::as_object)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| MaxError::Validation("upload response contains no photos".into()))?;

        let entry = photos.get("orig").or_else(|| photos.values().next());
        let token = entry
            .and_then(|e| e.get("token"))
            .and_then(Value::as_str)
            .ok_or_else(|| MaxError::Validation("photo entry carries no token".into()))?;

        let attachment = json!({
            "type": "image",
            "payload": { "token": token }
        });

        self.send_message(
            caption,
            &SendMessageOptions::to_chat(chat_id).with_attachments(vec![attachment]),
        )
        .await
    }

    /// Upload a video and send it to a chat in one call.
    ///
    /// Unlike images, the attachment token arrives with the upload URL; the
    /// upload response body is discarded.
    pub async fn send_video(
        &self,
        chat_id: i64,
        file_path: &Path,
        caption: &str,
    ) -> Result<Value, MaxError> {
        let endpoint = self.get_upload_url(UploadType::Video).await?;
        let token = endpoint.token.clone().ok_or_else(|| {
            MaxError::Validation("video upload endpoint returned no token".into())
        })?;

        self.upload_file(&endpoint.url, file_path).await?;

        let attachment = json!({
            "type": "video",
            "payload": { "token": token }
        });

        self.send_message(
            caption,
            &SendMessageOptions::to_chat(chat_id).with_attachments(vec![attachment]),
        )
        .await
    }

    // =========================================================================
    // Chats
    // =========================================================================

    /// `GET /chats/{chat_id}` -- chat details.
    pub async fn get_chat(&self, chat_id: i64) -> Result<Value, MaxError> {
        Self::execute(self.api_request(Method::GET, &format!("/chats/{chat_id}"))).await
    }

    /// `GET /chats` -- paginated chat list.
    pub async fn get_chats(&self, count: u32, marker: Option<&str>) -> Result<Value, MaxError> {
        let mut params: Vec<(&str, String)> = vec![("count", count.to_string())];
        if let Some(marker) = marker {
            params.push(("marker", marker.to_string()));
        }
        Self::execute(self.api_request(Method::GET, "/chats").query(&params)).await
    }

    // =========================================================================
    // Subscriptions (webhooks)
    // =========================================================================

    /// `POST /subscriptions` -- subscribe a webhook URL to update types.
    pub async fn subscribe_webhook(
        &self,
        url: &str,
        update_types: &[String],
        secret: Option<&str>,
    ) -> Result<Value, MaxError> {
        let mut body = json!({
            "url": url,
            "update_types": update_types,
        });
        if let Some(secret) = secret {
            body["secret"] = json!(secret);
        }

        Self::execute(self.api_request(Method::POST, "/subscriptions").json(&body)).await
    }

    /// `DELETE /subscriptions` -- remove a webhook subscription.
    pub async fn unsubscribe_webhook(&self, url: &str) -> Result<Value, MaxError> {
        Self::execute(
            self.api_request(Method::DELETE, "/subscriptions")
                .query(&[("url", url)]),
        )
        .await
    }

    /// `GET /subscriptions` -- current webhook subscriptions.
    pub async fn get_subscriptions(&self) -> Result<Value, MaxError> {
        Self::execute(self.api_request(Method::GET, "/subscriptions")).await
    }
}
