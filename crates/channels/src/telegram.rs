//! Telegram channel adapter.
//!
//! Implements the Channel trait over the Telegram Bot API with `reqwest`:
//! long polling via `getUpdates`, JSON calls for text, multipart uploads for
//! photos and documents, and `getFile` for downloads.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use snap2pdf_core::channel::{Channel, ChatId, Keyboard, MessageRef, TextFormat};
use snap2pdf_core::error::ChannelError;
use snap2pdf_core::event::{FileRef, Inbound};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::wire::{self, ApiResponse, InlineKeyboardMarkup, SentMessage, Update};

const DEFAULT_API_URL: &str = "https://api.telegram.org";
/// Pause after a failed poll before asking again.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(3);
/// Slack on top of the long-poll duration before the HTTP client gives up.
const HTTP_TIMEOUT_SLACK: Duration = Duration::from_secs(15);

/// Telegram channel configuration.
#[derive(Clone)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    pub bot_token: String,
    /// Bot API base URL (override for a local Bot API server).
    pub api_url: String,
    /// Long-poll duration for `getUpdates`, in seconds.
    pub poll_timeout_secs: u64,
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_url: DEFAULT_API_URL.into(),
            poll_timeout_secs: 30,
        }
    }
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("poll_timeout_secs", &self.poll_timeout_secs)
            .finish()
    }
}

/// Thin Bot API client. Cheap to clone; the poller owns its own copy.
#[derive(Clone)]
struct Api {
    client: reqwest::Client,
    method_base: String,
    file_base: String,
}

impl Api {
    fn new(config: &TelegramConfig) -> Result<Self, ChannelError> {
        if config.bot_token.trim().is_empty() {
            return Err(ChannelError::NotConfigured("Telegram bot token is empty".into()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.poll_timeout_secs) + HTTP_TIMEOUT_SLACK)
            .build()
            .map_err(|e| ChannelError::NotConfigured(format!("HTTP client: {e}")))?;

        let base = config.api_url.trim_end_matches('/');
        Ok(Self {
            client,
            method_base: format!("{base}/bot{}", config.bot_token),
            file_base: format!("{base}/file/bot{}", config.bot_token),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{method}", self.method_base)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{}/{}", self.file_base, file_path.trim_start_matches('/'))
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: &serde_json::Value,
    ) -> Result<T, ChannelError> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(method, e))?;
        Self::decode(method, response).await
    }

    async fn call_multipart<T: DeserializeOwned>(
        &self,
        method: &str,
        form: reqwest::multipart::Form,
    ) -> Result<T, ChannelError> {
        let response = self
            .client
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(method, e))?;
        Self::decode(method, response).await
    }

    async fn decode<T: DeserializeOwned>(
        method: &str,
        response: reqwest::Response,
    ) -> Result<T, ChannelError> {
        let envelope: ApiResponse<T> = response
            .json()
            .await
            .map_err(|e| transport_error(method, e))?;

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                description,
                error_code,
                ..
            } => Err(ChannelError::ApiError {
                method: method.into(),
                reason: format!(
                    "{} (code {})",
                    description.unwrap_or_else(|| "no description".into()),
                    error_code.map_or_else(|| "?".into(), |c| c.to_string())
                ),
            }),
        }
    }

    async fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>, ChannelError> {
        self.call(
            "getUpdates",
            &serde_json::json!({
                "offset": offset,
                "timeout": timeout_secs,
                "allowed_updates": ["message", "callback_query"],
            }),
        )
        .await
    }
}

/// Strip the URL (which embeds the token) from transport errors.
fn transport_error(method: &str, e: reqwest::Error) -> ChannelError {
    ChannelError::ApiError {
        method: method.into(),
        reason: e.without_url().to_string(),
    }
}

fn attach_markup(
    body: &mut serde_json::Value,
    format: TextFormat,
    keyboard: Option<&Keyboard>,
) {
    if let Some(mode) = wire::parse_mode(format) {
        body["parse_mode"] = serde_json::json!(mode);
    }
    if let Some(kb) = keyboard {
        body["reply_markup"] = serde_json::json!(InlineKeyboardMarkup::from(kb));
    }
}

async fn file_part(
    chat_id: ChatId,
    path: &Path,
    filename: &str,
) -> Result<reqwest::multipart::Part, ChannelError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ChannelError::DeliveryFailed {
            chat_id: chat_id.0,
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
    Ok(reqwest::multipart::Part::bytes(bytes).file_name(filename.to_string()))
}

/// Telegram channel adapter.
pub struct TelegramChannel {
    config: TelegramConfig,
    api: Api,
    poller: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl TelegramChannel {
    pub fn new(config: TelegramConfig) -> Result<Self, ChannelError> {
        let api = Api::new(&config)?;
        Ok(Self {
            config,
            api,
            poller: tokio::sync::Mutex::new(None),
        })
    }

    /// `getMe`: the bot's own account, proving the token works.
    pub async fn get_me(&self) -> Result<wire::User, ChannelError> {
        self.api.call("getMe", &serde_json::json!({})).await
    }
}

async fn poll_loop(
    api: Api,
    timeout_secs: u64,
    tx: mpsc::Sender<Result<Inbound, ChannelError>>,
) {
    let mut offset = 0i64;
    while !tx.is_closed() {
        match api.get_updates(offset, timeout_secs).await {
            Ok(updates) => {
                for update in updates {
                    offset = offset.max(update.update_id + 1);
                    let update_id = update.update_id;
                    match wire::to_inbound(update) {
                        Some(inbound) => {
                            if tx.send(Ok(inbound)).await.is_err() {
                                return; // Receiver dropped
                            }
                        }
                        None => debug!(update_id, "Ignoring update"),
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "getUpdates failed");
                if tx.send(Err(e)).await.is_err() {
                    return;
                }
                tokio::time::sleep(POLL_RETRY_DELAY).await;
            }
        }
    }
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<Inbound, ChannelError>>, ChannelError> {
        let mut poller = self.poller.lock().await;
        if poller.is_some() {
            return Err(ChannelError::NotConfigured(
                "Telegram channel already started".into(),
            ));
        }

        info!(
            api_url = %self.config.api_url,
            poll_timeout_secs = self.config.poll_timeout_secs,
            "Telegram channel starting (long polling)"
        );
        let (tx, rx) = mpsc::channel(64);
        *poller = Some(tokio::spawn(poll_loop(
            self.api.clone(),
            self.config.poll_timeout_secs,
            tx,
        )));
        Ok(rx)
    }

    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        format: TextFormat,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageRef, ChannelError> {
        let mut body = serde_json::json!({ "chat_id": chat_id.0, "text": text });
        attach_markup(&mut body, format, keyboard);
        let sent: SentMessage = self.api.call("sendMessage", &body).await?;
        debug!(chat_id = %chat_id, message_id = sent.message_id, "Message sent");
        Ok(MessageRef {
            chat_id: ChatId(sent.chat.id),
            message_id: sent.message_id,
        })
    }

    async fn edit_text(
        &self,
        message: &MessageRef,
        text: &str,
        format: TextFormat,
    ) -> Result<(), ChannelError> {
        let mut body = serde_json::json!({
            "chat_id": message.chat_id.0,
            "message_id": message.message_id,
            "text": text,
        });
        attach_markup(&mut body, format, None);
        // Returns the edited Message (or `true` for inline messages)
        let _: serde_json::Value = self.api.call("editMessageText", &body).await?;
        Ok(())
    }

    async fn answer_callback(&self, query_id: &str) -> Result<(), ChannelError> {
        let _: bool = self
            .api
            .call(
                "answerCallbackQuery",
                &serde_json::json!({ "callback_query_id": query_id }),
            )
            .await?;
        Ok(())
    }

    async fn send_photo(
        &self,
        chat_id: ChatId,
        path: &Path,
        caption: &str,
        format: TextFormat,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), ChannelError> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("photo.png");
        let mut form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.0.to_string())
            .text("caption", caption.to_string())
            .part("photo", file_part(chat_id, path, filename).await?);
        if let Some(mode) = wire::parse_mode(format) {
            form = form.text("parse_mode", mode);
        }
        if let Some(kb) = keyboard {
            let markup = serde_json::to_string(&InlineKeyboardMarkup::from(kb))
                .map_err(|e| ChannelError::InvalidPayload(e.to_string()))?;
            form = form.text("reply_markup", markup);
        }

        let _: SentMessage = self.api.call_multipart("sendPhoto", form).await?;
        info!(chat_id = %chat_id, path = %path.display(), "Photo sent");
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: ChatId,
        path: &Path,
        filename: &str,
    ) -> Result<(), ChannelError> {
        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.0.to_string())
            .part("document", file_part(chat_id, path, filename).await?);

        let _: SentMessage = self
            .api
            .call_multipart("sendDocument", form)
            .await
            .map_err(|e| ChannelError::DeliveryFailed {
                chat_id: chat_id.0,
                reason: e.to_string(),
            })?;
        info!(chat_id = %chat_id, filename, "Document sent");
        Ok(())
    }

    async fn download(&self, file: &FileRef, dest: &Path) -> Result<u64, ChannelError> {
        let download_err = |reason: String| ChannelError::DownloadFailed {
            file_id: file.file_id.clone(),
            reason,
        };

        let meta: wire::File = self
            .api
            .call("getFile", &serde_json::json!({ "file_id": file.file_id }))
            .await?;
        let file_path = meta
            .file_path
            .ok_or_else(|| download_err("getFile returned no file_path".into()))?;

        let response = self
            .api
            .client
            .get(self.api.file_url(&file_path))
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| download_err(e.without_url().to_string()))?;

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| download_err(format!("create {}: {e}", parent.display())))?;
        }
        let mut out = tokio::fs::File::create(dest)
            .await
            .map_err(|e| download_err(format!("create {}: {e}", dest.display())))?;

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let result = match chunk {
                Ok(bytes) => out.write_all(&bytes).await.map(|()| bytes.len() as u64),
                Err(e) => Err(std::io::Error::other(e.without_url())),
            };
            match result {
                Ok(n) => written += n,
                Err(e) => {
                    drop(out);
                    let _ = tokio::fs::remove_file(dest).await;
                    return Err(download_err(e.to_string()));
                }
            }
        }
        out.flush()
            .await
            .map_err(|e| download_err(format!("flush {}: {e}", dest.display())))?;

        debug!(file_id = %file.file_id, path = %dest.display(), bytes = written, "File downloaded");
        Ok(written)
    }

    async fn stop(&self) -> Result<(), ChannelError> {
        info!("Telegram channel stopping");
        if let Some(handle) = self.poller.lock().await.take() {
            handle.abort();
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, ChannelError> {
        Ok(self.get_me().await.is_ok())
    }
}
