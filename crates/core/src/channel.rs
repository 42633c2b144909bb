//! Channel trait — the abstraction over the messaging platform.
//!
//! A Channel delivers inbound [`Inbound`] events to the bot and carries the
//! bot's replies back: text, inline keyboards, photos and documents. It also
//! fetches uploaded files into local storage.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::ChannelError;
use crate::event::{Action, FileRef, Inbound};

/// Chat identifier. For private chats this equals the user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A message previously sent by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: i64,
}

/// How the platform should interpret reply text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextFormat {
    #[default]
    Plain,
    Markdown,
}

/// What pressing a button does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonKind {
    /// Sends the action tag back to the bot
    Action(Action),
    /// Opens an external link
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    pub label: String,
    pub kind: ButtonKind,
}

impl Button {
    pub fn action(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            kind: ButtonKind::Action(action),
        }
    }

    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            kind: ButtonKind::Url(url.into()),
        }
    }
}

/// An inline keyboard: rows of buttons attached to a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// One button per row.
    pub fn column(buttons: impl IntoIterator<Item = Button>) -> Self {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }
}

/// The core Channel trait.
///
/// Implementations handle platform-specific connection logic, wire formats
/// and authentication.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Human-readable channel name (e.g., "telegram").
    fn name(&self) -> &str;

    /// Start listening for incoming events.
    ///
    /// Returns a receiver that yields inbound events. Transport failures are
    /// yielded as `Err` items; the channel keeps listening afterwards.
    async fn start(
        &self,
    ) -> std::result::Result<
        mpsc::Receiver<std::result::Result<Inbound, ChannelError>>,
        ChannelError,
    >;

    /// Send a text message, optionally with an inline keyboard.
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        format: TextFormat,
        keyboard: Option<&Keyboard>,
    ) -> std::result::Result<MessageRef, ChannelError>;

    /// Replace the text of a message the bot sent earlier.
    async fn edit_text(
        &self,
        message: &MessageRef,
        text: &str,
        format: TextFormat,
    ) -> std::result::Result<(), ChannelError>;

    /// Acknowledge a button press.
    async fn answer_callback(&self, _query_id: &str) -> std::result::Result<(), ChannelError> {
        Ok(()) // No-op default
    }

    /// Send a local image file with a caption.
    async fn send_photo(
        &self,
        chat_id: ChatId,
        path: &Path,
        caption: &str,
        format: TextFormat,
        keyboard: Option<&Keyboard>,
    ) -> std::result::Result<(), ChannelError>;

    /// Send a local file as a document under the given display name.
    async fn send_document(
        &self,
        chat_id: ChatId,
        path: &Path,
        filename: &str,
    ) -> std::result::Result<(), ChannelError>;

    /// Download an uploaded file to `dest`. Returns the number of bytes written.
    async fn download(&self, file: &FileRef, dest: &Path)
    -> std::result::Result<u64, ChannelError>;

    /// Stop the channel gracefully.
    async fn stop(&self) -> std::result::Result<(), ChannelError> {
        Ok(())
    }

    /// Is the platform reachable with our credentials?
    async fn health_check(&self) -> std::result::Result<bool, ChannelError> {
        Ok(true)
    }
}
