//! Inbound platform events, already stripped of transport details.

use serde::{Deserialize, Serialize};

use crate::channel::{ChatId, MessageRef};
use crate::user::UserId;

/// Menu button actions, identified on the wire by their opaque tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Send,
    Convert,
    Clear,
    GetPremium,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Send, Action::Convert, Action::Clear, Action::GetPremium];

    /// The callback tag carried by the button.
    pub fn tag(self) -> &'static str {
        match self {
            Action::Send => "send",
            Action::Convert => "convert",
            Action::Clear => "clear",
            Action::GetPremium => "get_premium",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.tag() == tag)
    }
}

/// Slash commands understood by the bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Start,
    Help,
    Convert,
    Clear,
    Premium,
    Unknown(String),
}

impl Command {
    /// Parse `/name`, `/name@BotName` or `/name args`. Returns `None` for
    /// text that is not a command at all.
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.trim().strip_prefix('/')?;
        let word = rest.split_whitespace().next().unwrap_or_default();
        let name = word.split('@').next().unwrap_or_default().to_lowercase();
        Some(match name.as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "convert" | "pdf" => Command::Convert,
            "clear" => Command::Clear,
            "premium" => Command::Premium,
            _ => Command::Unknown(name),
        })
    }
}

/// A downloadable file on the platform side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    /// Platform file identifier used to fetch the content
    pub file_id: String,
    /// Extension to store the download under (without the dot)
    pub extension: String,
}

impl FileRef {
    pub fn jpeg(file_id: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            extension: "jpg".into(),
        }
    }
}

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum Event {
    Command(Command),
    Action(Action),
    ImageUploaded(FileRef),
    /// Plain text that is not a command
    Text(String),
}

/// How a reply to this event should be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReplyTarget {
    /// Send a fresh message into the chat
    NewMessage,
    /// A button press: acknowledge the callback and edit the menu message
    Callback {
        query_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<MessageRef>,
    },
}

/// An event together with who sent it and where to answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inbound {
    pub user_id: UserId,
    pub chat_id: ChatId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    pub reply: ReplyTarget,
    pub event: Event,
}
