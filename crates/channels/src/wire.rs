//! Telegram Bot API wire types and their mapping onto domain events.
//!
//! Only the fields the bot reads are modelled; serde ignores the rest.

use serde::{Deserialize, Serialize};
use snap2pdf_core::channel::{ButtonKind, ChatId, Keyboard, MessageRef, TextFormat};
use snap2pdf_core::event::{Action, Command, Event, FileRef, Inbound, ReplyTarget};
use snap2pdf_core::user::UserId;

/// Envelope around every Bot API result.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(default)]
    pub document: Option<Document>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub file_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Document {
    pub file_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

/// Result of `getFile`.
#[derive(Debug, Clone, Deserialize)]
pub struct File {
    pub file_id: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
}

/// Result of `sendMessage` and friends; only the id is kept.
#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub message_id: i64,
    pub chat: Chat,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<&Keyboard> for InlineKeyboardMarkup {
    fn from(kb: &Keyboard) -> Self {
        let inline_keyboard = kb
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|b| match &b.kind {
                        ButtonKind::Action(action) => InlineKeyboardButton {
                            text: b.label.clone(),
                            callback_data: Some(action.tag().to_string()),
                            url: None,
                        },
                        ButtonKind::Url(url) => InlineKeyboardButton {
                            text: b.label.clone(),
                            callback_data: None,
                            url: Some(url.clone()),
                        },
                    })
                    .collect()
            })
            .collect();
        Self { inline_keyboard }
    }
}

/// `parse_mode` value, if any.
pub fn parse_mode(format: TextFormat) -> Option<&'static str> {
    match format {
        TextFormat::Plain => None,
        TextFormat::Markdown => Some("Markdown"),
    }
}

/// Map a raw update onto a domain event. Updates the bot does not care
/// about (edits, stickers, bot senders, unknown buttons) map to `None`.
pub fn to_inbound(update: Update) -> Option<Inbound> {
    if let Some(query) = update.callback_query {
        return callback_to_inbound(query);
    }
    message_to_inbound(update.message?)
}

fn callback_to_inbound(query: CallbackQuery) -> Option<Inbound> {
    let action = query.data.as_deref().and_then(Action::from_tag)?;
    let message = query.message.as_ref().map(|m| MessageRef {
        chat_id: ChatId(m.chat.id),
        message_id: m.message_id,
    });
    Some(Inbound {
        user_id: UserId(query.from.id),
        // Private chats share the user's id; fall back to it when the menu
        // message is too old to be attached
        chat_id: message.map_or(ChatId(query.from.id), |m| m.chat_id),
        sender_name: display_name(&query.from),
        reply: ReplyTarget::Callback {
            query_id: query.id,
            message,
        },
        event: Event::Action(action),
    })
}

fn message_to_inbound(message: Message) -> Option<Inbound> {
    let from = message.from.as_ref().filter(|u| !u.is_bot)?;

    let event = if let Some(photo) = largest_photo(message.photo.as_deref()) {
        Event::ImageUploaded(FileRef::jpeg(photo.file_id.clone()))
    } else if let Some(file) = message.document.as_ref().and_then(image_document) {
        Event::ImageUploaded(file)
    } else if let Some(text) = message.text.as_deref() {
        match Command::parse(text) {
            Some(cmd) => Event::Command(cmd),
            None => Event::Text(text.to_string()),
        }
    } else {
        return None;
    };

    Some(Inbound {
        user_id: UserId(from.id),
        chat_id: ChatId(message.chat.id),
        sender_name: display_name(from),
        reply: ReplyTarget::NewMessage,
        event,
    })
}

/// Telegram sends every resolution of a photo; keep the biggest.
fn largest_photo(sizes: Option<&[PhotoSize]>) -> Option<&PhotoSize> {
    sizes?
        .iter()
        .max_by_key(|p| u64::from(p.width) * u64::from(p.height))
}

/// Images sent "as file" arrive as documents with an image MIME type.
/// Only formats the PDF assembler can decode are accepted; anything else
/// (webp, heic, svg, ...) is ignored rather than queued.
fn image_document(doc: &Document) -> Option<FileRef> {
    let mime = doc.mime_type.as_deref()?.to_ascii_lowercase();
    let subtype = mime.strip_prefix("image/")?;
    let extension = match subtype {
        "jpeg" | "jpg" | "pjpeg" => "jpg",
        "png" => "png",
        "gif" => "gif",
        "bmp" | "x-ms-bmp" => "bmp",
        "tiff" => "tiff",
        "x-portable-anymap" | "x-portable-pixmap" | "x-portable-graymap"
        | "x-portable-bitmap" => "pnm",
        _ => return None,
    };
    Some(FileRef {
        file_id: doc.file_id.clone(),
        extension: extension.to_string(),
    })
}

fn display_name(user: &User) -> Option<String> {
    user.username
        .clone()
        .or_else(|| (!user.first_name.is_empty()).then(|| user.first_name.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use snap2pdf_core::channel::Button;

    fn update(json: serde_json::Value) -> Update {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn start_command_maps_to_event() {
        let inbound = to_inbound(update(serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": 10,
                "date": 0,
                "from": {"id": 555, "is_bot": false, "first_name": "Ann"},
                "chat": {"id": 555, "type": "private"},
                "text": "/start"
            }
        })))
        .unwrap();
        assert_eq!(inbound.user_id, UserId(555));
        assert_eq!(inbound.chat_id, ChatId(555));
        assert_eq!(inbound.event, Event::Command(Command::Start));
        assert_eq!(inbound.reply, ReplyTarget::NewMessage);
        assert_eq!(inbound.sender_name.as_deref(), Some("Ann"));
    }

    #[test]
    fn photo_picks_largest_size() {
        let inbound = to_inbound(update(serde_json::json!({
            "update_id": 2,
            "message": {
                "message_id": 11,
                "from": {"id": 555, "is_bot": false, "first_name": "Ann"},
                "chat": {"id": 555},
                "photo": [
                    {"file_id": "small", "file_unique_id": "a", "width": 90, "height": 60},
                    {"file_id": "large", "file_unique_id": "c", "width": 1280, "height": 853},
                    {"file_id": "medium", "file_unique_id": "b", "width": 320, "height": 213}
                ]
            }
        })))
        .unwrap();
        assert_eq!(inbound.event, Event::ImageUploaded(FileRef::jpeg("large")));
    }

    #[test]
    fn png_document_is_an_image_upload() {
        let inbound = to_inbound(update(serde_json::json!({
            "update_id": 3,
            "message": {
                "message_id": 12,
                "from": {"id": 1, "first_name": "B"},
                "chat": {"id": 1},
                "document": {"file_id": "doc1", "file_name": "scan.PNG", "mime_type": "image/png"}
            }
        })))
        .unwrap();
        assert_eq!(
            inbound.event,
            Event::ImageUploaded(FileRef {
                file_id: "doc1".into(),
                extension: "png".into()
            })
        );
    }

    #[test]
    fn non_image_document_is_ignored() {
        let inbound = to_inbound(update(serde_json::json!({
            "update_id": 4,
            "message": {
                "message_id": 13,
                "from": {"id": 1, "first_name": "B"},
                "chat": {"id": 1},
                "document": {"file_id": "doc2", "mime_type": "application/zip"}
            }
        })));
        assert!(inbound.is_none());
    }

    #[test]
    fn undecodable_image_formats_are_not_uploads() {
        for mime in ["image/webp", "image/heic", "image/svg+xml"] {
            let inbound = to_inbound(update(serde_json::json!({
                "update_id": 4,
                "message": {
                    "message_id": 14,
                    "from": {"id": 1, "first_name": "B"},
                    "chat": {"id": 1},
                    "document": {"file_id": "doc3", "file_name": "pic.webp", "mime_type": mime}
                }
            })));
            assert!(inbound.is_none(), "{mime} should be ignored");
        }
    }

    #[test]
    fn decodable_document_formats_keep_their_extension() {
        for (mime, ext) in [("image/gif", "gif"), ("image/bmp", "bmp"), ("image/tiff", "tiff")] {
            let inbound = to_inbound(update(serde_json::json!({
                "update_id": 4,
                "message": {
                    "message_id": 15,
                    "from": {"id": 1, "first_name": "B"},
                    "chat": {"id": 1},
                    "document": {"file_id": "doc4", "mime_type": mime}
                }
            })))
            .unwrap();
            assert_eq!(
                inbound.event,
                Event::ImageUploaded(FileRef {
                    file_id: "doc4".into(),
                    extension: ext.into()
                })
            );
        }
    }

    #[test]
    fn callback_query_maps_to_action_with_edit_target() {
        let inbound = to_inbound(update(serde_json::json!({
            "update_id": 5,
            "callback_query": {
                "id": "cbq-1",
                "from": {"id": 777, "is_bot": false, "first_name": "C", "username": "cee"},
                "message": {"message_id": 99, "chat": {"id": 777}},
                "chat_instance": "x",
                "data": "get_premium"
            }
        })))
        .unwrap();
        assert_eq!(inbound.event, Event::Action(Action::GetPremium));
        assert_eq!(inbound.sender_name.as_deref(), Some("cee"));
        assert_eq!(
            inbound.reply,
            ReplyTarget::Callback {
                query_id: "cbq-1".into(),
                message: Some(MessageRef {
                    chat_id: ChatId(777),
                    message_id: 99
                })
            }
        );
    }

    #[test]
    fn unknown_callback_data_is_dropped() {
        let inbound = to_inbound(update(serde_json::json!({
            "update_id": 6,
            "callback_query": {
                "id": "cbq-2",
                "from": {"id": 1, "first_name": "D"},
                "data": "self_destruct"
            }
        })));
        assert!(inbound.is_none());
    }

    #[test]
    fn messages_from_bots_are_dropped() {
        let inbound = to_inbound(update(serde_json::json!({
            "update_id": 7,
            "message": {
                "message_id": 14,
                "from": {"id": 2, "is_bot": true, "first_name": "Bot"},
                "chat": {"id": 2},
                "text": "/start"
            }
        })));
        assert!(inbound.is_none());
    }

    #[test]
    fn keyboard_serializes_to_inline_markup() {
        let kb = Keyboard::column([
            Button::action("Create PDF", Action::Convert),
            Button::url("Send to Admin", "https://t.me/admin"),
        ]);
        let json = serde_json::to_value(InlineKeyboardMarkup::from(&kb)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "inline_keyboard": [
                    [{"text": "Create PDF", "callback_data": "convert"}],
                    [{"text": "Send to Admin", "url": "https://t.me/admin"}]
                ]
            })
        );
    }

    #[test]
    fn error_envelope_parses() {
        let resp: ApiResponse<File> = serde_json::from_value(serde_json::json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: invalid file_id"
        }))
        .unwrap();
        assert!(!resp.ok);
        assert!(resp.result.is_none());
        assert_eq!(resp.error_code, Some(400));
    }
}
