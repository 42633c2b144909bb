//! Chat channel implementations for snap2pdf.
//!
//! Each channel connects to a chat platform and relays events to/from the
//! bot. Channels are trait-based and platform-agnostic.
//!
//! Available channels:
//! - **Telegram** — Telegram Bot API over long polling

pub mod telegram;
pub mod wire;

pub use telegram::{TelegramChannel, TelegramConfig};
