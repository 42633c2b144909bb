//! # snap2pdf core
//!
//! Domain types, traits, and error definitions for the snap2pdf bot.
//! This crate has **no I/O of its own**; it defines the domain model that
//! the channel, ledger, document and bot crates implement against.
//!
//! ## Layout
//!
//! - [`user`] — user records, tiers and usage counters
//! - [`quota`] — the pure free-tier quota policy
//! - [`event`] — inbound platform events
//! - [`session`] — the per-user state machine and its effects
//! - [`channel`] — the messaging-platform abstraction
//! - [`document`] — the document-assembly abstraction

pub mod channel;
pub mod document;
pub mod error;
pub mod event;
pub mod quota;
pub mod session;
pub mod user;

// Re-export key types at crate root for ergonomics
pub use channel::{Button, ButtonKind, Channel, ChatId, Keyboard, MessageRef, TextFormat};
pub use document::DocumentAssembler;
pub use error::{AssemblyError, ChannelError, Error, Result, StorageError};
pub use event::{Action, Command, Event, FileRef, Inbound, ReplyTarget};
pub use quota::{Denial, Limits};
pub use session::{Effect, Notice, SessionState, Transition, transition};
pub use user::{PendingImage, Tier, Usage, UserId, UserRecord};
