//! The snap2pdf bot service.
//!
//! [`Bot`] owns the per-user [`SessionStore`], runs inbound events through
//! the session state machine and carries out the resulting effects against
//! a [`Channel`](snap2pdf_core::Channel) and a
//! [`DocumentAssembler`](snap2pdf_core::DocumentAssembler).
//! [`dispatcher::run`] drives it from the channel's event stream.

pub mod dispatcher;
pub mod messages;
pub mod router;
pub mod store;

pub use messages::PremiumOffer;
pub use router::{Bot, BotSettings};
pub use store::SessionStore;
