//! Per-user session state machine.
//!
//! [`transition`] is a pure function from a user record and an inbound event
//! to the next [`SessionState`] plus an ordered list of [`Effect`]s. The bot
//! executes the effects in order and stops at the first failure, so every
//! effect that mutates the record is placed after the I/O it depends on.
//!
//! ```text
//!  Idle ──send──▶ AwaitingImages ──image──▶ HasPendingImages ──convert──▶ (Converting) ──▶ Idle
//!    └──────────────────image───────────────────▲       └──────clear──────────────────────▲
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::event::{Action, Command, Event, FileRef};
use crate::quota::{self, Denial, Limits};
use crate::user::UserRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    /// The user asked to send images but none arrived yet
    AwaitingImages,
    HasPendingImages,
    /// A document is being assembled and delivered
    Converting,
}

/// User-facing messages a transition can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Help,
    SendImages,
    ImageSaved,
    ImageLimitReached,
    NoImages,
    DocumentLimitReached,
    /// `documents_used` is `None` for premium users
    Converted { documents_used: Option<u32> },
    Cleared,
    Busy,
    UnknownInput,
}

/// One step of a transition's plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Welcome text plus the action menu
    ShowMenu,
    Notify(Notice),
    /// Download the upload, append it to the queue, count it for free users
    StoreImage(FileRef),
    /// Render the images into one document and deliver it
    BuildDocument { images: Vec<PathBuf> },
    /// Empty the queue and count the document for free users
    CommitConversion,
    /// Empty the queue, counters untouched
    ClearPending,
    DeleteFiles(Vec<PathBuf>),
    RecordUpgradePrompt,
    OfferPremium,
}

impl Effect {
    /// Whether this step changes the user record (queue or counters).
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Effect::StoreImage(_) | Effect::CommitConversion | Effect::ClearPending
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// State once every effect has been applied
    pub next: SessionState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn stay(user: &UserRecord, effects: Vec<Effect>) -> Self {
        Self {
            next: user.state,
            effects,
        }
    }

    fn notify(user: &UserRecord, notice: Notice) -> Self {
        Self::stay(user, vec![Effect::Notify(notice)])
    }

    /// Whether applying this transition mutates the user record.
    pub fn mutates(&self) -> bool {
        self.effects.iter().any(Effect::mutates)
    }
}

pub fn transition(user: &UserRecord, limits: &Limits, event: &Event) -> Transition {
    match event {
        Event::Command(Command::Start) => Transition::stay(user, vec![Effect::ShowMenu]),
        Event::Command(Command::Help) => Transition::notify(user, Notice::Help),
        Event::Command(Command::Convert) => on_action(user, limits, Action::Convert),
        Event::Command(Command::Clear) => on_action(user, limits, Action::Clear),
        Event::Command(Command::Premium) => on_action(user, limits, Action::GetPremium),
        Event::Command(Command::Unknown(_)) | Event::Text(_) => {
            Transition::notify(user, Notice::UnknownInput)
        }
        Event::Action(action) => on_action(user, limits, *action),
        Event::ImageUploaded(file) => on_image(user, limits, file),
    }
}

fn on_action(user: &UserRecord, limits: &Limits, action: Action) -> Transition {
    if user.state == SessionState::Converting && action != Action::GetPremium {
        return Transition::notify(user, Notice::Busy);
    }

    match action {
        Action::Send => Transition {
            next: if user.pending.is_empty() {
                SessionState::AwaitingImages
            } else {
                SessionState::HasPendingImages
            },
            effects: vec![Effect::Notify(Notice::SendImages)],
        },
        Action::Convert => on_convert(user, limits),
        Action::Clear => Transition {
            next: SessionState::Idle,
            effects: vec![
                Effect::ClearPending,
                Effect::DeleteFiles(user.pending_paths()),
                Effect::Notify(Notice::Cleared),
            ],
        },
        Action::GetPremium => {
            Transition::stay(user, vec![Effect::RecordUpgradePrompt, Effect::OfferPremium])
        }
    }
}

fn on_image(user: &UserRecord, limits: &Limits, file: &FileRef) -> Transition {
    match quota::check_image(user, limits) {
        Ok(()) => Transition {
            next: match user.state {
                SessionState::Converting => SessionState::Converting,
                _ => SessionState::HasPendingImages,
            },
            effects: vec![
                Effect::StoreImage(file.clone()),
                Effect::Notify(Notice::ImageSaved),
            ],
        },
        Err(_) => Transition::notify(user, Notice::ImageLimitReached),
    }
}

fn on_convert(user: &UserRecord, limits: &Limits) -> Transition {
    match quota::check_document(user, limits) {
        Err(Denial::NoImages) => Transition::notify(user, Notice::NoImages),
        Err(_) => Transition::notify(user, Notice::DocumentLimitReached),
        Ok(()) => {
            let images = user.pending_paths();
            let documents_used =
                (!user.is_premium()).then(|| user.usage.documents_generated.saturating_add(1));
            Transition {
                next: SessionState::Idle,
                effects: vec![
                    Effect::BuildDocument {
                        images: images.clone(),
                    },
                    Effect::CommitConversion,
                    Effect::DeleteFiles(images),
                    Effect::Notify(Notice::Converted { documents_used }),
                ],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{PendingImage, Tier, UserId};

    fn free_user() -> UserRecord {
        UserRecord::new(UserId(42), Tier::Free)
    }

    fn with_pending(mut user: UserRecord, n: usize) -> UserRecord {
        for i in 0..n {
            user.pending.push(PendingImage::new(format!("42_{i}.jpg")));
        }
        user.usage.images_used = n as u32;
        user.state = SessionState::HasPendingImages;
        user
    }

    #[test]
    fn start_shows_menu_without_state_change() {
        let user = free_user();
        let t = transition(&user, &Limits::default(), &Event::Command(Command::Start));
        assert_eq!(t.next, SessionState::Idle);
        assert_eq!(t.effects, vec![Effect::ShowMenu]);
        assert!(!t.mutates());
    }

    #[test]
    fn send_moves_idle_to_awaiting() {
        let t = transition(&free_user(), &Limits::default(), &Event::Action(Action::Send));
        assert_eq!(t.next, SessionState::AwaitingImages);
        assert_eq!(t.effects, vec![Effect::Notify(Notice::SendImages)]);
    }

    #[test]
    fn image_accepted_below_limit() {
        let file = FileRef::jpeg("AgAD");
        let t = transition(&free_user(), &Limits::default(), &Event::ImageUploaded(file.clone()));
        assert_eq!(t.next, SessionState::HasPendingImages);
        assert_eq!(t.effects[0], Effect::StoreImage(file));
        assert!(t.mutates());
    }

    #[test]
    fn image_rejected_at_limit_without_mutation() {
        let user = with_pending(free_user(), 7);
        let t = transition(&user, &Limits::default(), &Event::ImageUploaded(FileRef::jpeg("x")));
        assert_eq!(t.effects, vec![Effect::Notify(Notice::ImageLimitReached)]);
        assert_eq!(t.next, SessionState::HasPendingImages);
        assert!(!t.mutates());
    }

    #[test]
    fn convert_with_empty_queue_is_rejected() {
        let t = transition(&free_user(), &Limits::default(), &Event::Action(Action::Convert));
        assert_eq!(t.effects, vec![Effect::Notify(Notice::NoImages)]);
    }

    #[test]
    fn convert_commits_only_after_building() {
        let user = with_pending(free_user(), 3);
        let t = transition(&user, &Limits::default(), &Event::Action(Action::Convert));
        assert_eq!(t.next, SessionState::Idle);
        let build = t
            .effects
            .iter()
            .position(|e| matches!(e, Effect::BuildDocument { .. }))
            .unwrap();
        let commit = t
            .effects
            .iter()
            .position(|e| *e == Effect::CommitConversion)
            .unwrap();
        assert!(build < commit);
        assert_eq!(
            t.effects[0],
            Effect::BuildDocument {
                images: user.pending_paths()
            }
        );
        assert_eq!(
            t.effects.last(),
            Some(&Effect::Notify(Notice::Converted {
                documents_used: Some(1)
            }))
        );
    }

    #[test]
    fn convert_rejected_at_document_limit() {
        let mut user = with_pending(free_user(), 2);
        user.usage.documents_generated = 7;
        let t = transition(&user, &Limits::default(), &Event::Command(Command::Convert));
        assert_eq!(t.effects, vec![Effect::Notify(Notice::DocumentLimitReached)]);
    }

    #[test]
    fn premium_convert_reports_no_usage() {
        let mut user = with_pending(UserRecord::new(UserId(1), Tier::Premium), 10);
        user.usage.documents_generated = 50;
        let t = transition(&user, &Limits::default(), &Event::Action(Action::Convert));
        assert_eq!(
            t.effects.last(),
            Some(&Effect::Notify(Notice::Converted {
                documents_used: None
            }))
        );
    }

    #[test]
    fn clear_empties_queue_and_deletes_files() {
        let user = with_pending(free_user(), 2);
        let t = transition(&user, &Limits::default(), &Event::Action(Action::Clear));
        assert_eq!(t.next, SessionState::Idle);
        assert!(t.effects.contains(&Effect::ClearPending));
        assert!(t.effects.contains(&Effect::DeleteFiles(user.pending_paths())));
        assert!(!t.effects.contains(&Effect::CommitConversion));
    }

    #[test]
    fn premium_prompt_is_recorded_then_offered() {
        let t = transition(&free_user(), &Limits::default(), &Event::Command(Command::Premium));
        assert_eq!(t.effects, vec![Effect::RecordUpgradePrompt, Effect::OfferPremium]);
    }

    #[test]
    fn convert_while_converting_is_busy() {
        let mut user = with_pending(free_user(), 1);
        user.state = SessionState::Converting;
        let t = transition(&user, &Limits::default(), &Event::Action(Action::Convert));
        assert_eq!(t.effects, vec![Effect::Notify(Notice::Busy)]);
        assert_eq!(t.next, SessionState::Converting);
    }

    #[test]
    fn only_queue_and_counter_effects_mutate() {
        assert!(Effect::StoreImage(FileRef::jpeg("a")).mutates());
        assert!(Effect::CommitConversion.mutates());
        assert!(Effect::ClearPending.mutates());
        assert!(!Effect::BuildDocument { images: vec![] }.mutates());
        assert!(!Effect::DeleteFiles(vec![]).mutates());
        assert!(!Effect::RecordUpgradePrompt.mutates());
        assert!(!Effect::Notify(Notice::Cleared).mutates());
    }

    #[test]
    fn plain_text_gets_a_hint() {
        let t = transition(&free_user(), &Limits::default(), &Event::Text("hi".into()));
        assert_eq!(t.effects, vec![Effect::Notify(Notice::UnknownInput)]);
    }
}
