//! Session store — per-user records for the lifetime of the process.
//!
//! Owned by the [`crate::Bot`]; nothing here touches the filesystem.
//! Deleting the files behind pending images is the caller's job.

use std::collections::HashMap;
use std::path::PathBuf;

use snap2pdf_core::session::SessionState;
use snap2pdf_core::user::{PendingImage, Tier, UserId, UserRecord};
use snap2pdf_ledger::PremiumLedger;
use tracing::debug;

pub struct SessionStore {
    ledger: PremiumLedger,
    users: HashMap<UserId, UserRecord>,
}

impl SessionStore {
    /// Tiers of newly seen users are resolved against `ledger`.
    pub fn new(ledger: PremiumLedger) -> Self {
        Self {
            ledger,
            users: HashMap::new(),
        }
    }

    /// The user's record, created on first contact.
    pub fn get_or_create(&mut self, user_id: UserId) -> &mut UserRecord {
        let ledger = &self.ledger;
        self.users.entry(user_id).or_insert_with(|| {
            let tier = if ledger.is_premium(user_id) {
                Tier::Premium
            } else {
                Tier::Free
            };
            debug!(user_id = %user_id, ?tier, "New user record");
            UserRecord::new(user_id, tier)
        })
    }

    pub fn get(&self, user_id: UserId) -> Option<&UserRecord> {
        self.users.get(&user_id)
    }

    /// Queue an accepted upload and count it against the free quota.
    pub fn append_image(&mut self, user_id: UserId, image: PendingImage) {
        let user = self.get_or_create(user_id);
        user.pending.push(image);
        if !user.is_premium() {
            user.usage.images_used = user.usage.images_used.saturating_add(1);
        }
    }

    /// Empty the queue and hand back the paths to delete. Counters stay.
    pub fn clear(&mut self, user_id: UserId) -> Vec<PathBuf> {
        let user = self.get_or_create(user_id);
        std::mem::take(&mut user.pending)
            .into_iter()
            .map(|p| p.path)
            .collect()
    }

    /// A document was delivered: empty the queue and count it.
    pub fn commit_conversion(&mut self, user_id: UserId) -> Vec<PathBuf> {
        let converted = self.clear(user_id);
        let user = self.get_or_create(user_id);
        if !user.is_premium() {
            user.usage.documents_generated = user.usage.documents_generated.saturating_add(1);
        }
        converted
    }

    pub fn set_state(&mut self, user_id: UserId, state: SessionState) {
        self.get_or_create(user_id).state = state;
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
