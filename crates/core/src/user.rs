//! User records — tier, pending images and lifetime usage counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::session::SessionState;

/// Platform-assigned user identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(UserId)
    }
}

/// Which quota class a user belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Subject to the image and document limits
    #[default]
    Free,
    /// Listed in the premium ledger, exempt from limits
    Premium,
}

impl Tier {
    pub fn is_premium(self) -> bool {
        matches!(self, Tier::Premium)
    }
}

/// Lifetime usage counters. Never reset, not even by `clear`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub images_used: u32,
    pub documents_generated: u32,
}

/// An image waiting to be converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingImage {
    /// Where the downloaded file lives
    pub path: PathBuf,
    /// When the upload was accepted
    pub received_at: DateTime<Utc>,
}

impl PendingImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            received_at: Utc::now(),
        }
    }
}

/// Everything the bot knows about one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub tier: Tier,
    pub state: SessionState,
    /// Upload order is page order
    pub pending: Vec<PendingImage>,
    pub usage: Usage,
}

impl UserRecord {
    pub fn new(id: UserId, tier: Tier) -> Self {
        Self {
            id,
            tier,
            state: SessionState::Idle,
            pending: Vec::new(),
            usage: Usage::default(),
        }
    }

    pub fn is_premium(&self) -> bool {
        self.tier.is_premium()
    }

    /// Paths of all pending images, in upload order.
    pub fn pending_paths(&self) -> Vec<PathBuf> {
        self.pending.iter().map(|p| p.path.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_parses_trimmed_integers() {
        assert_eq!(" 12345 \n".parse::<UserId>().unwrap(), UserId(12345));
        assert!("abc".parse::<UserId>().is_err());
        assert!("".parse::<UserId>().is_err());
    }

    #[test]
    fn new_record_starts_idle_and_empty() {
        let user = UserRecord::new(UserId(7), Tier::Free);
        assert_eq!(user.state, SessionState::Idle);
        assert!(user.pending.is_empty());
        assert_eq!(user.usage, Usage::default());
        assert!(!user.is_premium());
    }

    #[test]
    fn tier_serializes_lowercase() {
        let json = serde_json::to_string(&Tier::Premium).unwrap();
        assert_eq!(json, "\"premium\"");
    }
}
