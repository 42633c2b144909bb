//! Free-tier quota policy.
//!
//! Pure functions over a [`UserRecord`]; nothing here mutates state.
//! Premium users pass every limit check.

use serde::{Deserialize, Serialize};

use crate::user::UserRecord;

/// Configured free-tier limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum images a free user may upload over their lifetime
    pub images: u32,
    /// Maximum documents a free user may generate over their lifetime
    pub documents: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            images: 7,
            documents: 7,
        }
    }
}

/// Why an action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    ImageLimit,
    DocumentLimit,
    NoImages,
}

pub fn can_add_image(user: &UserRecord, limits: &Limits) -> bool {
    check_image(user, limits).is_ok()
}

pub fn can_create_document(user: &UserRecord, limits: &Limits) -> bool {
    user.is_premium()
        || (!user.pending.is_empty() && user.usage.documents_generated < limits.documents)
}

pub fn check_image(user: &UserRecord, limits: &Limits) -> Result<(), Denial> {
    if user.is_premium() || user.usage.images_used < limits.images {
        Ok(())
    } else {
        Err(Denial::ImageLimit)
    }
}

/// Conversion gate used by the router. An empty queue is reported before
/// the document limit, for every tier.
pub fn check_document(user: &UserRecord, limits: &Limits) -> Result<(), Denial> {
    if user.pending.is_empty() {
        Err(Denial::NoImages)
    } else if can_create_document(user, limits) {
        Ok(())
    } else {
        Err(Denial::DocumentLimit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{PendingImage, Tier, UserId};

    fn user(tier: Tier, images_used: u32, documents_generated: u32, pending: usize) -> UserRecord {
        let mut u = UserRecord::new(UserId(1), tier);
        u.usage.images_used = images_used;
        u.usage.documents_generated = documents_generated;
        u.pending = (0..pending)
            .map(|i| PendingImage::new(format!("1_{i}.jpg")))
            .collect();
        u
    }

    #[test]
    fn free_user_images_allowed_below_limit() {
        let limits = Limits::default();
        for used in 0..limits.images {
            assert!(can_add_image(&user(Tier::Free, used, 0, 0), &limits));
        }
    }

    #[test]
    fn free_user_images_denied_at_limit() {
        let limits = Limits::default();
        let u = user(Tier::Free, 7, 0, 0);
        assert_eq!(check_image(&u, &limits), Err(Denial::ImageLimit));
        assert!(!can_add_image(&user(Tier::Free, 100, 0, 0), &limits));
    }

    #[test]
    fn free_user_document_denied_at_limit_regardless_of_queue() {
        let limits = Limits::default();
        for pending in 1..5 {
            let u = user(Tier::Free, 0, 7, pending);
            assert_eq!(check_document(&u, &limits), Err(Denial::DocumentLimit));
        }
    }

    #[test]
    fn empty_queue_reported_before_limit() {
        let limits = Limits::default();
        let u = user(Tier::Free, 7, 7, 0);
        assert_eq!(check_document(&u, &limits), Err(Denial::NoImages));
    }

    #[test]
    fn premium_never_rejected_by_limits() {
        let limits = Limits::default();
        for used in [0, 7, 8, 1_000, u32::MAX] {
            let u = user(Tier::Premium, used, used, 1);
            assert!(can_add_image(&u, &limits));
            assert!(can_create_document(&u, &limits));
        }
    }

    #[test]
    fn free_user_cannot_create_from_empty_queue() {
        assert!(!can_create_document(&user(Tier::Free, 0, 0, 0), &Limits::default()));
    }

    #[test]
    fn premium_still_needs_images_to_convert() {
        let u = user(Tier::Premium, 0, 0, 0);
        assert_eq!(check_document(&u, &Limits::default()), Err(Denial::NoImages));
    }
}
