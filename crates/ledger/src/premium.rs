//! Premium ledger — the set of users exempt from quotas.
//!
//! Loaded once when the bot starts. Premium status is granted out of band by
//! editing the file and restarting; there is no write path here.

use std::collections::HashSet;
use std::path::Path;

use snap2pdf_core::UserId;
use snap2pdf_core::error::StorageError;
use tracing::info;

use crate::{parse_ids, read_optional};

#[derive(Debug, Clone, Default)]
pub struct PremiumLedger {
    users: HashSet<UserId>,
}

impl PremiumLedger {
    /// Load the ledger from `path`. A missing file gives an empty ledger.
    pub fn load(path: &Path) -> Result<Self, StorageError> {
        let content = read_optional(path)?;
        let users = parse_ids(&content, &path.display().to_string());
        info!(path = %path.display(), count = users.len(), "Premium ledger loaded");
        Ok(Self { users })
    }

    pub fn from_ids(ids: impl IntoIterator<Item = UserId>) -> Self {
        Self {
            users: ids.into_iter().collect(),
        }
    }

    pub fn is_premium(&self, user_id: UserId) -> bool {
        self.users.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn malformed_line_does_not_abort_load() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "1001").unwrap();
        writeln!(file, "oops").unwrap();
        writeln!(file, "1002").unwrap();

        let ledger = PremiumLedger::load(file.path()).unwrap();
        assert_eq!(ledger.len(), 2);
        assert!(ledger.is_premium(UserId(1001)));
        assert!(ledger.is_premium(UserId(1002)));
        assert!(!ledger.is_premium(UserId(1003)));
    }

    #[test]
    fn missing_file_is_empty_ledger() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = PremiumLedger::load(&dir.path().join("user_premium.txt")).unwrap();
        assert!(ledger.is_empty());
    }

    #[test]
    fn directory_path_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            PremiumLedger::load(dir.path()),
            Err(StorageError::Read { .. })
        ));
    }

    #[test]
    fn from_ids_deduplicates() {
        let ledger = PremiumLedger::from_ids([UserId(5), UserId(5), UserId(6)]);
        assert_eq!(ledger.len(), 2);
    }
}
