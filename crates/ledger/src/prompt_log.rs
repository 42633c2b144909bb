//! Upgrade-prompt log — who has been shown the premium offer.
//!
//! Ids already on disk are loaded into memory when the log is opened;
//! afterwards the set answers duplicate checks and the file is only ever
//! appended to.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};

use snap2pdf_core::UserId;
use snap2pdf_core::error::StorageError;
use tracing::debug;

use crate::{parse_ids, read_optional};

#[derive(Debug)]
pub struct PromptLog {
    path: PathBuf,
    seen: HashSet<UserId>,
    /// The file ends mid-line (edited by hand); terminate it before appending
    unterminated: bool,
}

impl PromptLog {
    /// Open the log at `path`. Nothing is created until the first append.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let content = read_optional(&path)?;
        let seen = parse_ids(&content, &path.display().to_string());
        let unterminated = !content.is_empty() && !content.ends_with('\n');
        debug!(path = %path.display(), count = seen.len(), "Upgrade-prompt log opened");
        Ok(Self {
            path,
            seen,
            unterminated,
        })
    }

    /// Record that `user_id` saw the prompt. Returns `true` when the id was
    /// new and got appended, `false` for a repeat visit.
    pub fn record(&mut self, user_id: UserId) -> Result<bool, StorageError> {
        if self.seen.contains(&user_id) {
            return Ok(false);
        }

        self.append(user_id)?;
        self.seen.insert(user_id);
        debug!(user_id = %user_id, "Recorded upgrade prompt");
        Ok(true)
    }

    fn append(&mut self, user_id: UserId) -> Result<(), StorageError> {
        let err = |source| StorageError::Append {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(err)?;
        }

        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(err)?;
        if self.unterminated {
            writeln!(file).map_err(err)?;
        }
        writeln!(file, "{user_id}").map_err(err)?;
        self.unterminated = false;
        Ok(())
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.seen.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_record_appends_repeat_does_not() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("user.txt");
        let mut log = PromptLog::open(&path).unwrap();
        assert!(log.is_empty());

        assert!(log.record(UserId(77)).unwrap());
        assert!(!log.record(UserId(77)).unwrap());
        assert!(log.record(UserId(78)).unwrap());

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "77\n78\n");
    }

    #[test]
    fn reopened_log_remembers_previous_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.txt");
        std::fs::write(&path, "10\n\nbad\n11\n").unwrap();

        let mut log = PromptLog::open(&path).unwrap();
        assert_eq!(log.len(), 2);
        assert!(log.contains(UserId(10)));
        assert!(!log.record(UserId(11)).unwrap());

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "10\n\nbad\n11\n");
    }

    #[test]
    fn append_after_unterminated_last_line_keeps_ids_apart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.txt");
        std::fs::write(&path, "10").unwrap();

        let mut log = PromptLog::open(&path).unwrap();
        assert!(log.record(UserId(11)).unwrap());
        assert!(log.record(UserId(12)).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "10\n11\n12\n");

        let reopened = PromptLog::open(&path).unwrap();
        assert_eq!(reopened.len(), 3);
        assert!(reopened.contains(UserId(10)));
        assert!(reopened.contains(UserId(11)));
    }

    #[test]
    fn open_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("user.txt");
        let _log = PromptLog::open(&path).unwrap();
        assert!(!path.exists());
    }
}
