//! Flat-file user sets.
//!
//! Both files hold one integer user id per line:
//! - **Premium ledger** — read once at startup, never written by the bot
//! - **Upgrade-prompt log** — append-only record of who saw the upgrade offer

pub mod premium;
pub mod prompt_log;

pub use premium::PremiumLedger;
pub use prompt_log::PromptLog;

use std::collections::HashSet;

use snap2pdf_core::UserId;
use snap2pdf_core::error::StorageError;
use tracing::warn;

/// Parse one id per line. Blank lines are ignored; malformed lines are
/// logged and skipped without stopping the parse.
pub(crate) fn parse_ids(content: &str, source: &str) -> HashSet<UserId> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(idx, line)| match line.parse::<UserId>() {
            Ok(id) => Some(id),
            Err(e) => {
                warn!(file = source, line = idx + 1, error = %e, "Skipping malformed user id");
                None
            }
        })
        .collect()
}

/// Read a file that may not exist yet. Missing means empty.
pub(crate) fn read_optional(path: &std::path::Path) -> Result<String, StorageError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(source) => Err(StorageError::Read {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_skips_garbage_and_keeps_going() {
        let ids = parse_ids("101\nnot-a-number\n\n  202  \n3.5\n303\n", "test");
        assert_eq!(ids.len(), 3);
        assert!(ids.contains(&UserId(101)));
        assert!(ids.contains(&UserId(202)));
        assert!(ids.contains(&UserId(303)));
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let content = read_optional(&dir.path().join("absent.txt")).unwrap();
        assert!(content.is_empty());
    }
}
