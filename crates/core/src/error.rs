//! Error types for the snap2pdf domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.
//!
//! Quota rejections are deliberately absent: they are ordinary outcomes of a
//! transition (see [`crate::session::Notice`]), not failures.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all snap2pdf operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Channel errors ---
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    // --- Document assembly ---
    #[error("Assembly error: {0}")]
    Assembly(#[from] AssemblyError),

    // --- Local file storage ---
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Channel not configured: {0}")]
    NotConfigured(String),

    #[error("API request {method} failed: {reason}")]
    ApiError { method: String, reason: String },

    #[error("Message delivery failed to {chat_id}: {reason}")]
    DeliveryFailed { chat_id: i64, reason: String },

    #[error("File download failed for {file_id}: {reason}")]
    DownloadFailed { file_id: String, reason: String },

    #[error("Invalid update payload: {0}")]
    InvalidPayload(String),
}

#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("No images to assemble")]
    Empty,

    #[error("Cannot read image {path}: {reason}")]
    UnreadableImage { path: PathBuf, reason: String },

    #[error("Failed to write document {path}: {reason}")]
    WriteFailed { path: PathBuf, reason: String },

    #[error("Assembly task aborted: {0}")]
    Aborted(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to append to {path}: {source}")]
    Append {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assembly_error_names_the_file() {
        let err = Error::Assembly(AssemblyError::UnreadableImage {
            path: PathBuf::from("images/42_0.jpg"),
            reason: "unexpected end of file".into(),
        });
        assert!(err.to_string().contains("42_0.jpg"));
        assert!(err.to_string().contains("unexpected end of file"));
    }

    #[test]
    fn channel_error_converts_into_top_level() {
        let err: Error = ChannelError::ApiError {
            method: "sendMessage".into(),
            reason: "Bad Request: chat not found".into(),
        }
        .into();
        assert!(matches!(err, Error::Channel(_)));
        assert!(err.to_string().contains("sendMessage"));
    }
}
