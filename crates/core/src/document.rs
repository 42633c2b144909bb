//! Document assembler trait — turns an ordered list of images into one file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::AssemblyError;

/// Renders images into a single document, one page per image, in order.
///
/// The assembler never deletes its inputs or its output; cleanup belongs to
/// the caller once the document has been delivered.
#[async_trait]
pub trait DocumentAssembler: Send + Sync {
    /// Short name for logs (e.g., "pdf").
    fn name(&self) -> &str;

    /// Write the document to `output` and return its path.
    async fn assemble(
        &self,
        images: &[PathBuf],
        output: &Path,
    ) -> std::result::Result<PathBuf, AssemblyError>;
}
