//! `printpdf`-backed assembler.
//!
//! Decoding and encoding are CPU-bound, so the work runs on tokio's blocking
//! pool. The output file is only created after every image decoded.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use printpdf::image_crate::{self, DynamicImage};
use printpdf::{Image, ImageTransform, Mm, PdfDocument};
use snap2pdf_core::DocumentAssembler;
use snap2pdf_core::error::AssemblyError;
use tracing::{debug, info};

use crate::layout::{self, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};

/// Renders each image onto its own A4 page.
#[derive(Debug, Clone)]
pub struct PdfAssembler {
    title: String,
}

impl Default for PdfAssembler {
    fn default() -> Self {
        Self::new("Images")
    }
}

impl PdfAssembler {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

#[async_trait]
impl DocumentAssembler for PdfAssembler {
    fn name(&self) -> &str {
        "pdf"
    }

    async fn assemble(&self, images: &[PathBuf], output: &Path) -> Result<PathBuf, AssemblyError> {
        if images.is_empty() {
            return Err(AssemblyError::Empty);
        }

        let title = self.title.clone();
        let images = images.to_vec();
        let output = output.to_path_buf();
        tokio::task::spawn_blocking(move || render(&title, &images, &output))
            .await
            .map_err(|e| AssemblyError::Aborted(e.to_string()))?
    }
}

fn decode(path: &Path) -> Result<DynamicImage, AssemblyError> {
    let unreadable = |reason: String| AssemblyError::UnreadableImage {
        path: path.to_path_buf(),
        reason,
    };
    // Sniff the content; uploaded files do not always carry an honest extension
    let img = image_crate::io::Reader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| unreadable(e.to_string()))?
        .decode()
        .map_err(|e| unreadable(e.to_string()))?;
    // Flatten alpha and palette formats; the PDF gets plain RGB
    Ok(DynamicImage::ImageRgb8(img.to_rgb8()))
}

fn render(title: &str, images: &[PathBuf], output: &Path) -> Result<PathBuf, AssemblyError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Page 1");
    let mut first = Some((first_page, first_layer));

    for (idx, path) in images.iter().enumerate() {
        let img = decode(path)?;
        let (page, layer) = match first.take() {
            Some(indices) => indices,
            None => doc.add_page(
                Mm(PAGE_WIDTH_MM),
                Mm(PAGE_HEIGHT_MM),
                format!("Page {}", idx + 1),
            ),
        };

        let placement = layout::fit(img.width(), img.height());
        debug!(
            page = idx + 1,
            path = %path.display(),
            width_mm = placement.width_mm,
            height_mm = placement.height_mm,
            "Placing image"
        );

        let layer = doc.get_page(page).get_layer(layer);
        Image::from_dynamic_image(&img).add_to_layer(
            layer,
            ImageTransform {
                translate_x: Some(Mm(placement.x_mm)),
                translate_y: Some(Mm(placement.y_mm)),
                dpi: Some(placement.dpi),
                ..Default::default()
            },
        );
    }

    let write_err = |reason: String| AssemblyError::WriteFailed {
        path: output.to_path_buf(),
        reason,
    };

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
    }
    let file = File::create(output).map_err(|e| write_err(e.to_string()))?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| write_err(e.to_string()))?;

    info!(path = %output.display(), pages = images.len(), "Document assembled");
    Ok(output.to_path_buf())
}
