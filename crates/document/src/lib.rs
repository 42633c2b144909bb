//! Document assembly for snap2pdf.
//!
//! [`PdfAssembler`] implements [`snap2pdf_core::DocumentAssembler`] with
//! `printpdf`: one A4 page per image, each image scaled to the content width
//! (or height, for tall images) and anchored at the top-left margin.

pub mod layout;
pub mod pdf;

pub use layout::Placement;
pub use pdf::PdfAssembler;

/// Re-exported so tests and tools can produce fixture images with the same
/// decoder version the assembler uses.
pub use printpdf::image_crate;
