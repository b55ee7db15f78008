//! Document rendering.
//!
//! This module provides:
//! - The [`DocumentRenderer`] trait, implemented once per output format
//! - A paginator that lays content blocks onto A4 pages
//! - The PDF backend

pub mod layout;
pub mod pdf;

pub use layout::{paginate, DrawOp, Font, Page};
pub use pdf::PdfRenderer;

use crate::error::GenerationError;
use crate::types::Document;

/// Turns a projected [`Document`] into file bytes.
pub trait DocumentRenderer {
    fn render(&self, document: &Document) -> Result<Vec<u8>, GenerationError>;
}
