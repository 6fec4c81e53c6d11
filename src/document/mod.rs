//! Opened, mutable documents.
//!
//! The engine talks to documents only through [`PageDocument`], so the
//! selection and budget logic can be exercised against in-memory fakes.
//! [`PdfDocument`] is the lopdf-backed implementation used in production.

pub mod pdf;

pub use pdf::PdfDocument;

use std::io::Write;

use crate::error::RedactorResult;

/// A page's bounding rectangle in default user space units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl PageRect {
    /// US Letter, used when a page tree carries no box at all.
    pub const LETTER: Self = Self {
        x0: 0.0,
        y0: 0.0,
        x1: 612.0,
        y1: 792.0,
    };

    /// Builds a rectangle from two opposite corners in any order.
    pub fn from_corners(ax: f32, ay: f32, bx: f32, by: f32) -> Self {
        Self {
            x0: ax.min(bx),
            y0: ay.min(by),
            x1: ax.max(bx),
            y1: ay.max(by),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// An opened document whose pages can be blacked out in place.
///
/// Pages are addressed by zero-based index and are never reordered or
/// removed. Implementations are not required to be thread-safe.
pub trait PageDocument {
    fn page_count(&self) -> usize;

    /// Whether the document needs [`authenticate`](Self::authenticate)
    /// before its pages can be modified.
    fn is_encrypted(&self) -> bool;

    /// Unlocks an encrypted document.
    ///
    /// Fails with [`RedactorError::IncorrectPassword`](crate::RedactorError::IncorrectPassword)
    /// when the password is rejected.
    fn authenticate(&mut self, password: &str) -> RedactorResult<()>;

    fn page_rect(&self, index: usize) -> RedactorResult<PageRect>;

    /// Paints `rect` on page `index` with an opaque black fill.
    fn fill_rect(&mut self, index: usize, rect: PageRect) -> RedactorResult<()>;

    /// Serializes the document in its current state.
    fn write_to(&mut self, sink: &mut dyn Write) -> RedactorResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_normalizes_corners() {
        let rect = PageRect::from_corners(612.0, 792.0, 0.0, 0.0);
        assert_eq!(rect, PageRect::LETTER);
        assert_eq!(rect.width(), 612.0);
        assert_eq!(rect.height(), 792.0);
    }
}
