//! Random page blackout for PDF documents.
//!
//! Given a PDF, blacks out a fixed share of the pages that follow the
//! first three, picked uniformly at random. The first three pages are
//! never touched. Blacked-out pages keep their size; their visible content
//! is covered by an opaque black rectangle.
//!
//! # Architecture
//!
//! - [`domain`]: Page-selection policy (ratio, eligible range, plans, budget)
//! - [`document`]: PDF access behind the [`PageDocument`] trait
//! - [`redaction`]: The blackout engine and the file-level service
//! - [`server`]: HTTP upload endpoint
//! - [`config`]: Environment-driven configuration
//! - [`error`]: Error taxonomy shared by all layers
//!
//! # Quick Start
//!
//! ```no_run
//! use blackout::RedactionService;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let service = RedactionService::default();
//!
//! let report = service.redact(
//!     Path::new("textbook.pdf"),
//!     Path::new("processed.pdf"),
//!     None,
//! )?;
//! println!("blacked out {} page(s)", report.redacted_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Reproducible Selection
//!
//! ```no_run
//! use blackout::{BlackoutEngine, BlackoutRatio, RedactionOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let input = std::fs::read("textbook.pdf")?;
//! let options = RedactionOptions::new(BlackoutRatio::new(0.45)?);
//!
//! let outcome = BlackoutEngine::seeded(7).redact(&input, &options)?;
//! assert!(outcome.report.redacted_pages.iter().all(|&p| p >= 3));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod document;
pub mod domain;
pub mod error;
pub mod redaction;
pub mod server;

pub use config::Config;
pub use document::{PageDocument, PageRect, PdfDocument};
pub use domain::{BlackoutRatio, Clock, EligibleRange, ExecutionBudget, RedactionPlan, SystemClock};
pub use error::{ErrorKind, RedactorError, RedactorResult};
pub use redaction::{
    BlackoutEngine, RedactionOptions, RedactionOutcome, RedactionReport, RedactionService,
    SelectionStrategy,
};
