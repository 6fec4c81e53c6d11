//! Page-selection policy.
//!
//! Pure logic with no PDF dependency: which pages may be blacked out, how
//! many of them, in which order, and how long the engine may keep going.

pub mod budget;
pub mod plan;
pub mod ratio;

pub use budget::{Clock, ExecutionBudget, SystemClock};
pub use plan::{EligibleRange, RedactionPlan};
pub use ratio::BlackoutRatio;

/// Number of leading pages that are never blacked out.
pub const PROTECTED_PAGES: usize = 3;
