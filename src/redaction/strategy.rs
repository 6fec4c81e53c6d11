//! Redaction options, selection strategies and the result report.

use std::time::Duration;

use crate::domain::BlackoutRatio;

/// Per-call engine options.
#[derive(Debug, Clone, Default)]
pub struct RedactionOptions {
    /// Open password for encrypted documents. `None` tries the empty password.
    pub password: Option<String>,

    pub ratio: BlackoutRatio,

    /// Wall-clock limit for the whole call; `None` selects unbounded mode.
    pub time_budget: Option<Duration>,
}

impl RedactionOptions {
    pub fn new(ratio: BlackoutRatio) -> Self {
        Self {
            ratio,
            ..Default::default()
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_time_budget(mut self, budget: Option<Duration>) -> Self {
        self.time_budget = budget;
        self
    }

    pub fn selection(&self) -> SelectionStrategy {
        SelectionStrategy::from_limit(self.time_budget)
    }
}

/// How pages are picked and how long the engine may keep drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStrategy {
    /// Sample exactly the target number of pages up front, then draw all of them.
    Unbounded,

    /// Walk a shuffled order of every eligible page, checking the clock
    /// before each one. Stops at the target or when the budget runs out.
    TimeBudgeted(Duration),
}

impl SelectionStrategy {
    pub fn from_limit(limit: Option<Duration>) -> Self {
        match limit {
            Some(budget) => Self::TimeBudgeted(budget),
            None => Self::Unbounded,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Unbounded => "unbounded",
            Self::TimeBudgeted(_) => "time-budgeted",
        }
    }
}

/// Statistics about a redaction operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedactionReport {
    pub total_pages: usize,

    /// Pages after the protected prefix
    pub eligible_pages: usize,

    /// `floor(ratio × eligible_pages)`
    pub target_pages: usize,

    /// Zero-based indices that were blacked out, ascending
    pub redacted_pages: Vec<usize>,

    /// The time budget ran out before the target was reached
    pub truncated: bool,
}

impl RedactionReport {
    /// A report for a document returned as-is.
    pub fn untouched(total_pages: usize, eligible_pages: usize) -> Self {
        Self {
            total_pages,
            eligible_pages,
            ..Default::default()
        }
    }

    pub fn redacted_count(&self) -> usize {
        self.redacted_pages.len()
    }

    pub fn has_redactions(&self) -> bool {
        !self.redacted_pages.is_empty()
    }

    pub fn is_partial(&self) -> bool {
        self.truncated && self.redacted_count() < self.target_pages
    }
}

/// Output bytes plus what was done to produce them.
#[derive(Debug, Clone)]
pub struct RedactionOutcome {
    pub bytes: Vec<u8>,
    pub report: RedactionReport,
}
