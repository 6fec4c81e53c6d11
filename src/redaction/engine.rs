//! The blackout engine.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::strategy::{RedactionOptions, RedactionOutcome, RedactionReport, SelectionStrategy};
use crate::document::{PageDocument, PdfDocument};
use crate::domain::{Clock, EligibleRange, ExecutionBudget, RedactionPlan, SystemClock};
use crate::error::RedactorResult;

/// Picks pages after the protected prefix and paints them black.
///
/// The random source and the clock are injected so page selection and
/// budget cut-off can be reproduced exactly. One engine serves one call at
/// a time; concurrent requests each build their own.
pub struct BlackoutEngine<R, C = SystemClock> {
    rng: R,
    clock: C,
}

impl BlackoutEngine<StdRng, SystemClock> {
    /// Engine seeded from OS entropy, for production use.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy(), SystemClock)
    }

    /// Engine with a fixed seed. Same seed and input, same pages.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed), SystemClock)
    }
}

impl<R: Rng, C: Clock> BlackoutEngine<R, C> {
    pub fn new(rng: R, clock: C) -> Self {
        Self { rng, clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Opens `input`, blacks out pages and serializes the result.
    ///
    /// The budget starts before the document is parsed. The document is
    /// released before this returns, on success and on every error.
    pub fn redact(
        &mut self,
        input: &[u8],
        options: &RedactionOptions,
    ) -> RedactorResult<RedactionOutcome> {
        let budget = ExecutionBudget::start(&self.clock, options.time_budget);
        let mut document = PdfDocument::open(input)?;

        let report = self.process(&mut document, options, &budget)?;

        let mut bytes = Vec::with_capacity(input.len());
        document.write_to(&mut bytes)?;

        info!(
            total_pages = report.total_pages,
            target = report.target_pages,
            redacted = report.redacted_count(),
            truncated = report.truncated,
            output_bytes = bytes.len(),
            "redaction complete"
        );

        Ok(RedactionOutcome { bytes, report })
    }

    /// Authenticates, selects and blacks out pages of an open document.
    ///
    /// The selection mode follows the budget: an unlimited budget samples
    /// the exact target up front, a limited one draws pages one by one
    /// until the target is met or the budget is spent.
    pub fn process<D: PageDocument + ?Sized>(
        &mut self,
        document: &mut D,
        options: &RedactionOptions,
        budget: &ExecutionBudget,
    ) -> RedactorResult<RedactionReport> {
        if document.is_encrypted() {
            document.authenticate(options.password.as_deref().unwrap_or(""))?;
        }

        let total_pages = document.page_count();
        let eligible = EligibleRange::for_document(total_pages);
        if eligible.is_empty() {
            debug!(total_pages, "no eligible pages, returning document unchanged");
            return Ok(RedactionReport::untouched(total_pages, 0));
        }

        let target = options.ratio.target_count(eligible.len());
        if target == 0 {
            debug!(
                total_pages,
                ratio = %options.ratio,
                "target rounds down to zero, returning document unchanged"
            );
            return Ok(RedactionReport::untouched(total_pages, eligible.len()));
        }

        let strategy = SelectionStrategy::from_limit(budget.limit());
        debug!(
            total_pages,
            eligible = eligible.len(),
            target,
            strategy = strategy.name(),
            "selecting pages"
        );

        let (plan, truncated) = match strategy {
            SelectionStrategy::Unbounded => {
                let plan = RedactionPlan::sample(&eligible, target, &mut self.rng);
                for &page in plan.pages() {
                    blackout(document, &eligible, page)?;
                }
                (plan, false)
            }
            SelectionStrategy::TimeBudgeted(_) => {
                self.redact_within_budget(document, &eligible, target, budget)?
            }
        };

        Ok(RedactionReport {
            total_pages,
            eligible_pages: eligible.len(),
            target_pages: target,
            redacted_pages: plan.into_pages(),
            truncated,
        })
    }

    fn redact_within_budget<D: PageDocument + ?Sized>(
        &mut self,
        document: &mut D,
        eligible: &EligibleRange,
        target: usize,
        budget: &ExecutionBudget,
    ) -> RedactorResult<(RedactionPlan, bool)> {
        let order = RedactionPlan::processing_order(eligible, &mut self.rng);
        let mut done = Vec::with_capacity(target);
        let mut truncated = false;

        for page in order {
            if done.len() == target {
                break;
            }
            if budget.is_exhausted(&self.clock) {
                truncated = true;
                break;
            }
            blackout(document, eligible, page)?;
            done.push(page);
        }

        if truncated {
            warn!(
                redacted = done.len(),
                target,
                limit_ms = budget.limit().map(|d| d.as_millis() as u64),
                "time budget exhausted, serializing partial redaction"
            );
        }

        Ok((RedactionPlan::from_pages(done), truncated))
    }
}

fn blackout<D: PageDocument + ?Sized>(
    document: &mut D,
    eligible: &EligibleRange,
    page: usize,
) -> RedactorResult<()> {
    debug_assert!(eligible.contains(page), "page {} is protected", page);
    let rect = document.page_rect(page)?;
    document.fill_rect(page, rect)
}
