//! Eligible page range and random page selection.

use std::ops::Range;

use rand::seq::SliceRandom;
use rand::Rng;

use super::PROTECTED_PAGES;

/// Page indices that may be blacked out: everything after the protected pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EligibleRange {
    range: Range<usize>,
}

impl EligibleRange {
    pub fn for_document(total_pages: usize) -> Self {
        let start = PROTECTED_PAGES.min(total_pages);
        Self {
            range: start..total_pages,
        }
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.range.contains(&index)
    }

    pub fn start(&self) -> usize {
        self.range.start
    }

    pub fn indices(&self) -> Range<usize> {
        self.range.clone()
    }
}

/// Page indices chosen for blackout.
///
/// Always sorted and free of duplicates; every index lies in the
/// [`EligibleRange`] it was drawn from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RedactionPlan {
    pages: Vec<usize>,
}

impl RedactionPlan {
    /// Draws exactly `min(target, range.len())` distinct indices uniformly.
    pub fn sample<R: Rng + ?Sized>(range: &EligibleRange, target: usize, rng: &mut R) -> Self {
        let amount = target.min(range.len());
        let mut pages: Vec<usize> = rand::seq::index::sample(rng, range.len(), amount)
            .into_iter()
            .map(|offset| range.start() + offset)
            .collect();
        pages.sort_unstable();
        Self { pages }
    }

    /// Every eligible index in a uniformly shuffled order.
    ///
    /// The time-budgeted loop walks this order and stops early, so any
    /// prefix of it is itself a uniform sample.
    pub fn processing_order<R: Rng + ?Sized>(range: &EligibleRange, rng: &mut R) -> Vec<usize> {
        let mut order: Vec<usize> = range.indices().collect();
        order.shuffle(rng);
        order
    }

    pub fn from_pages(mut pages: Vec<usize>) -> Self {
        pages.sort_unstable();
        pages.dedup();
        Self { pages }
    }

    pub fn pages(&self) -> &[usize] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn into_pages(self) -> Vec<usize> {
        self.pages
    }
}
