//! Page blackout: the engine and a file-oriented service around it.
//!
//! [`BlackoutEngine`] works on bytes and injected randomness/time;
//! [`RedactionService`] is what the HTTP handler and the CLI call with
//! input and output paths.

pub mod engine;
pub mod strategy;

pub use engine::BlackoutEngine;
pub use strategy::{
    RedactionOptions, RedactionOutcome, RedactionReport, SelectionStrategy,
};

use std::fs;
use std::path::Path;
use std::time::Duration;

use tracing::debug;

use crate::config::RedactionConfig;
use crate::domain::BlackoutRatio;
use crate::error::{RedactorError, RedactorResult};

/// Redaction service coordinating engine execution over files.
///
/// Holds only immutable policy, so one instance can be shared by every
/// request; each call builds a fresh engine.
#[derive(Debug, Clone)]
pub struct RedactionService {
    ratio: BlackoutRatio,
    time_budget: Option<Duration>,
    seed: Option<u64>,
}

impl RedactionService {
    pub fn new(ratio: BlackoutRatio, time_budget: Option<Duration>) -> Self {
        Self {
            ratio,
            time_budget,
            seed: None,
        }
    }

    pub fn from_config(config: &RedactionConfig) -> Self {
        Self::new(config.ratio, config.time_budget)
    }

    /// Fixes the random seed so repeated runs pick the same pages.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn options(&self, password: Option<&str>) -> RedactionOptions {
        RedactionOptions {
            password: password.map(str::to_string),
            ratio: self.ratio,
            time_budget: self.time_budget,
        }
    }

    /// Blacks out pages of the PDF at `input` and writes it to `output`.
    ///
    /// Nothing is written to `output` unless redaction succeeded.
    pub fn redact(
        &self,
        input: &Path,
        output: &Path,
        password: Option<&str>,
    ) -> RedactorResult<RedactionReport> {
        let bytes = fs::read(input).map_err(|source| RedactorError::Io {
            path: input.to_path_buf(),
            source,
        })?;

        debug!(
            input = %input.display(),
            bytes = bytes.len(),
            ratio = %self.ratio,
            "starting redaction"
        );

        let options = self.options(password);
        let outcome = match self.seed {
            Some(seed) => BlackoutEngine::seeded(seed).redact(&bytes, &options)?,
            None => BlackoutEngine::from_entropy().redact(&bytes, &options)?,
        };

        fs::write(output, &outcome.bytes).map_err(|source| RedactorError::Io {
            path: output.to_path_buf(),
            source,
        })?;

        Ok(outcome.report)
    }
}

impl Default for RedactionService {
    fn default() -> Self {
        Self::from_config(&RedactionConfig::default())
    }
}
