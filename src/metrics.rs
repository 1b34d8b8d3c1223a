//! Pipeline counters.
//!
//! Owned by a [`Conversation`](crate::conversation::Conversation) rather than
//! stored in a global, so separate sessions (and tests) never share counts.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Turns appended to history
    turns_recorded: AtomicUsize,

    /// Submissions ignored because they were blank
    blank_inputs: AtomicUsize,

    /// Turns answered in the default language after detection failed
    language_fallbacks: AtomicUsize,

    /// Turns whose reply is an inline generation error
    generation_failures: AtomicUsize,

    /// Submissions that produced no turn because analysis failed
    turn_failures: AtomicUsize,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_turn(&self) {
        self.turns_recorded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_blank_input(&self) {
        self.blank_inputs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_language_fallback(&self) {
        self.language_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_generation_failure(&self) {
        self.generation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_turn_failure(&self) {
        self.turn_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of the current counters.
    pub fn report(&self) -> MetricsReport {
        let turns_recorded = self.turns_recorded.load(Ordering::Relaxed);
        let generation_failures = self.generation_failures.load(Ordering::Relaxed);

        let generation_success_rate = if turns_recorded == 0 {
            100.0
        } else {
            ((turns_recorded - generation_failures.min(turns_recorded)) as f64 / turns_recorded as f64) * 100.0
        };

        MetricsReport {
            turns_recorded,
            blank_inputs: self.blank_inputs.load(Ordering::Relaxed),
            language_fallbacks: self.language_fallbacks.load(Ordering::Relaxed),
            generation_failures,
            turn_failures: self.turn_failures.load(Ordering::Relaxed),
            generation_success_rate,
        }
    }
}

/// Snapshot of [`PipelineMetrics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub turns_recorded: usize,
    pub blank_inputs: usize,
    pub language_fallbacks: usize,
    pub generation_failures: usize,
    pub turn_failures: usize,
    /// Percentage of recorded turns with a real reply
    pub generation_success_rate: f64,
}
