//! Per-trial phase timing
//!
//! Strategies record named phase durations as they go; the driver turns the
//! list into the benchmark's stdout lines. Kept separate from `tracing`
//! diagnostics; this is the measured interface.

use std::time::Duration;

/// Ordered list of (phase name, duration) pairs for one trial.
#[derive(Debug, Default, Clone)]
pub struct PhaseTimings {
    phases: Vec<(&'static str, Duration)>,
}

impl PhaseTimings {
    /// Empty timing record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one phase duration.
    pub fn record(&mut self, name: &'static str, elapsed: Duration) {
        self.phases.push((name, elapsed));
    }

    /// Iterate phases in recording order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, Duration)> + '_ {
        self.phases.iter().copied()
    }

    /// Duration of a named phase, if recorded.
    pub fn get(&self, name: &str) -> Option<Duration> {
        self.phases
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, d)| *d)
    }
}
