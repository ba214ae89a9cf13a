//! Wall-clock instrumentation around the board's heavier passes.
//!
//! Timings are advisory telemetry for hosts that want to surface them; they
//! never participate in control flow.

use std::time::{Duration, Instant};

/// Most recent durations of the instrumented board passes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimingReport {
    detection: Option<Duration>,
    spawning: Option<Duration>,
}

impl TimingReport {
    /// Duration of the last pattern-detection pass, if one has run.
    #[must_use]
    pub const fn detection(&self) -> Option<Duration> {
        self.detection
    }

    /// Duration of the last spawn batch, if one has run.
    #[must_use]
    pub const fn spawning(&self) -> Option<Duration> {
        self.spawning
    }

    pub(crate) fn record_detection(&mut self, took: Duration) {
        self.detection = Some(took);
    }

    pub(crate) fn record_spawning(&mut self, took: Duration) {
        self.spawning = Some(took);
    }
}

/// Runs `f` and reports how long it took alongside its result.
pub(crate) fn timed<T>(f: impl FnOnce() -> T) -> (T, Duration) {
    let started = Instant::now();
    let value = f();
    (value, started.elapsed())
}
