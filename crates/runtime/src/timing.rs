// Copyright (c) 2025 Accel-RT Contributors
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Reusable elapsed-time accumulators for pipeline instrumentation.
//!
//! A [`TimedSection`] wraps one pipeline stage: `start()` marks a
//! reference point, `pause()` appends the elapsed time to a running
//! history without resetting it, and `average()` is the arithmetic mean
//! over everything recorded. [`StageTimers`] groups the four sections the
//! engine instruments; the timers are owned by the engine and exposed via
//! an accessor, so there is no static timer state anywhere.

use std::time::{Duration, Instant};

/// A named elapsed-time accumulator with start/pause/restart semantics.
///
/// Not synchronized: each section is used from a single call site.
#[derive(Debug, Clone)]
pub struct TimedSection {
    name: String,
    started: Option<Instant>,
    samples: Vec<Duration>,
}

impl TimedSection {
    /// Creates an empty section with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started: None,
            samples: Vec::new(),
        }
    }

    /// Records a reference time point for the next `pause()`.
    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    /// Appends the elapsed time since `start()` to the history.
    ///
    /// Does not reset the history — repeated start/pause cycles
    /// accumulate. A `pause()` without a matching `start()` records
    /// nothing.
    pub fn pause(&mut self) {
        match self.started.take() {
            Some(t0) => self.record(t0.elapsed()),
            None => tracing::debug!("timer '{}' paused without start", self.name),
        }
    }

    /// Clears the history and starts a new cycle.
    pub fn restart(&mut self) {
        self.samples.clear();
        self.start();
    }

    fn record(&mut self, elapsed: Duration) {
        self.samples.push(elapsed);
    }

    /// Returns the section name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of recorded samples.
    pub fn count(&self) -> usize {
        self.samples.len()
    }

    /// Returns the arithmetic mean over all recorded samples, or zero if
    /// nothing has been recorded.
    pub fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let total: Duration = self.samples.iter().sum();
        total / self.samples.len() as u32
    }

    /// Returns the sum of all recorded samples.
    pub fn total(&self) -> Duration {
        self.samples.iter().sum()
    }

    /// Returns a human-readable one-line summary.
    pub fn summary(&self) -> String {
        format!(
            "timer {}: avg = {:.3} ms over {} samples",
            self.name,
            self.average().as_secs_f64() * 1000.0,
            self.count(),
        )
    }
}

/// The four sections the engine instruments, one per pipeline stage.
#[derive(Debug, Clone)]
pub struct StageTimers {
    /// Host-side input staging (`set_input`).
    pub set_input: TimedSection,
    /// Bulk host→device copy.
    pub copy_to_device: TimedSection,
    /// The execute call itself.
    pub execute: TimedSection,
    /// Bulk device→host copy.
    pub copy_to_host: TimedSection,
}

impl StageTimers {
    pub fn new() -> Self {
        Self {
            set_input: TimedSection::new("set_input"),
            copy_to_device: TimedSection::new("copy_to_device"),
            execute: TimedSection::new("execute"),
            copy_to_host: TimedSection::new("copy_to_host"),
        }
    }

    /// Returns a multi-line summary of all four sections.
    pub fn summary(&self) -> String {
        [
            &self.set_input,
            &self.copy_to_device,
            &self.execute,
            &self.copy_to_host,
        ]
        .iter()
        .map(|t| t.summary())
        .collect::<Vec<_>>()
        .join("\n")
    }
}

impl Default for StageTimers {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_is_exact_mean() {
        let mut t = TimedSection::new("mean");
        t.record(Duration::from_millis(10));
        t.record(Duration::from_millis(20));
        t.record(Duration::from_millis(60));

        assert_eq!(t.count(), 3);
        assert_eq!(t.average(), Duration::from_millis(30));
        assert_eq!(t.total(), Duration::from_millis(90));
    }

    #[test]
    fn test_empty_average_is_zero() {
        let t = TimedSection::new("empty");
        assert_eq!(t.average(), Duration::ZERO);
        assert_eq!(t.count(), 0);
    }

    #[test]
    fn test_start_pause_accumulates() {
        let mut t = TimedSection::new("acc");
        t.start();
        t.pause();
        t.start();
        t.pause();
        assert_eq!(t.count(), 2);
    }

    #[test]
    fn test_pause_without_start_records_nothing() {
        let mut t = TimedSection::new("noop");
        t.pause();
        assert_eq!(t.count(), 0);
    }

    #[test]
    fn test_restart_clears_history() {
        let mut t = TimedSection::new("restart");
        t.record(Duration::from_millis(5));
        t.record(Duration::from_millis(7));
        assert_eq!(t.count(), 2);

        t.restart();
        assert_eq!(t.count(), 0);
        // restart() also begins a new cycle.
        t.pause();
        assert_eq!(t.count(), 1);
    }

    #[test]
    fn test_summary_contains_name() {
        let mut t = TimedSection::new("execute");
        t.record(Duration::from_millis(2));
        assert!(t.summary().contains("timer execute"));
    }

    #[test]
    fn test_stage_timers_summary() {
        let timers = StageTimers::new();
        let s = timers.summary();
        assert!(s.contains("set_input"));
        assert!(s.contains("copy_to_device"));
        assert!(s.contains("execute"));
        assert!(s.contains("copy_to_host"));
    }
}
