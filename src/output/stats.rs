//! Run outcome counters

use std::fmt;

/// Per-run success and failure counts
///
/// Incremented once per extracted product as the orchestrator processes it.
/// Reported at the end of the run, never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.succeeded += 1;
    }

    pub fn record_failure(&mut self) {
        self.failed += 1;
    }

    /// Records one outcome
    pub fn record(&mut self, succeeded: bool) {
        if succeeded {
            self.record_success();
        } else {
            self.record_failure();
        }
    }

    /// Number of products processed
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Share of processed products that succeeded, in percent
    pub fn success_rate(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            (self.succeeded as f64 / self.total() as f64) * 100.0
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Success: {}", self.succeeded)?;
        write!(f, "  Errors: {}", self.failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut summary = RunSummary::new();
        summary.record_success();
        summary.record(true);
        summary.record(false);

        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_success_rate() {
        assert_eq!(RunSummary::new().success_rate(), 0.0);
        let summary = RunSummary {
            succeeded: 3,
            failed: 1,
        };
        assert_eq!(summary.success_rate(), 75.0);
    }

    #[test]
    fn test_two_line_display() {
        let summary = RunSummary {
            succeeded: 2,
            failed: 0,
        };
        assert_eq!(summary.to_string(), "  Success: 2\n  Errors: 0");
    }
}
