//! Lightweight progress reporting for the query pipeline.
//!
//! Use `NoopProgress` for library/headless runs (default) and
//! `IndicatifProgress` for an interactive CLI. Both draw nothing on stdout.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

/// Minimal progress interface used inside the ask pipeline.
pub trait Progress: Send + Sync {
    /// Advance by one step and show a short message.
    fn step(&self, _msg: &str) {}
    /// Finish the UI after success.
    fn finish(&self, _msg: &str) {}
    /// Tear the UI down after a failure.
    fn fail(&self, _msg: &str) {}
}

/// No-op reporter for headless runs.
#[derive(Default, Clone, Copy)]
pub struct NoopProgress;
impl Progress for NoopProgress {}

/// Indicatif spinner drawn on stderr.
pub struct IndicatifProgress {
    pb: ProgressBar,
}

impl IndicatifProgress {
    /// Spinner (unknown total).
    pub fn spinner() -> Self {
        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner} [{elapsed}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("-\\|/ ");
        pb.set_style(style);
        pb.enable_steady_tick(Duration::from_millis(80));
        Self { pb }
    }
}

impl Progress for IndicatifProgress {
    fn step(&self, msg: &str) {
        self.pb.set_message(msg.to_string());
    }
    fn finish(&self, _msg: &str) {
        self.pb.finish_and_clear();
    }
    fn fail(&self, msg: &str) {
        self.pb.abandon_with_message(msg.to_string());
    }
}
