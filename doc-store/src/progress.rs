//! Lightweight progress reporting for index builds.
//!
//! Use `NoopProgress` for headless runs and `IndicatifProgress` on a TTY.

use indicatif::{ProgressBar, ProgressStyle};

/// Minimal progress interface used while embedding segments.
pub trait Progress: Send + Sync {
    /// Set known total steps.
    fn set_total(&self, _n: u64) {}
    /// Advance by one step.
    fn step(&self, _msg: &str) {}
    /// Finish the UI.
    fn finish(&self, _msg: &str) {}
}

/// No-op reporter for servers/headless runs.
#[derive(Default, Clone, Copy)]
pub struct NoopProgress;
impl Progress for NoopProgress {}

/// Indicatif-based bar.
pub struct IndicatifProgress {
    pb: ProgressBar,
}

impl IndicatifProgress {
    /// Bounded bar; the length is set later through [`Progress::set_total`].
    pub fn bar() -> Self {
        let pb = ProgressBar::new(0);
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}",
        ) {
            pb.set_style(style);
        }
        Self { pb }
    }
}

impl Progress for IndicatifProgress {
    fn set_total(&self, n: u64) {
        self.pb.set_length(n);
    }
    fn step(&self, msg: &str) {
        self.pb.inc(1);
        self.pb.set_message(msg.to_string());
    }
    fn finish(&self, msg: &str) {
        self.pb.finish_with_message(msg.to_string());
    }
}
