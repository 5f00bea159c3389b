//! Progress bar for the update loop.

use dtpfix_domain::ProgressSink;
use dtpfix_types::work::{NodeResult, UpdateOutcome};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicU64, Ordering};

const TEMPLATE: &str = "{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}";
const SIMULATED_TEMPLATE: &str = "{spinner:.yellow} {msg} [{bar:40.yellow/blue}] {pos}/{len}";

/// [`ProgressSink`] drawing an indicatif bar on stderr.
pub struct BarProgress {
    bar: ProgressBar,
    failed: AtomicU64,
}

impl BarProgress {
    pub fn new(quiet: bool, simulation: bool) -> Self {
        let bar = ProgressBar::new(0);
        if quiet {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }

        let template = if simulation {
            SIMULATED_TEMPLATE
        } else {
            TEMPLATE
        };
        let style = ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░");
        bar.set_style(style);
        bar.set_message(if simulation {
            "(simulated) updating nodes"
        } else {
            "updating nodes"
        });

        Self {
            bar,
            failed: AtomicU64::new(0),
        }
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

impl ProgressSink for BarProgress {
    fn start(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
    }

    fn advance(&self, result: &NodeResult) {
        if matches!(result.outcome, UpdateOutcome::Failed { .. }) {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
