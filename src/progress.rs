use indicatif::{ProgressBar, ProgressStyle};
use std::time::Instant;

/// Rate and ETA bookkeeping for a validation run.
///
/// Updated from the result-collection loop on the calling thread, so it
/// needs no synchronization of its own.
#[derive(Debug)]
pub struct ProgressTracker {
    total: usize,
    completed: usize,
    started: Instant,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
            started: Instant::now(),
        }
    }

    /// Record one completed item
    pub fn tick(&mut self) {
        self.completed += 1;
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Items per second since the run started
    pub fn rate(&self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed <= 0.0 {
            return 0.0;
        }
        self.completed as f64 / elapsed
    }

    /// Estimated seconds until completion, 0.0 when unknowable
    pub fn eta_secs(&self) -> f64 {
        let rate = self.rate();
        if rate <= 0.0 || self.completed >= self.total {
            return 0.0;
        }
        (self.total - self.completed) as f64 / rate
    }
}

/// Build the per-item progress bar; hidden in quiet and batch modes
pub fn validation_bar(total: u64, hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar
}
