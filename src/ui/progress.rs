//! Progress rendering for analysis runs

use indicatif::{ProgressBar, ProgressStyle};

use crate::calendar::CalendarProgress;

/// Progress bar fed by [`CalendarProgress`] events.
///
/// Draws to stderr, and draws nothing when stderr is not a terminal or the
/// printer was created hidden (JSON output).
pub struct ProgressPrinter {
    bar: ProgressBar,
}

impl ProgressPrinter {
    pub fn new(total: usize, hidden: bool) -> Self {
        let bar = if hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(total as u64)
        };
        let style = ProgressStyle::with_template("{spinner:.green} [{bar:30.green}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        bar.set_style(style);
        Self { bar }
    }

    pub fn on_event(&self, event: CalendarProgress) {
        match event {
            CalendarProgress::Fetching { symbol, .. } => {
                self.bar.set_message(format!("Processing {} ...", symbol));
            }
            CalendarProgress::Done { completed, .. } => {
                self.bar.set_position(completed as u64);
            }
        }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
