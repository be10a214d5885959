//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`Progress`] struct which implements [`ProgressCallback`]
//! to display a spinner on stderr while files are collected and while the
//! detector refines its groups round by round.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::duplicates::RoundStats;

/// Progress callback for the scan pipeline.
///
/// Implement this trait to receive progress updates while files are
/// walked and while duplicates are detected.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase (`"walking"` or `"detecting"`)
    /// * `total` - Number of items known at the start (0 if unknown)
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called as work advances within a phase.
    ///
    /// # Arguments
    ///
    /// * `current` - Files found so far, or the current round number
    /// * `message` - Short description of the current step
    fn on_progress(&self, current: usize, message: &str);

    /// Called after every detector refinement round.
    fn on_round_end(&self, _round: &RoundStats) {}

    /// Called when a phase completes.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase
    fn on_phase_end(&self, phase: &str);
}

/// Progress reporter using an indicatif spinner.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    bytes_read: Mutex<u64>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use chunkdupe::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            bytes_read: Mutex::new(0),
            quiet,
        }
    }

    fn bar(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn spinner_style(phase: &str) -> ProgressStyle {
        let template = match phase {
            "walking" => "{spinner:.green} {msg} [{elapsed_precise}] {pos} files",
            _ => "{spinner:.cyan} {msg} [{elapsed_precise}]",
        };
        ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style(phase));
        pb.set_message(match phase {
            "walking" => "Collecting files".to_string(),
            "detecting" => format!("Comparing {total} files"),
            other => other.to_string(),
        });
        pb.enable_steady_tick(Duration::from_millis(100));

        *self.bytes_read.lock().unwrap_or_else(PoisonError::into_inner) = 0;
        if let Some(previous) = self.bar().replace(pb) {
            previous.finish_and_clear();
        }
    }

    fn on_progress(&self, current: usize, message: &str) {
        if self.quiet {
            return;
        }

        if let Some(ref pb) = *self.bar() {
            pb.set_position(current as u64);
            pb.set_message(truncate_message(message, 40));
        }
    }

    fn on_round_end(&self, round: &RoundStats) {
        if self.quiet {
            return;
        }

        let total = {
            let mut bytes = self.bytes_read.lock().unwrap_or_else(PoisonError::into_inner);
            *bytes += round.bytes_read;
            *bytes
        };

        if let Some(ref pb) = *self.bar() {
            pb.set_message(format!(
                "Round {}: {} groups, {} still colliding, {} read",
                round.round,
                round.groups,
                round.multi_member_groups,
                bytesize::ByteSize::b(total)
            ));
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        if let Some(pb) = self.bar().take() {
            log::debug!("Phase '{}' finished after {:?}", phase, pb.elapsed());
            pb.finish_and_clear();
        }
    }
}

/// Truncate a message for display next to the spinner, keeping its tail.
fn truncate_message(message: &str, max_len: usize) -> String {
    let count = message.chars().count();
    if count <= max_len {
        return message.to_string();
    }

    let tail: String = message.chars().skip(count - (max_len - 3)).collect();
    format!("...{tail}")
}
