use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::info;

/// Point-in-time view of a grid run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressSnapshot {
    pub processed: usize,
    pub total: usize,
    pub elapsed: Duration,
}

impl ProgressSnapshot {
    pub fn new(processed: usize, total: usize, elapsed: Duration) -> Self {
        Self {
            processed,
            total,
            elapsed,
        }
    }

    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.processed as f64 / self.total as f64 * 100.0
    }

    /// Points per second so far
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.processed as f64 / secs
        } else {
            0.0
        }
    }

    /// Remaining time extrapolated from the average rate; `None` until a rate is known.
    pub fn eta(&self) -> Option<Duration> {
        let remaining = self.total.saturating_sub(self.processed);
        if remaining == 0 {
            return Some(Duration::ZERO);
        }
        let rate = self.rate();
        if rate > 0.0 {
            Some(Duration::from_secs_f64(remaining as f64 / rate))
        } else {
            None
        }
    }

    pub fn summary(&self) -> String {
        let eta = self
            .eta()
            .map(|d| format!("{:6.1}s", d.as_secs_f64()))
            .unwrap_or_else(|| "     ?".to_string());
        format!(
            "Progress: {}/{} ({:5.1}%)  elapsed {:6.1}s  rate {:6.1} pts/s  ETA {}",
            self.processed,
            self.total,
            self.percent(),
            self.elapsed.as_secs_f64(),
            self.rate(),
            eta
        )
    }
}

/// Receives progress from the grid processor at a fixed cadence.
pub trait ProgressObserver {
    fn on_progress(&mut self, snapshot: &ProgressSnapshot);

    fn on_finish(&mut self, _snapshot: &ProgressSnapshot) {}
}

pub struct ProgressReporter {
    progress_bar: Option<ProgressBar>,
    silent: bool,
}

impl ProgressReporter {
    pub fn new(total: u64, message: &str, silent: bool) -> Self {
        if silent {
            Self {
                progress_bar: None,
                silent: true,
            }
        } else {
            let pb = ProgressBar::new(total);
            let style = ProgressStyle::default_bar()
                .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-");
            pb.set_style(style);
            pb.set_message(message.to_string());
            pb.enable_steady_tick(Duration::from_millis(100));

            Self {
                progress_bar: Some(pb),
                silent: false,
            }
        }
    }

    pub fn silent() -> Self {
        Self::new(0, "", true)
    }

    pub fn finish_with_message(&self, message: &str) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_with_message(message.to_string());
        }
    }

    pub fn println(&self, message: &str) {
        if !self.silent {
            if let Some(ref pb) = self.progress_bar {
                pb.println(message);
            } else {
                println!("{}", message);
            }
        }
    }
}

impl ProgressObserver for ProgressReporter {
    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        if let Some(ref pb) = self.progress_bar {
            pb.set_position(snapshot.processed as u64);
            pb.set_message(snapshot.summary());
        }
        info!("{}", snapshot.summary());
    }

    fn on_finish(&mut self, snapshot: &ProgressSnapshot) {
        self.finish_with_message(&format!(
            "Processed {} points in {:.1}s",
            snapshot.processed,
            snapshot.elapsed.as_secs_f64()
        ));
    }
}

impl Drop for ProgressReporter {
    fn drop(&mut self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_rate_and_eta() {
        let snapshot = ProgressSnapshot::new(50, 200, Duration::from_secs(25));

        assert_eq!(snapshot.percent(), 25.0);
        assert_eq!(snapshot.rate(), 2.0);
        assert_eq!(snapshot.eta(), Some(Duration::from_secs(75)));
    }

    #[test]
    fn test_snapshot_without_elapsed_time() {
        let snapshot = ProgressSnapshot::new(0, 10, Duration::ZERO);

        assert_eq!(snapshot.rate(), 0.0);
        assert_eq!(snapshot.eta(), None);
        assert!(snapshot.summary().contains("ETA      ?"));
    }

    #[test]
    fn test_completed_snapshot() {
        let snapshot = ProgressSnapshot::new(9, 9, Duration::from_secs(3));

        assert_eq!(snapshot.percent(), 100.0);
        assert_eq!(snapshot.eta(), Some(Duration::ZERO));
        assert!(snapshot.summary().starts_with("Progress: 9/9 (100.0%)"));
    }

    #[test]
    fn test_silent_reporter_accepts_updates() {
        let mut reporter = ProgressReporter::silent();
        let snapshot = ProgressSnapshot::new(1, 2, Duration::from_secs(1));
        reporter.on_progress(&snapshot);
        reporter.on_finish(&snapshot);
        reporter.println("not shown");
    }
}
