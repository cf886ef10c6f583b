use crate::dumper::ChunkProgress;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

pub struct ProgressManager {
    multi_progress: MultiProgress,
    enabled: bool,
}

impl ProgressManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            enabled,
        }
    }

    /// Byte progress for a single file being dumped.
    pub fn create_bytes_progress(&self, total_bytes: u64, message: &str) -> ProgressBar {
        if !self.enabled {
            return ProgressBar::hidden();
        }

        let pb = self.multi_progress.add(ProgressBar::new(total_bytes));
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes:>7}/{total_bytes:7} {msg}"
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-")
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }
}

pub fn update_bytes_progress(pb: &ProgressBar, progress: &ChunkProgress) {
    // The input may grow while we read it.
    if progress.bytes_written > pb.length().unwrap_or(0) {
        pb.set_length(progress.bytes_written);
    }
    pb.set_position(progress.bytes_written);
}

pub fn finish_progress_with_summary(pb: &ProgressBar, message: &str, duration: Duration) {
    let final_message = format!("{} (completed in {})", message, format_duration(duration));
    pb.finish_with_message(final_message);
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs > 0 {
        format!("{}s", secs)
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_progress_bars() {
        let manager = ProgressManager::new(false);
        let pb = manager.create_bytes_progress(100, "a.bin");
        assert!(pb.is_hidden());
    }

    #[test]
    fn test_update_bytes_progress() {
        let pb = ProgressBar::hidden();
        pb.set_length(10);

        update_bytes_progress(
            &pb,
            &ChunkProgress {
                bytes_written: 4,
                chunks_written: 1,
                total_bytes: 10,
            },
        );
        assert_eq!(pb.position(), 4);

        update_bytes_progress(
            &pb,
            &ChunkProgress {
                bytes_written: 12,
                chunks_written: 3,
                total_bytes: 10,
            },
        );
        assert_eq!(pb.length(), Some(12));
        assert_eq!(pb.position(), 12);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
    }
}
