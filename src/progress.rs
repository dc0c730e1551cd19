//! Progress reporting.
//!
//! Both procedures report how far they have got through a
//! [`ProgressCallback`]. The callback is attached to
//! [`ExtractOptions`](crate::ExtractOptions) or
//! [`AssembleOptions`](crate::AssembleOptions) and receives a
//! [`ProgressInfo`] snapshot every `batch_size` frames.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use framecast::{AssembleOptions, ProgressCallback, ProgressInfo};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         if let Some(pct) = info.percentage {
//!             println!("[{:?}] {pct:.1}% complete", info.operation);
//!         }
//!     }
//! }
//!
//! framecast::assemble_video(
//!     "frames/",
//!     "out.mp4",
//!     &AssembleOptions::new(30.0).with_progress(Arc::new(PrintProgress)),
//! )?;
//! # Ok::<(), framecast::FramecastError>(())
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

/// The kind of operation currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Writing decoded video frames out as images.
    FrameExtraction,
    /// Encoding images into a video.
    FrameAssembly,
}

/// A snapshot of progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// What kind of work is being performed.
    pub operation: OperationType,
    /// How many frames have been processed so far.
    pub current: u64,
    /// Total frames expected, if known ahead of time.
    ///
    /// During extraction this is the container's declared frame count, which
    /// may disagree with the number of frames actually decoded.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the operation started.
    pub elapsed: Duration,
    /// Estimated time remaining, based on current throughput.
    pub estimated_remaining: Option<Duration>,
    /// Zero-based index of the frame just processed.
    pub current_frame: Option<u64>,
}

/// Trait for receiving progress updates.
///
/// Progress callbacks are **infallible**: they observe the run but cannot
/// halt it.
pub trait ProgressCallback: Send + Sync {
    /// Called every `batch_size` frames and once more when the run finishes.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. The default callback.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Tracks progress timing and emits callbacks.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    batch_size: u64,
    start_time: Instant,
    items_since_last_report: u64,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
        batch_size: u64,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            batch_size: batch_size.max(1),
            start_time: Instant::now(),
            items_since_last_report: 0,
        }
    }

    /// Record one completed frame and fire the callback if the batch
    /// threshold is reached.
    pub(crate) fn advance(&mut self, frame_index: u64) {
        self.current += 1;
        self.items_since_last_report += 1;

        if self.items_since_last_report >= self.batch_size {
            self.report(Some(frame_index));
            self.items_since_last_report = 0;
        }
    }

    /// Unconditionally emit a final progress report.
    pub(crate) fn finish(&mut self) {
        self.report(None);
    }

    fn report(&self, frame_index: Option<u64>) {
        let elapsed = self.start_time.elapsed();

        let percentage = self
            .total
            .filter(|&t| t > 0)
            .map(|t| (self.current as f32 / t as f32) * 100.0);

        let estimated_remaining = if self.current > 0 {
            self.total.map(|t| {
                let remaining = t.saturating_sub(self.current);
                elapsed.mul_f64(remaining as f64 / self.current as f64)
            })
        } else {
            None
        };

        self.callback.on_progress(&ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage,
            elapsed,
            estimated_remaining,
            current_frame: frame_index,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recording {
        infos: Mutex<Vec<ProgressInfo>>,
    }

    impl ProgressCallback for Recording {
        fn on_progress(&self, info: &ProgressInfo) {
            self.infos.lock().unwrap().push(info.clone());
        }
    }

    #[test]
    fn reports_every_batch_and_on_finish() {
        let recording = Arc::new(Recording::default());
        let mut tracker = ProgressTracker::new(
            recording.clone(),
            OperationType::FrameAssembly,
            Some(5),
            2,
        );
        for index in 0..5 {
            tracker.advance(index);
        }
        tracker.finish();

        let infos = recording.infos.lock().unwrap();
        let counts: Vec<u64> = infos.iter().map(|info| info.current).collect();
        assert_eq!(counts, vec![2, 4, 5]);
        assert_eq!(infos[0].current_frame, Some(1));
        assert_eq!(infos[2].current_frame, None);
        assert_eq!(infos[2].percentage, Some(100.0));
    }

    #[test]
    fn unknown_total_has_no_percentage() {
        let recording = Arc::new(Recording::default());
        let mut tracker =
            ProgressTracker::new(recording.clone(), OperationType::FrameExtraction, None, 1);
        tracker.advance(0);

        let infos = recording.infos.lock().unwrap();
        assert_eq!(infos.len(), 1);
        assert!(infos[0].percentage.is_none());
        assert!(infos[0].estimated_remaining.is_none());
    }

    #[test]
    fn zero_batch_size_is_clamped() {
        let recording = Arc::new(Recording::default());
        let mut tracker =
            ProgressTracker::new(recording.clone(), OperationType::FrameExtraction, Some(3), 0);
        tracker.advance(0);
        assert_eq!(recording.infos.lock().unwrap().len(), 1);
    }

    #[test]
    fn overshooting_declared_total_does_not_underflow() {
        let recording = Arc::new(Recording::default());
        let mut tracker =
            ProgressTracker::new(recording.clone(), OperationType::FrameExtraction, Some(1), 1);
        tracker.advance(0);
        tracker.advance(1);

        let infos = recording.infos.lock().unwrap();
        assert_eq!(infos[1].estimated_remaining, Some(Duration::ZERO));
        assert_eq!(infos[1].percentage, Some(200.0));
    }
}
