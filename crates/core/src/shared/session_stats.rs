use std::sync::atomic::{AtomicU64, Ordering};

/// Counters shared between the capture queues, the consolidation worker and
/// any thread polling session status.
///
/// Each counter is independent; a [`StatsSnapshot`] is a best-effort read,
/// not a consistent cut across all of them.
#[derive(Debug, Default)]
pub struct SessionStats {
    frames_delivered: AtomicU64,
    frames_displayed: AtomicU64,
    frames_processed: AtomicU64,
    frames_dropped: AtomicU64,
    metadata_batches: AtomicU64,
    metadata_superseded: AtomicU64,
    processor_errors: AtomicU64,
    blink_count: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub frames_delivered: u64,
    pub frames_displayed: u64,
    pub frames_processed: u64,
    pub frames_dropped: u64,
    pub metadata_batches: u64,
    pub metadata_superseded: u64,
    pub processor_errors: u64,
    pub blink_count: u64,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_delivered(&self) {
        self.frames_delivered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_displayed(&self) {
        self.frames_displayed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_processed(&self, blink_count: u64) {
        self.frames_processed.fetch_add(1, Ordering::Relaxed);
        self.blink_count.store(blink_count, Ordering::Relaxed);
    }

    /// Returns the running total of dropped frames.
    pub fn record_dropped(&self) -> u64 {
        self.frames_dropped.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn record_metadata(&self) {
        self.metadata_batches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_superseded(&self) {
        self.metadata_superseded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_processor_error(&self) {
        self.processor_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames_delivered: self.frames_delivered.load(Ordering::Relaxed),
            frames_displayed: self.frames_displayed.load(Ordering::Relaxed),
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
            frames_dropped: self.frames_dropped.load(Ordering::Relaxed),
            metadata_batches: self.metadata_batches.load(Ordering::Relaxed),
            metadata_superseded: self.metadata_superseded.load(Ordering::Relaxed),
            processor_errors: self.processor_errors.load(Ordering::Relaxed),
            blink_count: self.blink_count.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_new_stats_are_zero() {
        assert_eq!(SessionStats::new().snapshot(), StatsSnapshot::default());
    }

    #[test]
    fn test_record_processed_keeps_latest_blink_count() {
        let stats = SessionStats::new();
        stats.record_processed(2);
        stats.record_processed(5);
        let snap = stats.snapshot();
        assert_eq!(snap.frames_processed, 2);
        assert_eq!(snap.blink_count, 5);
    }

    #[test]
    fn test_record_dropped_returns_running_total() {
        let stats = SessionStats::new();
        assert_eq!(stats.record_dropped(), 1);
        assert_eq!(stats.record_dropped(), 2);
    }

    #[test]
    fn test_counters_are_shared_across_threads() {
        let stats = Arc::new(SessionStats::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let stats = stats.clone();
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        stats.record_delivered();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(stats.snapshot().frames_delivered, 4000);
    }
}
