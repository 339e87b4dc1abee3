use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Running batch counters, shared by every document task.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    files_succeeded: AtomicU64,
    files_failed: AtomicU64,
    chunks_total: AtomicU64,
    chunks_cleaned: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                files_succeeded: AtomicU64::new(0),
                files_failed: AtomicU64::new(0),
                chunks_total: AtomicU64::new(0),
                chunks_cleaned: AtomicU64::new(0),
            }),
        }
    }

    pub fn increment_files_succeeded(&self) {
        self.inner.files_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_files_failed(&self) {
        self.inner.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_chunks(&self, cleaned: u64, total: u64) {
        self.inner.chunks_cleaned.fetch_add(cleaned, Ordering::Relaxed);
        self.inner.chunks_total.fetch_add(total, Ordering::Relaxed);
    }

    pub fn get_files_succeeded(&self) -> u64 {
        self.inner.files_succeeded.load(Ordering::Relaxed)
    }

    pub fn get_files_failed(&self) -> u64 {
        self.inner.files_failed.load(Ordering::Relaxed)
    }

    pub fn get_chunks_total(&self) -> u64 {
        self.inner.chunks_total.load(Ordering::Relaxed)
    }

    pub fn get_chunks_cleaned(&self) -> u64 {
        self.inner.chunks_cleaned.load(Ordering::Relaxed)
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Wall-clock stopwatch for a document or a whole batch.
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
