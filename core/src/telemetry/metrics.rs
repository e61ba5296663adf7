use std::sync::Mutex;

/// Point-in-time view of the pipeline counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub pairs_aligned: usize,
    pub candidates_detected: usize,
    pub records_formatted: usize,
    pub item_failures: usize,
}

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_pair_aligned(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.pairs_aligned += 1;
        }
    }

    pub fn record_candidates(&self, count: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.candidates_detected += count;
        }
    }

    pub fn record_record_formatted(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.records_formatted += 1;
        }
    }

    pub fn record_item_failure(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.item_failures += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner
            .lock()
            .map(|metrics| *metrics)
            .unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
