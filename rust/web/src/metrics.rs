use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Lock-free counters for the casino server.
///
/// Cheap to clone; every clone shares the same counters.
#[derive(Debug, Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    total_response_time_ms: AtomicU64,
    active_sessions: AtomicU64,
    total_events_broadcast: AtomicU64,
    total_rounds_settled: AtomicU64,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                total_requests: AtomicU64::new(0),
                successful_requests: AtomicU64::new(0),
                failed_requests: AtomicU64::new(0),
                total_response_time_ms: AtomicU64::new(0),
                active_sessions: AtomicU64::new(0),
                total_events_broadcast: AtomicU64::new(0),
                total_rounds_settled: AtomicU64::new(0),
            }),
        }
    }

    pub fn record_request_success(&self, duration_ms: u64) {
        self.inner.total_requests.fetch_add(1, Ordering::Relaxed);
        self.inner
            .successful_requests
            .fetch_add(1, Ordering::Relaxed);
        self.inner
            .total_response_time_ms
            .fetch_add(duration_ms, Ordering::Relaxed);

        tracing::trace!(duration_ms = duration_ms, "recorded successful request");
    }

    pub fn record_request_failure(&self, duration_ms: u64) {
        self.inner.total_requests.fetch_add(1, Ordering::Relaxed);
        self.inner.failed_requests.fetch_add(1, Ordering::Relaxed);
        self.inner
            .total_response_time_ms
            .fetch_add(duration_ms, Ordering::Relaxed);

        tracing::trace!(duration_ms = duration_ms, "recorded failed request");
    }

    pub fn increment_active_sessions(&self) {
        let count = self.inner.active_sessions.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!(active_sessions = count, "session count increased");
    }

    /// Saturates at zero; a drop below would mean a bookkeeping bug
    /// somewhere, so it is logged instead of wrapping.
    pub fn decrement_active_sessions(&self) {
        let mut current = self.inner.active_sessions.load(Ordering::Relaxed);
        loop {
            if current == 0 {
                tracing::warn!("attempted to decrement active_sessions below zero");
                return;
            }

            match self.inner.active_sessions.compare_exchange(
                current,
                current - 1,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    tracing::debug!(active_sessions = current - 1, "session count decreased");
                    return;
                }
                Err(actual) => current = actual,
            }
        }
    }

    pub fn record_event_broadcast(&self) {
        self.inner
            .total_events_broadcast
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_round_settled(&self) {
        self.inner
            .total_rounds_settled
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.inner.total_requests.load(Ordering::Relaxed),
            successful_requests: self.inner.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.inner.failed_requests.load(Ordering::Relaxed),
            total_response_time_ms: self.inner.total_response_time_ms.load(Ordering::Relaxed),
            active_sessions: self.inner.active_sessions.load(Ordering::Relaxed),
            total_events_broadcast: self.inner.total_events_broadcast.load(Ordering::Relaxed),
            total_rounds_settled: self.inner.total_rounds_settled.load(Ordering::Relaxed),
        }
    }

    pub fn log_metrics(&self) {
        let snapshot = self.snapshot();
        tracing::info!(
            total_requests = snapshot.total_requests,
            successful_requests = snapshot.successful_requests,
            failed_requests = snapshot.failed_requests,
            avg_response_time_ms = snapshot.average_response_time_ms(),
            active_sessions = snapshot.active_sessions,
            total_events_broadcast = snapshot.total_events_broadcast,
            total_rounds_settled = snapshot.total_rounds_settled,
            "server metrics"
        );
    }
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub successful_requests: u64,
    pub failed_requests: u64,
    pub total_response_time_ms: u64,
    pub active_sessions: u64,
    pub total_events_broadcast: u64,
    pub total_rounds_settled: u64,
}

impl MetricsSnapshot {
    pub fn average_response_time_ms(&self) -> u64 {
        if self.total_requests > 0 {
            self.total_response_time_ms / self.total_requests
        } else {
            0
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_requests > 0 {
            (self.successful_requests as f64) / (self.total_requests as f64)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let snapshot = MetricsCollector::new().snapshot();

        assert_eq!(snapshot.total_requests, 0);
        assert_eq!(snapshot.successful_requests, 0);
        assert_eq!(snapshot.failed_requests, 0);
        assert_eq!(snapshot.active_sessions, 0);
        assert_eq!(snapshot.total_events_broadcast, 0);
        assert_eq!(snapshot.total_rounds_settled, 0);
    }

    #[test]
    fn requests_split_by_outcome() {
        let metrics = MetricsCollector::new();
        metrics.record_request_success(100);
        metrics.record_request_failure(50);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 2);
        assert_eq!(snapshot.successful_requests, 1);
        assert_eq!(snapshot.failed_requests, 1);
        assert_eq!(snapshot.total_response_time_ms, 150);
    }

    #[test]
    fn session_count_never_goes_below_zero() {
        let metrics = MetricsCollector::new();

        metrics.increment_active_sessions();
        metrics.increment_active_sessions();
        metrics.decrement_active_sessions();
        assert_eq!(metrics.snapshot().active_sessions, 1);

        metrics.decrement_active_sessions();
        metrics.decrement_active_sessions();
        assert_eq!(metrics.snapshot().active_sessions, 0);
    }

    #[test]
    fn broadcasts_and_rounds_accumulate() {
        let metrics = MetricsCollector::new();

        metrics.record_event_broadcast();
        metrics.record_event_broadcast();
        metrics.record_round_settled();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_events_broadcast, 2);
        assert_eq!(snapshot.total_rounds_settled, 1);
    }

    #[test]
    fn average_response_time_is_per_request() {
        let metrics = MetricsCollector::new();

        metrics.record_request_success(100);
        metrics.record_request_success(200);
        metrics.record_request_success(300);

        assert_eq!(metrics.snapshot().average_response_time_ms(), 200);
    }

    #[test]
    fn success_rate_counts_failures() {
        let metrics = MetricsCollector::new();

        metrics.record_request_success(100);
        metrics.record_request_success(100);
        metrics.record_request_failure(100);

        assert!((metrics.snapshot().success_rate() - 0.666).abs() < 0.01);
    }

    #[test]
    fn clones_share_the_same_counters() {
        let metrics = MetricsCollector::new();
        let clone = metrics.clone();

        clone.record_request_success(5);
        metrics.record_request_success(5);

        assert_eq!(metrics.snapshot().total_requests, 2);
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        use std::sync::Arc;
        use std::thread;

        let metrics = Arc::new(MetricsCollector::new());
        let mut handles = vec![];

        for _ in 0..10 {
            let m = Arc::clone(&metrics);
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    m.record_request_success(1);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 1000);
        assert_eq!(snapshot.successful_requests, 1000);
    }
}
