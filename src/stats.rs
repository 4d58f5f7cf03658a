use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub calls: u64,
    pub failures: u64,
    pub failure_rate: f64,
    pub calls_per_minute: f64,
    pub period_ms: u64,
    pub emitted_at: String,
}

#[derive(Debug)]
pub struct CallStats {
    interval: Duration,
    calls: AtomicU64,
    failures: AtomicU64,
    period_start: Mutex<Instant>,
}

impl CallStats {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            calls: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            period_start: Mutex::new(Instant::now()),
        }
    }

    pub fn record(&self, failed: bool) -> Option<StatsReport> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.failures.fetch_add(1, Ordering::Relaxed);
        }
        self.report_if_due(Instant::now())
    }

    pub fn snapshot(&self) -> (u64, u64) {
        (
            self.calls.load(Ordering::Relaxed),
            self.failures.load(Ordering::Relaxed),
        )
    }

    fn report_if_due(&self, now: Instant) -> Option<StatsReport> {
        let mut start = self.period_start.try_lock().ok()?;
        let period = now.saturating_duration_since(*start);
        if period < self.interval {
            return None;
        }
        *start = now;
        let calls = self.calls.swap(0, Ordering::Relaxed);
        let failures = self.failures.swap(0, Ordering::Relaxed);
        drop(start);

        let report = build_report(calls, failures, period);
        info!(
            calls = report.calls,
            failures = report.failures,
            failure_rate = report.failure_rate,
            calls_per_minute = report.calls_per_minute,
            period_s = period.as_secs(),
            "ontology service call statistics"
        );
        Some(report)
    }
}

fn build_report(calls: u64, failures: u64, period: Duration) -> StatsReport {
    let failure_rate = if calls == 0 {
        0.0
    } else {
        failures as f64 / calls as f64
    };
    let minutes = period.as_secs_f64() / 60.0;
    let calls_per_minute = if minutes > 0.0 {
        calls as f64 / minutes
    } else {
        0.0
    };
    StatsReport {
        calls,
        failures,
        failure_rate,
        calls_per_minute,
        period_ms: period.as_millis() as u64,
        emitted_at: chrono::Utc::now().to_rfc3339(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_report_before_interval() {
        let stats = CallStats::new(Duration::from_secs(300));
        assert!(stats.record(false).is_none());
        assert!(stats.record(true).is_none());
        assert_eq!(stats.snapshot(), (2, 1));
    }

    #[test]
    fn report_resets_counters() {
        let stats = CallStats::new(Duration::from_secs(300));
        stats.record(false);
        stats.record(true);
        stats.record(false);
        stats.record(true);

        let later = Instant::now() + Duration::from_secs(301);
        let report = stats.report_if_due(later).unwrap();
        assert_eq!(report.calls, 4);
        assert_eq!(report.failures, 2);
        assert!((report.failure_rate - 0.5).abs() < 1e-9);
        assert_eq!(stats.snapshot(), (0, 0));
    }

    #[test]
    fn zero_interval_reports_every_call() {
        let stats = CallStats::new(Duration::ZERO);
        let report = stats.record(true).unwrap();
        assert_eq!(report.calls, 1);
        assert_eq!(report.failures, 1);
    }

    #[test]
    fn contended_report_is_skipped() {
        let stats = CallStats::new(Duration::ZERO);
        let _held = stats.period_start.lock().unwrap();
        assert!(stats.report_if_due(Instant::now()).is_none());
    }
}
