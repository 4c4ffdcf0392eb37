use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Clock used by the tick loop.
pub trait Timer: Clone + Send + Sync + 'static {
    type Timestamp: Copy + Clone + Send + Sync;
    fn now(&self) -> Self::Timestamp;
    fn elapsed(&self, ts: Self::Timestamp) -> Duration;
    fn sleep(&self, d: Duration) -> impl Future<Output = ()> + Send;
}

/// `tokio::time` backed timer. Honors paused time in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    type Timestamp = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, ts: Instant) -> Duration {
        Instant::now().saturating_duration_since(ts)
    }

    fn sleep(&self, d: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(d)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SleepOutcome {
    Elapsed,
    Cancelled,
}

/// Sleeps for `d` unless `cancel` fires first.
pub async fn cancellable_sleep<T: Timer>(
    timer: &T,
    d: Duration,
    cancel: &CancellationToken,
) -> SleepOutcome {
    if cancel.is_cancelled() {
        return SleepOutcome::Cancelled;
    }
    tokio::select! {
        _ = cancel.cancelled() => SleepOutcome::Cancelled,
        _ = timer.sleep(d) => SleepOutcome::Elapsed,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickStatsSummary {
    pub samples: usize,
    pub average_interval_ns: f64,
    pub jitter_ns: f64,
    pub min_interval_ns: f64,
    pub max_interval_ns: f64,
    /// Mean observed interval minus the target interval.
    pub drift_ns: f64,
}

/// Observed spacing between ticks, kept in a bounded window.
#[derive(Debug, Clone)]
pub struct TickStats {
    pub target: Duration,
    pub intervals: Vec<Duration>,
    pub max_samples: usize,
}

impl TickStats {
    pub fn new(target: Duration) -> Self {
        Self::with_capacity(target, 1000)
    }

    pub fn with_capacity(target: Duration, max_samples: usize) -> Self {
        Self {
            target,
            intervals: Vec::with_capacity(max_samples.min(1000)),
            max_samples: max_samples.max(1),
        }
    }

    pub fn record(&mut self, d: Duration) {
        if self.intervals.len() >= self.max_samples {
            self.intervals.remove(0);
        }
        self.intervals.push(d);
    }

    pub fn summary(&self) -> TickStatsSummary {
        let times: Vec<f64> = self
            .intervals
            .iter()
            .map(|d| d.as_nanos() as f64)
            .collect();
        if times.is_empty() {
            return TickStatsSummary {
                samples: 0,
                average_interval_ns: 0.0,
                jitter_ns: 0.0,
                min_interval_ns: 0.0,
                max_interval_ns: 0.0,
                drift_ns: 0.0,
            };
        }
        let sum: f64 = times.iter().sum();
        let avg = sum / times.len() as f64;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / times.len() as f64;
        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        TickStatsSummary {
            samples: times.len(),
            average_interval_ns: avg,
            jitter_ns: var.sqrt(),
            min_interval_ns: min,
            max_interval_ns: max,
            drift_ns: avg - self.target.as_nanos() as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn sleep_elapses_without_cancel() {
        let cancel = CancellationToken::new();
        let timer = TokioTimer;
        let start = timer.now();
        let outcome = cancellable_sleep(&timer, Duration::from_millis(250), &cancel).await;
        assert_eq!(outcome, SleepOutcome::Elapsed);
        assert!(timer.elapsed(start) >= Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_interrupts_sleep() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            trigger.cancel();
        });
        let timer = TokioTimer;
        let start = timer.now();
        let outcome = cancellable_sleep(&timer, Duration::from_secs(60), &cancel).await;
        assert_eq!(outcome, SleepOutcome::Cancelled);
        assert!(timer.elapsed(start) < Duration::from_secs(60));
    }

    #[tokio::test]
    async fn already_cancelled_returns_immediately() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = cancellable_sleep(&TokioTimer, Duration::from_secs(60), &cancel).await;
        assert_eq!(outcome, SleepOutcome::Cancelled);
    }

    #[test]
    fn empty_stats_are_zero() {
        let stats = TickStats::new(Duration::from_millis(100));
        assert_eq!(stats.summary().samples, 0);
        assert_eq!(stats.summary().jitter_ns, 0.0);
    }

    #[test]
    fn stats_report_drift_and_jitter() {
        let mut stats = TickStats::new(Duration::from_millis(100));
        stats.record(Duration::from_millis(100));
        stats.record(Duration::from_millis(104));
        let summary = stats.summary();
        assert_eq!(summary.samples, 2);
        assert_eq!(summary.average_interval_ns, 102_000_000.0);
        assert_eq!(summary.drift_ns, 2_000_000.0);
        assert_eq!(summary.jitter_ns, 2_000_000.0);
        assert_eq!(summary.min_interval_ns, 100_000_000.0);
        assert_eq!(summary.max_interval_ns, 104_000_000.0);
    }

    #[test]
    fn window_drops_oldest() {
        let mut stats = TickStats::with_capacity(Duration::from_millis(10), 2);
        stats.record(Duration::from_millis(1));
        stats.record(Duration::from_millis(2));
        stats.record(Duration::from_millis(3));
        assert_eq!(
            stats.intervals,
            vec![Duration::from_millis(2), Duration::from_millis(3)]
        );
    }
}
