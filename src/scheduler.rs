use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info};

use crate::error::{AppError, Result};

pub type TickFn = Arc<dyn Fn() + Send + Sync>;

/// Repeating refresh timer with exactly one live timer task.
///
/// Changing the period aborts the pending timer and arms a new one whose
/// first tick lands one full new period after the change. Work started by
/// earlier ticks is not cancelled.
pub struct RefreshScheduler {
    on_tick: TickFn,
    interval_ms: AtomicU64,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl RefreshScheduler {
    pub fn new(interval_ms: u64, on_tick: TickFn) -> Result<Arc<Self>> {
        if interval_ms == 0 {
            return Err(AppError::InvalidInterval(interval_ms));
        }
        Ok(Arc::new(Self {
            on_tick,
            interval_ms: AtomicU64::new(interval_ms),
            timer: Mutex::new(None),
        }))
    }

    /// Fire one tick immediately, then tick every period.
    pub fn start(&self) {
        (self.on_tick)();
        self.arm(self.interval_ms());
    }

    /// Replace the running timer with one at `new_ms`. Returns the old period.
    pub fn set_interval(&self, new_ms: u64) -> Result<u64> {
        if new_ms == 0 {
            return Err(AppError::InvalidInterval(new_ms));
        }
        let old_ms = self.interval_ms.swap(new_ms, Ordering::SeqCst);
        self.arm(new_ms);
        info!(old_ms, new_ms, "Refresh interval changed");
        Ok(old_ms)
    }

    pub fn cancel(&self) {
        if let Some(handle) = self.lock_timer().take() {
            handle.abort();
            debug!("Refresh timer cancelled");
        }
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.lock_timer().as_ref().is_some_and(|h| !h.is_finished())
    }

    fn arm(&self, period_ms: u64) {
        let period = Duration::from_millis(period_ms);
        let on_tick = Arc::clone(&self.on_tick);

        let mut timer = self.lock_timer();
        if let Some(previous) = timer.take() {
            previous.abort();
        }
        *timer = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                on_tick();
            }
        }));
    }

    fn lock_timer(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.timer.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::sleep;

    fn counting_scheduler(interval_ms: u64) -> (Arc<RefreshScheduler>, Arc<AtomicUsize>) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let scheduler = RefreshScheduler::new(
            interval_ms,
            Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();
        (scheduler, ticks)
    }

    fn count(ticks: &AtomicUsize) -> usize {
        ticks.load(Ordering::SeqCst)
    }

    #[tokio::test(start_paused = true)]
    async fn start_ticks_immediately_then_periodically() {
        let (scheduler, ticks) = counting_scheduler(30_000);
        scheduler.start();
        assert_eq!(count(&ticks), 1);

        sleep(Duration::from_millis(29_500)).await;
        assert_eq!(count(&ticks), 1);

        sleep(Duration::from_millis(1_000)).await;
        assert_eq!(count(&ticks), 2);

        sleep(Duration::from_millis(30_000)).await;
        assert_eq!(count(&ticks), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_change_cancels_old_timer() {
        let (scheduler, ticks) = counting_scheduler(30_000);
        scheduler.start();

        sleep(Duration::from_millis(12_000)).await;
        assert_eq!(scheduler.set_interval(5_000).unwrap(), 30_000);
        assert_eq!(scheduler.interval_ms(), 5_000);

        // No carry-over: first new tick is 5s after the change (t=17s).
        sleep(Duration::from_millis(4_500)).await;
        assert_eq!(count(&ticks), 1);
        sleep(Duration::from_millis(1_000)).await;
        assert_eq!(count(&ticks), 2);

        // t=30.5s: new ticks at 22s and 27s only; the old 30s boundary is gone.
        sleep(Duration::from_millis(13_000)).await;
        assert_eq!(count(&ticks), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_rejected_and_timer_kept() {
        let (scheduler, ticks) = counting_scheduler(1_000);
        scheduler.start();

        assert!(matches!(scheduler.set_interval(0), Err(AppError::InvalidInterval(0))));
        assert_eq!(scheduler.interval_ms(), 1_000);

        sleep(Duration::from_millis(1_500)).await;
        assert_eq!(count(&ticks), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_ticking() {
        let (scheduler, ticks) = counting_scheduler(1_000);
        scheduler.start();
        assert!(scheduler.is_running());

        scheduler.cancel();
        assert!(!scheduler.is_running());

        sleep(Duration::from_millis(5_500)).await;
        assert_eq!(count(&ticks), 1);
    }

    #[test]
    fn zero_initial_interval_is_rejected() {
        assert!(RefreshScheduler::new(0, Arc::new(|| {})).is_err());
    }
}
