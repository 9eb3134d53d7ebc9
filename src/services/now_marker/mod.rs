//! Live current-time marker for the time grid.
//!
//! A [`NowMarker`] belongs to one mounted grid. It computes the offset
//! immediately, refreshes it once a minute on the tokio runtime and stops
//! its task when dropped.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::services::layout::now_offset;

pub const NOW_MARKER_PERIOD: StdDuration = StdDuration::from_secs(60);

/// Wall-clock source, swapped out in tests.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

pub struct NowMarker {
    offset: Arc<AtomicU32>,
    task: JoinHandle<()>,
}

impl NowMarker {
    /// Start a marker refreshing every minute. `on_tick` runs after each
    /// refresh (the grid uses it to request a repaint).
    pub fn start<F>(
        handle: &Handle,
        clock: Arc<dyn Clock>,
        tz: Tz,
        hour_height: f32,
        on_tick: F,
    ) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::start_with_period(handle, clock, tz, hour_height, NOW_MARKER_PERIOD, on_tick)
    }

    pub fn start_with_period<F>(
        handle: &Handle,
        clock: Arc<dyn Clock>,
        tz: Tz,
        hour_height: f32,
        period: StdDuration,
        on_tick: F,
    ) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        let initial = now_offset(clock.now(), &tz, hour_height);
        let offset = Arc::new(AtomicU32::new(initial.to_bits()));
        let shared = Arc::clone(&offset);

        let task = handle.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                let value = now_offset(clock.now(), &tz, hour_height);
                shared.store(value.to_bits(), Ordering::Relaxed);
                on_tick();
            }
        });

        log::debug!("Now marker started at offset {:.1}px", initial);
        Self { offset, task }
    }

    /// Latest offset in pixels from the top of the day column.
    pub fn offset(&self) -> f32 {
        f32::from_bits(self.offset.load(Ordering::Relaxed))
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for NowMarker {
    fn drop(&mut self) {
        self.task.abort();
        log::debug!("Now marker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use std::sync::atomic::{AtomicI64, AtomicUsize};

    fn nine_am() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
    }

    /// Advances one minute every time it is read.
    struct SteppingClock {
        minutes: AtomicI64,
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let step = self.minutes.fetch_add(1, Ordering::SeqCst);
            nine_am() + Duration::minutes(step)
        }
    }

    #[tokio::test]
    async fn test_offset_available_immediately() {
        let mut clock = MockClock::new();
        clock.expect_now().times(1).return_const(nine_am());

        let marker = NowMarker::start(&Handle::current(), Arc::new(clock), Tz::UTC, 60.0, || {});
        assert_eq!(marker.offset(), 540.0);
        assert!(marker.is_running());
    }

    #[tokio::test]
    async fn test_offset_refreshes_on_each_tick() {
        let clock = Arc::new(SteppingClock { minutes: AtomicI64::new(0) });
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        let marker = NowMarker::start_with_period(
            &Handle::current(),
            clock,
            Tz::UTC,
            60.0,
            StdDuration::from_millis(10),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );

        tokio::time::sleep(StdDuration::from_millis(80)).await;

        let observed = ticks.load(Ordering::SeqCst);
        assert!(observed >= 1);
        // One clock read for the initial value, one per tick
        assert_eq!(marker.offset(), 540.0 + observed as f32);
    }

    #[tokio::test]
    async fn test_drop_stops_the_timer() {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);

        let marker = NowMarker::start_with_period(
            &Handle::current(),
            Arc::new(SystemClock),
            Tz::UTC,
            60.0,
            StdDuration::from_millis(5),
            move || {
                counter.fetch_add(1, Ordering::SeqCst);
            },
        );
        tokio::time::sleep(StdDuration::from_millis(30)).await;
        drop(marker);

        let after_drop = ticks.load(Ordering::SeqCst);
        tokio::time::sleep(StdDuration::from_millis(50)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), after_drop);
    }
}
