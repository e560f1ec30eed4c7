use std::time::Duration;
use log::debug;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// Periodic tick source backed by a tokio task.
///
/// The callback runs once per period, the first time one full period after
/// spawning. Returning `false` ends the task. Dropping the `Ticker` aborts the
/// task, so no callback runs after its owner is gone.
pub struct Ticker {
    handle: JoinHandle<()>,
    period: Duration,
    origin: Instant,
}

impl Ticker {
    pub fn spawn<F>(period: Duration, on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        Self::resume(period, Duration::ZERO, on_tick)
    }

    /// Like [`Ticker::spawn`], but `carried` of the first period has already
    /// passed, so the first tick comes `period - carried` from now.
    pub fn resume<F>(period: Duration, carried: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let carried = if carried < period { carried } else { Duration::ZERO };
        let now = Instant::now();
        let origin = now.checked_sub(carried).unwrap_or(now);
        let handle = tokio::spawn(async move {
            let mut interval = interval_at(origin + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if !on_tick() {
                    debug!("ticker finished: callback declined further ticks");
                    break;
                }
            }
        });

        Self { handle, period, origin }
    }

    /// How far into the current period the ticker is.
    pub fn progress(&self) -> Duration {
        let period = self.period.as_nanos().max(1);
        let into = Instant::now().saturating_duration_since(self.origin).as_nanos() % period;
        Duration::from_nanos(into as u64)
    }

    pub fn cancel(self) {
        // Drop does the abort.
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
