use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Self-correcting interval schedule.
///
/// Tracks the expected fire time relative to an arbitrary start instant. On
/// each fire the caller reports how much wall time has actually elapsed; the
/// schedule answers with the compensated delay until the next fire and
/// whether the tick drifted by more than one full interval, which means the
/// host could not keep up.
///
/// Pure state machine so the drift arithmetic is testable with synthetic
/// timestamps; [`AdjustingInterval`] drives it against the tokio clock.
#[derive(Debug, Clone, Copy)]
pub struct Schedule {
    interval: Duration,
    expected: Duration,
}

/// Outcome of one fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// The fire arrived more than one interval late.
    pub drifted: bool,
    /// Compensated delay before the next fire; never negative, a late tick
    /// shortens it down to zero.
    pub delay: Duration,
}

impl Schedule {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            // the first fire is due one interval after start
            expected: interval,
        }
    }

    /// Record a fire at `elapsed` since the schedule started.
    pub fn on_fire(&mut self, elapsed: Duration) -> Tick {
        let drift = elapsed.saturating_sub(self.expected);
        let drifted = drift > self.interval;
        self.expected += self.interval;
        Tick {
            drifted,
            delay: self.interval.saturating_sub(drift),
        }
    }
}

/// A repeating timer that compensates for callback and scheduler latency,
/// so N ticks stay anchored to `start + N * interval` instead of drifting
/// by the per-tick overhead.
///
/// `on_error` fires once for every tick that lands more than one interval
/// late. `stop` is idempotent and also runs on drop.
#[derive(Debug)]
pub struct AdjustingInterval {
    handle: Option<JoinHandle<()>>,
}

impl AdjustingInterval {
    pub fn start<F, E>(interval: Duration, mut on_tick: F, mut on_error: E) -> Self
    where
        F: FnMut() + Send + 'static,
        E: FnMut() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let start = Instant::now();
            let mut schedule = Schedule::new(interval);
            let mut deadline = start + interval;
            loop {
                tokio::time::sleep_until(deadline).await;
                let tick = schedule.on_fire(Instant::now() - start);
                if tick.drifted {
                    tracing::warn!(?interval, "tick drifted past a full interval");
                    on_error();
                }
                on_tick();
                deadline = Instant::now() + tick.delay;
            }
        });
        Self {
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for AdjustingInterval {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
