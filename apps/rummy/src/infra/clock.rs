//! Clock collaborator. Timestamps order display only and never decide legality.

use std::sync::atomic::{AtomicI64, Ordering};

use time::OffsetDateTime;

pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch; strictly increasing per clock.
    fn now_millis(&self) -> i64;
}

/// Wall clock, nudged forward when two reads land in the same millisecond.
#[derive(Debug, Default)]
pub struct SystemClock {
    last: AtomicI64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        let wall = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(wall.max(last + 1))
            })
            .unwrap_or(wall);
        wall.max(prev + 1)
    }
}

/// Deterministic clock for tests and the simulator: each read advances by `step`.
#[derive(Debug)]
pub struct ManualClock {
    next: AtomicI64,
    step: i64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self::with_step(start, 1)
    }

    pub fn with_step(start: i64, step: i64) -> Self {
        Self {
            next: AtomicI64::new(start),
            step: step.max(1),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.next.fetch_add(millis.max(0), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.next.fetch_add(self.step, Ordering::SeqCst)
    }
}
