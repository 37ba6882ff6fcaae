//! Clock and tick scheduling primitives the countdown depends on

use std::{
    fmt::Debug,
    sync::atomic::{AtomicU64, Ordering},
};

use tokio::time::Instant;

/// Monotonic timestamp in milliseconds
pub type Millis = u64;

/// Source of monotonic time
pub trait Clock: Send + Sync + Debug {
    fn now_ms(&self) -> Millis;
}

/// Milliseconds since the clock was created, backed by tokio's `Instant`
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

/// Hand-driven clock
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    pub fn at(now: Millis) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    pub fn set(&self, now: Millis) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, delta: Millis) {
        self.now.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.load(Ordering::SeqCst)
    }
}

/// Identifies one scheduled tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickHandle(u64);

/// Book-keeping for the single in-flight tick
///
/// At most one handle is pending. A cancelled handle can never be taken
/// again, so a callback that was already queued finds nothing to run.
#[derive(Debug, Default)]
pub struct TickScheduler {
    issued: u64,
    pending: Option<TickHandle>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a tick, replacing any pending one
    pub fn schedule(&mut self) -> TickHandle {
        self.issued += 1;
        let handle = TickHandle(self.issued);
        self.pending = Some(handle);
        handle
    }

    pub fn cancel(&mut self) -> Option<TickHandle> {
        self.pending.take()
    }

    /// Claim the pending tick for execution
    pub fn take_pending(&mut self) -> Option<TickHandle> {
        self.pending.take()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
