//! Clocks and cancellable deferred tasks.
//!
//! Time is measured as a [`Duration`] since the clock's origin. A
//! [`TimerQueue`] never fires anything by itself: the owner asks it for the
//! timers that are due at a given instant, which keeps expiry deterministic
//! under a [`ManualClock`].

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A monotonic time source.
pub trait Clock {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// Wall-clock time, via the tokio clock so paused test runtimes apply.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: tokio::time::Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: tokio::time::Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Virtual time that only moves when told to.
///
/// Clones share the same time, so a test can keep one handle while the cart
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward.
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.nanos
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                Some(n.saturating_add(by))
            })
            .ok();
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// Identifies one scheduled timer. Handles are never reused within a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Pending timers carrying a payload of type `K`, ordered by deadline.
#[derive(Debug)]
pub struct TimerQueue<K> {
    next_handle: u64,
    by_deadline: BTreeMap<(Duration, TimerHandle), K>,
    deadlines: HashMap<TimerHandle, Duration>,
}

impl<K> TimerQueue<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_handle: 0,
            by_deadline: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Schedule `payload` to become due at `deadline`.
    pub fn schedule(&mut self, deadline: Duration, payload: K) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.by_deadline.insert((deadline, handle), payload);
        self.deadlines.insert(handle, deadline);
        handle
    }

    /// Cancel a timer. Returns its payload if it had not fired yet.
    pub fn cancel(&mut self, handle: TimerHandle) -> Option<K> {
        let deadline = self.deadlines.remove(&handle)?;
        self.by_deadline.remove(&(deadline, handle))
    }

    /// Remove and return every timer due at or before `now`, earliest first.
    /// Timers with equal deadlines come out in scheduling order.
    pub fn drain_due(&mut self, now: Duration) -> Vec<(TimerHandle, K)> {
        let mut due = Vec::new();
        while let Some(entry) = self.by_deadline.first_entry() {
            if entry.key().0 > now {
                break;
            }
            let ((_, handle), payload) = entry.remove_entry();
            self.deadlines.remove(&handle);
            due.push((handle, payload));
        }
        due
    }

    /// Deadline of the earliest outstanding timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.by_deadline.keys().next().map(|(deadline, _)| *deadline)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}
