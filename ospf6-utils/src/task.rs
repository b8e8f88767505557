//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{self, AtomicU64};
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

/// Identifier of a timer registered in a [`TimerWheel`].
pub type TimerId = u64;

// Global timer ID allocator.
static TIMER_ID: AtomicU64 = AtomicU64::new(1);

/// Control message sent from a [`TimeoutTask`] handle to the [`TimerWheel`]
/// that owns its deadline.
#[derive(Debug)]
pub enum TimerRequest<M> {
    Start {
        id: TimerId,
        timeout: Duration,
        msg: M,
    },
    Cancel {
        id: TimerId,
    },
}

/// A handle which can be used to manipulate the timeout created by the
/// [`TimeoutTask::new`] function.
///
/// Timers never run on their own. Arming, re-arming and cancelling a timer
/// only posts a [`TimerRequest`] to the event loop, which keeps the deadlines
/// in a [`TimerWheel`] and delivers `msg` back to the protocol instance once
/// the deadline is reached.
///
/// Dropping this handle cancels the timeout.
#[derive(Debug)]
pub struct TimeoutTask<M: Clone> {
    id: TimerId,
    timeout: Duration,
    msg: M,
    control: UnboundedSender<TimerRequest<M>>,
}

/// Ordered set of pending deadlines, driven by an external clock.
///
/// Deadlines that expire at the same instant are delivered in the order in
/// which they were armed.
#[derive(Debug)]
pub struct TimerWheel<M> {
    now: Duration,
    seq: u64,
    queue: BTreeMap<(Duration, u64), (TimerId, M)>,
    deadlines: HashMap<TimerId, (Duration, u64)>,
}

// ===== impl TimeoutTask =====

impl<M> TimeoutTask<M>
where
    M: Clone,
{
    /// Creates a new timeout that delivers `msg` once `timeout` elapses.
    pub fn new(
        timeout: Duration,
        msg: M,
        control: &UnboundedSender<TimerRequest<M>>,
    ) -> TimeoutTask<M> {
        let id = TIMER_ID.fetch_add(1, atomic::Ordering::Relaxed);
        let task = TimeoutTask {
            id,
            timeout,
            msg,
            control: control.clone(),
        };
        task.arm();
        task
    }

    /// Resets the timeout, optionally using a new duration.
    pub fn reset(&mut self, timeout: Option<Duration>) {
        if let Some(timeout) = timeout {
            self.timeout = timeout;
        }
        self.arm();
    }

    /// Returns the duration this timeout was last armed with.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the timer identifier.
    pub fn id(&self) -> TimerId {
        self.id
    }

    fn arm(&self) {
        let _ = self.control.send(TimerRequest::Start {
            id: self.id,
            timeout: self.timeout,
            msg: self.msg.clone(),
        });
    }
}

impl<M> Drop for TimeoutTask<M>
where
    M: Clone,
{
    fn drop(&mut self) {
        let _ = self.control.send(TimerRequest::Cancel { id: self.id });
    }
}

// ===== impl TimerWheel =====

impl<M> TimerWheel<M> {
    pub fn new() -> TimerWheel<M> {
        TimerWheel {
            now: Duration::ZERO,
            seq: 0,
            queue: Default::default(),
            deadlines: Default::default(),
        }
    }

    /// Returns the current clock value.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Moves the clock forward. The clock never goes backwards.
    pub fn advance(&mut self, now: Duration) {
        if now > self.now {
            self.now = now;
        }
    }

    /// Applies a request posted by a [`TimeoutTask`] handle.
    pub fn apply(&mut self, request: TimerRequest<M>) {
        match request {
            TimerRequest::Start { id, timeout, msg } => {
                self.remove(id);
                let key = (self.now + timeout, self.seq);
                self.seq += 1;
                self.queue.insert(key, (id, msg));
                self.deadlines.insert(id, key);
            }
            TimerRequest::Cancel { id } => {
                self.remove(id);
            }
        }
    }

    /// Returns the earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Pops the earliest timer whose deadline is not later than `now`,
    /// moving the clock to that deadline.
    pub fn expire(&mut self, now: Duration) -> Option<M> {
        let key = *self.queue.keys().next()?;
        if key.0 > now {
            return None;
        }
        let (id, msg) = self.queue.remove(&key)?;
        self.deadlines.remove(&id);
        self.advance(key.0);
        Some(msg)
    }

    /// Returns whether the given timer is armed.
    pub fn is_armed(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Returns the remaining time until the given timer expires.
    pub fn remaining(&self, id: TimerId) -> Option<Duration> {
        self.deadlines
            .get(&id)
            .map(|(deadline, _)| deadline.saturating_sub(self.now))
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn remove(&mut self, id: TimerId) {
        if let Some(key) = self.deadlines.remove(&id) {
            self.queue.remove(&key);
        }
    }
}

impl<M> Default for TimerWheel<M> {
    fn default() -> TimerWheel<M> {
        TimerWheel::new()
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    fn drain(
        wheel: &mut TimerWheel<u32>,
        rx: &mut mpsc::UnboundedReceiver<TimerRequest<u32>>,
    ) {
        while let Ok(request) = rx.try_recv() {
            wheel.apply(request);
        }
    }

    #[test]
    fn test_timeout_expire_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut wheel = TimerWheel::new();

        let _t1 = TimeoutTask::new(Duration::from_secs(5), 1, &tx);
        let _t2 = TimeoutTask::new(Duration::from_secs(2), 2, &tx);
        let _t3 = TimeoutTask::new(Duration::from_secs(2), 3, &tx);
        drain(&mut wheel, &mut rx);

        assert_eq!(wheel.next_deadline(), Some(Duration::from_secs(2)));
        assert_eq!(wheel.expire(Duration::from_secs(1)), None);
        assert_eq!(wheel.expire(Duration::from_secs(10)), Some(2));
        assert_eq!(wheel.expire(Duration::from_secs(10)), Some(3));
        assert_eq!(wheel.expire(Duration::from_secs(10)), Some(1));
        assert_eq!(wheel.now(), Duration::from_secs(5));
        assert!(wheel.is_empty());
    }

    #[test]
    fn test_timeout_reset_and_drop() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut wheel = TimerWheel::new();

        let mut t1 = TimeoutTask::new(Duration::from_secs(5), 1, &tx);
        let t2 = TimeoutTask::new(Duration::from_secs(3), 2, &tx);
        drain(&mut wheel, &mut rx);
        assert_eq!(wheel.len(), 2);

        t1.reset(Some(Duration::from_secs(1)));
        drop(t2);
        drain(&mut wheel, &mut rx);
        assert_eq!(wheel.len(), 1);
        assert!(wheel.is_armed(t1.id()));
        assert_eq!(wheel.remaining(t1.id()), Some(Duration::from_secs(1)));
        assert_eq!(wheel.expire(Duration::from_secs(1)), Some(1));
    }
}
