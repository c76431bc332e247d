// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock abstraction for stamping locally authored messages.

use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Source of wall-clock time, injectable for tests.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}

/// System clock implementation using [`Utc::now`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        ManualClock {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += by;
        }
    }

    /// Jumps the clock to `to`.
    pub fn set(&self, to: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = to;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
            .lock()
            .map(|now| *now)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}

/// Issues strictly increasing timestamps from an underlying clock.
///
/// Two messages sent within the clock's resolution still sort in the order
/// they were created.
pub struct MonotonicStamper<C: Clock> {
    clock: C,
    last: Option<DateTime<Utc>>,
}

impl<C: Clock> MonotonicStamper<C> {
    pub fn new(clock: C) -> Self {
        MonotonicStamper { clock, last: None }
    }

    /// Returns a timestamp greater than every one previously returned.
    pub fn stamp(&mut self) -> DateTime<Utc> {
        let now = self.clock.now();
        let next = match self.last {
            Some(last) if now <= last => last + Duration::nanoseconds(1),
            _ => now,
        };
        self.last = Some(next);
        next
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
