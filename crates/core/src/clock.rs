// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Logical clock for action ordering.
//!
//! A [`Stamp`] pairs wall clock time with a logical counter so that stamps
//! handed out by one [`ActionClock`] strictly increase, even when the wall
//! clock stalls or jumps backwards.
//!
//! Format: `{wall_ms}-{counter}`
//!
//! Ordering rules:
//! 1. Higher wall_ms wins
//! 2. If wall_ms equal, higher counter wins

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Error, Result};

/// A logical creation stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stamp {
    /// Wall clock time in milliseconds since Unix epoch.
    pub wall_ms: u64,
    /// Logical counter for stamps issued at the same wall time.
    pub counter: u32,
}

impl Stamp {
    pub fn new(wall_ms: u64, counter: u32) -> Self {
        Stamp { wall_ms, counter }
    }

    /// The earliest possible stamp.
    pub fn min() -> Self {
        Stamp { wall_ms: 0, counter: 0 }
    }

    /// Fixed-width rendering whose lexical order matches logical order.
    ///
    /// Used as the stored `created_at` so SQLite can sort on it as text.
    pub fn sort_key(&self) -> String {
        format!("{:020}-{:010}", self.wall_ms, self.counter)
    }

    fn successor(&self) -> Stamp {
        match self.counter.checked_add(1) {
            Some(counter) => Stamp::new(self.wall_ms, counter),
            None => Stamp::new(self.wall_ms.saturating_add(1), 0),
        }
    }
}

impl Ord for Stamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.wall_ms.cmp(&other.wall_ms).then_with(|| self.counter.cmp(&other.counter))
    }
}

impl PartialOrd for Stamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.wall_ms, self.counter)
    }
}

impl FromStr for Stamp {
    type Err = Error;

    /// Accepts both the display form and the zero-padded sort key.
    fn from_str(s: &str) -> Result<Self> {
        let (wall, counter) = s.split_once('-').ok_or_else(|| {
            Error::InvalidStamp(format!("expected format 'wall_ms-counter', got '{s}'"))
        })?;

        let wall_ms = wall
            .parse::<u64>()
            .map_err(|_| Error::InvalidStamp(format!("invalid wall_ms '{wall}' in '{s}'")))?;
        let counter = counter
            .parse::<u32>()
            .map_err(|_| Error::InvalidStamp(format!("invalid counter '{counter}' in '{s}'")))?;

        Ok(Stamp::new(wall_ms, counter))
    }
}

/// Trait for getting the current wall clock time.
///
/// This allows injecting a controllable clock for testing.
pub trait ClockSource: Send + Sync {
    /// Returns the current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;
}

/// System clock implementation using `std::time::SystemTime`.
#[derive(Debug, Default)]
pub struct SystemClock;

impl ClockSource for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
    }
}

impl<C: ClockSource + ?Sized> ClockSource for Arc<C> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    time_ms: AtomicU64,
}

impl ManualClock {
    pub fn new(initial_ms: u64) -> Self {
        ManualClock { time_ms: AtomicU64::new(initial_ms) }
    }

    pub fn set(&self, ms: u64) {
        self.time_ms.store(ms, AtomicOrdering::SeqCst);
    }

    pub fn advance(&self, ms: u64) {
        self.time_ms.fetch_add(ms, AtomicOrdering::SeqCst);
    }
}

impl ClockSource for ManualClock {
    fn now_ms(&self) -> u64 {
        self.time_ms.load(AtomicOrdering::SeqCst)
    }
}

/// Hands out strictly increasing [`Stamp`]s.
///
/// Thread-safe. When the wall clock has not advanced past the last stamp,
/// the logical counter is bumped instead.
pub struct ActionClock<C: ClockSource = SystemClock> {
    clock: C,
    last: Mutex<Stamp>,
}

impl ActionClock<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for ActionClock<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ClockSource> ActionClock<C> {
    /// Creates a clock backed by a custom clock source.
    pub fn with_clock(clock: C) -> Self {
        ActionClock { clock, last: Mutex::new(Stamp::min()) }
    }

    /// Generates the next stamp.
    pub fn now(&self) -> Stamp {
        let physical = self.clock.now_ms();
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());

        *last = if physical > last.wall_ms {
            Stamp::new(physical, 0)
        } else {
            // Wall clock stalled or went backwards
            last.successor()
        };
        *last
    }

    /// Raises the clock's floor so later stamps sort after `seen`.
    ///
    /// Called with the newest persisted stamp when a store is reopened.
    pub fn observe(&self, seen: Stamp) {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        if seen > *last {
            *last = seen;
        }
    }

    /// The most recently issued or observed stamp.
    pub fn last(&self) -> Stamp {
        *self.last.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
