// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use std::thread;
use yare::parameterized;

#[test]
fn stamp_ordering() {
    assert!(Stamp::new(200, 0) > Stamp::new(100, 9));
    assert!(Stamp::new(100, 2) > Stamp::new(100, 1));
    assert_eq!(Stamp::new(100, 1), Stamp::new(100, 1));
}

#[parameterized(
    display = { "1700000000000-3" },
    padded = { "00000001700000000000-0000000003" },
)]
fn stamp_parses(input: &str) {
    let stamp: Stamp = input.parse().unwrap();
    assert_eq!(stamp, Stamp::new(1_700_000_000_000, 3));
}

#[parameterized(
    empty = { "" },
    no_separator = { "12345" },
    bad_wall = { "abc-1" },
    bad_counter = { "1-xyz" },
    negative = { "-1-1" },
)]
fn stamp_rejects(input: &str) {
    assert!(matches!(input.parse::<Stamp>(), Err(Error::InvalidStamp(_))));
}

#[test]
fn sort_key_preserves_order_lexically() {
    let stamps = [
        Stamp::new(9, 0),
        Stamp::new(10, 0),
        Stamp::new(10, 11),
        Stamp::new(10, 2),
        Stamp::new(1_700_000_000_000, 0),
    ];
    let mut by_key: Vec<Stamp> = stamps.to_vec();
    by_key.sort_by_key(|s| s.sort_key());
    let mut by_ord: Vec<Stamp> = stamps.to_vec();
    by_ord.sort();
    assert_eq!(by_key, by_ord);
}

#[test]
fn clock_advances_with_wall_time() {
    let source = Arc::new(ManualClock::new(1000));
    let clock = ActionClock::with_clock(Arc::clone(&source));

    assert_eq!(clock.now(), Stamp::new(1000, 0));
    source.advance(5);
    assert_eq!(clock.now(), Stamp::new(1005, 0));
}

#[test]
fn clock_bumps_counter_when_wall_time_stalls() {
    let clock = ActionClock::with_clock(ManualClock::new(1000));

    let a = clock.now();
    let b = clock.now();
    let c = clock.now();
    assert_eq!(a, Stamp::new(1000, 0));
    assert_eq!(b, Stamp::new(1000, 1));
    assert_eq!(c, Stamp::new(1000, 2));
}

#[test]
fn clock_never_goes_backwards_on_skew() {
    let source = Arc::new(ManualClock::new(5000));
    let clock = ActionClock::with_clock(Arc::clone(&source));

    let before = clock.now();
    source.set(1000);
    let after = clock.now();
    assert!(after > before);
    assert_eq!(after.wall_ms, 5000);
}

#[test]
fn observe_raises_floor() {
    let clock = ActionClock::with_clock(ManualClock::new(100));
    clock.observe(Stamp::new(900, 4));

    let next = clock.now();
    assert_eq!(next, Stamp::new(900, 5));
}

#[test]
fn observe_ignores_older_stamps() {
    let clock = ActionClock::with_clock(ManualClock::new(100));
    clock.now();
    clock.observe(Stamp::new(50, 0));
    assert_eq!(clock.last(), Stamp::new(100, 0));
}

#[test]
fn counter_overflow_rolls_into_wall_time() {
    let clock = ActionClock::with_clock(ManualClock::new(10));
    clock.observe(Stamp::new(10, u32::MAX));
    assert_eq!(clock.now(), Stamp::new(11, 0));
}

#[test]
fn concurrent_stamps_are_unique() {
    let clock = Arc::new(ActionClock::with_clock(ManualClock::new(42)));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let clock = Arc::clone(&clock);
            thread::spawn(move || (0..250).map(|_| clock.now()).collect::<Vec<_>>())
        })
        .collect();

    let mut all: Vec<Stamp> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
    let total = all.len();
    all.sort();
    all.dedup();
    assert_eq!(all.len(), total);
}
