// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! sq-core: Shared library for the studyq offline action queue
//!
//! This crate provides the action data model, the durable action store,
//! the retry policy, and the wire protocol used by both the `sq` CLI and
//! the `sq-remote` reference server.

pub mod action;
pub mod clock;
pub mod error;
pub mod outcome;
pub mod payload;
pub mod protocol;
pub mod retry;
pub mod store;

pub use action::{Action, ActionId, ActionStatus, ActionType};
pub use clock::{ActionClock, ClockSource, ManualClock, Stamp, SystemClock};
pub use error::{Error, Result};
pub use outcome::Outcome;
pub use payload::{ActionPayload, CURRENT_SCHEMA_VERSION};
pub use retry::{ErrorClass, RetryDecision, RetryPolicy};
pub use store::{ActionStore, QueueLock, Recorded, StatusCounts};
