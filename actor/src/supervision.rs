// Copyright 2025 Kore Ledger, SL
// SPDX-License-Identifier: Apache-2.0

//! Supervision strategies
//!
//! A parent reacts to a crashed child according to its [`SupervisionStrategy`].
//! Strategies are plain values; the mutable part of a decision, how often a
//! given child failed recently, lives in a [`FailureCounter`] kept by the
//! parent for each child.
//!

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use std::time::Duration;

/// Upper bound on tolerated failures inside one window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxRetries {
    /// At most this many failures per window.
    Limited(u32),
    /// Every failure is tolerated.
    Unbounded,
}

/// Parameters of the one-for-one strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OneForOne {
    /// Failures tolerated inside one window.
    pub max_retries: MaxRetries,
    /// Length of the window.
    pub time_threshold: Duration,
}

impl Default for OneForOne {
    fn default() -> Self {
        Self {
            max_retries: MaxRetries::Limited(5),
            time_threshold: Duration::from_secs(10),
        }
    }
}

/// How a parent handles the crash of one of its children.
///
/// Only the crashed child's subtree is affected, never its siblings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupervisionStrategy {
    /// The crashed child is stopped.
    Stop,
    /// The crashed child is restarted while it stays within tolerance.
    OneForOne(OneForOne),
}

impl Default for SupervisionStrategy {
    fn default() -> Self {
        SupervisionStrategy::OneForOne(OneForOne::default())
    }
}

impl SupervisionStrategy {
    /// One-for-one with a retry limit.
    pub fn one_for_one(max_retries: u32, time_threshold: Duration) -> Self {
        SupervisionStrategy::OneForOne(OneForOne {
            max_retries: MaxRetries::Limited(max_retries),
            time_threshold,
        })
    }

    /// One-for-one that restarts forever.
    pub fn restart_forever() -> Self {
        SupervisionStrategy::OneForOne(OneForOne {
            max_retries: MaxRetries::Unbounded,
            time_threshold: Duration::ZERO,
        })
    }

    /// A fresh counter for one child.
    pub fn counter(&self) -> FailureCounter {
        match self {
            SupervisionStrategy::Stop => {
                FailureCounter::new(MaxRetries::Limited(0), Duration::ZERO)
            }
            SupervisionStrategy::OneForOne(params) => {
                FailureCounter::new(params.max_retries, params.time_threshold)
            }
        }
    }
}

/// What a parent does with a crashed child.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChildAction {
    /// Restart the child.
    Restart,
    /// Stop the child for good.
    Stop,
}

/// Sliding-window failure tally for one child.
#[derive(Clone, Debug)]
pub struct FailureCounter {
    max_retries: MaxRetries,
    time_threshold: Duration,
    retries: u32,
    window_start: Option<Instant>,
}

impl FailureCounter {
    /// Creates a counter with an empty window.
    pub fn new(max_retries: MaxRetries, time_threshold: Duration) -> Self {
        Self {
            max_retries,
            time_threshold,
            retries: 0,
            window_start: None,
        }
    }

    /// Records a failure now. Returns `true` if it is tolerated.
    pub fn capture(&mut self) -> bool {
        self.capture_at(Instant::now())
    }

    /// Records a failure at `now`. Returns `true` if it is tolerated.
    ///
    /// Inside the window the failure counts against the limit. Past the
    /// window a new one starts at `now` with this failure as its first.
    pub fn capture_at(&mut self, now: Instant) -> bool {
        let start = *self.window_start.get_or_insert(now);
        if now.saturating_duration_since(start) > self.time_threshold {
            self.window_start = Some(now);
            self.retries = 1;
            return true;
        }
        self.retries = self.retries.saturating_add(1);
        match self.max_retries {
            MaxRetries::Unbounded => true,
            MaxRetries::Limited(max) => self.retries <= max,
        }
    }

    /// Decision for a failure happening now.
    pub fn decide(&mut self) -> ChildAction {
        if self.capture() {
            ChildAction::Restart
        } else {
            ChildAction::Stop
        }
    }

    /// Failures counted in the current window.
    pub fn retries(&self) -> u32 {
        self.retries
    }
}
