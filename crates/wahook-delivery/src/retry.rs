// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retry schedule for webhook delivery.

use std::time::Duration;

/// Default waits before the 2nd, 3rd and 4th attempt.
pub const DEFAULT_RETRY_DELAYS: [Duration; 3] = [
    Duration::from_secs(2),
    Duration::from_secs(5),
    Duration::from_secs(10),
];

/// One scheduled attempt. `number` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt {
    pub number: usize,
    /// Wait before issuing this attempt; `None` for the first.
    pub delay_before: Option<Duration>,
}

/// Attempt sequence: one immediate attempt, then one per configured delay.
///
/// Iterating yields `delays.len() + 1` attempts and then `None`.
#[derive(Debug, Clone)]
pub struct RetrySchedule {
    attempt: usize,
    delays: Vec<Duration>,
}

impl RetrySchedule {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { attempt: 0, delays }
    }

    /// Total attempts this schedule allows.
    pub fn max_attempts(&self) -> usize {
        self.delays.len() + 1
    }

    /// Attempts handed out so far.
    pub fn attempts_made(&self) -> usize {
        self.attempt
    }
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self::new(DEFAULT_RETRY_DELAYS.to_vec())
    }
}

impl Iterator for RetrySchedule {
    type Item = Attempt;

    fn next(&mut self) -> Option<Attempt> {
        if self.attempt >= self.max_attempts() {
            return None;
        }
        let delay_before = match self.attempt {
            0 => None,
            n => Some(self.delays[n - 1]),
        };
        self.attempt += 1;
        Some(Attempt {
            number: self.attempt,
            delay_before,
        })
    }
}
