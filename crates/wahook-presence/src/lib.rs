// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keeps always-online instances showing as available.
//!
//! Chat servers drop an account back to "unavailable" after a while without
//! presence updates. [`PresenceScheduler`] re-announces availability for every
//! flagged instance on a fixed interval, with a bounded number of refreshes in
//! flight per batch.

pub mod scheduler;

pub use scheduler::{BatchReport, DEFAULT_INTERVAL, DEFAULT_WORKERS, PresenceScheduler};
