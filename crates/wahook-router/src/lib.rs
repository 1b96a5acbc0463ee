// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Event routing for the wahook gateway.
//!
//! Raw session events are resolved to their instance, filtered by its
//! subscription and content policy, converted into notification payloads and
//! queued for webhook delivery. Media attachments are relayed on the way and
//! inbound messages can trigger automatic receipts.

pub mod blob;
pub mod convert;
pub mod limiter;
pub mod media;
pub mod receipts;
pub mod router;

pub use blob::HttpBlobStorage;
pub use limiter::{ConcurrencyLimiter, LimiterPermit};
pub use media::{MediaRelay, RelayedMedia};
pub use router::{EventRouter, RouteOutcome};
