// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-through instance cache.
//!
//! [`TtlCache`] is a generic concurrent map with per-entry expiry.
//! [`InstanceCache`] layers a bounded-latency lookup against the
//! [`InstanceLookup`](wahook_core::InstanceLookup) collaborator on top of it.

pub mod instance;
pub mod ttl;

pub use instance::InstanceCache;
pub use ttl::TtlCache;
