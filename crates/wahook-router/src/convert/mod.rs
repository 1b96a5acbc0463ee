// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-kind mappings from raw session events to notification bodies.
//!
//! Everything here is synchronous and side-effect free; identity resolution,
//! profile pictures and media are fetched by the router and passed in.

pub mod contact;
pub mod message;
pub mod receipt;
pub mod vcard;
