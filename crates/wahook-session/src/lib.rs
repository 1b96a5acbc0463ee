// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Live session bookkeeping for the wahook gateway.
//!
//! [`SessionRegistry`] maps instance ids to their running session runtime and
//! tracks which instances want always-online presence. [`Commands`] exposes
//! the outbound operations callers issue against a registered session.

pub mod commands;
pub mod registry;

pub use commands::Commands;
pub use registry::{SessionHandle, SessionRegistry};
