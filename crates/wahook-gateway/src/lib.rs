// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway assembly for wahook.
//!
//! The [`Gateway`] owns one of each pipeline component, wired from a
//! [`WahookConfig`](wahook_config::WahookConfig):
//! - instance cache over a lookup collaborator
//! - session registry and command pass-throughs
//! - event router feeding the shared delivery queue
//! - delivery worker, cache sweeper and presence scheduler as background tasks
//!
//! Shutdown is driven by a single cancellation token; see [`shutdown`].

pub mod gateway;
pub mod lookup;
pub mod shutdown;

pub use gateway::{Gateway, GatewayBuilder};
pub use lookup::StaticInstanceLookup;
pub use shutdown::install_signal_handler;
