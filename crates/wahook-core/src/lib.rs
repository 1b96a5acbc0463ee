// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the wahook gateway.
//!
//! This crate provides the error type, the tenant and event data model, the
//! notification payload shapes, and the collaborator traits (session runtime,
//! instance lookup, blob storage) used throughout the workspace.

pub mod error;
pub mod event;
pub mod jid;
pub mod payload;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::WahookError;
pub use event::RawEvent;
pub use jid::Jid;
pub use payload::{NotificationData, NotificationPayload};
pub use types::{EventKind, Instance, Subscription, WebhookSettings};

pub use traits::{BlobStorage, InstanceLookup, SessionRuntime};
