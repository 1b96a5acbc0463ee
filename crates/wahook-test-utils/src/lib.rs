// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for wahook integration tests.
//!
//! Provides mock collaborators for fast, deterministic tests without a live
//! chat session, database, or object store.
//!
//! # Components
//!
//! - [`MockSession`] - session runtime that records every command
//! - [`MockLookup`] - instance lookup with call counting and injectable latency
//! - [`MockBlobStorage`] - blob storage that captures uploads

pub mod mock_blob;
pub mod mock_lookup;
pub mod mock_session;

pub use mock_blob::{MockBlobStorage, Upload};
pub use mock_lookup::MockLookup;
pub use mock_session::{MockSession, SessionCall};

use wahook_core::{Instance, WebhookSettings};

/// An instance subscribed to every event, with all skip flags off and
/// auto receipts disabled.
pub fn test_instance(id: &str, webhook_url: &str) -> Instance {
    Instance {
        id: id.to_string(),
        webhook: WebhookSettings {
            url: webhook_url.to_string(),
            events: vec!["ALL".to_string()],
            inline_media: false,
        },
        ..Default::default()
    }
}
