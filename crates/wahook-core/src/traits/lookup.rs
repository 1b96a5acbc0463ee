// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Instance lookup trait for the persistence collaborator.

use async_trait::async_trait;

use crate::error::WahookError;
use crate::types::Instance;

/// Lookup-by-id over durable instance configuration.
#[async_trait]
pub trait InstanceLookup: Send + Sync + 'static {
    /// Returns `Ok(None)` when no instance with this id exists.
    async fn find_by_id(&self, id: &str) -> Result<Option<Instance>, WahookError>;
}
