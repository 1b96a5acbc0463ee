// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Blob storage trait used to re-host downloaded media.

use async_trait::async_trait;

use crate::error::WahookError;

#[async_trait]
pub trait BlobStorage: Send + Sync + 'static {
    /// Stores `bytes` under `name` and returns the public URL.
    async fn upload(&self, name: &str, mimetype: &str, bytes: Vec<u8>) -> Result<String, WahookError>;
}
