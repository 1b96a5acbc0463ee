// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits consumed by the gateway core.
//!
//! All traits use `#[async_trait]` so they can be held as trait objects.

pub mod blob;
pub mod lookup;
pub mod session;

pub use blob::BlobStorage;
pub use lookup::InstanceLookup;
pub use session::SessionRuntime;
