// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concurrent instance-id to session map with an always-online side table.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use wahook_core::SessionRuntime;

/// Shared handle to a live session runtime.
pub type SessionHandle = Arc<dyn SessionRuntime>;

/// Registry of live sessions.
///
/// The always-online table is independent of the session map: an id can be
/// flagged before its session connects, and the presence scheduler clears
/// flags whose session has gone away.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, SessionHandle>,
    always_online: DashMap<String, ()>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `session` for `id`, returning the handle it replaced.
    pub fn insert(&self, id: impl Into<String>, session: SessionHandle) -> Option<SessionHandle> {
        let id = id.into();
        debug!(instance_id = %id, "session registered");
        self.sessions.insert(id, session)
    }

    pub fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn remove(&self, id: &str) -> Option<SessionHandle> {
        let removed = self.sessions.remove(id).map(|(_, session)| session);
        if removed.is_some() {
            debug!(instance_id = id, "session removed");
        }
        removed
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Ids of all registered sessions, in no particular order.
    pub fn ids(&self) -> Vec<String> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn enable_always_online(&self, id: impl Into<String>) {
        self.always_online.insert(id.into(), ());
    }

    pub fn disable_always_online(&self, id: &str) -> bool {
        self.always_online.remove(id).is_some()
    }

    pub fn is_always_online(&self, id: &str) -> bool {
        self.always_online.contains_key(id)
    }

    /// Snapshot of ids flagged always-online.
    pub fn always_online_ids(&self) -> Vec<String> {
        self.always_online
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }
}
