// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory instance lookup backed by the `[[instances]]` config array.

use async_trait::async_trait;
use dashmap::DashMap;

use wahook_config::WahookConfig;
use wahook_core::{Instance, InstanceLookup, WahookError};

/// Instance store seeded from configuration.
///
/// Stands in for the persistence collaborator when instances are declared
/// statically. Entries can be replaced at runtime; callers holding an
/// [`InstanceCache`](wahook_cache::InstanceCache) still see the old copy
/// until it expires or is invalidated.
#[derive(Debug, Default)]
pub struct StaticInstanceLookup {
    instances: DashMap<String, Instance>,
}

impl StaticInstanceLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every configured instance against `[defaults]`.
    pub fn from_config(config: &WahookConfig) -> Self {
        let lookup = Self::new();
        for instance in config.resolved_instances() {
            lookup.upsert(instance);
        }
        lookup
    }

    /// Insert or replace an instance, returning the previous one.
    pub fn upsert(&self, instance: Instance) -> Option<Instance> {
        self.instances.insert(instance.id.clone(), instance)
    }

    pub fn remove(&self, id: &str) -> Option<Instance> {
        self.instances.remove(id).map(|(_, instance)| instance)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

#[async_trait]
impl InstanceLookup for StaticInstanceLookup {
    async fn find_by_id(&self, id: &str) -> Result<Option<Instance>, WahookError> {
        Ok(self.instances.get(id).map(|entry| entry.value().clone()))
    }
}
