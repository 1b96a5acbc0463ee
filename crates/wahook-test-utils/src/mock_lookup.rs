// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock instance lookup with call counting and injectable latency.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use wahook_core::{Instance, InstanceLookup, WahookError};

/// An in-memory `InstanceLookup`.
///
/// Tracks total calls and the peak number of concurrent calls, so tests can
/// assert both cache behaviour and concurrency bounds.
#[derive(Default)]
pub struct MockLookup {
    instances: RwLock<HashMap<String, Instance>>,
    delay: Option<Duration>,
    failing: AtomicBool,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl MockLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instance(self, instance: Instance) -> Self {
        self.insert(instance);
        self
    }

    /// Every lookup sleeps for `delay` (tokio time, so paused clocks apply).
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn insert(&self, instance: Instance) {
        self.instances
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .insert(instance.id.clone(), instance);
    }

    pub fn remove(&self, id: &str) {
        self.instances
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .remove(id);
    }

    /// Make subsequent lookups return an error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InstanceLookup for MockLookup {
    async fn find_by_id(&self, id: &str) -> Result<Option<Instance>, WahookError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let result = if self.failing.load(Ordering::SeqCst) {
            Err(WahookError::Lookup {
                source: Box::new(std::io::Error::other("mock lookup failure")),
            })
        } else {
            Ok(self
                .instances
                .read()
                .unwrap_or_else(|p| p.into_inner())
                .get(id)
                .cloned())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
