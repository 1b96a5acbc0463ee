// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metric registration and recording helpers.
//!
//! Uses the metrics-rs facade; recording is a no-op until a recorder is installed.

use metrics::{describe_counter, describe_gauge};

/// Register all wahook metric descriptions.
///
/// Called once at startup after the recorder is installed.
pub fn register_metrics() {
    describe_counter!(
        "wahook_events_total",
        "Raw session events by kind and routing outcome"
    );
    describe_counter!(
        "wahook_deliveries_total",
        "Webhook delivery tasks by final outcome"
    );
    describe_counter!(
        "wahook_delivery_attempts_total",
        "Individual webhook HTTP attempts"
    );
    describe_counter!(
        "wahook_cache_lookups_total",
        "Instance cache reads by result"
    );
    describe_counter!(
        "wahook_presence_refresh_total",
        "Always-online presence refreshes by outcome"
    );
    describe_gauge!(
        "wahook_limiter_available",
        "Free slots in the event concurrency limiter"
    );
}

/// Record a routed event. `outcome` is e.g. `enqueued`, `filtered`, `unknown_instance`.
pub fn record_event(kind: &str, outcome: &'static str) {
    metrics::counter!("wahook_events_total", "kind" => kind.to_string(), "outcome" => outcome)
        .increment(1);
}

/// Record the final outcome of a delivery task (`delivered` or `abandoned`).
pub fn record_delivery(outcome: &'static str) {
    metrics::counter!("wahook_deliveries_total", "outcome" => outcome).increment(1);
}

/// Record one HTTP attempt against a webhook.
pub fn record_delivery_attempt() {
    metrics::counter!("wahook_delivery_attempts_total").increment(1);
}

/// Record an instance cache read (`hit`, `miss`, `not_found`, `error`, `timeout`).
pub fn record_cache_lookup(result: &'static str) {
    metrics::counter!("wahook_cache_lookups_total", "result" => result).increment(1);
}

/// Record a presence refresh (`refreshed`, `failed`, `skipped`, `cleared`).
pub fn record_presence_refresh(outcome: &'static str) {
    metrics::counter!("wahook_presence_refresh_total", "outcome" => outcome).increment(1);
}

/// Set the number of free limiter slots.
pub fn set_limiter_available(available: usize) {
    metrics::gauge!("wahook_limiter_available").set(available as f64);
}
