// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prometheus metrics for the wahook gateway.
//!
//! Components record through the metrics-rs facade via [`recording`]; the
//! binary installs the Prometheus recorder and scrape endpoint when enabled.

pub mod recording;

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;
use wahook_core::WahookError;

pub use recording::{
    record_cache_lookup, record_delivery, record_delivery_attempt, record_event,
    record_presence_refresh, register_metrics, set_limiter_available,
};

/// Install the Prometheus recorder and its HTTP scrape listener.
///
/// Must be called from within a tokio runtime. Only one recorder can be
/// installed per process.
pub fn install_exporter(listen: SocketAddr) -> Result<(), WahookError> {
    PrometheusBuilder::new()
        .with_http_listener(listen)
        .install()
        .map_err(|e| WahookError::Internal(format!("failed to install Prometheus exporter: {e}")))?;

    register_metrics();
    tracing::info!(%listen, "prometheus exporter listening");
    Ok(())
}
