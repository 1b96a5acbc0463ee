// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wahook serve` command implementation.
//!
//! Builds the gateway from configuration, starts its background tasks and
//! runs until SIGINT or SIGTERM.

use tracing::{debug, info, warn};

use wahook_config::WahookConfig;
use wahook_core::WahookError;
use wahook_gateway::{Gateway, install_signal_handler};

/// Crate targets the configured log level applies to.
const LOG_TARGETS: &[&str] = &[
    "wahook",
    "wahook_cache",
    "wahook_config",
    "wahook_core",
    "wahook_delivery",
    "wahook_gateway",
    "wahook_presence",
    "wahook_prometheus",
    "wahook_router",
    "wahook_session",
];

/// Runs the gateway until a shutdown signal arrives.
pub async fn run_serve(config: WahookConfig) -> Result<(), WahookError> {
    init_tracing(&config.gateway.log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        instances = config.instances.len(),
        "starting wahook serve"
    );

    init_metrics(&config);

    let gateway = Gateway::from_config(config)?;
    let cancel = install_signal_handler();
    let handles = gateway.start(cancel.clone())?;
    info!("wahook gateway ready");

    cancel.cancelled().await;

    for handle in handles {
        if let Err(e) = handle.await {
            warn!(error = %e, "background task ended abnormally");
        }
    }

    info!("wahook serve shutdown complete");
    Ok(())
}

#[cfg(feature = "prometheus")]
fn init_metrics(config: &WahookConfig) {
    if !config.prometheus.enabled {
        debug!("prometheus metrics disabled by configuration");
        return;
    }
    let listen = match config.prometheus.listen_address.parse() {
        Ok(listen) => listen,
        Err(e) => {
            warn!(
                address = %config.prometheus.listen_address,
                error = %e,
                "invalid prometheus listen address, continuing without metrics"
            );
            return;
        }
    };
    if let Err(e) = wahook_prometheus::install_exporter(listen) {
        warn!(error = %e, "prometheus initialization failed, continuing without metrics");
    }
}

#[cfg(not(feature = "prometheus"))]
fn init_metrics(config: &WahookConfig) {
    if config.prometheus.enabled {
        warn!("prometheus enabled in config but this build has no prometheus support");
    } else {
        debug!("prometheus metrics disabled by configuration");
    }
}

fn filter_directives(log_level: &str) -> String {
    let mut directives: Vec<String> = LOG_TARGETS
        .iter()
        .map(|target| format!("{target}={log_level}"))
        .collect();
    directives.push("warn".to_string());
    directives.join(",")
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` takes precedence when set.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_covers_every_crate() {
        let directives = filter_directives("debug");
        assert!(directives.starts_with("wahook=debug,"));
        assert!(directives.contains("wahook_router=debug"));
        assert!(directives.contains("wahook_delivery=debug"));
        assert!(directives.ends_with(",warn"));
    }

    #[test]
    fn filter_directives_parse() {
        let filter = tracing_subscriber::EnvFilter::try_new(filter_directives("info"));
        assert!(filter.is_ok());
    }
}
