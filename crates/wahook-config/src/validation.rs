// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as non-zero capacities, webhook URL schemes, and known event names.

use std::collections::HashSet;

use wahook_core::EventKind;

use crate::diagnostic::{suggest_key, ConfigError};
use crate::model::WahookConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Names accepted in `webhook_events`, used for suggestions.
const EVENT_NAMES: &[&str] = &[
    "ALL",
    "MESSAGES_UPSERT",
    "MESSAGES_UPDATE",
    "CONTACTS_UPSERT",
    "CONNECTION_UPDATE",
    "GROUPS_UPSERT",
    "CALL",
];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &WahookConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.gateway.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(validation(format!(
            "gateway.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.gateway.log_level
        )));
    }

    for (key, value) in [
        ("cache.ttl_secs", config.cache.ttl_secs),
        ("cache.sweep_interval_secs", config.cache.sweep_interval_secs),
        ("cache.lookup_timeout_secs", config.cache.lookup_timeout_secs),
        ("router.media_timeout_secs", config.router.media_timeout_secs),
        ("delivery.request_timeout_secs", config.delivery.request_timeout_secs),
        ("presence.interval_secs", config.presence.interval_secs),
    ] {
        if value == 0 {
            errors.push(validation(format!("{key} must be greater than 0")));
        }
    }

    for (key, value) in [
        ("router.semaphore_size", config.router.semaphore_size),
        ("delivery.buffer_size", config.delivery.buffer_size),
        ("presence.workers", config.presence.workers),
    ] {
        if value == 0 {
            errors.push(validation(format!("{key} must be at least 1")));
        }
    }

    if config.storage.enabled {
        match config.storage.base_url.as_deref().map(str::trim) {
            None | Some("") => errors.push(validation(
                "storage.base_url is required when storage.enabled = true".to_string(),
            )),
            Some(url) if !is_http_url(url) => errors.push(validation(format!(
                "storage.base_url `{url}` must start with http:// or https://"
            ))),
            Some(_) => {}
        }
    }

    if config.prometheus.enabled
        && config
            .prometheus
            .listen_address
            .parse::<std::net::SocketAddr>()
            .is_err()
    {
        errors.push(validation(format!(
            "prometheus.listen_address `{}` is not a valid socket address",
            config.prometheus.listen_address
        )));
    }

    check_webhook(
        "defaults",
        &config.defaults.webhook_url,
        &config.defaults.webhook_events,
        &mut errors,
    );

    let mut seen_ids = HashSet::new();
    for (i, instance) in config.instances.iter().enumerate() {
        if instance.id.trim().is_empty() {
            errors.push(validation(format!("instances[{i}].id must not be empty")));
            continue;
        }
        if !seen_ids.insert(instance.id.as_str()) {
            errors.push(validation(format!(
                "duplicate instance id `{}` in [[instances]] array",
                instance.id
            )));
        }
        let url = instance.webhook_url.as_deref().unwrap_or_default();
        let events = instance.webhook_events.as_deref().unwrap_or_default();
        check_webhook(&format!("instances[{i}]"), url, events, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validation(message: String) -> ConfigError {
    ConfigError::Validation { message }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn check_webhook(scope: &str, url: &str, events: &[String], errors: &mut Vec<ConfigError>) {
    let url = url.trim();
    if !url.is_empty() && !is_http_url(url) {
        errors.push(validation(format!(
            "{scope}.webhook_url `{url}` must start with http:// or https://"
        )));
    }

    for name in events {
        if name.trim().eq_ignore_ascii_case("all") || EventKind::from_subscription_name(name).is_some() {
            continue;
        }
        let upper = name.trim().to_ascii_uppercase();
        let message = match suggest_key(&upper, EVENT_NAMES) {
            Some(s) => format!("{scope}.webhook_events: unknown event `{name}`, did you mean `{s}`?"),
            None => format!(
                "{scope}.webhook_events: unknown event `{name}`, expected one of {}",
                EVENT_NAMES.join(", ")
            ),
        };
        errors.push(validation(message));
    }
}
