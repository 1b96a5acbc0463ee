// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the wahook gateway.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use wahook_core::{Instance, WebhookSettings};

/// Top-level wahook configuration.
///
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WahookConfig {
    /// Process-level settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Instance cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Event router settings.
    #[serde(default)]
    pub router: RouterConfig,

    /// Webhook delivery settings.
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Always-online presence scheduler settings.
    #[serde(default)]
    pub presence: PresenceConfig,

    /// Blob storage used to re-host media.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Policy applied to instances that leave a field unset.
    #[serde(default)]
    pub defaults: InstanceDefaults,

    /// Prometheus metrics exporter settings.
    #[serde(default)]
    pub prometheus: PrometheusConfig,

    /// Statically configured instances.
    #[serde(default)]
    pub instances: Vec<InstanceConfig>,
}

impl WahookConfig {
    /// Resolve every configured instance against the defaults.
    pub fn resolved_instances(&self) -> Vec<Instance> {
        self.instances
            .iter()
            .map(|i| i.resolve(&self.defaults))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    /// Logging level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Instance cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// How long a looked-up instance stays fresh.
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,

    /// Interval between sweeps that evict expired entries.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Upper bound on a single lookup against the persistence collaborator.
    #[serde(default = "default_lookup_timeout_secs")]
    pub lookup_timeout_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_cache_ttl_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            lookup_timeout_secs: default_lookup_timeout_secs(),
        }
    }
}

fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_sweep_interval_secs() -> u64 {
    600
}

fn default_lookup_timeout_secs() -> u64 {
    5
}

/// Event router configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RouterConfig {
    /// Maximum number of events processed concurrently across all instances.
    #[serde(default = "default_semaphore_size")]
    pub semaphore_size: usize,

    /// Delay before an inbound message is marked as read.
    #[serde(default = "default_read_delay_secs")]
    pub read_delay_secs: u64,

    /// Upper bound on downloading and re-hosting one attachment.
    #[serde(default = "default_media_timeout_secs")]
    pub media_timeout_secs: u64,
}

impl RouterConfig {
    pub fn read_delay(&self) -> Duration {
        Duration::from_secs(self.read_delay_secs)
    }

    pub fn media_timeout(&self) -> Duration {
        Duration::from_secs(self.media_timeout_secs)
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            semaphore_size: default_semaphore_size(),
            read_delay_secs: default_read_delay_secs(),
            media_timeout_secs: default_media_timeout_secs(),
        }
    }
}

fn default_semaphore_size() -> usize {
    512
}

fn default_read_delay_secs() -> u64 {
    8
}

fn default_media_timeout_secs() -> u64 {
    60
}

/// Webhook delivery configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeliveryConfig {
    /// Capacity of the shared delivery queue.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Backoff before each retry; total attempts = len + 1.
    #[serde(default = "default_retry_delays_secs")]
    pub retry_delays_secs: Vec<u64>,

    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl DeliveryConfig {
    pub fn retry_delays(&self) -> Vec<Duration> {
        self.retry_delays_secs
            .iter()
            .map(|s| Duration::from_secs(*s))
            .collect()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            retry_delays_secs: default_retry_delays_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_buffer_size() -> usize {
    2048
}

fn default_retry_delays_secs() -> Vec<u64> {
    vec![2, 5, 10]
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Always-online presence scheduler configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PresenceConfig {
    /// Run the scheduler at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Interval between batches.
    #[serde(default = "default_presence_interval_secs")]
    pub interval_secs: u64,

    /// Concurrent presence refreshes per batch.
    #[serde(default = "default_presence_workers")]
    pub workers: usize,
}

impl PresenceConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_presence_interval_secs(),
            workers: default_presence_workers(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_presence_interval_secs() -> u64 {
    900
}

fn default_presence_workers() -> usize {
    20
}

/// Blob storage for re-hosted media.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Upload downloaded attachments and publish their URL.
    #[serde(default)]
    pub enabled: bool,

    /// Base URL objects are `PUT` under (`<base_url>/<name>`).
    #[serde(default)]
    pub base_url: Option<String>,

    /// Bearer token sent with uploads, if the bucket requires one.
    #[serde(default)]
    pub auth_token: Option<String>,
}

/// Policy applied to instances that leave a field unset.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceDefaults {
    #[serde(default)]
    pub webhook_url: String,

    #[serde(default = "default_webhook_events")]
    pub webhook_events: Vec<String>,

    #[serde(default)]
    pub inline_media: bool,

    #[serde(default = "default_true")]
    pub auto_receipt: bool,

    #[serde(default = "default_true")]
    pub read_messages: bool,

    #[serde(default)]
    pub always_online: bool,

    #[serde(default)]
    pub skip_groups: bool,

    #[serde(default)]
    pub skip_broadcasts: bool,

    #[serde(default)]
    pub skip_own_messages: bool,
}

impl Default for InstanceDefaults {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            webhook_events: default_webhook_events(),
            inline_media: false,
            auto_receipt: true,
            read_messages: true,
            always_online: false,
            skip_groups: false,
            skip_broadcasts: false,
            skip_own_messages: false,
        }
    }
}

fn default_webhook_events() -> Vec<String> {
    vec!["All".to_string()]
}

/// One statically configured instance. Unset fields fall back to `[defaults]`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InstanceConfig {
    pub id: String,

    #[serde(default)]
    pub webhook_url: Option<String>,

    #[serde(default)]
    pub webhook_events: Option<Vec<String>>,

    #[serde(default)]
    pub inline_media: Option<bool>,

    #[serde(default)]
    pub auto_receipt: Option<bool>,

    #[serde(default)]
    pub read_messages: Option<bool>,

    #[serde(default)]
    pub always_online: Option<bool>,

    #[serde(default)]
    pub skip_groups: Option<bool>,

    #[serde(default)]
    pub skip_broadcasts: Option<bool>,

    #[serde(default)]
    pub skip_own_messages: Option<bool>,
}

impl InstanceConfig {
    /// Build the instance snapshot, filling unset fields from `defaults`.
    pub fn resolve(&self, defaults: &InstanceDefaults) -> Instance {
        Instance {
            id: self.id.clone(),
            webhook: WebhookSettings {
                url: self
                    .webhook_url
                    .clone()
                    .unwrap_or_else(|| defaults.webhook_url.clone()),
                events: self
                    .webhook_events
                    .clone()
                    .unwrap_or_else(|| defaults.webhook_events.clone()),
                inline_media: self.inline_media.unwrap_or(defaults.inline_media),
            },
            skip_groups: self.skip_groups.unwrap_or(defaults.skip_groups),
            skip_broadcasts: self.skip_broadcasts.unwrap_or(defaults.skip_broadcasts),
            skip_own_messages: self.skip_own_messages.unwrap_or(defaults.skip_own_messages),
            auto_receipt: self.auto_receipt.unwrap_or(defaults.auto_receipt),
            read_messages: self.read_messages.unwrap_or(defaults.read_messages),
            always_online: self.always_online.unwrap_or(defaults.always_online),
        }
    }
}

/// Prometheus metrics exporter configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PrometheusConfig {
    /// Install the Prometheus recorder and scrape endpoint at startup.
    #[serde(default)]
    pub enabled: bool,

    /// Socket address of the scrape endpoint.
    #[serde(default = "default_prometheus_listen")]
    pub listen_address: String,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_address: default_prometheus_listen(),
        }
    }
}

fn default_prometheus_listen() -> String {
    "127.0.0.1:9464".to_string()
}
