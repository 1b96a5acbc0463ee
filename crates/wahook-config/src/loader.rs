// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./wahook.toml` > `~/.config/wahook/wahook.toml` > `/etc/wahook/wahook.toml`
//! with environment variable overrides via the `WAHOOK_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::WahookConfig;

pub const SYSTEM_CONFIG_PATH: &str = "/etc/wahook/wahook.toml";

/// Config sections that accept `WAHOOK_<SECTION>_<KEY>` overrides.
const ENV_SECTIONS: &[&str] = &[
    "gateway",
    "cache",
    "router",
    "delivery",
    "presence",
    "storage",
    "defaults",
    "prometheus",
];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/wahook/wahook.toml`
/// 3. `~/.config/wahook/wahook.toml`
/// 4. `./wahook.toml`
/// 5. `WAHOOK_*` environment variables
pub fn load_config() -> Result<WahookConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<WahookConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WahookConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<WahookConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WahookConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(WahookConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("wahook/wahook.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("wahook.toml"))
        .merge(env_provider())
}

/// Environment provider with explicit section mapping.
///
/// `Env::split("_")` would turn `WAHOOK_DELIVERY_BUFFER_SIZE` into
/// `delivery.buffer.size`; only the first separator after a known section
/// name becomes a dot.
fn env_provider() -> Env {
    Env::prefixed("WAHOOK_").map(|key| map_env_key(&key.as_str().to_ascii_lowercase()).into())
}

/// Map a lowercased, prefix-stripped env key to its dotted config path.
pub fn map_env_key(key: &str) -> String {
    for section in ENV_SECTIONS {
        if let Some(rest) = key
            .strip_prefix(section)
            .and_then(|rest| rest.strip_prefix('_'))
        {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
