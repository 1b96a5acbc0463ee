// SPDX-FileCopyrightText: 2026 Wahook Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wahook - multi-tenant chat session to webhook gateway.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use wahook_config::{ConfigError, WahookConfig};

/// Wahook - multi-tenant chat session to webhook gateway.
#[derive(Parser, Debug)]
#[command(name = "wahook", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, short, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the gateway.
    Serve,
    /// Inspect configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Validate configuration and exit.
    Check,
    /// Print the effective configuration as TOML.
    Show,
}

fn load(path: Option<&Path>) -> Result<WahookConfig, Vec<ConfigError>> {
    match path {
        Some(path) => wahook_config::load_and_validate_path(path),
        None => wahook_config::load_and_validate(),
    }
}

/// Effective config with secrets masked.
fn redacted(mut config: WahookConfig) -> WahookConfig {
    if config.storage.auth_token.is_some() {
        config.storage.auth_token = Some("********".to_string());
    }
    config
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            wahook_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config {
            action: ConfigCommands::Check,
        }) => {
            println!(
                "wahook: config ok ({} instance(s), queue capacity {})",
                config.instances.len(),
                config.delivery.buffer_size
            );
        }
        Some(Commands::Config {
            action: ConfigCommands::Show,
        }) => match toml::to_string_pretty(&redacted(config)) {
            Ok(rendered) => print!("{rendered}"),
            Err(e) => {
                eprintln!("error: failed to render config: {e}");
                std::process::exit(1);
            }
        },
        None => {
            println!("wahook: use --help for available commands");
        }
    }
}
