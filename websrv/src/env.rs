// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{env, path::PathBuf};

use dotenvy::dotenv;
use tracing::{Subscriber, subscriber::set_global_default};
use tracing_log::LogTracer;
use tracing_subscriber::EnvFilter;

use playtally_storage_sqlite::connection::{IN_MEMORY_CONNECTION, Storage};

use crate::config::Config;

pub(crate) fn init_environment() {
    if let Ok(path) = dotenv() {
        // Print to stderr because logging has not been initialized yet
        eprintln!("Loaded environment from dotenv file {path:?}");
    }
}

const TRACING_SUBSCRIBER_ENV_FILTER_DEFAULT: &str = "info";

fn create_env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|err| {
        let rust_log_from_env = env::var("RUST_LOG").ok();
        if let Some(rust_log_from_env) = rust_log_from_env {
            if !rust_log_from_env.is_empty() {
                eprintln!("Failed to parse RUST_LOG environment variable '{rust_log_from_env}': {err}");
            }
        }
        EnvFilter::new(TRACING_SUBSCRIBER_ENV_FILTER_DEFAULT.to_owned())
    })
}

fn create_tracing_subscriber() -> impl Subscriber {
    let env_filter = create_env_filter();
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish()
}

pub(crate) fn init_tracing_and_logging() -> anyhow::Result<()> {
    // Capture and redirect all log messages as tracing events
    LogTracer::init()?;

    let subscriber = create_tracing_subscriber();
    set_global_default(subscriber)?;

    Ok(())
}

const ENDPOINT_IP_ENV: &str = "ENDPOINT_IP";

const ENDPOINT_PORT_ENV: &str = "ENDPOINT_PORT";

const DATABASE_URL_ENV: &str = "DATABASE_URL";

const UPLOADS_DIR_ENV: &str = "UPLOADS_DIR";

/// Apply environment variables on top of the loaded configuration.
pub(crate) fn apply_overrides(config: &mut Config) {
    if let Ok(var) = env::var(ENDPOINT_IP_ENV) {
        tracing::debug!("{ENDPOINT_IP_ENV} = {var}");
        match var.parse() {
            Ok(ip_addr) => config.network.endpoint.ip_addr = ip_addr,
            Err(err) => {
                tracing::warn!("Failed to parse {ENDPOINT_IP_ENV} = {var}: {err}");
            }
        }
    }
    if let Ok(var) = env::var(ENDPOINT_PORT_ENV) {
        tracing::debug!("{ENDPOINT_PORT_ENV} = {var}");
        match var.parse() {
            Ok(port) => config.network.endpoint.port = port,
            Err(err) => {
                tracing::warn!("Failed to parse {ENDPOINT_PORT_ENV} = {var}: {err}");
            }
        }
    }
    if let Ok(var) = env::var(DATABASE_URL_ENV) {
        tracing::debug!("{DATABASE_URL_ENV} = {var}");
        config.database.connection.storage = if var == IN_MEMORY_CONNECTION {
            Storage::InMemory
        } else {
            Storage::File {
                path: PathBuf::from(var),
            }
        };
    }
    if let Ok(var) = env::var(UPLOADS_DIR_ENV) {
        tracing::debug!("{UPLOADS_DIR_ENV} = {var}");
        config.tasks.uploads_dir = PathBuf::from(var);
    }
}
