// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{fs, path::PathBuf};

use anyhow::Context as _;
use directories::ProjectDirs;

use crate::config::Config;

mod config;
mod env;
mod routing;
mod runtime;

#[must_use]
fn app_name() -> &'static str {
    env!("CARGO_PKG_NAME")
}

#[must_use]
fn app_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "playtally", app_name())
}

#[must_use]
fn config_file_path(app_dirs: &ProjectDirs) -> PathBuf {
    let mut path_buf = app_dirs.config_dir().to_path_buf();
    path_buf.push("config");
    path_buf.set_extension("ron");
    path_buf
}

#[must_use]
fn load_app_config(app_dirs: &ProjectDirs) -> Config {
    let file_path = config_file_path(app_dirs);
    log::info!(
        "Loading configuration from file: {path}",
        path = file_path.display()
    );
    match fs::read(&file_path) {
        Ok(bytes) => ron::de::from_bytes(&bytes)
            .map_err(|err| {
                log::warn!("Failed to parse configuration data: {err}");
            })
            .unwrap_or_default(),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Default::default(),
        Err(err) => {
            log::warn!("Failed to read configuration data from file: {err}");
            Default::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    env::init_environment();
    env::init_tracing_and_logging()?;

    let mut config = app_dirs().map(|app_dirs| load_app_config(&app_dirs)).unwrap_or_default();
    env::apply_overrides(&mut config);
    log::info!("Configuration: {config:?}");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create the tokio runtime")?;
    runtime.block_on(runtime::run(config))
}
