// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::sync::Arc;

use warp::Filter as _;

use playtally_repo_sqlite::{initialize_database, run_migrations};
use playtally_storage_sqlite::connection::pool::{
    create_connection_pool, gatekeeper::Gatekeeper as DatabaseConnectionGatekeeper,
    get_pooled_connection,
};
use playtally_usecases::{
    artifact::ArtifactStore,
    task::{Config as TaskConfig, TaskService},
};

use crate::{
    config::{Config, DatabaseConfig},
    routing,
};

fn provision_database(config: &DatabaseConfig) -> anyhow::Result<DatabaseConnectionGatekeeper> {
    log::info!(
        "Commissioning SQLite database: {storage}",
        storage = config.connection.storage,
    );

    // The maximum size of the pool defines the maximum number of
    // allowed readers while writers require exclusive access.
    let pool_max_size = config.connection.pool.max_size;
    log::info!("Creating connection pool of max. size {pool_max_size}");
    let connection_pool =
        create_connection_pool(&config.connection.storage.connection_string(), pool_max_size)?;

    log::info!("Initializing database");
    let mut init_connection = get_pooled_connection(&connection_pool)?;
    initialize_database(&mut init_connection)?;

    if config.migrate_schema_on_startup {
        log::info!("Migrating database schema");
        let mut migration_connection = get_pooled_connection(&connection_pool)?;
        run_migrations(&mut migration_connection)
            .map_err(|err| anyhow::anyhow!(err.to_string()))?;
    }

    Ok(DatabaseConnectionGatekeeper::new(
        connection_pool,
        config.connection.pool.gatekeeper,
    ))
}

pub(crate) async fn run(config: Config) -> anyhow::Result<()> {
    let gatekeeper = Arc::new(provision_database(&config.database)?);

    let artifacts = ArtifactStore::new(&config.tasks.uploads_dir)?;
    log::info!(
        "Storing artifacts in: {uploads_dir}",
        uploads_dir = artifacts.uploads_dir().display()
    );

    let task_service = TaskService::new(
        Arc::clone(&gatekeeper),
        artifacts,
        TaskConfig {
            max_concurrent_tasks: config.tasks.max_concurrent_tasks,
        },
    );

    let filters = routing::create_filters(task_service).recover(routing::handle_rejection);

    let endpoint_addr = config.network.endpoint.socket_addr();
    let (socket_addr, server) =
        warp::serve(filters).try_bind_with_graceful_shutdown(endpoint_addr, async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for the shutdown signal: {err}");
            }
            log::info!("Shutting down");
        })?;
    log::info!("Listening on {socket_addr}");
    server.await;

    let pending_tasks = gatekeeper.pending_tasks();
    if pending_tasks.read > 0 || pending_tasks.write > 0 {
        log::warn!("Terminating with pending database tasks: {pending_tasks:?}");
    }
    Ok(())
}
