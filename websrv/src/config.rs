// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    net::{IpAddr, Ipv6Addr, SocketAddr},
    num::NonZeroUsize,
    path::PathBuf,
};

use serde::{Deserialize, Serialize};

use playtally_storage_sqlite::connection::{
    Config as DatabaseConnectionConfig, Storage,
    pool::Config as DatabaseConnectionPoolConfig,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub network: NetworkConfig,
    pub database: DatabaseConfig,
    pub tasks: TasksConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub endpoint: EndpointConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub ip_addr: IpAddr,
    pub port: u16,
}

const ENDPOINT_PORT_DEFAULT: u16 = 8080;

impl EndpointConfig {
    #[must_use]
    pub const fn socket_addr(self) -> SocketAddr {
        let Self { ip_addr, port } = self;
        SocketAddr::new(ip_addr, port)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            ip_addr: IpAddr::V6(Ipv6Addr::UNSPECIFIED),
            port: ENDPOINT_PORT_DEFAULT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub connection: DatabaseConnectionConfig,
    pub migrate_schema_on_startup: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connection: DatabaseConnectionConfig {
                storage: Storage::File {
                    path: default_uploads_dir().join("playtally.sqlite"),
                },
                pool: DatabaseConnectionPoolConfig::default(),
            },
            migrate_schema_on_startup: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TasksConfig {
    /// Directory for the input and output artifacts of all tasks.
    pub uploads_dir: PathBuf,

    /// Upper bound on concurrently processing uploads.
    pub max_concurrent_tasks: NonZeroUsize,
}

const DEFAULT_MAX_CONCURRENT_TASKS: NonZeroUsize = NonZeroUsize::new(4).unwrap();

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("uploads")
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            uploads_dir: default_uploads_dir(),
            max_concurrent_tasks: DEFAULT_MAX_CONCURRENT_TASKS,
        }
    }
}
