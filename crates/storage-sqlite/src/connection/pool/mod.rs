// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::num::NonZeroU32;

use diesel::{Connection as _, r2d2};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Result;

#[cfg(feature = "tokio")]
pub mod gatekeeper;

pub type ConnectionManager = r2d2::ConnectionManager<diesel::SqliteConnection>;

pub type ConnectionPool = r2d2::Pool<ConnectionManager>;

pub type PooledConnection = r2d2::PooledConnection<ConnectionManager>;

/// Pool sizing and task scheduling parameters.
///
/// The maximum size of the pool defines the maximum number of allowed
/// readers while writers require exclusive access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    pub max_size: NonZeroU32,

    #[cfg(feature = "tokio")]
    pub gatekeeper: gatekeeper::Config,
}

const DEFAULT_MAX_SIZE: NonZeroU32 = NonZeroU32::new(8).unwrap();

impl Default for Config {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            #[cfg(feature = "tokio")]
            gatekeeper: Default::default(),
        }
    }
}

pub fn create_connection_pool(connection: &str, max_size: NonZeroU32) -> Result<ConnectionPool> {
    // Establish a test connection before creating the connection pool
    // to fail early. If the given file is inaccessible r2d2 would do
    // multiple retries and log errors instead of simply returning an
    // error immediately.
    let _ = diesel::SqliteConnection::establish(connection)?;
    // The test connection is dropped immediately without using it
    // and missing files should have been created after reaching
    // this point.
    let manager = ConnectionManager::new(connection);
    let pool = ConnectionPool::builder()
        .max_size(max_size.get())
        .build(manager)?;
    Ok(pool)
}

pub fn get_pooled_connection(pool: &ConnectionPool) -> Result<PooledConnection> {
    pool.get().map_err(Into::into)
}
