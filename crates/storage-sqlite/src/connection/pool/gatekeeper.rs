// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    num::NonZeroU64,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use tokio::{sync::RwLock, task::spawn_blocking, time::sleep};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

use super::{ConnectionPool, PooledConnection, get_pooled_connection};

/// Manage database connections for asynchronous tasks.
///
/// Only a single writer is allowed to access the `SQLite` database at
/// any given time. Reader tasks share the inner lock and writer tasks
/// take it exclusively, so concurrent write operations never collide
/// on a shared database instance and never time out each other's
/// connections.
#[allow(missing_debug_implementations)]
pub struct Gatekeeper {
    connection_pool: Arc<RwLock<ConnectionPool>>,
    acquire_read_timeout: Duration,
    acquire_write_timeout: Duration,
    pending_task_counters: Arc<PendingTaskCounters>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    pub acquire_read_timeout_millis: NonZeroU64,
    pub acquire_write_timeout_millis: NonZeroU64,
}

const DEFAULT_ACQUIRE_READ_TIMEOUT_MILLIS: NonZeroU64 = NonZeroU64::new(10_000).unwrap();

const DEFAULT_ACQUIRE_WRITE_TIMEOUT_MILLIS: NonZeroU64 = NonZeroU64::new(30_000).unwrap();

impl Default for Config {
    fn default() -> Self {
        Self {
            acquire_read_timeout_millis: DEFAULT_ACQUIRE_READ_TIMEOUT_MILLIS,
            acquire_write_timeout_millis: DEFAULT_ACQUIRE_WRITE_TIMEOUT_MILLIS,
        }
    }
}

/// Number of tasks that have been submitted but not yet finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTasks {
    pub read: usize,
    pub write: usize,
}

#[derive(Debug, Default)]
struct PendingTaskCounters {
    read: AtomicUsize,
    write: AtomicUsize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskMode {
    Read,
    Write,
}

impl PendingTaskCounters {
    const fn counter(&self, mode: TaskMode) -> &AtomicUsize {
        match mode {
            TaskMode::Read => &self.read,
            TaskMode::Write => &self.write,
        }
    }
}

/// Counts a task as pending for the duration of its scope.
struct PendingTaskScope {
    counters: Arc<PendingTaskCounters>,
    mode: TaskMode,
}

impl PendingTaskScope {
    #[must_use]
    fn start(counters: Arc<PendingTaskCounters>, mode: TaskMode) -> Self {
        let pending_before = counters.counter(mode).fetch_add(1, Ordering::Relaxed);
        log::debug!(
            "Starting {mode:?} task: {pending} pending {mode:?} task(s)",
            pending = pending_before + 1
        );
        Self { counters, mode }
    }
}

impl Drop for PendingTaskScope {
    fn drop(&mut self) {
        let pending_before = self
            .counters
            .counter(self.mode)
            .fetch_sub(1, Ordering::Relaxed);
        debug_assert!(pending_before > 0);
    }
}

impl Gatekeeper {
    #[must_use]
    pub fn new(connection_pool: ConnectionPool, config: Config) -> Self {
        let Config {
            acquire_read_timeout_millis,
            acquire_write_timeout_millis,
        } = config;
        Self {
            connection_pool: Arc::new(RwLock::new(connection_pool)),
            acquire_read_timeout: Duration::from_millis(acquire_read_timeout_millis.get()),
            acquire_write_timeout: Duration::from_millis(acquire_write_timeout_millis.get()),
            pending_task_counters: Default::default(),
        }
    }

    #[must_use]
    pub fn pending_tasks(&self) -> PendingTasks {
        PendingTasks {
            read: self.pending_task_counters.read.load(Ordering::Relaxed),
            write: self.pending_task_counters.write.load(Ordering::Relaxed),
        }
    }

    pub async fn spawn_blocking_read_task<H, R>(&self, connection_handler: H) -> Result<R>
    where
        H: FnOnce(PooledConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        let _pending_task_scope = PendingTaskScope::start(
            Arc::clone(&self.pending_task_counters),
            TaskMode::Read,
        );
        let timeout = sleep(self.acquire_read_timeout);
        tokio::pin!(timeout);
        tokio::select! {
            () = &mut timeout => Err(Error::TaskTimeout { reason: "database is locked".to_owned() }),
            guard = self.connection_pool.read() => {
                let connection = get_pooled_connection(&guard)?;
                spawn_blocking(move || connection_handler(connection))
                    .await
                    .map_err(Error::TaskScheduling)
            },
        }
    }

    pub async fn spawn_blocking_write_task<H, R>(&self, connection_handler: H) -> Result<R>
    where
        H: FnOnce(PooledConnection) -> R + Send + 'static,
        R: Send + 'static,
    {
        let _pending_task_scope = PendingTaskScope::start(
            Arc::clone(&self.pending_task_counters),
            TaskMode::Write,
        );
        let timeout = sleep(self.acquire_write_timeout);
        tokio::pin!(timeout);
        tokio::select! {
            () = &mut timeout => Err(Error::TaskTimeout { reason: "database is locked".to_owned() }),
            guard = self.connection_pool.write() => {
                let connection = get_pooled_connection(&guard)?;
                spawn_blocking(move || connection_handler(connection))
                    .await
                    .map_err(Error::TaskScheduling)
            },
        }
    }
}
