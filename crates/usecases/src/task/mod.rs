// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! The task lifecycle: submission, background processing, polling.

use std::{num::NonZeroUsize, path::PathBuf, sync::Arc};

use tokio::sync::Semaphore;

use playtally_core::{
    clock::now_timestamp_millis,
    task::{TaskState, TaskUid},
};
use playtally_repo::{prelude::OptionalRepoResult as _, task::TaskRepo as _};
use playtally_repo_sqlite::prelude::Connection;
use playtally_storage_sqlite::connection::pool::gatekeeper::Gatekeeper;

use crate::{Error, Result, artifact::ArtifactStore};

mod process;


/// Caller-visible status of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    /// The output artifact exists and is complete.
    Completed { output_path: PathBuf },

    /// The task has been accepted and has neither finished nor failed
    /// yet.
    Processing,

    /// Background processing failed. The task will never complete.
    Failed { error_message: String },

    /// Neither artifacts nor a task record exist for this uid.
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Upper bound on concurrently processing background tasks.
    ///
    /// Submissions beyond the bound are accepted and wait for a free
    /// slot instead of being rejected.
    pub max_concurrent_tasks: NonZeroUsize,
}

const DEFAULT_MAX_CONCURRENT_TASKS: NonZeroUsize = NonZeroUsize::new(4).unwrap();

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: DEFAULT_MAX_CONCURRENT_TASKS,
        }
    }
}

/// Entry point for the upload→process→retrieve pipeline.
///
/// Cloning is cheap, all handles are shared.
#[derive(Clone)]
#[allow(missing_debug_implementations)]
pub struct TaskService {
    gatekeeper: Arc<Gatekeeper>,
    artifacts: ArtifactStore,
    processing_permits: Arc<Semaphore>,
}

impl TaskService {
    #[must_use]
    pub fn new(gatekeeper: Arc<Gatekeeper>, artifacts: ArtifactStore, config: Config) -> Self {
        let Config {
            max_concurrent_tasks,
        } = config;
        Self {
            gatekeeper,
            artifacts,
            processing_permits: Arc::new(Semaphore::new(max_concurrent_tasks.get())),
        }
    }

    #[must_use]
    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    /// Accept an uploaded file and start background processing.
    ///
    /// Returns as soon as the input artifact is persisted, the task is
    /// recorded, and the background task has been launched. Never
    /// waits for processing to finish.
    pub async fn submit(&self, input_bytes: Vec<u8>) -> Result<TaskUid> {
        if input_bytes.is_empty() {
            return Err(Error::Input(anyhow::anyhow!("empty upload")));
        }

        let task_uid = TaskUid::random();
        let input_path = self.artifacts.input_path(&task_uid);
        tokio::fs::write(&input_path, &input_bytes).await?;
        log::info!(
            "Task {task_uid}: persisted input artifact: {path}",
            path = input_path.display()
        );

        let created_at = now_timestamp_millis();
        self.gatekeeper
            .spawn_blocking_write_task(move |mut pooled_connection| {
                Connection::new(&mut pooled_connection).insert_task(
                    created_at,
                    &task_uid,
                    &TaskState::Submitted,
                )
            })
            .await??;

        let service = self.clone();
        tokio::spawn(async move {
            service.process(task_uid).await;
        });

        log::info!("Task {task_uid}: submitted");
        Ok(task_uid)
    }

    /// Report the status of a task.
    ///
    /// The existence of the output artifact is the completion signal.
    /// An input artifact without a task record still reports as
    /// processing, which distinguishes "not finished yet" from "never
    /// existed".
    pub async fn poll_status(&self, task_uid: &TaskUid) -> Result<TaskStatus> {
        if self.artifacts.has_output(task_uid) {
            return Ok(TaskStatus::Completed {
                output_path: self.artifacts.output_path(task_uid),
            });
        }
        let uid = *task_uid;
        let state = self
            .gatekeeper
            .spawn_blocking_read_task(move |mut pooled_connection| {
                Connection::new(&mut pooled_connection)
                    .load_task_state(&uid)
                    .optional()
            })
            .await??;
        let status = match state {
            Some(TaskState::Failed { error_message }) => TaskStatus::Failed { error_message },
            Some(_) => TaskStatus::Processing,
            None if self.artifacts.has_input(task_uid) => TaskStatus::Processing,
            None => TaskStatus::NotFound,
        };
        Ok(status)
    }
}
