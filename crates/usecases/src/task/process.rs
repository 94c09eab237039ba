// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{
    fs::File,
    io::{BufRead as _, BufReader},
    path::Path,
    sync::Arc,
};

use tokio::io::AsyncWriteExt as _;

use playtally_core::{
    clock::now_timestamp_millis,
    play::PlayTotal,
    task::{TaskState, TaskUid},
};
use playtally_repo::{Pagination, PaginationLimit, staging::StagingRepo as _, task::TaskRepo as _};
use playtally_repo_sqlite::prelude::Connection;

use crate::{Error, Result, plays};

use super::TaskService;

/// Number of aggregated groups fetched from the staging store per page
/// while writing the output artifact.
const FETCH_PAGE_LIMIT: PaginationLimit = 500;

impl TaskService {
    /// Background half of one task: ingest, aggregate, publish.
    ///
    /// Never propagates an error to the spawning context. The outcome
    /// is recorded in the task record and the log, where polling
    /// callers pick it up.
    pub(super) async fn process(self, task_uid: TaskUid) {
        let Ok(_processing_permit) = Arc::clone(&self.processing_permits).acquire_owned().await
        else {
            // The semaphore is never closed while the service exists.
            return;
        };
        log::info!("Task {task_uid}: processing started");
        match self.run_pipeline(task_uid).await {
            Ok(group_count) => {
                log::info!("Task {task_uid}: completed with {group_count} aggregated row(s)");
            }
            Err(err) => {
                log::error!("Task {task_uid}: processing failed: {err}");
                self.record_failure(task_uid, &err).await;
            }
        }
    }

    async fn run_pipeline(&self, task_uid: TaskUid) -> Result<u64> {
        self.update_task_state(task_uid, TaskState::Processing)
            .await?;

        // Stage all raw rows of the input artifact.
        let input_path = self.artifacts.input_path(&task_uid);
        let ingested_count = self
            .gatekeeper
            .spawn_blocking_write_task(move |mut pooled_connection| {
                ingest_staged_plays(
                    &mut Connection::new(&mut pooled_connection),
                    &task_uid,
                    &input_path,
                )
            })
            .await??;
        log::debug!("Task {task_uid}: staged {ingested_count} row(s)");

        // Page the grouped rows out into the output artifact.
        let partial_path = self.artifacts.partial_output_path(&task_uid);
        let mut output = tokio::io::BufWriter::new(tokio::fs::File::create(&partial_path).await?);
        output.write_all(plays::OUTPUT_CSV_HEADER.as_bytes()).await?;
        output.write_all(b"\n").await?;
        let mut group_count = 0u64;
        loop {
            let page = self.fetch_aggregated_page(task_uid, group_count).await?;
            if page.is_empty() {
                break;
            }
            let mut encoded = String::new();
            for total in &page {
                encoded.push_str(&plays::play_total_csv_row(total));
                encoded.push('\n');
            }
            output.write_all(encoded.as_bytes()).await?;
            group_count += page.len() as u64;
            log::debug!("Task {task_uid}: wrote {group_count} aggregated row(s)");
        }
        output.flush().await?;
        output.into_inner().sync_all().await?;
        let output_path = self.artifacts.finalize_output(&task_uid)?;
        log::info!(
            "Task {task_uid}: finalized output artifact: {path}",
            path = output_path.display()
        );

        self.update_task_state(task_uid, TaskState::Completed)
            .await?;
        Ok(group_count)
    }

    async fn fetch_aggregated_page(
        &self,
        task_uid: TaskUid,
        offset: u64,
    ) -> Result<Vec<PlayTotal>> {
        let pagination = Pagination::page(FETCH_PAGE_LIMIT, offset);
        let page = self
            .gatekeeper
            .spawn_blocking_read_task(move |mut pooled_connection| {
                Connection::new(&mut pooled_connection)
                    .fetch_aggregated_plays(&task_uid, &pagination)
            })
            .await??;
        Ok(page)
    }

    async fn update_task_state(&self, task_uid: TaskUid, state: TaskState) -> Result<()> {
        let updated_at = now_timestamp_millis();
        self.gatekeeper
            .spawn_blocking_write_task(move |mut pooled_connection| {
                Connection::new(&mut pooled_connection).update_task_state(
                    updated_at,
                    &task_uid,
                    &state,
                )
            })
            .await??;
        Ok(())
    }

    async fn record_failure(&self, task_uid: TaskUid, err: &Error) {
        let state = TaskState::Failed {
            error_message: err.to_string(),
        };
        if let Err(err) = self.update_task_state(task_uid, state).await {
            log::warn!("Task {task_uid}: failed to record failure: {err}");
        }
    }
}

/// Reset the task's staging rows, then parse and stage every data row
/// of the input artifact. The first line is the header and is skipped
/// unparsed.
fn ingest_staged_plays(
    repo: &mut Connection<'_>,
    task_uid: &TaskUid,
    input_path: &Path,
) -> Result<u64> {
    repo.reset_staged_plays(task_uid)?;
    let input = BufReader::new(File::open(input_path)?);
    let mut lines = input.lines();
    if let Some(header) = lines.next() {
        // Discard the header row without validating it.
        let _header = header?;
    }
    let mut ingested_count = 0u64;
    for line in lines {
        let record =
            plays::parse_play_record(&line?).map_err(|err| Error::Input(err.into()))?;
        repo.insert_staged_play(task_uid, &record)?;
        ingested_count += 1;
    }
    Ok(ingested_count)
}
