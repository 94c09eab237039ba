// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use playtally_core::{
    play::{PlayRecord, PlayTotal},
    task::TaskUid,
};

use crate::prelude::*;

/// Durable staging area for the raw rows of one task's processing run.
///
/// Rows are scoped per task so that concurrently processing tasks
/// cannot disturb each other. Grouping and summation happen inside the
/// store because the raw row volume may exceed memory: writes stay
/// append-only and cheap, reads return pre-aggregated groups.
pub trait StagingRepo {
    /// Remove all rows previously staged for this task.
    ///
    /// Idempotent. Must run before a task's ingestion starts. Returns
    /// the number of rows removed.
    fn reset_staged_plays(&mut self, task_uid: &TaskUid) -> RepoResult<usize>;

    /// Append one raw row for this task.
    fn insert_staged_play(&mut self, task_uid: &TaskUid, record: &PlayRecord) -> RepoResult<()>;

    /// Read back up to `limit` grouped and summed rows, ordered by
    /// (song, date) ascending, starting at `offset` groups.
    ///
    /// An empty result indicates that `offset` is at or beyond the
    /// number of distinct groups, which is the termination signal
    /// paginating consumers rely on.
    fn fetch_aggregated_plays(
        &mut self,
        task_uid: &TaskUid,
        pagination: &Pagination,
    ) -> RepoResult<Vec<PlayTotal>>;
}
