// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use playtally_core::{
    clock::TimestampMillis,
    task::{TaskState, TaskUid},
};

use crate::prelude::*;

/// Persistent record of each task's lifecycle state.
///
/// Updated by the background half of the pipeline, including on the
/// failure path, so that polling callers receive a terminal signal
/// instead of waiting forever on a task that died.
pub trait TaskRepo {
    fn insert_task(
        &mut self,
        created_at: TimestampMillis,
        task_uid: &TaskUid,
        state: &TaskState,
    ) -> RepoResult<RecordId>;

    /// Fails with [`RepoError::NotFound`] if the task has never been
    /// recorded.
    fn update_task_state(
        &mut self,
        updated_at: TimestampMillis,
        task_uid: &TaskUid,
        state: &TaskState,
    ) -> RepoResult<()>;

    /// Fails with [`RepoError::NotFound`] if the task has never been
    /// recorded.
    fn load_task_state(&mut self, task_uid: &TaskUid) -> RepoResult<TaskState>;
}
