// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use playtally_core::{
    clock::TimestampMillis,
    task::{TaskState, TaskUid},
};
use playtally_repo::task::TaskRepo;

use crate::{
    db::task::{models::*, schema::*},
    prelude::*,
};

impl TaskRepo for Connection<'_> {
    fn insert_task(
        &mut self,
        created_at: TimestampMillis,
        task_uid: &TaskUid,
        state: &TaskState,
    ) -> RepoResult<RecordId> {
        let insertable = InsertableRecord::bind(created_at, task_uid, state);
        let query = diesel::insert_into(task::table).values(&insertable);
        let rows_affected = query.execute(self.as_mut()).map_err(repo_error)?;
        debug_assert_eq!(1, rows_affected);
        task::table
            .filter(task::task_uid.eq(task_uid.to_string()))
            .select(task::row_id)
            .first::<RecordId>(self.as_mut())
            .map_err(repo_error)
    }

    fn update_task_state(
        &mut self,
        updated_at: TimestampMillis,
        task_uid: &TaskUid,
        state: &TaskState,
    ) -> RepoResult<()> {
        let (state, error_message) = encode_task_state(state);
        let target = task::table.filter(task::task_uid.eq(task_uid.to_string()));
        let query = diesel::update(target).set((
            task::row_updated_ms.eq(updated_at),
            task::state.eq(state),
            task::error_message.eq(error_message),
        ));
        let rows_affected = query.execute(self.as_mut()).map_err(repo_error)?;
        if rows_affected < 1 {
            return Err(RepoError::NotFound);
        }
        debug_assert_eq!(1, rows_affected);
        Ok(())
    }

    fn load_task_state(&mut self, task_uid: &TaskUid) -> RepoResult<TaskState> {
        task::table
            .filter(task::task_uid.eq(task_uid.to_string()))
            .select((task::state, task::error_message))
            .first::<(i16, Option<String>)>(self.as_mut())
            .map_err(repo_error)
            .and_then(|(state, error_message)| decode_task_state(state, error_message))
    }
}

#[cfg(test)]
mod tests;
