// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use diesel::dsl::sql;
use diesel::sql_types::{BigInt, Nullable};

use playtally_core::{
    play::{PlayRecord, PlayTotal},
    task::TaskUid,
};
use playtally_repo::staging::StagingRepo;

use crate::{
    db::staged_play::{models::*, schema::*},
    prelude::*,
};

impl StagingRepo for Connection<'_> {
    fn reset_staged_plays(&mut self, task_uid: &TaskUid) -> RepoResult<usize> {
        let target =
            staged_play::table.filter(staged_play::task_uid.eq(task_uid.to_string()));
        let rows_deleted = diesel::delete(target)
            .execute(self.as_mut())
            .map_err(repo_error)?;
        log::debug!("Removed {rows_deleted} staged row(s) of task {task_uid}");
        Ok(rows_deleted)
    }

    fn insert_staged_play(&mut self, task_uid: &TaskUid, record: &PlayRecord) -> RepoResult<()> {
        let insertable = InsertableRecord::bind(task_uid, record);
        let query = diesel::insert_into(staged_play::table).values(&insertable);
        let rows_affected = query.execute(self.as_mut()).map_err(repo_error)?;
        debug_assert_eq!(1, rows_affected);
        Ok(())
    }

    fn fetch_aggregated_plays(
        &mut self,
        task_uid: &TaskUid,
        pagination: &Pagination,
    ) -> RepoResult<Vec<PlayTotal>> {
        // SQLite: OFFSET can only be used in conjunction with LIMIT.
        let limit = pagination.limit.map_or(i64::MAX, |limit| limit as i64);
        let offset = pagination.offset.map_or(0, |offset| offset as i64);
        staged_play::table
            .filter(staged_play::task_uid.eq(task_uid.to_string()))
            .group_by((staged_play::song, staged_play::date))
            .select((
                staged_play::song,
                staged_play::date,
                sql::<Nullable<BigInt>>("SUM(plays)"),
            ))
            .order_by(staged_play::song.asc())
            .then_order_by(staged_play::date.asc())
            .limit(limit)
            .offset(offset)
            .load::<QueryableAggregatedRecord>(self.as_mut())
            .map_err(repo_error)
            .map(|records| {
                log::debug!(
                    "Fetched {count} aggregated row(s) of task {task_uid}",
                    count = records.len()
                );
                records.into_iter().map(Into::into).collect()
            })
    }
}

#[cfg(test)]
mod tests;
