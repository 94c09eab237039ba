// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use playtally_core::{
    play::{PlayCount, PlayRecord, PlayTotal},
    task::TaskUid,
};

use crate::prelude::*;

use super::schema::*;

#[derive(Debug, Insertable)]
#[diesel(table_name = staged_play)]
pub(crate) struct InsertableRecord<'a> {
    pub(crate) task_uid: String,
    pub(crate) song: &'a str,
    pub(crate) date: &'a str,
    pub(crate) plays: i64,
}

impl<'a> InsertableRecord<'a> {
    pub(crate) fn bind(task_uid: &TaskUid, record: &'a PlayRecord) -> Self {
        let PlayRecord { song, date, plays } = record;
        Self {
            task_uid: task_uid.to_string(),
            song,
            date,
            plays: *plays as i64,
        }
    }
}

/// One pre-grouped row as returned by the aggregating read-back query.
///
/// `SUM()` is nullable in SQL even though every group contains at
/// least one row, hence the optional count.
#[derive(Debug, Queryable)]
pub(crate) struct QueryableAggregatedRecord {
    pub(crate) song: String,
    pub(crate) date: String,
    pub(crate) total_plays: Option<i64>,
}

impl From<QueryableAggregatedRecord> for PlayTotal {
    fn from(from: QueryableAggregatedRecord) -> Self {
        let QueryableAggregatedRecord {
            song,
            date,
            total_plays,
        } = from;
        Self {
            song,
            date,
            total_plays: total_plays.unwrap_or_default() as PlayCount,
        }
    }
}
