// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use playtally_core::{
    clock::TimestampMillis,
    task::{TaskState, TaskUid},
};

use crate::prelude::*;

use super::schema::*;

pub(crate) const STATE_SUBMITTED: i16 = 0;
pub(crate) const STATE_PROCESSING: i16 = 1;
pub(crate) const STATE_COMPLETED: i16 = 2;
pub(crate) const STATE_FAILED: i16 = 3;

pub(crate) fn encode_task_state(state: &TaskState) -> (i16, Option<String>) {
    match state {
        TaskState::Submitted => (STATE_SUBMITTED, None),
        TaskState::Processing => (STATE_PROCESSING, None),
        TaskState::Completed => (STATE_COMPLETED, None),
        TaskState::Failed { error_message } => (STATE_FAILED, Some(error_message.clone())),
    }
}

pub(crate) fn decode_task_state(
    state: i16,
    error_message: Option<String>,
) -> RepoResult<TaskState> {
    let decoded = match state {
        STATE_SUBMITTED => TaskState::Submitted,
        STATE_PROCESSING => TaskState::Processing,
        STATE_COMPLETED => TaskState::Completed,
        STATE_FAILED => TaskState::Failed {
            error_message: error_message.unwrap_or_default(),
        },
        unknown => {
            return Err(RepoError::Other(anyhow::anyhow!(
                "unknown task state: {unknown}"
            )));
        }
    };
    Ok(decoded)
}

#[derive(Debug, Insertable)]
#[diesel(table_name = task)]
pub(crate) struct InsertableRecord {
    pub(crate) row_created_ms: TimestampMillis,
    pub(crate) row_updated_ms: TimestampMillis,
    pub(crate) task_uid: String,
    pub(crate) state: i16,
    pub(crate) error_message: Option<String>,
}

impl InsertableRecord {
    pub(crate) fn bind(
        created_at: TimestampMillis,
        task_uid: &TaskUid,
        state: &TaskState,
    ) -> Self {
        let (state, error_message) = encode_task_state(state);
        Self {
            row_created_ms: created_at,
            row_updated_ms: created_at,
            task_uid: task_uid.to_string(),
            state,
            error_message,
        }
    }
}
