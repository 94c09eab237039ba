// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{fmt, str::FromStr};

use thiserror::Error;
use uuid::Uuid;

///////////////////////////////////////////////////////////////////////
// TaskUid
///////////////////////////////////////////////////////////////////////

/// Unique identity of one upload-to-output processing run.
///
/// Generated once when an upload is accepted and never reused. The
/// canonical textual form is the hyphenated UUID rendering, which also
/// appears in the names of the persisted artifacts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskUid(Uuid);

impl TaskUid {
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct DecodeError(#[from] uuid::Error);

impl fmt::Display for TaskUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TaskUid {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self).map_err(Into::into)
    }
}

///////////////////////////////////////////////////////////////////////
// TaskState
///////////////////////////////////////////////////////////////////////

/// Lifecycle of a task as recorded in persistent storage.
///
/// `Submitted → Processing → Completed | Failed`, with no transitions
/// out of a terminal state. Completion of a task is ultimately derived
/// from the existence of its output artifact; the persisted state adds
/// the terminal failure signal that artifact presence cannot express.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaskState {
    Submitted,
    Processing,
    Completed,
    Failed { error_message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_uid_encode_decode_roundtrip() {
        let uid = TaskUid::random();
        let encoded = uid.to_string();
        let decoded = encoded.parse::<TaskUid>().expect("decodable uid");
        assert_eq!(uid, decoded);
    }

    #[test]
    fn task_uids_are_distinct() {
        assert_ne!(TaskUid::random(), TaskUid::random());
    }

    #[test]
    fn decoding_garbage_fails() {
        assert!("not-a-task-uid".parse::<TaskUid>().is_err());
    }
}
