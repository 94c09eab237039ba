// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use test_log::test;

use playtally_core::clock::now_timestamp_millis;

use crate::prelude::tests::*;

use super::*;

struct Fixture {
    db: DbConnection,
}

impl Fixture {
    fn new() -> TestResult<Self> {
        let db = establish_connection()?;
        Ok(Self { db })
    }
}

#[test]
fn insert_and_load_task_state() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let task_uid = TaskUid::random();

    let mut repo = Connection::new(&mut fixture.db);
    repo.insert_task(now_timestamp_millis(), &task_uid, &TaskState::Submitted)?;

    assert_eq!(TaskState::Submitted, repo.load_task_state(&task_uid)?);
    Ok(())
}

#[test]
fn load_task_state_of_unknown_task() -> TestResult<()> {
    let mut fixture = Fixture::new()?;

    let mut repo = Connection::new(&mut fixture.db);
    assert!(matches!(
        repo.load_task_state(&TaskUid::random()),
        Err(RepoError::NotFound)
    ));
    Ok(())
}

#[test]
fn update_task_state_of_unknown_task() -> TestResult<()> {
    let mut fixture = Fixture::new()?;

    let mut repo = Connection::new(&mut fixture.db);
    assert!(matches!(
        repo.update_task_state(
            now_timestamp_millis(),
            &TaskUid::random(),
            &TaskState::Processing
        ),
        Err(RepoError::NotFound)
    ));
    Ok(())
}

#[test]
fn update_task_state_through_lifecycle() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let task_uid = TaskUid::random();

    let mut repo = Connection::new(&mut fixture.db);
    repo.insert_task(now_timestamp_millis(), &task_uid, &TaskState::Submitted)?;

    repo.update_task_state(now_timestamp_millis(), &task_uid, &TaskState::Processing)?;
    assert_eq!(TaskState::Processing, repo.load_task_state(&task_uid)?);

    repo.update_task_state(now_timestamp_millis(), &task_uid, &TaskState::Completed)?;
    assert_eq!(TaskState::Completed, repo.load_task_state(&task_uid)?);
    Ok(())
}

#[test]
fn update_task_state_failed_stores_error_message() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let task_uid = TaskUid::random();

    let mut repo = Connection::new(&mut fixture.db);
    repo.insert_task(now_timestamp_millis(), &task_uid, &TaskState::Submitted)?;

    let failed = TaskState::Failed {
        error_message: "invalid play count".to_owned(),
    };
    repo.update_task_state(now_timestamp_millis(), &task_uid, &failed)?;

    assert_eq!(failed, repo.load_task_state(&task_uid)?);
    Ok(())
}
