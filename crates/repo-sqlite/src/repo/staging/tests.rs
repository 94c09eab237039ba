// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use test_log::test;

use playtally_core::play::PlayCount;

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

    fn stage_rows(
        &mut self,
        task_uid: &TaskUid,
        rows: &[(&str, &str, PlayCount)],
    ) -> TestResult<()> {
        let mut repo = Connection::new(&mut self.db);
        for (song, date, plays) in rows {
            let record = PlayRecord {
                song: (*song).to_owned(),
                date: (*date).to_owned(),
                plays: *plays,
            };
            repo.insert_staged_play(task_uid, &record)?;
        }
        Ok(())
    }

    fn fetch_all(&mut self, task_uid: &TaskUid) -> TestResult<Vec<PlayTotal>> {
        let fetched =
            Connection::new(&mut self.db).fetch_aggregated_plays(task_uid, &Default::default())?;
        Ok(fetched)
    }
}

fn play_total(song: &str, date: &str, total_plays: PlayCount) -> PlayTotal {
    PlayTotal {
        song: song.to_owned(),
        date: date.to_owned(),
        total_plays,
    }
}

#[test]
fn fetch_aggregated_plays_groups_and_sorts() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let task_uid = TaskUid::random();
    // Deliberately unordered input with a duplicate (song, date) pair.
    fixture.stage_rows(
        &task_uid,
        &[
            ("Song B", "2020-01-02", 3),
            ("Song A", "2020-01-01", 10),
            ("Song A", "2020-01-01", 5),
        ],
    )?;

    let fetched = fixture.fetch_all(&task_uid)?;

    assert_eq!(
        vec![
            play_total("Song A", "2020-01-01", 15),
            play_total("Song B", "2020-01-02", 3),
        ],
        fetched
    );
    Ok(())
}

#[test]
fn fetch_aggregated_plays_empty_store() -> TestResult<()> {
    let mut fixture = Fixture::new()?;

    let fetched = fixture.fetch_all(&TaskUid::random())?;

    assert!(fetched.is_empty());
    Ok(())
}

#[test]
fn fetch_aggregated_plays_paginated_pages_concatenate() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let task_uid = TaskUid::random();
    let mut rows = Vec::new();
    for i in 0..7u64 {
        rows.push((format!("Song {i}"), "2020-01-01".to_owned(), i));
    }
    let borrowed: Vec<_> = rows
        .iter()
        .map(|(song, date, plays)| (song.as_str(), date.as_str(), *plays))
        .collect();
    fixture.stage_rows(&task_uid, &borrowed)?;

    let page_limit = 3;
    let mut concatenated = Vec::new();
    let mut offset = 0;
    loop {
        let page = Connection::new(&mut fixture.db)
            .fetch_aggregated_plays(&task_uid, &Pagination::page(page_limit, offset))?;
        if page.is_empty() {
            break;
        }
        assert!(page.len() as PaginationLimit <= page_limit);
        offset += page.len() as PaginationOffset;
        concatenated.extend(page);
    }

    assert_eq!(fixture.fetch_all(&task_uid)?, concatenated);
    Ok(())
}

#[test]
fn fetch_aggregated_plays_offset_beyond_groups_is_empty() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let task_uid = TaskUid::random();
    fixture.stage_rows(&task_uid, &[("Song A", "2020-01-01", 1)])?;

    let page = Connection::new(&mut fixture.db)
        .fetch_aggregated_plays(&task_uid, &Pagination::page(500, 1))?;

    assert!(page.is_empty());
    Ok(())
}

#[test]
fn reset_staged_plays_is_scoped_per_task() -> TestResult<()> {
    let mut fixture = Fixture::new()?;
    let task_uid = TaskUid::random();
    let other_task_uid = TaskUid::random();
    fixture.stage_rows(&task_uid, &[("Song A", "2020-01-01", 1)])?;
    fixture.stage_rows(&other_task_uid, &[("Song B", "2020-01-02", 2)])?;

    let rows_deleted = Connection::new(&mut fixture.db).reset_staged_plays(&task_uid)?;
    assert_eq!(1, rows_deleted);

    // Only the reset task's rows are gone.
    assert!(fixture.fetch_all(&task_uid)?.is_empty());
    assert_eq!(
        vec![play_total("Song B", "2020-01-02", 2)],
        fixture.fetch_all(&other_task_uid)?
    );

    // Resetting again is a no-op.
    let rows_deleted = Connection::new(&mut fixture.db).reset_staged_plays(&task_uid)?;
    assert_eq!(0, rows_deleted);
    Ok(())
}
