// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::collections::BTreeSet;

use super::*;

fn record(song: &str, date: &str, plays: PlayCount) -> PlayRecord {
    PlayRecord {
        song: song.to_owned(),
        date: date.to_owned(),
        plays,
    }
}

fn sample_records() -> Vec<PlayRecord> {
    vec![
        record("Song D", "2020-01-02", 7),
        record("Song A", "2020-01-01", 10),
        record("Song A", "2020-01-02", 2),
        record("Song A", "2020-01-01", 5),
        record("Song B", "2020-01-02", 3),
        record("Song D", "2020-01-02", 0),
    ]
}

#[test]
fn parse_play_record_reads_first_three_fields() {
    assert_eq!(
        record("Song A", "2020-01-01", 42),
        parse_play_record("Song A,2020-01-01,42").expect("parsable row")
    );
    // Extra fields are ignored.
    assert_eq!(
        record("Song A", "2020-01-01", 42),
        parse_play_record("Song A,2020-01-01,42,extra,fields").expect("parsable row")
    );
    // CRLF line endings are tolerated.
    assert_eq!(
        record("Song A", "2020-01-01", 42),
        parse_play_record("Song A,2020-01-01,42\r").expect("parsable row")
    );
}

#[test]
fn parse_play_record_with_missing_fields() {
    assert!(matches!(
        parse_play_record("Song A,2020-01-01"),
        Err(MalformedRecordError::MissingFields(2))
    ));
    assert!(matches!(
        parse_play_record(""),
        Err(MalformedRecordError::MissingFields(1))
    ));
}

#[test]
fn parse_play_record_with_invalid_play_count() {
    assert!(matches!(
        parse_play_record("Song A,2020-01-01,abc"),
        Err(MalformedRecordError::InvalidPlayCount { .. })
    ));
    // Play counts are non-negative.
    assert!(matches!(
        parse_play_record("Song A,2020-01-01,-1"),
        Err(MalformedRecordError::InvalidPlayCount { .. })
    ));
}

#[test]
fn aggregate_plays_empty_input() {
    assert!(aggregate_plays([]).is_empty());
}

#[test]
fn aggregate_plays_scenario() {
    let records = [
        record("A", "2020-01-01", 10),
        record("A", "2020-01-01", 5),
        record("B", "2020-01-02", 3),
    ];
    let expected = vec![
        PlayTotal {
            song: "A".to_owned(),
            date: "2020-01-01".to_owned(),
            total_plays: 15,
        },
        PlayTotal {
            song: "B".to_owned(),
            date: "2020-01-02".to_owned(),
            total_plays: 3,
        },
    ];
    assert_eq!(expected, aggregate_plays(records));
}

#[test]
fn aggregate_plays_preserves_total_sum() {
    let records = sample_records();
    let input_sum: PlayCount = records.iter().map(|record| record.plays).sum();

    let totals = aggregate_plays(records);
    let output_sum: PlayCount = totals.iter().map(|total| total.total_plays).sum();

    assert_eq!(input_sum, output_sum);
}

#[test]
fn aggregate_plays_covers_exactly_the_distinct_pairs() {
    let records = sample_records();
    let input_pairs: BTreeSet<(String, String)> = records
        .iter()
        .map(|record| (record.song.clone(), record.date.clone()))
        .collect();

    let totals = aggregate_plays(records);
    let output_pairs: BTreeSet<(String, String)> = totals
        .iter()
        .map(|total| (total.song.clone(), total.date.clone()))
        .collect();

    // No pair invented, none dropped, no duplicates.
    assert_eq!(input_pairs, output_pairs);
    assert_eq!(output_pairs.len(), totals.len());
}

#[test]
fn aggregate_plays_is_idempotent() {
    let records = sample_records();
    assert_eq!(
        aggregate_plays(records.clone()),
        aggregate_plays(records)
    );
}

#[test]
fn aggregate_plays_output_is_strictly_sorted() {
    let totals = aggregate_plays(sample_records());
    assert!(
        totals
            .windows(2)
            .all(|window| window[0].group_key() < window[1].group_key())
    );
}

#[test]
fn play_total_csv_row_format() {
    let total = PlayTotal {
        song: "Song A".to_owned(),
        date: "2020-01-01".to_owned(),
        total_plays: 15,
    };
    assert_eq!("Song A,2020-01-01,15", play_total_csv_row(&total));
}
