// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Parsing and aggregation of play records.

use std::collections::BTreeMap;

use thiserror::Error;

use playtally_core::play::{PlayCount, PlayRecord, PlayTotal};

/// Header row of the aggregated output artifact.
///
/// The exact text is a compatibility contract with downstream
/// consumers of the output files.
pub const OUTPUT_CSV_HEADER: &str = "Song,Date,Total Number of Plays for Date";

const MIN_RECORD_FIELDS: usize = 3;

#[derive(Error, Debug)]
pub enum MalformedRecordError {
    #[error("expected {MIN_RECORD_FIELDS} fields in row, found {0}")]
    MissingFields(usize),

    #[error("invalid play count {value:?}: {source}")]
    InvalidPlayCount {
        value: String,
        source: std::num::ParseIntError,
    },
}

/// Parse one data row of an uploaded file.
///
/// Only the first three comma-separated fields are read, any extra
/// fields are ignored. The play count must parse as a non-negative
/// integer. A trailing carriage return is tolerated for files with
/// CRLF line endings.
pub fn parse_play_record(line: &str) -> Result<PlayRecord, MalformedRecordError> {
    let line = line.trim_end_matches('\r');
    let fields: Vec<&str> = line.split(',').collect();
    if fields.len() < MIN_RECORD_FIELDS {
        return Err(MalformedRecordError::MissingFields(fields.len()));
    }
    let plays = fields[2]
        .trim()
        .parse::<PlayCount>()
        .map_err(|source| MalformedRecordError::InvalidPlayCount {
            value: fields[2].to_owned(),
            source,
        })?;
    Ok(PlayRecord {
        song: fields[0].to_owned(),
        date: fields[1].to_owned(),
        plays,
    })
}

/// Format one aggregated row for the output artifact, without the
/// trailing line break.
#[must_use]
pub fn play_total_csv_row(total: &PlayTotal) -> String {
    let PlayTotal {
        song,
        date,
        total_plays,
    } = total;
    format!("{song},{date},{total_plays}")
}

/// Fold raw rows into per-(song, date) totals.
///
/// Every (song, date) pair of the input appears exactly once in the
/// result, carrying the exact sum of its play counts. The result is
/// ordered ascending by song then date using ordinal string
/// comparison. Totals saturate instead of wrapping on overflow.
#[must_use]
pub fn aggregate_plays(records: impl IntoIterator<Item = PlayRecord>) -> Vec<PlayTotal> {
    let mut totals: BTreeMap<(String, String), PlayCount> = BTreeMap::new();
    for PlayRecord { song, date, plays } in records {
        let total = totals.entry((song, date)).or_default();
        *total = total.saturating_add(plays);
    }
    totals
        .into_iter()
        .map(|((song, date), total_plays)| PlayTotal {
            song,
            date,
            total_plays,
        })
        .collect()
}

#[cfg(test)]
mod tests;
