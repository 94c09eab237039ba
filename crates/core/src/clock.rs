// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

/// Milliseconds since the Unix epoch, the resolution of all stored
/// row timestamps.
pub type TimestampMillis = i64;

#[must_use]
pub fn now_timestamp_millis() -> TimestampMillis {
    jiff::Timestamp::now().as_millisecond()
}
