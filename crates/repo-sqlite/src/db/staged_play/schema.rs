// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

diesel::table! {
    staged_play (row_id) {
        row_id -> BigInt,
        task_uid -> Text,
        song -> Text,
        date -> Text,
        plays -> BigInt,
    }
}
