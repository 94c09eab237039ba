// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

diesel::table! {
    task (row_id) {
        row_id -> BigInt,
        row_created_ms -> BigInt,
        row_updated_ms -> BigInt,
        task_uid -> Text,
        state -> SmallInt,
        error_message -> Nullable<Text>,
    }
}
