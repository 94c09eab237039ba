// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::{borrow::Cow, fmt, path::PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod pool;

/// Connection string of a private in-memory database that is wiped
/// when the last connection closes.
pub const IN_MEMORY_CONNECTION: &str = ":memory:";

/// Location of the SQLite database.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Storage {
    InMemory,
    File { path: PathBuf },
}

impl Storage {
    #[must_use]
    pub fn connection_string(&self) -> Cow<'_, str> {
        match self {
            Self::InMemory => Cow::Borrowed(IN_MEMORY_CONNECTION),
            Self::File { path } => path.to_string_lossy(),
        }
    }
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.connection_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    pub storage: Storage,
    pub pool: pool::Config,
}
