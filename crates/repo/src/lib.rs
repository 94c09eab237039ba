// SPDX-FileCopyrightText: Copyright (C) 2025-2026 playtally contributors
// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod staging;
pub mod task;

/// Numeric key of a stored record, i.e. the `SQLite` rowid.
pub type RecordId = i64;

pub type PaginationOffset = u64;

pub type PaginationLimit = u64;

/// Limit/offset pagination of grouped query results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pagination {
    pub limit: Option<PaginationLimit>,
    pub offset: Option<PaginationOffset>,
}

impl Pagination {
    /// One fixed-size page starting at `offset` groups.
    #[must_use]
    pub const fn page(limit: PaginationLimit, offset: PaginationOffset) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }
}

pub mod prelude {
    use thiserror::Error;

    pub use crate::{Pagination, PaginationLimit, PaginationOffset, RecordId};

    #[derive(Error, Debug)]
    pub enum RepoError {
        #[error("not found")]
        NotFound,

        #[error(transparent)]
        Other(#[from] anyhow::Error),
    }

    pub type RepoResult<T> = Result<T, RepoError>;

    pub trait OptionalRepoResult<T> {
        fn optional(self) -> RepoResult<Option<T>>;
    }

    impl<T> OptionalRepoResult<T> for Result<T, RepoError> {
        fn optional(self) -> RepoResult<Option<T>> {
            self.map_or_else(
                |err| {
                    if matches!(err, RepoError::NotFound) {
                        Ok(None)
                    } else {
                        Err(err)
                    }
                },
                |val| Ok(Some(val)),
            )
        }
    }
}
