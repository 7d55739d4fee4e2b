// Copyright (c) 2025 Spendbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Errors surfaced by the store and the storage adapters.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Rejected input: non-positive amount, blank description, and the like.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The storage backend failed to read or write a slice.
    #[error("storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub(crate) fn storage(err: impl std::fmt::Display) -> Self {
        StoreError::Storage(err.to_string())
    }
}
