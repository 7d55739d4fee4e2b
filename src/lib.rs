// Copyright (c) 2025 Spendbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod budget;
pub mod categories;
pub mod currencies;
pub mod error;
pub mod models;
pub mod recurrence;
pub mod stats;
pub mod storage;
pub mod store;
