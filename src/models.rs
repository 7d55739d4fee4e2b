// Copyright (c) 2025 Spendbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single recorded expense. `currency` is stamped from the store's active
/// currency at creation time and never rewritten afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub amount: Decimal,
    pub description: String,
    pub category_id: String,
    pub date: DateTime<Utc>,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_recurring: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_id: Option<String>,
}

/// Caller-supplied fields for a new expense. Id, currency and the recurring
/// back-reference are assigned by the store.
#[derive(Debug, Clone, Default)]
pub struct ExpenseDraft {
    pub amount: Decimal,
    pub description: String,
    pub category_id: String,
    /// Effective date; `None` means "now".
    pub date: Option<DateTime<Utc>>,
    pub images: Vec<String>,
}

/// Partial update for an expense; only present fields are merged.
#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub images: Option<Vec<String>>,
}

/// How often a recurring template produces a concrete expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
}

/// Budget evaluation window: rolling seven days or the current calendar
/// month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
}

/// categoryId -> period -> limit. No entry means "no budget set", not zero.
pub type Budgets = HashMap<String, HashMap<BudgetPeriod, Decimal>>;

/// Template from which concrete expenses are generated on a schedule.
/// `last_generated` is advanced only by the recurrence pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringExpense {
    pub id: String,
    pub amount: Decimal,
    pub description: String,
    pub category_id: String,
    pub frequency: Frequency,
    pub last_generated: DateTime<Utc>,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct RecurringDraft {
    pub amount: Decimal,
    pub description: String,
    pub category_id: String,
    pub frequency: Frequency,
}

/// Partial update for a recurring template. `last_generated` is deliberately
/// not patchable from the outside.
#[derive(Debug, Clone, Default)]
pub struct RecurringPatch {
    pub amount: Option<Decimal>,
    pub description: Option<String>,
    pub category_id: Option<String>,
    pub frequency: Option<Frequency>,
    pub is_active: Option<bool>,
}

impl Expense {
    pub(crate) fn apply(&mut self, patch: ExpensePatch) {
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(images) = patch.images {
            self.images = images;
        }
    }
}

impl RecurringExpense {
    pub(crate) fn apply(&mut self, patch: RecurringPatch) {
        if let Some(amount) = patch.amount {
            self.amount = amount;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
        }
        if let Some(frequency) = patch.frequency {
            self.frequency = frequency;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
    }
}
