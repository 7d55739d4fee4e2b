// Copyright (c) 2025 Spendbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Datelike, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::BudgetPeriod;
use crate::store::ExpenseStore;

/// Severity of spending against a configured budget. Thresholds are
/// percentage lower bounds, checked highest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetHealth {
    Safe,
    Caution,
    Warning,
    Exceeded,
}

/// Spending evaluated against one `(category, period)` budget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub budget: Decimal,
    pub spent: Decimal,
    /// May go negative once the budget is exceeded.
    pub remaining: Decimal,
    /// Capped at 100 for display; the exceeded check uses the uncapped value.
    pub percentage: Decimal,
    pub status: BudgetHealth,
}

/// Whether `date` falls inside the period window ending at `now`: a rolling
/// seven days for weekly, the calendar month for monthly.
pub(crate) fn in_period(date: DateTime<Utc>, period: BudgetPeriod, now: DateTime<Utc>) -> bool {
    match period {
        BudgetPeriod::Weekly => date >= now - TimeDelta::days(7),
        BudgetPeriod::Monthly => date.month() == now.month() && date.year() == now.year(),
    }
}

impl ExpenseStore {
    /// Total spent in `category_id` within the period window ending at `now`.
    pub fn category_spending_at(
        &self,
        category_id: &str,
        period: BudgetPeriod,
        now: DateTime<Utc>,
    ) -> Decimal {
        self.lock_state()
            .expenses
            .iter()
            .filter(|e| e.category_id == category_id && in_period(e.date, period, now))
            .map(|e| e.amount)
            .sum()
    }

    pub fn category_spending(&self, category_id: &str, period: BudgetPeriod) -> Decimal {
        self.category_spending_at(category_id, period, Utc::now())
    }

    /// Evaluates spending against the configured budget. `None` when no
    /// budget is set for the key; absence is not an error.
    pub fn budget_status_at(
        &self,
        category_id: &str,
        period: BudgetPeriod,
        now: DateTime<Utc>,
    ) -> Option<BudgetStatus> {
        let budget = self.budget(category_id, period);
        if budget <= Decimal::ZERO {
            return None;
        }

        let spent = self.category_spending_at(category_id, period, now);
        let percentage = spent / budget * Decimal::from(100);
        let status = if percentage >= Decimal::from(100) {
            BudgetHealth::Exceeded
        } else if percentage >= Decimal::from(80) {
            BudgetHealth::Warning
        } else if percentage >= Decimal::from(60) {
            BudgetHealth::Caution
        } else {
            BudgetHealth::Safe
        };

        Some(BudgetStatus {
            budget,
            spent,
            remaining: budget - spent,
            percentage: percentage.min(Decimal::from(100)),
            status,
        })
    }

    pub fn budget_status(&self, category_id: &str, period: BudgetPeriod) -> Option<BudgetStatus> {
        self.budget_status_at(category_id, period, Utc::now())
    }
}
