// Copyright (c) 2025 Spendbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, TimeDelta, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::categories::{FALLBACK_COLOR, category_by_id};
use crate::models::Expense;
use crate::store::ExpenseStore;

/// Window for the statistics views. Week is rolling; month and year are
/// calendar matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeFilter {
    All,
    Week,
    Month,
    Year,
}

/// One slice of the category breakdown, display-ready.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category_id: String,
    pub name: &'static str,
    pub color: &'static str,
    pub amount: Decimal,
}

/// Total spend in one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    pub year: i32,
    pub month: u32,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendingSummary {
    pub total: Decimal,
    pub count: usize,
    pub average: Decimal,
    pub max: Decimal,
}

fn matches_filter(date: DateTime<Utc>, filter: TimeFilter, now: DateTime<Utc>) -> bool {
    match filter {
        TimeFilter::All => true,
        TimeFilter::Week => date >= now - TimeDelta::days(7),
        TimeFilter::Month => date.month() == now.month() && date.year() == now.year(),
        TimeFilter::Year => date.year() == now.year(),
    }
}

// All queries here are pure reads recomputed per call; nothing is cached.
impl ExpenseStore {
    pub fn filtered_expenses_at(&self, filter: TimeFilter, now: DateTime<Utc>) -> Vec<Expense> {
        self.lock_state()
            .expenses
            .iter()
            .filter(|e| matches_filter(e.date, filter, now))
            .cloned()
            .collect()
    }

    pub fn filtered_expenses(&self, filter: TimeFilter) -> Vec<Expense> {
        self.filtered_expenses_at(filter, Utc::now())
    }

    pub fn filtered_total_at(&self, filter: TimeFilter, now: DateTime<Utc>) -> Decimal {
        self.lock_state()
            .expenses
            .iter()
            .filter(|e| matches_filter(e.date, filter, now))
            .map(|e| e.amount)
            .sum()
    }

    pub fn filtered_total(&self, filter: TimeFilter) -> Decimal {
        self.filtered_total_at(filter, Utc::now())
    }

    /// Per-category sums over the filtered window, in first-seen order.
    /// Unresolvable category ids render as "Other" with the neutral fallback
    /// color rather than the Other category's own styling.
    pub fn category_breakdown_at(
        &self,
        filter: TimeFilter,
        now: DateTime<Utc>,
    ) -> Vec<CategoryTotal> {
        let mut totals: Vec<(String, Decimal)> = Vec::new();
        for expense in self
            .lock_state()
            .expenses
            .iter()
            .filter(|e| matches_filter(e.date, filter, now))
        {
            match totals.iter_mut().find(|(id, _)| *id == expense.category_id) {
                Some((_, amount)) => *amount += expense.amount,
                None => totals.push((expense.category_id.clone(), expense.amount)),
            }
        }

        totals
            .into_iter()
            .map(|(category_id, amount)| match category_by_id(&category_id) {
                Some(category) => CategoryTotal {
                    category_id,
                    name: category.name,
                    color: category.color,
                    amount,
                },
                None => CategoryTotal {
                    category_id,
                    name: "Other",
                    color: FALLBACK_COLOR,
                    amount,
                },
            })
            .collect()
    }

    pub fn category_breakdown(&self, filter: TimeFilter) -> Vec<CategoryTotal> {
        self.category_breakdown_at(filter, Utc::now())
    }

    /// Spend per calendar month over ALL expenses (never time-filtered),
    /// chronological, trimmed to the most recent six buckets.
    pub fn monthly_trend(&self) -> Vec<MonthlyTotal> {
        let mut buckets: HashMap<(i32, u32), Decimal> = HashMap::new();
        for expense in self.lock_state().expenses.iter() {
            *buckets
                .entry((expense.date.year(), expense.date.month()))
                .or_insert(Decimal::ZERO) += expense.amount;
        }

        let mut months: Vec<MonthlyTotal> = buckets
            .into_iter()
            .map(|((year, month), total)| MonthlyTotal { year, month, total })
            .collect();
        months.sort_by_key(|m| (m.year, m.month));
        if months.len() > 6 {
            months.drain(..months.len() - 6);
        }
        months
    }

    /// Total, count, average and largest single amount over the filtered
    /// window. The average guards an empty window by treating count as one.
    pub fn summary_at(&self, filter: TimeFilter, now: DateTime<Utc>) -> SpendingSummary {
        let state = self.lock_state();
        let mut total = Decimal::ZERO;
        let mut count = 0usize;
        let mut max = Decimal::ZERO;
        for expense in state
            .expenses
            .iter()
            .filter(|e| matches_filter(e.date, filter, now))
        {
            total += expense.amount;
            count += 1;
            max = max.max(expense.amount);
        }
        let average = total / Decimal::from(count.max(1));
        SpendingSummary { total, count, average, max }
    }

    pub fn summary(&self, filter: TimeFilter) -> SpendingSummary {
        self.summary_at(filter, Utc::now())
    }
}
