// Copyright (c) 2025 Spendbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::time::Duration;

use chrono::{DateTime, Months, TimeDelta, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::models::{Expense, Frequency};
use crate::store::{ExpenseStore, new_id};

/// How often the generation pass runs once the store is loaded.
pub const CHECK_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// The next date a template is due after `last`, one frequency step ahead.
/// Monthly steps use calendar months, with end-of-month days clamped.
pub fn next_due(last: DateTime<Utc>, frequency: Frequency) -> DateTime<Utc> {
    match frequency {
        Frequency::Daily => last + TimeDelta::days(1),
        Frequency::Weekly => last + TimeDelta::days(7),
        Frequency::Monthly => last
            .checked_add_months(Months::new(1))
            .unwrap_or_else(|| last + TimeDelta::days(31)),
    }
}

impl ExpenseStore {
    /// Runs one generation pass at the given time. For every active template
    /// whose next due date is on or before `now` (date-only comparison), one
    /// expense is materialized and `last_generated` advances to `now`.
    ///
    /// Because `last_generated` jumps to `now` rather than to the theoretical
    /// due date, at most one expense is produced per template per pass no
    /// matter how many periods have elapsed. Catch-up after a long absence is
    /// a single expense; that is policy, not a scheduling bug.
    ///
    /// Returns the number of expenses generated.
    pub fn process_recurring_at(&self, now: DateTime<Utc>) -> usize {
        let today = now.date_naive();
        let mut state = self.lock_state();
        let currency = state.currency.clone();

        let mut generated = Vec::new();
        for template in state.recurring.iter_mut() {
            if !template.is_active {
                continue;
            }
            if next_due(template.last_generated, template.frequency).date_naive() > today {
                continue;
            }
            debug!(template = %template.id, "recurring expense due");
            generated.push(Expense {
                id: new_id(),
                amount: template.amount,
                description: template.description.clone(),
                category_id: template.category_id.clone(),
                date: now,
                currency: currency.clone(),
                images: Vec::new(),
                is_recurring: true,
                recurring_id: Some(template.id.clone()),
            });
            template.last_generated = now;
        }

        let count = generated.len();
        for expense in generated {
            state.expenses.insert(0, expense);
        }
        if count > 0 {
            self.persist_expenses(&state);
            self.persist_recurring(&state);
        }
        count
    }

    /// [`process_recurring_at`](Self::process_recurring_at) against the
    /// current time.
    pub fn process_recurring(&self) -> usize {
        self.process_recurring_at(Utc::now())
    }
}

/// Background task driving [`ExpenseStore::process_recurring`]: one pass
/// immediately, then one per [`CHECK_INTERVAL`]. Each firing reads the
/// then-current template collection, so edits between firings are honored.
/// Dropping the scheduler aborts the task.
pub struct RecurrenceScheduler {
    handle: JoinHandle<()>,
}

impl RecurrenceScheduler {
    pub fn spawn(store: ExpenseStore) -> Self {
        Self::spawn_with_interval(store, CHECK_INTERVAL)
    }

    /// Same loop with a caller-chosen period; tests use short intervals.
    pub fn spawn_with_interval(store: ExpenseStore, period: Duration) -> Self {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                // First tick completes immediately.
                ticker.tick().await;
                let count = store.process_recurring();
                if count > 0 {
                    info!(count, "generated recurring expenses");
                }
            }
        });
        Self { handle }
    }

    /// Explicit teardown; equivalent to dropping the scheduler.
    pub fn shutdown(self) {
        self.handle.abort();
    }
}

impl Drop for RecurrenceScheduler {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
