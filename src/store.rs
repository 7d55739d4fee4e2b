// Copyright (c) 2025 Spendbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{error, warn};
use uuid::Uuid;

use crate::currencies::DEFAULT_CURRENCY;
use crate::error::StoreError;
use crate::models::{
    Budgets, BudgetPeriod, Expense, ExpenseDraft, ExpensePatch, RecurringDraft, RecurringExpense,
    RecurringPatch,
};
use crate::storage::{Storage, keys};

#[derive(Debug)]
pub(crate) struct State {
    pub(crate) expenses: Vec<Expense>,
    pub(crate) currency: String,
    pub(crate) budgets: Budgets,
    pub(crate) recurring: Vec<RecurringExpense>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            expenses: Vec::new(),
            currency: DEFAULT_CURRENCY.to_string(),
            budgets: Budgets::new(),
            recurring: Vec::new(),
        }
    }
}

struct Inner {
    state: Mutex<State>,
    storage: Arc<dyn Storage>,
    loading: AtomicBool,
}

/// The canonical in-memory expense/budget/recurrence state.
///
/// Mutations update memory synchronously and schedule a best-effort write of
/// the whole affected slice; write failures are logged and never rolled back.
/// The store must live under a tokio runtime so those writes (and the
/// recurrence scheduler) can be spawned. Clones share the same state.
#[derive(Clone)]
pub struct ExpenseStore {
    inner: Arc<Inner>,
}

impl ExpenseStore {
    /// Creates a store in the loading state. Call [`load`](Self::load) before
    /// relying on mutations to persist.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::default()),
                storage,
                loading: AtomicBool::new(true),
            }),
        }
    }

    /// Loads all four slices in parallel. A slice that is absent or fails to
    /// parse falls back to its default; load itself never fails.
    pub async fn load(&self) {
        let storage = &self.inner.storage;
        let (expenses, currency, budgets, recurring) = tokio::join!(
            storage.get(keys::EXPENSES),
            storage.get(keys::CURRENCY),
            storage.get(keys::BUDGETS),
            storage.get(keys::RECURRING),
        );

        let expenses: Vec<Expense> = decode_slice(keys::EXPENSES, expenses);
        let budgets: Budgets = decode_slice(keys::BUDGETS, budgets);
        let recurring: Vec<RecurringExpense> = decode_slice(keys::RECURRING, recurring);
        // The currency slice is a raw code, not JSON.
        let currency = match currency {
            Ok(Some(code)) if !code.trim().is_empty() => code,
            Ok(_) => DEFAULT_CURRENCY.to_string(),
            Err(e) => {
                warn!(key = keys::CURRENCY, error = %e, "load failed, using default");
                DEFAULT_CURRENCY.to_string()
            }
        };

        {
            let mut state = self.lock_state();
            state.expenses = expenses;
            state.currency = currency;
            state.budgets = budgets;
            state.recurring = recurring;
        }
        self.inner.loading.store(false, Ordering::SeqCst);
    }

    /// True until the initial load has resolved all four slices.
    pub fn is_loading(&self) -> bool {
        self.inner.loading.load(Ordering::SeqCst)
    }

    // Readable state, returned as snapshots.

    pub fn expenses(&self) -> Vec<Expense> {
        self.lock_state().expenses.clone()
    }

    pub fn currency(&self) -> String {
        self.lock_state().currency.clone()
    }

    pub fn budgets(&self) -> Budgets {
        self.lock_state().budgets.clone()
    }

    pub fn recurring_expenses(&self) -> Vec<RecurringExpense> {
        self.lock_state().recurring.clone()
    }

    // Expense mutations.

    /// Records a new expense: assigns an id, defaults the date to now, stamps
    /// the active currency, and prepends so the collection stays
    /// newest-created-first.
    pub fn add_expense(&self, draft: ExpenseDraft) -> Result<Expense, StoreError> {
        let description = validate_description(&draft.description)?;
        validate_amount(draft.amount)?;
        validate_category(&draft.category_id)?;

        let mut state = self.lock_state();
        let expense = Expense {
            id: new_id(),
            amount: draft.amount,
            description,
            category_id: draft.category_id,
            date: draft.date.unwrap_or_else(Utc::now),
            currency: state.currency.clone(),
            images: draft.images,
            is_recurring: false,
            recurring_id: None,
        };
        state.expenses.insert(0, expense.clone());
        self.persist_expenses(&state);
        Ok(expense)
    }

    /// Merges `patch` onto the expense with `id`; silently a no-op when the
    /// id is unknown.
    pub fn update_expense(&self, id: &str, patch: ExpensePatch) {
        let mut state = self.lock_state();
        let Some(expense) = state.expenses.iter_mut().find(|e| e.id == id) else {
            return;
        };
        expense.apply(patch);
        self.persist_expenses(&state);
    }

    pub fn delete_expense(&self, id: &str) {
        let mut state = self.lock_state();
        let before = state.expenses.len();
        state.expenses.retain(|e| e.id != id);
        if state.expenses.len() != before {
            self.persist_expenses(&state);
        }
    }

    /// Deletes every expense and removes the persisted blob in one step, so a
    /// failed remove is reported instead of leaving stale data to resurrect
    /// on the next load.
    pub async fn clear_expenses(&self) -> Result<(), StoreError> {
        self.lock_state().expenses.clear();
        self.inner.storage.remove(keys::EXPENSES).await
    }

    /// Sum of all expense amounts, across every currency tag.
    pub fn total_expenses(&self) -> Decimal {
        self.lock_state().expenses.iter().map(|e| e.amount).sum()
    }

    // Currency.

    /// Sets the active currency code. Forward-only: already-recorded expenses
    /// keep the tag they were created with.
    pub fn change_currency(&self, code: &str) {
        let mut state = self.lock_state();
        state.currency = code.to_string();
        self.persist_raw(keys::CURRENCY, state.currency.clone());
    }

    // Budgets.

    pub fn set_budget(
        &self,
        category_id: &str,
        period: BudgetPeriod,
        amount: Decimal,
    ) -> Result<(), StoreError> {
        validate_amount(amount)?;
        let mut state = self.lock_state();
        state
            .budgets
            .entry(category_id.to_string())
            .or_default()
            .insert(period, amount);
        self.persist_budgets(&state);
        Ok(())
    }

    /// Removes a budget entirely (back to "no budget set").
    pub fn remove_budget(&self, category_id: &str, period: BudgetPeriod) {
        let mut state = self.lock_state();
        let mut removed = false;
        if let Some(periods) = state.budgets.get_mut(category_id) {
            removed = periods.remove(&period).is_some();
            if periods.is_empty() {
                state.budgets.remove(category_id);
            }
        }
        if removed {
            self.persist_budgets(&state);
        }
    }

    /// The configured limit, or zero when none is set.
    pub fn budget(&self, category_id: &str, period: BudgetPeriod) -> Decimal {
        self.lock_state()
            .budgets
            .get(category_id)
            .and_then(|p| p.get(&period))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    // Recurring templates.

    /// Registers a recurring template, active and with `last_generated`
    /// stamped to now (the first generation falls one frequency step later).
    pub fn add_recurring(&self, draft: RecurringDraft) -> Result<RecurringExpense, StoreError> {
        let description = validate_description(&draft.description)?;
        validate_amount(draft.amount)?;
        validate_category(&draft.category_id)?;

        let mut state = self.lock_state();
        let recurring = RecurringExpense {
            id: new_id(),
            amount: draft.amount,
            description,
            category_id: draft.category_id,
            frequency: draft.frequency,
            last_generated: Utc::now(),
            is_active: true,
        };
        state.recurring.push(recurring.clone());
        self.persist_recurring(&state);
        Ok(recurring)
    }

    pub fn update_recurring(&self, id: &str, patch: RecurringPatch) {
        let mut state = self.lock_state();
        let Some(recurring) = state.recurring.iter_mut().find(|r| r.id == id) else {
            return;
        };
        recurring.apply(patch);
        self.persist_recurring(&state);
    }

    pub fn delete_recurring(&self, id: &str) {
        let mut state = self.lock_state();
        let before = state.recurring.len();
        state.recurring.retain(|r| r.id != id);
        if state.recurring.len() != before {
            self.persist_recurring(&state);
        }
    }

    // Internals shared with the recurrence/budget/stats impls.

    pub(crate) fn lock_state(&self) -> MutexGuard<'_, State> {
        // Not held across await points anywhere in the crate.
        self.inner.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub(crate) fn persist_expenses(&self, state: &State) {
        self.persist_json(keys::EXPENSES, &state.expenses);
    }

    pub(crate) fn persist_recurring(&self, state: &State) {
        self.persist_json(keys::RECURRING, &state.recurring);
    }

    fn persist_budgets(&self, state: &State) {
        self.persist_json(keys::BUDGETS, &state.budgets);
    }

    fn persist_json<T: Serialize>(&self, key: &'static str, value: &T) {
        match serde_json::to_string(value) {
            Ok(blob) => self.persist_raw(key, blob),
            Err(e) => error!(key, error = %e, "failed to serialize slice"),
        }
    }

    /// Schedules a fire-and-forget write of the serialized slice. Suppressed
    /// while the initial load is in flight so defaults never clobber durable
    /// state that simply has not arrived yet.
    fn persist_raw(&self, key: &'static str, blob: String) {
        if self.is_loading() {
            return;
        }
        let storage = Arc::clone(&self.inner.storage);
        tokio::spawn(async move {
            if let Err(e) = storage.set(key, &blob).await {
                error!(key, error = %e, "failed to persist slice");
            }
        });
    }
}

pub(crate) fn new_id() -> String {
    // v7 is timestamp-prefixed, so ids sort by creation order.
    Uuid::now_v7().to_string()
}

fn decode_slice<T: DeserializeOwned + Default>(
    key: &str,
    loaded: Result<Option<String>, StoreError>,
) -> T {
    match loaded {
        Ok(Some(blob)) => match serde_json::from_str(&blob) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "unparsable slice, using default");
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            warn!(key, error = %e, "load failed, using default");
            T::default()
        }
    }
}

fn validate_amount(amount: Decimal) -> Result<(), StoreError> {
    if amount <= Decimal::ZERO {
        return Err(StoreError::InvalidArgument(format!(
            "amount must be positive, got {amount}"
        )));
    }
    Ok(())
}

fn validate_description(description: &str) -> Result<String, StoreError> {
    let trimmed = description.trim();
    if trimmed.is_empty() {
        return Err(StoreError::InvalidArgument("description must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

fn validate_category(category_id: &str) -> Result<(), StoreError> {
    if category_id.is_empty() {
        return Err(StoreError::InvalidArgument("a category must be selected".into()));
    }
    Ok(())
}
