// Copyright (c) 2025 Spendbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use rust_decimal::Decimal;
use spendbook::models::{Frequency, RecurringDraft};
use spendbook::recurrence::{RecurrenceScheduler, next_due};
use spendbook::storage::{MemoryStorage, Storage, keys};
use spendbook::store::ExpenseStore;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
}

fn template_blob(frequency: &str, last_generated: DateTime<Utc>, is_active: bool) -> String {
    format!(
        r#"[{{"id":"r1","amount":"9.99","description":"Gym","categoryId":"6","frequency":"{}","lastGenerated":"{}","isActive":{}}}]"#,
        frequency,
        last_generated.to_rfc3339(),
        is_active
    )
}

async fn setup_with_template(
    frequency: &str,
    last_generated: DateTime<Utc>,
    is_active: bool,
) -> ExpenseStore {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set(keys::RECURRING, &template_blob(frequency, last_generated, is_active))
        .await
        .unwrap();
    let store = ExpenseStore::new(storage);
    store.load().await;
    store
}

#[test]
fn next_due_steps() {
    let last = Utc.with_ymd_and_hms(2024, 1, 31, 9, 30, 0).unwrap();
    assert_eq!(next_due(last, Frequency::Daily), last + TimeDelta::days(1));
    assert_eq!(next_due(last, Frequency::Weekly), last + TimeDelta::days(7));
    // Calendar month step clamps Jan 31 to Feb 29 (2024 is a leap year).
    assert_eq!(
        next_due(last, Frequency::Monthly),
        Utc.with_ymd_and_hms(2024, 2, 29, 9, 30, 0).unwrap()
    );
}

#[tokio::test]
async fn catch_up_generates_exactly_one_expense() {
    let store = setup_with_template("daily", now() - TimeDelta::days(10), true).await;

    let generated = store.process_recurring_at(now());
    assert_eq!(generated, 1);

    let expenses = store.expenses();
    assert_eq!(expenses.len(), 1);
    assert_eq!(expenses[0].amount, dec("9.99"));
    assert_eq!(expenses[0].date, now());
    assert!(expenses[0].is_recurring);
    assert_eq!(expenses[0].recurring_id.as_deref(), Some("r1"));

    // last_generated jumps to the evaluation time, not to the theoretical
    // next due date, so the missed periods are not backfilled.
    assert_eq!(store.recurring_expenses()[0].last_generated, now());

    // A second pass at the same time generates nothing further.
    assert_eq!(store.process_recurring_at(now()), 0);
    assert_eq!(store.expenses().len(), 1);
}

#[tokio::test]
async fn monthly_template_from_yesterday_is_not_due() {
    let store = setup_with_template("monthly", now() - TimeDelta::days(1), true).await;
    assert_eq!(store.process_recurring_at(now()), 0);
    assert!(store.expenses().is_empty());
    assert_eq!(store.recurring_expenses()[0].last_generated, now() - TimeDelta::days(1));
}

#[tokio::test]
async fn due_comparison_ignores_time_of_day() {
    // Due "today" at a later wall-clock time still counts as due.
    let last = Utc.with_ymd_and_hms(2024, 3, 14, 23, 0, 0).unwrap();
    let store = setup_with_template("daily", last, true).await;
    let evaluation = Utc.with_ymd_and_hms(2024, 3, 15, 1, 0, 0).unwrap();
    assert_eq!(store.process_recurring_at(evaluation), 1);
}

#[tokio::test]
async fn paused_template_generates_nothing() {
    let store = setup_with_template("daily", now() - TimeDelta::days(10), false).await;
    assert_eq!(store.process_recurring_at(now()), 0);
    assert!(store.expenses().is_empty());
}

#[tokio::test]
async fn generated_expense_is_stamped_with_current_currency() {
    let store = setup_with_template("weekly", now() - TimeDelta::days(8), true).await;
    store.change_currency("USD");
    store.process_recurring_at(now());
    assert_eq!(store.expenses()[0].currency, "USD");
}

#[tokio::test]
async fn generated_expenses_are_prepended() {
    let store = setup_with_template("daily", now() - TimeDelta::days(2), true).await;
    store
        .add_expense(spendbook::models::ExpenseDraft {
            amount: dec("1"),
            description: "manual".to_string(),
            category_id: "1".to_string(),
            date: Some(now() - TimeDelta::days(1)),
            images: Vec::new(),
        })
        .unwrap();

    store.process_recurring_at(now());
    let expenses = store.expenses();
    assert_eq!(expenses.len(), 2);
    assert!(expenses[0].is_recurring);
    assert_eq!(expenses[1].description, "manual");
}

#[tokio::test(flavor = "multi_thread")]
async fn scheduler_runs_an_immediate_pass_and_stops_on_drop() {
    let store = ExpenseStore::new(Arc::new(MemoryStorage::new()));
    store.load().await;
    store
        .add_recurring(RecurringDraft {
            amount: dec("5"),
            description: "Daily paper".to_string(),
            category_id: "5".to_string(),
            frequency: Frequency::Daily,
        })
        .unwrap();
    // A just-created template is not due, so repeated passes must not
    // generate anything.
    let scheduler =
        RecurrenceScheduler::spawn_with_interval(store.clone(), Duration::from_millis(20));
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(store.expenses().is_empty());

    scheduler.shutdown();
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(store.expenses().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn scheduler_generates_due_expenses() {
    let storage = Arc::new(MemoryStorage::new());
    storage
        .set(keys::RECURRING, &template_blob("daily", Utc::now() - TimeDelta::days(3), true))
        .await
        .unwrap();
    let store = ExpenseStore::new(storage);
    store.load().await;

    let scheduler = RecurrenceScheduler::spawn_with_interval(store.clone(), Duration::from_secs(3600));
    // The first tick fires immediately; give the task a moment to run it.
    for _ in 0..50 {
        if !store.expenses().is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(store.expenses().len(), 1);
    drop(scheduler);
}
