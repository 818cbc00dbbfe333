use chrono::NaiveDate;
use rust_decimal::Decimal;
use spendbook_core::db::open_db_in_memory;
use spendbook_core::{
    dispatch, ActionOutcome, Clock, CsvWriter, ExpenseField, ExpenseGateway, ExpenseInput,
    ExpenseRecord, ExpenseTracker, ExportError, PersistenceResult, RowAction,
    SqliteExpenseGateway, TrackerError, ValidationError, EXPENSES_SLOT_KEY,
};
use std::cell::{Cell, RefCell};
use std::str::FromStr;

struct FixedClock(i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// In-memory gateway that counts saves.
#[derive(Default)]
struct RecordingGateway {
    stored: RefCell<Vec<ExpenseRecord>>,
    saves: Cell<usize>,
}

impl ExpenseGateway for RecordingGateway {
    fn load(&self) -> PersistenceResult<Vec<ExpenseRecord>> {
        Ok(self.stored.borrow().clone())
    }

    fn save(&self, records: &[ExpenseRecord]) -> PersistenceResult<()> {
        self.saves.set(self.saves.get() + 1);
        *self.stored.borrow_mut() = records.to_vec();
        Ok(())
    }
}

fn tracker() -> ExpenseTracker<RecordingGateway, FixedClock> {
    ExpenseTracker::open_with_clock(RecordingGateway::default(), FixedClock(1_704_067_200_000))
}

fn add(
    tracker: &mut ExpenseTracker<RecordingGateway, FixedClock>,
    description: &str,
    amount: &str,
    category: &str,
    date: &str,
) -> i64 {
    tracker
        .add(&ExpenseInput::new(description, amount, category, date))
        .unwrap()
}

#[test]
fn scenario_groups_sort_and_total() {
    let mut tracker = tracker();
    let coffee = add(&mut tracker, "Coffee", "3.50", "Food", "2024-01-05");
    let bus = add(&mut tracker, "Bus", "2.00", "Transport", "2024-01-03");
    let lunch = add(&mut tracker, "Lunch", "8.00", "Food", "2024-01-02");

    let summary = tracker.summary();
    let categories: Vec<_> = summary.categories().collect();
    assert_eq!(categories, vec!["Food", "Transport"]);

    let food = summary.group("Food").unwrap();
    let food_ids: Vec<_> = food.records.iter().map(|r| r.id).collect();
    assert_eq!(food_ids, vec![lunch, coffee]);
    assert_eq!(food.subtotal, Decimal::new(1150, 2));

    let transport = summary.group("Transport").unwrap();
    assert_eq!(transport.records[0].id, bus);
    assert_eq!(transport.subtotal, Decimal::new(200, 2));
    assert_eq!(summary.grand_total, Decimal::new(1350, 2));

    let display = tracker.display();
    assert_eq!(display.sections[0].footer, "Total Food: Rs. 11.50 | Items: 2");
    assert_eq!(display.sections[1].footer, "Total Transport: Rs. 2.00 | Items: 1");
    assert_eq!(display.grand_total, "13.50");
    assert_eq!(tracker.gateway().saves.get(), 3);
}

#[test]
fn ids_are_unique_even_within_one_millisecond() {
    let mut tracker = tracker();
    let first = add(&mut tracker, "Tea", "1", "Food", "2024-01-01");
    let second = add(&mut tracker, "Tea", "1", "Food", "2024-01-01");

    assert_eq!(first, 1_704_067_200_000);
    assert!(second > first);
}

#[test]
fn rejected_add_has_no_side_effects() {
    let mut tracker = tracker();
    add(&mut tracker, "Coffee", "3.50", "Food", "2024-01-05");
    let display_before = tracker.display().clone();

    let err = tracker
        .add(&ExpenseInput::new("Bus", "abc", "Transport", "2024-01-03"))
        .unwrap_err();

    match err {
        TrackerError::Validation(err) => assert_eq!(err.field(), ExpenseField::Amount),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(tracker.records().len(), 1);
    assert_eq!(tracker.gateway().saves.get(), 1);
    assert_eq!(tracker.display(), &display_before);
}

#[test]
fn add_that_would_overflow_the_total_is_rejected() {
    let mut tracker = tracker();
    add(
        &mut tracker,
        "Yacht",
        "79228162514264337593543950335",
        "Fun",
        "2024-01-05",
    );
    let display_before = tracker.display().clone();

    let err = tracker
        .add(&ExpenseInput::new("Gum", "1", "Food", "2024-01-06"))
        .unwrap_err();

    match err {
        TrackerError::Validation(err) => {
            assert_eq!(err, ValidationError::TotalOverflow(Decimal::ONE));
            assert_eq!(err.field(), ExpenseField::Amount);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(tracker.records().len(), 1);
    assert_eq!(tracker.gateway().saves.get(), 1);
    assert_eq!(tracker.display(), &display_before);

    // Zero still fits.
    add(&mut tracker, "Sample", "0", "Food", "2024-01-06");
    assert_eq!(tracker.summary().grand_total, Decimal::MAX);
}

#[test]
fn opening_an_overflowing_ledger_saturates_totals() {
    let huge = |id: i64| ExpenseRecord {
        id,
        description: format!("huge {id}"),
        amount: Decimal::MAX,
        category: "Fun".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    };
    let gateway = RecordingGateway::default();
    *gateway.stored.borrow_mut() = vec![huge(1), huge(2)];

    let mut tracker = ExpenseTracker::open_with_clock(gateway, FixedClock(10));
    assert_eq!(tracker.records().len(), 2);
    assert_eq!(tracker.summary().grand_total, Decimal::MAX);
    assert_eq!(tracker.display().sections[0].count, 2);

    // Already past the limit: any further positive amount is refused.
    let err = tracker
        .add(&ExpenseInput::new("Gum", "1", "Food", "2024-01-06"))
        .unwrap_err();
    assert!(matches!(err, TrackerError::Validation(ValidationError::TotalOverflow(_))));
    assert!(tracker.delete(1).unwrap());
    assert_eq!(tracker.summary().grand_total, Decimal::MAX);
}

#[test]
fn delete_of_missing_id_is_silent_noop() {
    let mut tracker = tracker();
    add(&mut tracker, "Coffee", "3.50", "Food", "2024-01-05");
    let display_before = tracker.display().clone();

    assert!(!tracker.delete(12345).unwrap());
    assert_eq!(tracker.records().len(), 1);
    assert_eq!(tracker.gateway().saves.get(), 1);
    assert_eq!(tracker.display(), &display_before);
}

#[test]
fn delete_removes_persists_and_rerenders() {
    let mut tracker = tracker();
    let coffee = add(&mut tracker, "Coffee", "3.50", "Food", "2024-01-05");
    let bus = add(&mut tracker, "Bus", "2.00", "Transport", "2024-01-03");

    assert!(tracker.delete(coffee).unwrap());

    assert!(tracker.find(coffee).is_none());
    assert_eq!(tracker.gateway().stored.borrow().len(), 1);
    assert_eq!(tracker.display().sections.len(), 1);
    assert!(tracker.display().row(bus).is_some());
    assert_eq!(tracker.display().grand_total, "2.00");
}

#[test]
fn abandoned_edit_loses_the_record() {
    let mut tracker = tracker();
    let coffee = add(&mut tracker, "Coffee", "3.50", "Food", "2024-01-05");

    let input = tracker.edit(coffee).unwrap().unwrap();
    assert_eq!(input.description, "Coffee");
    assert_eq!(input.amount, "3.50");
    assert_eq!(input.category, "Food");
    assert_eq!(input.date, "2024-01-05");

    assert!(tracker.find(coffee).is_none());
    assert!(tracker.gateway().stored.borrow().is_empty());
    assert!(tracker.display().sections.is_empty());
}

#[test]
fn resubmitted_edit_gets_a_new_id() {
    let mut tracker = tracker();
    let coffee = add(&mut tracker, "Coffee", "3.50", "Food", "2024-01-05");

    let mut input = tracker.edit(coffee).unwrap().unwrap();
    input.amount = "4.00".to_string();
    let replacement = tracker.add(&input).unwrap();

    assert_ne!(replacement, coffee);
    let record = tracker.find(replacement).unwrap();
    assert_eq!(record.amount, Decimal::new(400, 2));
    assert_eq!(tracker.records().len(), 1);
}

#[test]
fn edit_of_missing_id_is_noop() {
    let mut tracker = tracker();
    add(&mut tracker, "Coffee", "3.50", "Food", "2024-01-05");

    assert!(tracker.edit(999).unwrap().is_none());
    assert_eq!(tracker.records().len(), 1);
    assert_eq!(tracker.gateway().saves.get(), 1);
}

#[test]
fn row_actions_dispatch_to_commands() {
    let mut tracker = tracker();
    let coffee = add(&mut tracker, "Coffee", "3.50", "Food", "2024-01-05");
    let bus = add(&mut tracker, "Bus", "2.00", "Transport", "2024-01-03");

    let [edit, _] = tracker.display().row(coffee).unwrap().actions();
    let outcome = dispatch(&mut tracker, edit).unwrap();
    assert!(matches!(
        outcome,
        ActionOutcome::EditStarted(Some(ref input)) if input.description == "Coffee"
    ));

    let outcome = dispatch(&mut tracker, RowAction::Delete(bus)).unwrap();
    assert_eq!(outcome, ActionOutcome::Deleted(true));
    assert!(tracker.records().is_empty());

    let outcome = dispatch(&mut tracker, RowAction::Delete(bus)).unwrap();
    assert_eq!(outcome, ActionOutcome::Deleted(false));
}

#[test]
fn export_of_empty_ledger_writes_nothing() {
    let tracker = tracker();
    let dir = tempfile::tempdir().unwrap();

    let err = tracker.export(&CsvWriter, dir.path()).unwrap_err();
    assert!(matches!(err, TrackerError::Export(ExportError::NothingToExport)));
    assert_eq!(err.to_string(), "export failed: nothing to export");
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn export_writes_rows_in_store_order_with_total() {
    let mut tracker = tracker();
    add(&mut tracker, "Coffee", "3.50", "Food", "2024-01-05");
    add(&mut tracker, "Bus", "2.00", "Transport", "2024-01-03");
    add(&mut tracker, "Lunch", "8.00", "Food", "2024-01-02");
    let dir = tempfile::tempdir().unwrap();

    let path = tracker.export(&CsvWriter, dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), "expenses.csv");

    let content = std::fs::read_to_string(path).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Description,Amount,Category,Date",
            "Coffee,3.50,Food,05/01/24",
            "Bus,2.00,Transport,03/01/24",
            "Lunch,8.00,Food,02/01/24",
            ",,,",
            "TOTAL,13.50,,",
        ]
    );
}

#[test]
fn tracker_reloads_state_from_sqlite() {
    let conn = open_db_in_memory().unwrap();
    let coffee = {
        let mut tracker = ExpenseTracker::open(SqliteExpenseGateway::new(&conn));
        tracker
            .add(&ExpenseInput::new("Coffee", "3.50", "Food", "2024-01-05"))
            .unwrap()
    };

    let tracker = ExpenseTracker::open(SqliteExpenseGateway::new(&conn)).with_currency("EUR");
    assert!(tracker.find(coffee).is_some());
    assert_eq!(tracker.display().sections[0].rows[0].amount, "EUR 3.50");
}

#[test]
fn corrupt_storage_opens_as_empty_ledger() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_slots (key, value) VALUES (?1, ?2);",
        [EXPENSES_SLOT_KEY, "][ definitely not json"],
    )
    .unwrap();

    let tracker = ExpenseTracker::open(SqliteExpenseGateway::new(&conn));
    assert!(tracker.records().is_empty());
    assert_eq!(tracker.display().grand_total, "0.00");
}

#[test]
fn failed_save_is_surfaced_but_memory_keeps_the_change() {
    let conn = open_db_in_memory().unwrap();
    let mut tracker = ExpenseTracker::open(SqliteExpenseGateway::new(&conn));
    conn.execute_batch("DROP TABLE kv_slots;").unwrap();

    let err = tracker
        .add(&ExpenseInput::new("Coffee", "3.50", "Food", "2024-01-05"))
        .unwrap_err();

    assert!(matches!(err, TrackerError::Persistence(_)));
    assert_eq!(tracker.records().len(), 1);
    assert_eq!(tracker.display().grand_total, "3.50");
}

#[test]
fn reopened_tracker_keeps_every_digit_of_the_amount() {
    let conn = open_db_in_memory().unwrap();
    let (fine, huge) = {
        let mut tracker = ExpenseTracker::open(SqliteExpenseGateway::new(&conn));
        let fine = tracker
            .add(&ExpenseInput::new("Fine", "0.1234567890123456789", "Misc", "2024-01-05"))
            .unwrap();
        let huge = tracker
            .add(&ExpenseInput::new("Huge", "12345678901234567.89", "Misc", "2024-01-06"))
            .unwrap();
        (fine, huge)
    };

    let tracker = ExpenseTracker::open(SqliteExpenseGateway::new(&conn));
    assert_eq!(
        tracker.find(fine).unwrap().amount,
        Decimal::from_str("0.1234567890123456789").unwrap()
    );
    assert_eq!(
        tracker.find(huge).unwrap().amount,
        Decimal::from_str("12345678901234567.89").unwrap()
    );
}

#[test]
fn invalid_stored_record_does_not_wipe_the_ledger() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_slots (key, value) VALUES (?1, ?2);",
        [
            EXPENSES_SLOT_KEY,
            r#"[
                {"id":1,"description":"Rent","amount":900,"category":"Home","date":"2024-01-01"},
                {"id":2,"description":"Refund","amount":-5,"category":"Food","date":"2024-01-03"}
            ]"#,
        ],
    )
    .unwrap();

    let mut tracker = ExpenseTracker::open(SqliteExpenseGateway::new(&conn));
    assert!(tracker.find(1).is_some());
    assert!(tracker.find(2).is_none());

    tracker
        .add(&ExpenseInput::new("Tea", "1", "Food", "2024-01-04"))
        .unwrap();

    let reloaded = SqliteExpenseGateway::new(&conn).load().unwrap();
    let descriptions: Vec<_> = reloaded
        .iter()
        .map(|r| r.description.as_str())
        .collect();
    assert_eq!(descriptions, vec!["Rent", "Tea"]);
}
