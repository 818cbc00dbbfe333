//! Core domain logic for spendbook.
//! This crate is the single source of truth for ledger invariants.

pub mod aggregate;
pub mod config;
pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod render;
pub mod repo;
pub mod service;
pub mod store;

pub use aggregate::{checked_grand_total, grand_total, CategoryGroup, Summary};
pub use config::TrackerConfig;
pub use export::{CsvWriter, ExportError, ExportRow, Sheet, SpreadsheetWriter};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::expense::{
    ExpenseField, ExpenseId, ExpenseInput, ExpenseRecord, ValidExpense, ValidationError,
};
pub use render::{render, CategorySection, DisplayTree, ExpenseRow, RowAction};
pub use repo::expense_gateway::{
    ExpenseGateway, PersistenceError, PersistenceResult, SqliteExpenseGateway, EXPENSES_SLOT_KEY,
};
pub use service::dispatch::{dispatch, ActionOutcome};
pub use service::expense_service::{
    Clock, ExpenseTracker, SystemClock, TrackerError, TrackerResult,
};
pub use store::RecordStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
