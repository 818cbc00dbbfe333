//! Expense command handlers.
//!
//! # Responsibility
//! - Own the record store for one process run.
//! - Run every command as validate → mutate → save → aggregate → render.
//! - Keep the last rendered display tree for front-ends.
//!
//! # Invariants
//! - A rejected command leaves store, storage and display untouched.
//! - A failed save keeps the in-memory mutation and its re-render.
//! - Commands on a missing id are silent no-ops.

use crate::aggregate::{checked_grand_total, Summary};
use crate::export::{export_records, ExportError, SpreadsheetWriter};
use crate::model::expense::{ExpenseId, ExpenseInput, ExpenseRecord, ValidationError};
use crate::render::{render, DisplayTree};
use crate::repo::expense_gateway::{ExpenseGateway, PersistenceError};
use crate::store::RecordStore;
use chrono::Utc;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Default currency label shown before amounts.
pub const DEFAULT_CURRENCY_LABEL: &str = "Rs.";

/// Error surfaced by tracker commands.
#[derive(Debug)]
pub enum TrackerError {
    Validation(ValidationError),
    /// The in-memory state changed but could not be stored.
    Persistence(PersistenceError),
    Export(ExportError),
}

impl Display for TrackerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "invalid expense: {err}"),
            Self::Persistence(err) => write!(f, "changes not saved: {err}"),
            Self::Export(err) => write!(f, "export failed: {err}"),
        }
    }
}

impl Error for TrackerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Persistence(err) => Some(err),
            Self::Export(err) => Some(err),
        }
    }
}

impl From<ValidationError> for TrackerError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<PersistenceError> for TrackerError {
    fn from(value: PersistenceError) -> Self {
        Self::Persistence(value)
    }
}

impl From<ExportError> for TrackerError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

pub type TrackerResult<T> = Result<T, TrackerError>;

/// Source of creation timestamps for new ids.
pub trait Clock {
    fn now_millis(&self) -> i64;
}

/// Wall clock in UTC epoch milliseconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Expense tracker session over a persistence gateway.
pub struct ExpenseTracker<G: ExpenseGateway, C: Clock = SystemClock> {
    gateway: G,
    clock: C,
    store: RecordStore,
    currency: String,
    display: DisplayTree,
}

impl<G: ExpenseGateway> ExpenseTracker<G> {
    /// Loads the stored ledger and renders it once.
    ///
    /// Unreadable storage is logged and treated as an empty ledger.
    pub fn open(gateway: G) -> Self {
        Self::open_with_clock(gateway, SystemClock)
    }
}

impl<G: ExpenseGateway, C: Clock> ExpenseTracker<G, C> {
    pub fn open_with_clock(gateway: G, clock: C) -> Self {
        let records = match gateway.load() {
            Ok(records) => records,
            Err(err) => {
                warn!(
                    "event=tracker_open module=service status=recovered reason=load_failed error={}",
                    err
                );
                Vec::new()
            }
        };
        info!(
            "event=tracker_open module=service status=ok records={}",
            records.len()
        );

        let mut tracker = Self {
            gateway,
            clock,
            store: RecordStore::from_records(records),
            currency: DEFAULT_CURRENCY_LABEL.to_string(),
            display: DisplayTree::default(),
        };
        tracker.refresh();
        tracker
    }

    /// Replaces the currency label and re-renders.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self.refresh();
        self
    }

    /// Validates `input` and appends a new record with a fresh id.
    ///
    /// # Errors
    /// - `Validation` without any side effect.
    /// - `Persistence` after the record was added in memory and rendered.
    pub fn add(&mut self, input: &ExpenseInput) -> TrackerResult<ExpenseId> {
        let fields = input.validate().map_err(|err| {
            debug!(
                "event=expense_add module=service status=rejected field={}",
                err.field()
            );
            err
        })?;
        if checked_grand_total(self.store.all())
            .and_then(|total| total.checked_add(fields.amount))
            .is_none()
        {
            debug!(
                "event=expense_add module=service status=rejected field=amount reason=total_overflow"
            );
            return Err(ValidationError::TotalOverflow(fields.amount).into());
        }

        let id = self.store.next_id(self.clock.now_millis());
        self.store.add(ExpenseRecord::new(id, fields));
        info!("event=expense_add module=service status=ok id={id}");

        self.commit()?;
        Ok(id)
    }

    /// Starts editing `id`: returns its values for re-entry and removes it.
    ///
    /// The record is deleted immediately. Re-submitting the returned input
    /// through [`Self::add`] creates a record with a new id; abandoning the
    /// edit loses the record. Returns `Ok(None)` when `id` is absent.
    pub fn edit(&mut self, id: ExpenseId) -> TrackerResult<Option<ExpenseInput>> {
        let Some(record) = self.store.remove_by_id(id) else {
            debug!("event=expense_edit module=service status=noop id={id}");
            return Ok(None);
        };
        info!("event=expense_edit module=service status=ok id={id}");

        let input = record.to_input();
        self.commit()?;
        Ok(Some(input))
    }

    /// Removes `id`. Returns whether a record was removed.
    pub fn delete(&mut self, id: ExpenseId) -> TrackerResult<bool> {
        if self.store.remove_by_id(id).is_none() {
            debug!("event=expense_delete module=service status=noop id={id}");
            return Ok(false);
        }
        info!("event=expense_delete module=service status=ok id={id}");

        self.commit()?;
        Ok(true)
    }

    /// Returns the record for `id`, used to pre-fill edit forms.
    pub fn find(&self, id: ExpenseId) -> Option<&ExpenseRecord> {
        self.store.find_by_id(id)
    }

    pub fn records(&self) -> &[ExpenseRecord] {
        self.store.all()
    }

    /// Groups and totals for the current ledger.
    pub fn summary(&self) -> Summary<'_> {
        Summary::from_records(self.store.all())
    }

    /// Display tree from the last render.
    pub fn display(&self) -> &DisplayTree {
        &self.display
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Writes the ledger to `dir/expenses.<ext>`.
    ///
    /// # Errors
    /// - `Export(NothingToExport)` when the ledger is empty.
    pub fn export<W: SpreadsheetWriter>(&self, writer: &W, dir: &Path) -> TrackerResult<PathBuf> {
        Ok(export_records(self.store.all(), writer, dir)?)
    }

    /// Saves, then re-renders even when the save failed.
    fn commit(&mut self) -> TrackerResult<()> {
        let saved = self.gateway.save(self.store.all());
        self.refresh();
        if let Err(err) = &saved {
            warn!(
                "event=tracker_commit module=service status=error records={} error={}",
                self.store.len(),
                err
            );
        }
        Ok(saved?)
    }

    fn refresh(&mut self) {
        let display = render(&Summary::from_records(self.store.all()), &self.currency);
        self.display = display;
    }
}
