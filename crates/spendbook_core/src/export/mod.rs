//! Flat spreadsheet export of the ledger.
//!
//! # Responsibility
//! - Project records, in store order, into spreadsheet rows.
//! - Append the blank separator and `TOTAL` rows.
//! - Hand the finished sheet to a [`SpreadsheetWriter`].
//!
//! # Invariants
//! - An empty ledger produces no file.
//! - Output file name is always `expenses.<ext>`.

use crate::aggregate::grand_total;
use crate::model::expense::ExpenseRecord;
use crate::render::format_display_date;
use log::info;
use rust_decimal::Decimal;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Base name of exported files.
pub const EXPORT_FILE_STEM: &str = "expenses";
/// Sheet name inside exported workbooks.
pub const EXPORT_SHEET_NAME: &str = "Expenses";
/// Label of the closing total row.
pub const TOTAL_ROW_LABEL: &str = "TOTAL";

/// Header and character-width hint of one export column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub width: u16,
}

pub const EXPORT_COLUMNS: [Column; 4] = [
    Column {
        header: "Description",
        width: 25,
    },
    Column {
        header: "Amount",
        width: 10,
    },
    Column {
        header: "Category",
        width: 15,
    },
    Column {
        header: "Date",
        width: 12,
    },
];

/// One spreadsheet row; `None` cells stay empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportRow {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub date: Option<String>,
}

impl ExportRow {
    /// Cells in [`EXPORT_COLUMNS`] order.
    pub fn cells(&self) -> [String; 4] {
        [
            self.description.clone().unwrap_or_default(),
            self.amount.map(|amount| amount.to_string()).unwrap_or_default(),
            self.category.clone().unwrap_or_default(),
            self.date.clone().unwrap_or_default(),
        ]
    }

    pub fn is_blank(&self) -> bool {
        self == &Self::default()
    }
}

/// Named sheet handed to a writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sheet {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub rows: Vec<ExportRow>,
}

#[derive(Debug)]
pub enum ExportError {
    /// The ledger holds no records.
    NothingToExport,
    Io(std::io::Error),
    Csv(csv::Error),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NothingToExport => write!(f, "nothing to export"),
            Self::Io(err) => write!(f, "{err}"),
            Self::Csv(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NothingToExport => None,
            Self::Io(err) => Some(err),
            Self::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

/// Spreadsheet encoder collaborator.
pub trait SpreadsheetWriter {
    /// File extension without the dot.
    fn extension(&self) -> &'static str;
    /// Writes `sheet` to `path`, replacing any existing file.
    fn write(&self, sheet: &Sheet, path: &Path) -> Result<(), ExportError>;
}

/// Comma-separated writer; column widths are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvWriter;

impl SpreadsheetWriter for CsvWriter {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn write(&self, sheet: &Sheet, path: &Path) -> Result<(), ExportError> {
        let mut writer = csv::WriterBuilder::new().from_writer(File::create(path)?);
        writer.write_record(sheet.columns.iter().map(|column| column.header))?;
        for row in &sheet.rows {
            writer.write_record(row.cells())?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Builds the export sheet for `records`.
///
/// # Errors
/// - `NothingToExport` when `records` is empty.
pub fn build_sheet(records: &[ExpenseRecord]) -> Result<Sheet, ExportError> {
    if records.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let mut rows: Vec<ExportRow> = records
        .iter()
        .map(|record| ExportRow {
            description: Some(record.description.clone()),
            amount: Some(record.amount),
            category: Some(record.category.clone()),
            date: Some(format_display_date(record.date)),
        })
        .collect();
    rows.push(ExportRow::default());
    rows.push(ExportRow {
        description: Some(TOTAL_ROW_LABEL.to_string()),
        amount: Some(grand_total(records)),
        ..ExportRow::default()
    });

    Ok(Sheet {
        name: EXPORT_SHEET_NAME,
        columns: &EXPORT_COLUMNS,
        rows,
    })
}

/// Exports `records` into `dir/expenses.<ext>` and returns the written path.
pub fn export_records<W: SpreadsheetWriter>(
    records: &[ExpenseRecord],
    writer: &W,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    let sheet = build_sheet(records)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{EXPORT_FILE_STEM}.{}", writer.extension()));
    writer.write(&sheet, &path)?;

    info!(
        "event=export module=export status=ok format={} rows={}",
        writer.extension(),
        sheet.rows.len()
    );
    Ok(path)
}
