//! Display tree projection of a [`Summary`].
//!
//! # Responsibility
//! - Turn grouped records into display strings, one section per category.
//! - Attach row actions so an input layer can route interaction by id.
//!
//! # Invariants
//! - Rendering is pure: the same summary always yields an equal tree.
//! - Each render builds a complete tree; nothing is patched in place.
//! - Amounts are rounded to 2 fraction digits here and nowhere else.

use crate::aggregate::Summary;
use crate::model::expense::{ExpenseId, ExpenseRecord};
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::{Display, Formatter};

/// Human-facing date format, `dd/mm/yy`.
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%y";

/// User interaction available on one rendered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowAction {
    Edit(ExpenseId),
    Delete(ExpenseId),
}

impl RowAction {
    pub fn id(self) -> ExpenseId {
        match self {
            Self::Edit(id) | Self::Delete(id) => id,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Edit(_) => "Edit",
            Self::Delete(_) => "Delete",
        }
    }
}

/// One rendered expense line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRow {
    pub id: ExpenseId,
    pub description: String,
    pub amount: String,
    pub date: String,
}

impl ExpenseRow {
    pub fn actions(&self) -> [RowAction; 2] {
        [RowAction::Edit(self.id), RowAction::Delete(self.id)]
    }
}

/// One category block: heading, rows, footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySection {
    pub heading: String,
    pub rows: Vec<ExpenseRow>,
    pub subtotal: String,
    pub count: usize,
    /// `Total <category>: <currency> <subtotal> | Items: <count>`.
    pub footer: String,
}

/// Complete display state for one render pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayTree {
    pub sections: Vec<CategorySection>,
    /// Grand total with 2 fraction digits and no currency label.
    pub grand_total: String,
}

impl DisplayTree {
    /// Finds the row rendered for `id`.
    pub fn row(&self, id: ExpenseId) -> Option<&ExpenseRow> {
        self.sections
            .iter()
            .flat_map(|section| section.rows.iter())
            .find(|row| row.id == id)
    }

    pub fn row_count(&self) -> usize {
        self.sections.iter().map(|section| section.rows.len()).sum()
    }
}

/// Renders `summary` with `currency` as the amount prefix.
pub fn render(summary: &Summary<'_>, currency: &str) -> DisplayTree {
    let sections = summary
        .groups
        .iter()
        .map(|(category, group)| {
            let subtotal = format_amount(group.subtotal);
            let count = group.count();
            CategorySection {
                heading: (*category).to_string(),
                rows: group
                    .records
                    .iter()
                    .map(|record| render_row(record, currency))
                    .collect(),
                footer: format!("Total {category}: {currency} {subtotal} | Items: {count}"),
                subtotal,
                count,
            }
        })
        .collect();

    DisplayTree {
        sections,
        grand_total: format_amount(summary.grand_total),
    }
}

fn render_row(record: &ExpenseRecord, currency: &str) -> ExpenseRow {
    ExpenseRow {
        id: record.id,
        description: record.description.clone(),
        amount: format!("{currency} {}", format_amount(record.amount)),
        date: format_display_date(record.date),
    }
}

/// Formats an amount with exactly 2 fraction digits, half away from zero.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

/// Formats a date as `dd/mm/yy`.
pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Plain-text layout used by terminal front-ends.
impl Display for DisplayTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for section in &self.sections {
            writeln!(f, "{}", section.heading)?;
            for row in &section.rows {
                writeln!(
                    f,
                    "  [{}] {}  {}  {}",
                    row.id, row.description, row.amount, row.date
                )?;
            }
            writeln!(f, "  {}", section.footer)?;
            writeln!(f)?;
        }
        write!(f, "Total: {}", self.grand_total)
    }
}
