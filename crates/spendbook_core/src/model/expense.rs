//! Expense domain model.
//!
//! # Responsibility
//! - Define the canonical expense record persisted and rendered by core.
//! - Validate raw form input before anything reaches the record store.
//!
//! # Invariants
//! - `id` is unique among live records and never reused by an edit.
//! - `amount` is finite and non-negative.
//! - `description` and `category` are never blank.

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Stable identifier of one expense, epoch milliseconds at creation.
pub type ExpenseId = i64;

/// ISO calendar date format used for storage and form input.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical expense record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    pub description: String,
    /// Serialized as a JSON number carrying every stored digit.
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub amount: Decimal,
    /// Raw label; grouping never normalizes case or whitespace.
    pub category: String,
    /// Serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
}

impl ExpenseRecord {
    /// Builds a record from already validated fields.
    pub fn new(id: ExpenseId, fields: ValidExpense) -> Self {
        Self {
            id,
            description: fields.description,
            amount: fields.amount,
            category: fields.category,
            date: fields.date,
        }
    }

    /// Checks invariants of a record that did not come through [`ExpenseInput`],
    /// e.g. one decoded from storage.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::Blank(ExpenseField::Description));
        }
        if self.category.trim().is_empty() {
            return Err(ValidationError::Blank(ExpenseField::Category));
        }
        if self.amount.is_sign_negative() && !self.amount.is_zero() {
            return Err(ValidationError::NegativeAmount(self.amount));
        }
        Ok(())
    }

    /// Returns the field values as they would be re-entered into a form.
    pub fn to_input(&self) -> ExpenseInput {
        ExpenseInput {
            description: self.description.clone(),
            amount: self.amount.to_string(),
            category: self.category.clone(),
            date: self.date.format(ISO_DATE_FORMAT).to_string(),
        }
    }
}

/// Raw, unvalidated form values for one expense.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseInput {
    pub description: String,
    pub amount: String,
    pub category: String,
    pub date: String,
}

impl ExpenseInput {
    pub fn new(
        description: impl Into<String>,
        amount: impl Into<String>,
        category: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            amount: amount.into(),
            category: category.into(),
            date: date.into(),
        }
    }

    /// Empty form whose date defaults to the local calendar day.
    pub fn today() -> Self {
        Self {
            date: Local::now().date_naive().format(ISO_DATE_FORMAT).to_string(),
            ..Self::default()
        }
    }

    /// Validates every field in form order and returns typed values.
    ///
    /// # Errors
    /// - Returns the first failing field; later fields are not inspected.
    pub fn validate(&self) -> Result<ValidExpense, ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::Blank(ExpenseField::Description));
        }
        let amount = parse_amount(&self.amount)?;
        if self.category.trim().is_empty() {
            return Err(ValidationError::Blank(ExpenseField::Category));
        }
        let date = parse_date(&self.date)?;

        Ok(ValidExpense {
            description: self.description.clone(),
            amount,
            category: self.category.clone(),
            date,
        })
    }
}

/// Typed field values that passed [`ExpenseInput::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidExpense {
    pub description: String,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
}

/// Form field names used in validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpenseField {
    Description,
    Amount,
    Category,
    Date,
}

impl ExpenseField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Amount => "amount",
            Self::Category => "category",
            Self::Date => "date",
        }
    }
}

impl Display for ExpenseField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-specific rejection of expense input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Blank(ExpenseField),
    InvalidAmount(String),
    NegativeAmount(Decimal),
    /// Adding the amount would push the ledger total past `Decimal::MAX`.
    TotalOverflow(Decimal),
    InvalidDate(String),
}

impl ValidationError {
    /// Field that failed validation.
    pub fn field(&self) -> ExpenseField {
        match self {
            Self::Blank(field) => *field,
            Self::InvalidAmount(_) | Self::NegativeAmount(_) | Self::TotalOverflow(_) => {
                ExpenseField::Amount
            }
            Self::InvalidDate(_) => ExpenseField::Date,
        }
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blank(field) => write!(f, "{field} must not be empty"),
            Self::InvalidAmount(value) => write!(f, "amount `{value}` is not a number"),
            Self::NegativeAmount(value) => write!(f, "amount {value} must not be negative"),
            Self::TotalOverflow(value) => {
                write!(f, "amount {value} would overflow the ledger total")
            }
            Self::InvalidDate(value) => {
                write!(f, "date `{value}` is not a valid YYYY-MM-DD date")
            }
        }
    }
}

impl Error for ValidationError {}

fn parse_amount(raw: &str) -> Result<Decimal, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank(ExpenseField::Amount));
    }
    let amount = Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| ValidationError::InvalidAmount(trimmed.to_string()))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(ValidationError::NegativeAmount(amount));
    }
    Ok(amount)
}

fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank(ExpenseField::Date));
    }
    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(trimmed.to_string()))
}
