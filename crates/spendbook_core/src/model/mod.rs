//! Domain model for recorded expenses.
//!
//! # Responsibility
//! - Define the record shape shared by storage, aggregation and export.
//! - Own field validation for form input.
//!
//! # Invariants
//! - Records are identified only by their `ExpenseId`.
//! - Invalid input never becomes an `ExpenseRecord`.

pub mod expense;
