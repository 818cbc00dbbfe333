//! Persistence contracts and the SQLite slot implementation.
//!
//! # Invariants
//! - Callers see `Corrupt` for unreadable blobs in addition to DB transport
//!   errors; individual bad records never fail a load.

pub mod expense_gateway;
