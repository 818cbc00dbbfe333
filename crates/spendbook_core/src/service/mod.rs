//! Command handlers and input routing.
//!
//! # Responsibility
//! - Orchestrate store, persistence and rendering per user command.
//! - Keep front-ends decoupled from storage and rendering details.

pub mod dispatch;
pub mod expense_service;
