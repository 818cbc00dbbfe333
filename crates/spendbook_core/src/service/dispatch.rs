//! Routes row interactions to tracker commands.
//!
//! Rendered rows only carry ids and [`RowAction`]s; this module is the one
//! place that turns an action into a mutation.

use crate::model::expense::ExpenseInput;
use crate::render::RowAction;
use crate::repo::expense_gateway::ExpenseGateway;
use crate::service::expense_service::{Clock, ExpenseTracker, TrackerResult};

/// Result of one dispatched row action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Edit started; holds the values to re-enter, or `None` if the id was gone.
    EditStarted(Option<ExpenseInput>),
    /// Delete ran; `true` when a record was removed.
    Deleted(bool),
}

pub fn dispatch<G: ExpenseGateway, C: Clock>(
    tracker: &mut ExpenseTracker<G, C>,
    action: RowAction,
) -> TrackerResult<ActionOutcome> {
    match action {
        RowAction::Edit(id) => tracker.edit(id).map(ActionOutcome::EditStarted),
        RowAction::Delete(id) => tracker.delete(id).map(ActionOutcome::Deleted),
    }
}
