use crate::model::expense::{ExpenseId, ExpenseRecord};

/// Ordered sequence of live expense records.
///
/// Insertion order is kept as the tie-break for records sharing a date.
/// The store performs no validation; callers validate before `add`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordStore {
    records: Vec<ExpenseRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from records in their persisted order.
    pub fn from_records(records: Vec<ExpenseRecord>) -> Self {
        Self { records }
    }

    /// Appends one record.
    pub fn add(&mut self, record: ExpenseRecord) {
        self.records.push(record);
    }

    /// Removes the first record with `id`.
    ///
    /// Returns the removed record, or `None` when no record matched.
    pub fn remove_by_id(&mut self, id: ExpenseId) -> Option<ExpenseRecord> {
        let index = self.records.iter().position(|record| record.id == id)?;
        Some(self.records.remove(index))
    }

    pub fn find_by_id(&self, id: ExpenseId) -> Option<&ExpenseRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn all(&self) -> &[ExpenseRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns an id strictly greater than every live id and not earlier
    /// than `now_ms`.
    pub fn next_id(&self, now_ms: ExpenseId) -> ExpenseId {
        match self.records.iter().map(|record| record.id).max() {
            Some(max_id) if max_id >= now_ms => max_id.saturating_add(1),
            _ => now_ms,
        }
    }
}
