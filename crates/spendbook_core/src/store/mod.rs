//! In-memory record store owned by the tracker for one process run.

mod record_store;

pub use record_store::RecordStore;
