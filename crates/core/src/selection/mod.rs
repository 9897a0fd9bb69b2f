//! Persisted pool selection.
//!
//! The last pool, ticket/guarantee sizes, stakes and generated tickets are
//! kept under a single key so the CLI can pick up where it left off.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteSelectionStore;
pub use store::{SelectionStore, StoreError};
pub use types::{SavedSelection, STATE_KEY};
