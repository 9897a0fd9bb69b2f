//! Selection storage trait.

use thiserror::Error;

use super::SavedSelection;

/// Error type for selection storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Storage for the single saved selection.
pub trait SelectionStore: Send + Sync {
    /// Load the saved selection, if any.
    fn load(&self) -> Result<Option<SavedSelection>, StoreError>;

    /// Replace the saved selection.
    fn save(&self, selection: &SavedSelection) -> Result<(), StoreError>;

    /// Remove the saved selection. Returns true if one existed.
    fn clear(&self) -> Result<bool, StoreError>;
}
