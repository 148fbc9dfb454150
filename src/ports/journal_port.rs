//! Journal store port trait.

use crate::domain::entry::{EntryPatch, NewEntry, TradeEntry};
use crate::domain::error::JournalError;
use crate::domain::filter::{EntryFilter, PageRequest, PageResult};

/// Persistent store of one-or-more owners' journal rows. Every operation
/// is scoped to an `owner_id`; a row belonging to another owner behaves as
/// if it did not exist.
pub trait JournalPort {
    fn insert(&self, owner_id: i64, entry: NewEntry) -> Result<TradeEntry, JournalError>;

    fn get(&self, owner_id: i64, id: i64) -> Result<Option<TradeEntry>, JournalError>;

    /// Apply a partial update. Returns `false` when the row does not exist
    /// for this owner.
    fn update(&self, owner_id: i64, id: i64, patch: EntryPatch) -> Result<bool, JournalError>;

    /// Delete a row. Returns `false` when the row does not exist for this
    /// owner.
    fn delete(&self, owner_id: i64, id: i64) -> Result<bool, JournalError>;

    fn list(
        &self,
        owner_id: i64,
        filter: &EntryFilter,
        page: PageRequest,
    ) -> Result<PageResult<TradeEntry>, JournalError>;

    /// The owner's complete journal, unpaginated, for the dashboard and
    /// for export.
    fn fetch_all_for_owner(&self, owner_id: i64) -> Result<Vec<TradeEntry>, JournalError>;
}
