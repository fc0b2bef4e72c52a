//! Defines the entry store trait.

use std::fmt::Debug;

use crate::{
    Error,
    database_id::EntryId,
    models::{Entry, EntryPatch, NewEntry},
    query::{EntryFilter, ListQuery},
};

/// Handles the creation, retrieval and modification of entries.
pub trait EntryStore: Debug + Send + Sync {
    /// Create a new entry in the store.
    fn create(&self, new_entry: NewEntry) -> Result<Entry, Error>;

    /// Create many entries at once.
    ///
    /// Implementers should create either all of the entries or none of them.
    fn create_many(&self, new_entries: Vec<NewEntry>) -> Result<Vec<Entry>, Error>;

    /// Retrieve an entry from the store.
    ///
    /// Returns [Error::NotFound] if `id` does not refer to an entry.
    fn get(&self, id: EntryId) -> Result<Entry, Error>;

    /// Retrieve the entries with the given `ids`. IDs that do not refer to an
    /// entry are skipped.
    fn get_many(&self, ids: &[EntryId]) -> Result<Vec<Entry>, Error>;

    /// Retrieve entries from the store in the way defined by `query`.
    fn get_query(&self, query: &ListQuery<EntryFilter>) -> Result<Vec<Entry>, Error>;

    /// Count the entries matching `filter`.
    fn count(&self, filter: &EntryFilter) -> Result<usize, Error>;

    /// Merge `patch` into the entry `id`.
    ///
    /// Returns [Error::UpdateMissingEntry] if `id` does not refer to an entry.
    fn update(&self, id: EntryId, patch: &EntryPatch) -> Result<(), Error>;

    /// Merge `patch` into every entry matching `filter` and return how many
    /// entries matched.
    fn update_where(&self, filter: &EntryFilter, patch: &EntryPatch) -> Result<usize, Error>;

    /// Overwrite every field of the entry `id`.
    ///
    /// Returns [Error::UpdateMissingEntry] if `id` does not refer to an entry.
    fn replace(&self, id: EntryId, new_entry: NewEntry) -> Result<(), Error>;

    /// Delete the entry `id`. Expenses linked to it become unassigned.
    ///
    /// Returns [Error::DeleteMissingEntry] if `id` does not refer to an entry.
    fn delete(&self, id: EntryId) -> Result<(), Error>;
}
