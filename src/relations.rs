//! Attaches related records to entries and expenses.
//!
//! Relations are never loaded implicitly by the stores. Handlers call these
//! functions when a request does not ask for flat records.

use std::collections::{HashMap, HashSet};

use crate::{
    Error,
    database_id::EntryId,
    models::{Entry, EntryWithExpenses, Expense, ExpenseWithEntry},
    stores::{EntryStore, ExpenseStore},
};

/// Attach the linked expenses to each of `entries`.
///
/// The expenses of each entry are ordered most recent first. The order of
/// `entries` is preserved.
///
/// # Errors
/// Returns an error if the expenses could not be fetched.
pub fn include_expenses(
    entries: Vec<Entry>,
    expense_store: &dyn ExpenseStore,
) -> Result<Vec<EntryWithExpenses>, Error> {
    let entry_ids: Vec<EntryId> = entries.iter().map(|entry| entry.id).collect();
    let mut expenses_by_entry: HashMap<EntryId, Vec<Expense>> = HashMap::new();

    for expense in expense_store.get_by_entries(&entry_ids)? {
        if let Some(entry_id) = expense.entry_id {
            expenses_by_entry.entry(entry_id).or_default().push(expense);
        }
    }

    Ok(entries
        .into_iter()
        .map(|entry| EntryWithExpenses {
            expenses: expenses_by_entry.remove(&entry.id).unwrap_or_default(),
            entry,
        })
        .collect())
}

/// Attach the linked entry to each of `expenses`.
///
/// Unassigned expenses are returned without an entry.
///
/// # Errors
/// Returns an error if the entries could not be fetched.
pub fn include_entry(
    expenses: Vec<Expense>,
    entry_store: &dyn EntryStore,
) -> Result<Vec<ExpenseWithEntry>, Error> {
    let entry_ids: Vec<EntryId> = expenses
        .iter()
        .filter_map(|expense| expense.entry_id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let entries_by_id: HashMap<EntryId, Entry> = entry_store
        .get_many(&entry_ids)?
        .into_iter()
        .map(|entry| (entry.id, entry))
        .collect();

    Ok(expenses
        .into_iter()
        .map(|expense| ExpenseWithEntry {
            entry: expense
                .entry_id
                .and_then(|entry_id| entries_by_id.get(&entry_id).cloned()),
            expense,
        })
        .collect())
}
