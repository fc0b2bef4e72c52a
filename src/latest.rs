//! Queries for the most recent expenses.

use time::Date;

use crate::{
    Error,
    models::ExpenseWithEntry,
    query::{ExpenseFilter, ListQuery},
    relations::include_entry,
    stores::{EntryStore, ExpenseStore},
};

/// The date of the most recent expense.
///
/// # Errors
/// Returns [Error::EmptyResult] if there are no expenses.
pub fn latest_date(expense_store: &dyn ExpenseStore) -> Result<Date, Error> {
    expense_store.latest_date()
}

/// Every expense on the date of the most recent expense, with their entries.
///
/// The date and the expenses are read separately, so an expense added between
/// the two reads may be missed.
///
/// # Errors
/// Returns [Error::EmptyResult] if there are no expenses.
pub fn latest_expenses(
    expense_store: &dyn ExpenseStore,
    entry_store: &dyn EntryStore,
) -> Result<Vec<ExpenseWithEntry>, Error> {
    let date = expense_store.latest_date()?;

    let filter = ExpenseFilter {
        ymd: Some(date),
        ..Default::default()
    };
    let expenses = expense_store.get_query(&ListQuery::new(filter))?;

    include_entry(expenses, entry_store)
}
