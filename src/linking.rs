//! Rules for linking expenses to entries: finding unassigned expenses,
//! unlinking an expense and suggesting links.

use crate::{
    Error,
    database_id::{EntryId, ExpenseId},
    models::{Entry, Expense, NewExpense},
    query::{DateRange, ExpenseFilter, ListQuery},
    stores::ExpenseStore,
};

/// Get the expenses in `range` that are not linked to an entry, most recent
/// first.
///
/// # Errors
/// Returns an error if the expenses could not be fetched.
pub fn find_unassigned(
    expense_store: &dyn ExpenseStore,
    range: DateRange,
) -> Result<Vec<Expense>, Error> {
    let mut expenses =
        expense_store.get_query(&ListQuery::new(ExpenseFilter::default().within(range)))?;
    expenses.retain(Expense::is_unassigned);

    Ok(expenses)
}

/// Unlink the expense `id` from its entry.
///
/// Every other field of the expense is kept as is.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to an expense.
pub fn reset_link(expense_store: &dyn ExpenseStore, id: ExpenseId) -> Result<(), Error> {
    let expense = expense_store.get(id)?;

    let unlinked = NewExpense {
        ymd: expense.ymd,
        description: expense.description,
        tags: expense.tags,
        method: expense.method,
        inflow: expense.inflow,
        outflow: expense.outflow,
        entry_id: None,
    };

    match expense_store.replace(id, unlinked) {
        Err(Error::UpdateMissingExpense) => Err(Error::NotFound),
        result => result,
    }
}

/// Suggest expenses that could be linked to the entry `entry_id`.
///
/// Matching is not implemented yet, so there are never any suggestions.
pub fn suggest_expenses(_entry_id: EntryId) -> Vec<Expense> {
    Vec::new()
}

/// Suggest entries that the expense `expense_id` could be linked to.
///
/// Matching is not implemented yet, so there are never any suggestions.
pub fn suggest_entries(_expense_id: ExpenseId) -> Vec<Entry> {
    Vec::new()
}
