//! Defines the expense store trait.

use std::fmt::Debug;

use time::Date;

use crate::{
    Error,
    database_id::{EntryId, ExpenseId},
    models::{Expense, ExpensePatch, NewExpense},
    query::{ExpenseFilter, ListQuery},
};

/// Handles the creation, retrieval and modification of expenses.
///
/// Writes that link an expense to an entry that does not exist fail with
/// [Error::InvalidEntryId].
pub trait ExpenseStore: Debug + Send + Sync {
    /// Create a new expense in the store.
    fn create(&self, new_expense: NewExpense) -> Result<Expense, Error>;

    /// Create many expenses at once.
    ///
    /// Implementers should create either all of the expenses or none of them.
    fn create_many(&self, new_expenses: Vec<NewExpense>) -> Result<Vec<Expense>, Error>;

    /// Retrieve an expense from the store.
    ///
    /// Returns [Error::NotFound] if `id` does not refer to an expense.
    fn get(&self, id: ExpenseId) -> Result<Expense, Error>;

    /// Retrieve every expense linked to one of `entry_ids`, most recent first.
    fn get_by_entries(&self, entry_ids: &[EntryId]) -> Result<Vec<Expense>, Error>;

    /// Retrieve expenses from the store in the way defined by `query`.
    fn get_query(&self, query: &ListQuery<ExpenseFilter>) -> Result<Vec<Expense>, Error>;

    /// Count the expenses matching `filter`.
    fn count(&self, filter: &ExpenseFilter) -> Result<usize, Error>;

    /// Get the most recent date of any expense.
    ///
    /// Returns [Error::EmptyResult] if there are no expenses.
    fn latest_date(&self) -> Result<Date, Error>;

    /// Merge `patch` into the expense `id`.
    ///
    /// Returns [Error::UpdateMissingExpense] if `id` does not refer to an expense.
    fn update(&self, id: ExpenseId, patch: &ExpensePatch) -> Result<(), Error>;

    /// Merge `patch` into every expense matching `filter` and return how many
    /// expenses matched.
    fn update_where(&self, filter: &ExpenseFilter, patch: &ExpensePatch) -> Result<usize, Error>;

    /// Overwrite every field of the expense `id`, including its entry link.
    ///
    /// Returns [Error::UpdateMissingExpense] if `id` does not refer to an expense.
    fn replace(&self, id: ExpenseId, new_expense: NewExpense) -> Result<(), Error>;

    /// Delete the expense `id`.
    ///
    /// Returns [Error::DeleteMissingExpense] if `id` does not refer to an expense.
    fn delete(&self, id: ExpenseId) -> Result<(), Error>;

    /// Delete every expense matching `filter` and return how many were deleted.
    fn delete_where(&self, filter: &ExpenseFilter) -> Result<usize, Error>;
}
