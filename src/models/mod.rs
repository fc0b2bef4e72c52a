//! The domain models: ledger entries and the expenses that can be linked to them.

mod entry;
mod expense;

pub use entry::{Entry, EntryPatch, EntryTags, EntryWithExpenses, NewEntry};
pub use expense::{Expense, ExpensePatch, ExpenseTags, ExpenseWithEntry, NewExpense};
