//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;
/// The ID of an [Entry](crate::models::Entry).
pub type EntryId = DatabaseId;
/// The ID of an [Expense](crate::models::Expense).
pub type ExpenseId = DatabaseId;
