//! Contains traits and implementations for objects that store the domain [models](crate::models).

mod entry;
mod expense;

pub mod sqlite;

pub use entry::EntryStore;
pub use expense::ExpenseStore;
