//! Creates the database schema.

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error,
    stores::sqlite::{SQLiteEntryStore, SQLiteExpenseStore},
};

/// A trait for adding an object schema to a database.
pub trait CreateTable {
    /// Create the table for the model if it does not already exist.
    ///
    /// # Errors
    /// Returns an error if there is an SQL error.
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error>;
}

/// Create the tables for the entries and expenses and enable foreign key
/// enforcement on `connection`.
///
/// Safe to call on a database that has already been initialized.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Has no effect inside a transaction.
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    SQLiteEntryStore::create_table(&transaction)?;
    SQLiteExpenseStore::create_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
