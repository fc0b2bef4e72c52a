//! SQLite backed implementations of the store traits, plus the helpers they
//! share for building queries.

mod entry;
mod expense;

pub use entry::SQLiteEntryStore;
pub use expense::SQLiteExpenseStore;

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, ParamsFromIter, types::Value};

use crate::{AppState, Error, db::initialize, export::ExportConfig, query::SortOrder};

/// Creates an [AppState] instance that uses SQLite for the backend.
///
/// This function will modify the database by adding the tables for the domain
/// models to the database.
///
/// # Errors
/// Returns an error if the database cannot be initialized.
pub fn create_app_state(
    db_connection: Connection,
    local_timezone: &str,
    export_config: ExportConfig,
) -> Result<AppState, Error> {
    initialize(&db_connection)?;

    let connection = Arc::new(Mutex::new(db_connection));

    Ok(AppState::new(
        Arc::new(SQLiteEntryStore::new(connection.clone())),
        Arc::new(SQLiteExpenseStore::new(connection)),
        local_timezone,
        export_config,
    ))
}

fn lock_connection(connection: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>, Error> {
    connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)
}

/// Collects the values for the numbered parameters of a dynamically built query.
#[derive(Debug, Default)]
struct SqlParameters {
    values: Vec<Value>,
}

impl SqlParameters {
    /// Add `value` to the parameters and return its placeholder, e.g. `?3`.
    fn bind(&mut self, value: impl Into<Value>) -> String {
        self.values.push(value.into());
        format!("?{}", self.values.len())
    }

    fn as_params(&self) -> ParamsFromIter<std::slice::Iter<'_, Value>> {
        rusqlite::params_from_iter(self.values.iter())
    }
}

fn where_clause(conditions: &[String]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    }
}

fn order_and_limit_clause(
    sort: SortOrder,
    limit: Option<i64>,
    offset: i64,
    parameters: &mut SqlParameters,
) -> String {
    let direction = sort.as_sql();
    let mut clause = format!(" ORDER BY ymd {direction}, id {direction}");

    match (limit, offset) {
        (Some(limit), offset) => {
            let limit = parameters.bind(limit);
            let offset = parameters.bind(offset);
            clause.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
        }
        // SQLite only accepts an offset after a limit, -1 means no limit.
        (None, offset) if offset > 0 => {
            let offset = parameters.bind(offset);
            clause.push_str(&format!(" LIMIT -1 OFFSET {offset}"));
        }
        (None, _) => {}
    }

    clause
}

fn id_list_placeholders(ids: &[i64], parameters: &mut SqlParameters) -> String {
    ids.iter()
        .map(|id| parameters.bind(*id))
        .collect::<Vec<_>>()
        .join(", ")
}
