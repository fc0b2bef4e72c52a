//! Implements a struct that holds the state of the REST server.

use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    export::ExportConfig,
    stores::{EntryStore, ExpenseStore},
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The store for managing [entries](crate::models::Entry).
    pub entry_store: Arc<dyn EntryStore>,

    /// The store for managing [expenses](crate::models::Expense).
    pub expense_store: Arc<dyn ExpenseStore>,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// Used to decide which month is the current one.
    pub local_timezone: String,

    /// Where CSV exports are written.
    pub export_config: ExportConfig,
}

impl AppState {
    /// Create a new [AppState].
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    pub fn new(
        entry_store: Arc<dyn EntryStore>,
        expense_store: Arc<dyn ExpenseStore>,
        local_timezone: &str,
        export_config: ExportConfig,
    ) -> Self {
        Self {
            entry_store,
            expense_store,
            local_timezone: local_timezone.to_owned(),
            export_config,
        }
    }
}

/// The state needed to export records to CSV files.
#[derive(Debug, Clone)]
pub struct ExportState {
    /// The store to read entries from.
    pub entry_store: Arc<dyn EntryStore>,
    /// The store to read expenses from.
    pub expense_store: Arc<dyn ExpenseStore>,
    /// Where the files are written.
    pub export_config: ExportConfig,
}

impl FromRef<AppState> for ExportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            entry_store: state.entry_store.clone(),
            expense_store: state.expense_store.clone(),
            export_config: state.export_config.clone(),
        }
    }
}
