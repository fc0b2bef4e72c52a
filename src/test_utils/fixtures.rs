use std::path::Path;

use rusqlite::Connection;
use time::Date;

use crate::{
    AppState,
    export::ExportConfig,
    models::{NewEntry, NewExpense},
    stores::sqlite::create_app_state,
};

pub(crate) fn get_test_state() -> AppState {
    get_test_state_with_export_dir(&std::env::temp_dir())
}

pub(crate) fn get_test_state_with_export_dir(export_dir: &Path) -> AppState {
    let connection =
        Connection::open_in_memory().expect("Could not open database in memory.");

    create_app_state(connection, "Etc/UTC", ExportConfig::new(export_dir))
        .expect("Could not create app state")
}

pub(crate) fn new_entry(ymd: Date, description: &str) -> NewEntry {
    NewEntry {
        ymd,
        description: description.to_owned(),
        tags: "".to_owned(),
        method: "cash".to_owned(),
        inflow: 0.0,
        outflow: 20.0,
    }
}

pub(crate) fn new_expense(ymd: Date, description: &str) -> NewExpense {
    NewExpense {
        ymd,
        description: description.to_owned(),
        tags: vec![],
        method: "card".to_owned(),
        inflow: 0.0,
        outflow: 5.0,
        entry_id: None,
    }
}
