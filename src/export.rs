//! Writes entries and expenses to CSV files inside the export directory.

use std::path::{Component, Path, PathBuf};

use serde::{Serialize, Serializer};

use crate::{
    Error,
    database_id::{EntryId, ExpenseId},
    models::{Entry, Expense},
    query::{EntryFilter, ExpenseFilter, ListQuery},
    stores::{EntryStore, ExpenseStore},
};

/// The name of the file that entries are exported to.
pub const ENTRIES_FILE_NAME: &str = "entries.csv";
/// The name of the file that expenses are exported to.
pub const EXPENSES_FILE_NAME: &str = "expenses.csv";

const ENTRY_HEADER: [&str; 7] = [
    "id",
    "ymd",
    "description",
    "tags",
    "method",
    "inflow",
    "outflow",
];
const EXPENSE_HEADER: [&str; 8] = [
    "id",
    "ymd",
    "description",
    "tags",
    "method",
    "inflow",
    "outflow",
    "entryId",
];

/// A CSV file written to the export directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvExport {
    /// Where the file was written.
    pub path: PathBuf,
    /// The bytes written to the file.
    pub contents: Vec<u8>,
}

/// Where exported files are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportConfig {
    /// The directory that every exported file must be inside of.
    pub directory: PathBuf,
}

impl ExportConfig {
    /// Create a config that writes files into `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

/// Join `file_name` onto `directory`, refusing names that would leave the
/// directory.
///
/// # Errors
/// Returns [Error::InvalidPath] if `file_name` is empty, absolute or contains
/// `..` or `.` components.
pub fn resolve_export_path(directory: &Path, file_name: &str) -> Result<PathBuf, Error> {
    let relative = Path::new(file_name);
    let mut components = relative.components().peekable();

    if components.peek().is_none()
        || !components.all(|component| matches!(component, Component::Normal(_)))
    {
        tracing::warn!("Rejected export file name {file_name:?}");
        return Err(Error::InvalidPath(file_name.to_owned()));
    }

    Ok(directory.join(relative))
}

/// Write every entry to the entries CSV file.
///
/// # Errors
/// Returns [Error::ExportFailed] if the file could not be written, or an error
/// if the entries could not be read.
pub fn export_entries(
    config: &ExportConfig,
    entry_store: &dyn EntryStore,
) -> Result<CsvExport, Error> {
    let entries = entry_store.get_query(&ListQuery::new(EntryFilter::default()))?;
    let path = resolve_export_path(&config.directory, ENTRIES_FILE_NAME)?;

    write_entries_csv(&path, &entries).ok_or(Error::ExportFailed)
}

/// Write every expense to the expenses CSV file.
///
/// # Errors
/// Returns [Error::ExportFailed] if the file could not be written, or an error
/// if the expenses could not be read.
pub fn export_expenses(
    config: &ExportConfig,
    expense_store: &dyn ExpenseStore,
) -> Result<CsvExport, Error> {
    let expenses = expense_store.get_query(&ListQuery::new(ExpenseFilter::default()))?;
    let path = resolve_export_path(&config.directory, EXPENSES_FILE_NAME)?;

    write_expenses_csv(&path, &expenses).ok_or(Error::ExportFailed)
}

#[derive(Serialize)]
struct EntryRow<'a> {
    id: EntryId,
    ymd: String,
    description: &'a str,
    tags: &'a str,
    method: &'a str,
    inflow: f64,
    outflow: f64,
}

impl<'a> From<&'a Entry> for EntryRow<'a> {
    fn from(entry: &'a Entry) -> Self {
        Self {
            id: entry.id,
            ymd: entry.ymd.to_string(),
            description: &entry.description,
            tags: &entry.tags,
            method: &entry.method,
            inflow: entry.inflow,
            outflow: entry.outflow,
        }
    }
}

#[derive(Serialize)]
struct ExpenseRow<'a> {
    id: ExpenseId,
    ymd: String,
    description: &'a str,
    #[serde(serialize_with = "serialize_tags")]
    tags: &'a [String],
    method: &'a str,
    inflow: f64,
    outflow: f64,
    entry_id: Option<EntryId>,
}

impl<'a> From<&'a Expense> for ExpenseRow<'a> {
    fn from(expense: &'a Expense) -> Self {
        Self {
            id: expense.id,
            ymd: expense.ymd.to_string(),
            description: &expense.description,
            tags: &expense.tags,
            method: &expense.method,
            inflow: expense.inflow,
            outflow: expense.outflow,
            entry_id: expense.entry_id,
        }
    }
}

/// Tags go in a single cell as a JSON array so that tags containing the CSV
/// delimiter survive a round trip.
fn serialize_tags<S: Serializer>(tags: &&[String], serializer: S) -> Result<S::Ok, S::Error> {
    let json = serde_json::to_string(tags).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&json)
}

/// Write `entries` to `path`, returning `None` if the file could not be written.
pub fn write_entries_csv(path: &Path, entries: &[Entry]) -> Option<CsvExport> {
    write_csv(path, &ENTRY_HEADER, entries.iter().map(EntryRow::from))
}

/// Write `expenses` to `path`, returning `None` if the file could not be written.
///
/// Tags are written as a JSON array.
pub fn write_expenses_csv(path: &Path, expenses: &[Expense]) -> Option<CsvExport> {
    write_csv(path, &EXPENSE_HEADER, expenses.iter().map(ExpenseRow::from))
}

fn write_csv<R: Serialize>(
    path: &Path,
    header: &[&str],
    rows: impl Iterator<Item = R>,
) -> Option<CsvExport> {
    match try_write_csv(path, header, rows) {
        Ok(contents) => {
            tracing::info!("Wrote CSV export to {}", path.display());
            Some(CsvExport {
                path: path.to_owned(),
                contents,
            })
        }
        Err(error) => {
            tracing::error!("Could not write CSV export to {}: {error}", path.display());
            None
        }
    }
}

fn try_write_csv<R: Serialize>(
    path: &Path,
    header: &[&str],
    rows: impl Iterator<Item = R>,
) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(header)?;

    for row in rows {
        writer.serialize(row)?;
    }

    let contents = writer
        .into_inner()
        .map_err(|error| csv::Error::from(error.into_error()))?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, &contents)?;

    Ok(contents)
}
