//! Route handlers for downloading entries and expenses as CSV files and for
//! backing up every record to the export directory.

use axum::{
    Json,
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};

use crate::{
    Error,
    app_state::ExportState,
    export::{CsvExport, export_entries, export_expenses},
};

/// Write every entry to a CSV file and send the file as a download.
pub(super) async fn download_entries(State(state): State<ExportState>) -> Result<Response, Error> {
    let export = export_entries(&state.export_config, state.entry_store.as_ref())?;

    Ok(csv_attachment(export))
}

/// Write every expense to a CSV file and send the file as a download.
pub(super) async fn download_expenses(
    State(state): State<ExportState>,
) -> Result<Response, Error> {
    let export = export_expenses(&state.export_config, state.expense_store.as_ref())?;

    Ok(csv_attachment(export))
}

/// Write both CSV files to the export directory and return the names of the
/// files that were written.
pub(super) async fn run_data_backup(
    State(state): State<ExportState>,
) -> Result<Json<Vec<String>>, Error> {
    let entries = export_entries(&state.export_config, state.entry_store.as_ref())?;
    let expenses = export_expenses(&state.export_config, state.expense_store.as_ref())?;

    Ok(Json(vec![file_name(&entries), file_name(&expenses)]))
}

fn file_name(export: &CsvExport) -> String {
    export
        .path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// Sends the bytes this request wrote, not the file on disk.
fn csv_attachment(export: CsvExport) -> Response {
    let file_name = file_name(&export);

    (
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        export.contents,
    )
        .into_response()
}
