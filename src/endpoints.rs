//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/entries/{entry_id}', use [format_endpoint].

/// The route to create and query entries.
pub const ENTRIES: &str = "/entries";
/// The route to create many entries at once.
pub const ENTRIES_MULTIPLE: &str = "/entries/multiple";
/// The route to count entries.
pub const ENTRIES_COUNT: &str = "/entries/count";
/// The route to download every entry as a CSV file.
pub const ENTRIES_DOWNLOAD: &str = "/entries/download-data";
/// The route to access a single entry.
pub const ENTRY: &str = "/entries/{entry_id}";
/// The route to replace the tags of an entry.
pub const ENTRY_TAGS: &str = "/entries/{entry_id}/tags";
/// The route to get expenses that could be linked to an entry.
pub const ENTRY_LINK_SUGGESTIONS: &str = "/entries/{entry_id}/link-suggestions";
/// The route to access the expenses linked to an entry.
pub const ENTRY_EXPENSES: &str = "/entries/{entry_id}/expenses";

/// The route to create and query expenses.
pub const EXPENSES: &str = "/expenses";
/// The route to create many expenses at once.
pub const EXPENSES_MULTIPLE: &str = "/expenses/multiple";
/// The route to count expenses.
pub const EXPENSES_COUNT: &str = "/expenses/count";
/// The route to get the expenses on the most recent date.
pub const EXPENSES_LATEST: &str = "/expenses/latest";
/// The route to get the date of the most recent expense.
pub const EXPENSES_LATEST_DATE: &str = "/expenses/latest/date";
/// The route to get the expenses in a month that are not linked to an entry.
pub const EXPENSES_UNASSIGNED: &str = "/expenses-unassigned";
/// The route to get the current page of expenses.
pub const EXPENSES_PAGE: &str = "/expenses/page";
/// The route to download every expense as a CSV file.
pub const EXPENSES_DOWNLOAD: &str = "/expenses/download-csv";
/// The route to access a single expense.
pub const EXPENSE: &str = "/expenses/{expense_id}";
/// The route to replace the tags of an expense.
pub const EXPENSE_TAGS: &str = "/expenses/{expense_id}/tags";
/// The route to unlink an expense from its entry.
pub const EXPENSE_RESET_LINK: &str = "/expenses/{expense_id}/reset-link";
/// The route to get entries that an expense could be linked to.
pub const EXPENSE_LINK_SUGGESTIONS: &str = "/expenses/{expense_id}/link-suggestions";
/// The route to get the entry an expense is linked to.
pub const EXPENSE_ENTRY: &str = "/expenses/{expense_id}/entry";

/// The route to write every entry and expense to the export directory.
pub const DATA_BACKUP: &str = "/data-backup";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/entries/{entry_id}', '{entry_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map_or(endpoint_path.len(), |end| param_start + end + 1);

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
