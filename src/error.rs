//! Defines the app level error type and its conversion into JSON error responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::database_id::{EntryId, ExpenseId};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to update an entry that does not exist
    #[error("tried to update an entry that is not in the database")]
    UpdateMissingEntry,

    /// Tried to delete an entry that does not exist
    #[error("tried to delete an entry that is not in the database")]
    DeleteMissingEntry,

    /// Tried to update an expense that does not exist
    #[error("tried to update an expense that is not in the database")]
    UpdateMissingExpense,

    /// Tried to delete an expense that does not exist
    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,

    /// The expense has no entry linked to it.
    #[error("expense {0} is not linked to an entry")]
    UnassignedExpense(ExpenseId),

    /// A request body was missing a required field or had a field of the
    /// wrong type.
    #[error("invalid request body: {0}")]
    ValidationError(String),

    /// The entry ID used to link an expense did not match a valid entry.
    #[error("the entry ID {0} does not refer to a valid entry")]
    InvalidEntryId(EntryId),

    /// A month outside of 1-12 was requested.
    #[error("{0} is not a valid month, expected a number from 1 to 12")]
    InvalidMonth(u8),

    /// A year that cannot be represented as a calendar date was requested.
    #[error("{0} is not a supported year")]
    InvalidYear(i32),

    /// The export file path resolved to a location outside of the export
    /// directory.
    #[error("the path \"{0}\" is not inside the export directory")]
    InvalidPath(String),

    /// A query that needs at least one record ran against an empty table.
    #[error("no records found")]
    EmptyResult,

    /// The CSV export file could not be written.
    ///
    /// The underlying error is logged where it happens.
    #[error("could not write the export file")]
    ExportFailed,

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::ValidationError(rejection.body_text())
    }
}

impl Error {
    fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound
            | Error::UpdateMissingEntry
            | Error::DeleteMissingEntry
            | Error::UpdateMissingExpense
            | Error::DeleteMissingExpense
            | Error::UnassignedExpense(_)
            | Error::EmptyResult => StatusCode::NOT_FOUND,
            Error::ValidationError(_) | Error::InvalidEntryId(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Error::InvalidMonth(_) | Error::InvalidYear(_) | Error::InvalidPath(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::ExportFailed
            | Error::InvalidTimezoneError(_)
            | Error::DatabaseLockError
            | Error::SqlError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Error::NotFound
            | Error::UpdateMissingEntry
            | Error::DeleteMissingEntry
            | Error::UpdateMissingExpense
            | Error::DeleteMissingExpense
            | Error::UnassignedExpense(_) => "NotFoundError",
            Error::EmptyResult => "EmptyResultError",
            Error::ValidationError(_) | Error::InvalidEntryId(_) => "ValidationError",
            Error::InvalidMonth(_) | Error::InvalidYear(_) => "BadRequestError",
            Error::InvalidPath(_) => "InvalidPathError",
            Error::ExportFailed
            | Error::InvalidTimezoneError(_)
            | Error::DatabaseLockError
            | Error::SqlError(_) => "InternalServerError",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code = self.status_code();

        let message = if status_code == StatusCode::INTERNAL_SERVER_ERROR {
            // The details of these errors are only meant for the server logs.
            tracing::error!("An unexpected error occurred: {}", self);
            "An unexpected error occurred, check the server logs for more details.".to_owned()
        } else {
            self.to_string()
        };

        let body = Json(json!({
            "error": {
                "statusCode": status_code.as_u16(),
                "name": self.name(),
                "message": message,
            }
        }));

        (status_code, body).into_response()
    }
}

#[cfg(test)]
mod error_response_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::Value;

    use super::Error;

    async fn get_json_body(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Could not read response body");

        (
            status,
            serde_json::from_slice(&body).expect("Could not parse response body as JSON"),
        )
    }

    #[tokio::test]
    async fn not_found_is_404() {
        let (status, body) = get_json_body(Error::NotFound).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["statusCode"], 404);
        assert_eq!(body["error"]["name"], "NotFoundError");
    }

    #[tokio::test]
    async fn empty_result_is_404_with_message() {
        let (status, body) = get_json_body(Error::EmptyResult).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["message"], "no records found");
    }

    #[tokio::test]
    async fn invalid_path_is_bad_request() {
        let (status, body) = get_json_body(Error::InvalidPath("../etc/passwd".to_owned())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["name"], "InvalidPathError");
    }

    #[tokio::test]
    async fn internal_errors_hide_details() {
        let (status, body) =
            get_json_body(Error::InvalidTimezoneError("Mars/Olympus_Mons".to_owned())).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = body["error"]["message"].as_str().unwrap();
        assert!(
            !message.contains("Mars"),
            "'{message}' should not contain the error details"
        );
    }

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }
}
