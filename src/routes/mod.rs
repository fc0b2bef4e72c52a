//! This module defines the REST API's routes and their handlers.

mod entries;
mod entry_expenses;
mod expenses;
mod export;

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::{get, patch, post, put},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, Error, endpoints};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let entry_routes = Router::new()
        .route(
            endpoints::ENTRIES,
            get(entries::get_entries)
                .post(entries::create_entry)
                .patch(entries::update_entries_where),
        )
        .route(endpoints::ENTRIES_MULTIPLE, post(entries::create_entries))
        .route(endpoints::ENTRIES_COUNT, get(entries::count_entries))
        .route(endpoints::ENTRIES_DOWNLOAD, get(export::download_entries))
        .route(
            endpoints::ENTRY,
            get(entries::get_entry)
                .patch(entries::update_entry)
                .put(entries::replace_entry)
                .delete(entries::delete_entry),
        )
        .route(endpoints::ENTRY_TAGS, patch(entries::update_entry_tags))
        .route(
            endpoints::ENTRY_LINK_SUGGESTIONS,
            get(entries::get_entry_link_suggestions),
        )
        .route(
            endpoints::ENTRY_EXPENSES,
            get(entry_expenses::get_entry_expenses)
                .post(entry_expenses::create_entry_expense)
                .patch(entry_expenses::update_entry_expenses)
                .delete(entry_expenses::delete_entry_expenses),
        );

    let expense_routes = Router::new()
        .route(
            endpoints::EXPENSES,
            get(expenses::get_expenses)
                .post(expenses::create_expense)
                .patch(expenses::update_expenses_where),
        )
        .route(endpoints::EXPENSES_MULTIPLE, post(expenses::create_expenses))
        .route(endpoints::EXPENSES_COUNT, get(expenses::count_expenses))
        .route(endpoints::EXPENSES_LATEST, get(expenses::get_latest_expenses))
        .route(
            endpoints::EXPENSES_LATEST_DATE,
            get(expenses::get_latest_expense_date),
        )
        .route(
            endpoints::EXPENSES_UNASSIGNED,
            get(expenses::get_unassigned_expenses),
        )
        .route(endpoints::EXPENSES_PAGE, get(expenses::get_expense_page))
        .route(endpoints::EXPENSES_DOWNLOAD, get(export::download_expenses))
        .route(
            endpoints::EXPENSE,
            get(expenses::get_expense)
                .patch(expenses::update_expense)
                .put(expenses::replace_expense)
                .delete(expenses::delete_expense),
        )
        .route(endpoints::EXPENSE_TAGS, patch(expenses::update_expense_tags))
        .route(endpoints::EXPENSE_RESET_LINK, put(expenses::reset_expense_link))
        .route(
            endpoints::EXPENSE_LINK_SUGGESTIONS,
            get(expenses::get_expense_link_suggestions),
        )
        .route(endpoints::EXPENSE_ENTRY, get(expenses::get_expense_entry));

    entry_routes
        .merge(expense_routes)
        .route(endpoints::DATA_BACKUP, get(export::run_data_backup))
        .fallback(get_404_not_found)
        .with_state(state)
}

async fn get_404_not_found() -> Response {
    Error::NotFound.into_response()
}

/// The response body for operations that count records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Count {
    /// The number of records counted or modified.
    pub count: usize,
}

/// Query parameters for lookups of a single record.
#[derive(Debug, Default, Deserialize)]
struct FlatParams {
    flat: Option<bool>,
}

#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;

    use crate::test_utils::{assert_error, get_test_server, get_test_state};

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let server = get_test_server(get_test_state());

        let response = server.get("/budgets").await;

        assert_error(&response, StatusCode::NOT_FOUND, "NotFoundError");
    }
}
