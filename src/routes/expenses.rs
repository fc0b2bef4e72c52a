//! Route handlers for creating, querying and modifying expenses.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use time::Date;

use crate::{
    AppState, Error,
    database_id::{EntryId, ExpenseId},
    extract::{JsonBody, PathParam, QueryParams},
    latest::{latest_date, latest_expenses},
    linking::{find_unassigned, reset_link, suggest_entries},
    models::{Entry, Expense, ExpensePatch, ExpenseTags, ExpenseWithEntry, NewExpense},
    query::{ExpenseFilter, Inclusion, ListQuery, MonthQuery},
    relations::include_entry,
    timezone::current_local_date,
};

use super::{Count, FlatParams};

/// The page reported by [get_expense_page] until paging is implemented.
const EXPENSE_PAGE: u64 = 2;

/// Query parameters that select expenses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ExpenseWhereParams {
    since: Option<Date>,
    until: Option<Date>,
    ymd: Option<Date>,
    method: Option<String>,
    description: Option<String>,
    entry_id: Option<EntryId>,
    unassigned: Option<bool>,
}

impl From<ExpenseWhereParams> for ExpenseFilter {
    fn from(params: ExpenseWhereParams) -> Self {
        Self {
            since: params.since,
            until: params.until,
            ymd: params.ymd,
            method: params.method,
            description: params.description,
            entry_id: params.entry_id,
            unassigned: params.unassigned.unwrap_or(false),
        }
    }
}

/// Query parameters for listing expenses.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ExpenseListParams {
    year: Option<i32>,
    month: Option<u8>,
    since: Option<Date>,
    until: Option<Date>,
    ymd: Option<Date>,
    method: Option<String>,
    description: Option<String>,
    entry_id: Option<EntryId>,
    unassigned: Option<bool>,
    limit: Option<u64>,
    offset: Option<u64>,
    flat: Option<bool>,
}

pub(super) async fn create_expense(
    State(state): State<AppState>,
    JsonBody(new_expense): JsonBody<NewExpense>,
) -> Result<Json<Expense>, Error> {
    state.expense_store.create(new_expense).map(Json)
}

pub(super) async fn create_expenses(
    State(state): State<AppState>,
    JsonBody(new_expenses): JsonBody<Vec<NewExpense>>,
) -> Result<Json<Vec<Expense>>, Error> {
    state.expense_store.create_many(new_expenses).map(Json)
}

pub(super) async fn count_expenses(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ExpenseWhereParams>,
) -> Result<Json<Count>, Error> {
    let count = state.expense_store.count(&params.into())?;

    Ok(Json(Count { count }))
}

/// Get expenses, most recent first.
///
/// Expenses are only limited to a calendar month if a year or month is given.
pub(super) async fn get_expenses(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ExpenseListParams>,
) -> Result<Response, Error> {
    let month = MonthQuery {
        year: params.year,
        month: params.month,
    };

    let mut filter = ExpenseFilter {
        since: params.since,
        until: params.until,
        ymd: params.ymd,
        method: params.method,
        description: params.description,
        entry_id: params.entry_id,
        unassigned: params.unassigned.unwrap_or(false),
    };

    if !month.is_empty() {
        let range = month.resolve(current_local_date(&state.local_timezone)?)?;
        filter = filter.within(range);
    }

    let query = ListQuery::new(filter).paginate(params.limit, params.offset)?;
    let expenses = state.expense_store.get_query(&query)?;

    match Inclusion::from_flat(params.flat) {
        Inclusion::Flat => Ok(Json(expenses).into_response()),
        Inclusion::WithRelations => {
            let expenses = include_entry(expenses, state.entry_store.as_ref())?;
            Ok(Json(expenses).into_response())
        }
    }
}

pub(super) async fn get_expense(
    State(state): State<AppState>,
    PathParam(expense_id): PathParam<ExpenseId>,
    QueryParams(params): QueryParams<FlatParams>,
) -> Result<Response, Error> {
    let expense = state.expense_store.get(expense_id)?;

    match Inclusion::from_flat(params.flat) {
        Inclusion::Flat => Ok(Json(expense).into_response()),
        Inclusion::WithRelations => {
            let mut expenses = include_entry(vec![expense], state.entry_store.as_ref())?;
            match expenses.pop() {
                Some(expense) => Ok(Json(expense).into_response()),
                None => Err(Error::NotFound),
            }
        }
    }
}

pub(super) async fn update_expenses_where(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ExpenseWhereParams>,
    JsonBody(patch): JsonBody<ExpensePatch>,
) -> Result<Json<Count>, Error> {
    let count = state.expense_store.update_where(&params.into(), &patch)?;

    Ok(Json(Count { count }))
}

pub(super) async fn update_expense(
    State(state): State<AppState>,
    PathParam(expense_id): PathParam<ExpenseId>,
    JsonBody(patch): JsonBody<ExpensePatch>,
) -> Result<StatusCode, Error> {
    state.expense_store.update(expense_id, &patch)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Replace the tags of an expense, leaving its other fields unchanged.
pub(super) async fn update_expense_tags(
    State(state): State<AppState>,
    PathParam(expense_id): PathParam<ExpenseId>,
    JsonBody(ExpenseTags { tags }): JsonBody<ExpenseTags>,
) -> Result<StatusCode, Error> {
    let patch = ExpensePatch {
        tags: Some(tags),
        ..Default::default()
    };
    state.expense_store.update(expense_id, &patch)?;

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn replace_expense(
    State(state): State<AppState>,
    PathParam(expense_id): PathParam<ExpenseId>,
    JsonBody(new_expense): JsonBody<NewExpense>,
) -> Result<StatusCode, Error> {
    state.expense_store.replace(expense_id, new_expense)?;

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn delete_expense(
    State(state): State<AppState>,
    PathParam(expense_id): PathParam<ExpenseId>,
) -> Result<StatusCode, Error> {
    state.expense_store.delete(expense_id)?;

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn get_latest_expenses(
    State(state): State<AppState>,
) -> Result<Json<Vec<ExpenseWithEntry>>, Error> {
    latest_expenses(state.expense_store.as_ref(), state.entry_store.as_ref()).map(Json)
}

pub(super) async fn get_latest_expense_date(
    State(state): State<AppState>,
) -> Result<Json<Date>, Error> {
    latest_date(state.expense_store.as_ref()).map(Json)
}

/// Get the expenses in a calendar month that are not linked to an entry.
pub(super) async fn get_unassigned_expenses(
    State(state): State<AppState>,
    QueryParams(month): QueryParams<MonthQuery>,
) -> Result<Json<Vec<Expense>>, Error> {
    let range = month.resolve(current_local_date(&state.local_timezone)?)?;

    find_unassigned(state.expense_store.as_ref(), range).map(Json)
}

pub(super) async fn get_expense_page() -> Json<u64> {
    Json(EXPENSE_PAGE)
}

pub(super) async fn reset_expense_link(
    State(state): State<AppState>,
    PathParam(expense_id): PathParam<ExpenseId>,
) -> Result<StatusCode, Error> {
    reset_link(state.expense_store.as_ref(), expense_id)?;

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn get_expense_link_suggestions(
    PathParam(expense_id): PathParam<ExpenseId>,
) -> Json<Vec<Entry>> {
    Json(suggest_entries(expense_id))
}

/// Get the entry an expense is linked to.
pub(super) async fn get_expense_entry(
    State(state): State<AppState>,
    PathParam(expense_id): PathParam<ExpenseId>,
) -> Result<Json<Entry>, Error> {
    let expense = state.expense_store.get(expense_id)?;
    let entry_id = expense
        .entry_id
        .ok_or(Error::UnassignedExpense(expense_id))?;

    state.entry_store.get(entry_id).map(Json)
}
