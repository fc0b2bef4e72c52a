//! Route handlers for creating, querying and modifying entries.

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
    database_id::EntryId,
    extract::{JsonBody, PathParam, QueryParams},
    linking::suggest_expenses,
    models::{Entry, EntryPatch, EntryTags, Expense, NewEntry},
    query::{EntryFilter, Inclusion, ListQuery, MonthQuery},
    relations::include_expenses,
    timezone::current_local_date,
};

use super::{Count, FlatParams};

/// Query parameters that select entries.
#[derive(Debug, Default, Deserialize)]
pub(super) struct EntryWhereParams {
    since: Option<Date>,
    until: Option<Date>,
    ymd: Option<Date>,
    method: Option<String>,
    description: Option<String>,
}

impl From<EntryWhereParams> for EntryFilter {
    fn from(params: EntryWhereParams) -> Self {
        Self {
            since: params.since,
            until: params.until,
            ymd: params.ymd,
            method: params.method,
            description: params.description,
        }
    }
}

/// Query parameters for listing entries.
#[derive(Debug, Default, Deserialize)]
pub(super) struct EntryListParams {
    year: Option<i32>,
    month: Option<u8>,
    since: Option<Date>,
    until: Option<Date>,
    ymd: Option<Date>,
    method: Option<String>,
    description: Option<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    flat: Option<bool>,
}

pub(super) async fn create_entry(
    State(state): State<AppState>,
    JsonBody(new_entry): JsonBody<NewEntry>,
) -> Result<Json<Entry>, Error> {
    state.entry_store.create(new_entry).map(Json)
}

pub(super) async fn create_entries(
    State(state): State<AppState>,
    JsonBody(new_entries): JsonBody<Vec<NewEntry>>,
) -> Result<Json<Vec<Entry>>, Error> {
    state.entry_store.create_many(new_entries).map(Json)
}

pub(super) async fn count_entries(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<EntryWhereParams>,
) -> Result<Json<Count>, Error> {
    let count = state.entry_store.count(&params.into())?;

    Ok(Json(Count { count }))
}

/// Get the entries in a calendar month, most recent first.
///
/// The month defaults to the current month in the server's timezone.
pub(super) async fn get_entries(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<EntryListParams>,
) -> Result<Response, Error> {
    let month = MonthQuery {
        year: params.year,
        month: params.month,
    };
    let range = month.resolve(current_local_date(&state.local_timezone)?)?;

    let filter = EntryFilter {
        since: params.since,
        until: params.until,
        ymd: params.ymd,
        method: params.method,
        description: params.description,
    }
    .within(range);
    let query = ListQuery::new(filter).paginate(params.limit, params.offset)?;
    let entries = state.entry_store.get_query(&query)?;

    match Inclusion::from_flat(params.flat) {
        Inclusion::Flat => Ok(Json(entries).into_response()),
        Inclusion::WithRelations => {
            let entries = include_expenses(entries, state.expense_store.as_ref())?;
            Ok(Json(entries).into_response())
        }
    }
}

pub(super) async fn get_entry(
    State(state): State<AppState>,
    PathParam(entry_id): PathParam<EntryId>,
    QueryParams(params): QueryParams<FlatParams>,
) -> Result<Response, Error> {
    let entry = state.entry_store.get(entry_id)?;

    match Inclusion::from_flat(params.flat) {
        Inclusion::Flat => Ok(Json(entry).into_response()),
        Inclusion::WithRelations => {
            let mut entries = include_expenses(vec![entry], state.expense_store.as_ref())?;
            match entries.pop() {
                Some(entry) => Ok(Json(entry).into_response()),
                None => Err(Error::NotFound),
            }
        }
    }
}

pub(super) async fn update_entries_where(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<EntryWhereParams>,
    JsonBody(patch): JsonBody<EntryPatch>,
) -> Result<Json<Count>, Error> {
    let count = state.entry_store.update_where(&params.into(), &patch)?;

    Ok(Json(Count { count }))
}

pub(super) async fn update_entry(
    State(state): State<AppState>,
    PathParam(entry_id): PathParam<EntryId>,
    JsonBody(patch): JsonBody<EntryPatch>,
) -> Result<StatusCode, Error> {
    state.entry_store.update(entry_id, &patch)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Replace the tags of an entry, leaving its other fields unchanged.
pub(super) async fn update_entry_tags(
    State(state): State<AppState>,
    PathParam(entry_id): PathParam<EntryId>,
    JsonBody(EntryTags { tags }): JsonBody<EntryTags>,
) -> Result<StatusCode, Error> {
    let patch = EntryPatch {
        tags: Some(tags),
        ..Default::default()
    };
    state.entry_store.update(entry_id, &patch)?;

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn replace_entry(
    State(state): State<AppState>,
    PathParam(entry_id): PathParam<EntryId>,
    JsonBody(new_entry): JsonBody<NewEntry>,
) -> Result<StatusCode, Error> {
    state.entry_store.replace(entry_id, new_entry)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Delete an entry. Its expenses are kept and become unassigned.
pub(super) async fn delete_entry(
    State(state): State<AppState>,
    PathParam(entry_id): PathParam<EntryId>,
) -> Result<StatusCode, Error> {
    state.entry_store.delete(entry_id)?;

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn get_entry_link_suggestions(
    PathParam(entry_id): PathParam<EntryId>,
) -> Json<Vec<Expense>> {
    Json(suggest_expenses(entry_id))
}
