//! Route handlers for the expenses that belong to an entry.

use axum::{Json, extract::State};

use crate::{
    AppState, Error,
    database_id::EntryId,
    extract::{JsonBody, PathParam, QueryParams},
    models::{Expense, ExpensePatch, ExpenseWithEntry, NewExpense},
    query::{ExpenseFilter, ListQuery},
};

use super::{Count, expenses::ExpenseWhereParams};

/// Get the expenses linked to an entry, each with the entry attached.
pub(super) async fn get_entry_expenses(
    State(state): State<AppState>,
    PathParam(entry_id): PathParam<EntryId>,
    QueryParams(params): QueryParams<ExpenseWhereParams>,
) -> Result<Json<Vec<ExpenseWithEntry>>, Error> {
    let entry = state.entry_store.get(entry_id)?;
    let filter = ExpenseFilter::from(params).linked_to(entry_id);
    let expenses = state.expense_store.get_query(&ListQuery::new(filter))?;

    Ok(Json(
        expenses
            .into_iter()
            .map(|expense| ExpenseWithEntry {
                expense,
                entry: Some(entry.clone()),
            })
            .collect(),
    ))
}

/// Create an expense linked to an entry.
///
/// Any `entryId` in the request body is replaced by the entry in the path.
pub(super) async fn create_entry_expense(
    State(state): State<AppState>,
    PathParam(entry_id): PathParam<EntryId>,
    JsonBody(new_expense): JsonBody<NewExpense>,
) -> Result<Json<Expense>, Error> {
    state.entry_store.get(entry_id)?;

    state
        .expense_store
        .create(new_expense.entry_id(Some(entry_id)))
        .map(Json)
}

pub(super) async fn update_entry_expenses(
    State(state): State<AppState>,
    PathParam(entry_id): PathParam<EntryId>,
    QueryParams(params): QueryParams<ExpenseWhereParams>,
    JsonBody(patch): JsonBody<ExpensePatch>,
) -> Result<Json<Count>, Error> {
    let filter = ExpenseFilter::from(params).linked_to(entry_id);
    let count = state.expense_store.update_where(&filter, &patch)?;

    Ok(Json(Count { count }))
}

pub(super) async fn delete_entry_expenses(
    State(state): State<AppState>,
    PathParam(entry_id): PathParam<EntryId>,
    QueryParams(params): QueryParams<ExpenseWhereParams>,
) -> Result<Json<Count>, Error> {
    let filter = ExpenseFilter::from(params).linked_to(entry_id);
    let count = state.expense_store.delete_where(&filter)?;

    Ok(Json(Count { count }))
}
