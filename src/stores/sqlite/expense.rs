//! Implements a SQLite backed expense store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, OptionalExtension, Row, types::Type};
use time::Date;

use crate::{
    Error,
    database_id::{EntryId, ExpenseId},
    db::CreateTable,
    models::{Expense, ExpensePatch, NewExpense},
    query::{ExpenseFilter, ListQuery, SortOrder},
    stores::ExpenseStore,
};

use super::{
    SqlParameters, id_list_placeholders, lock_connection, order_and_limit_clause, where_clause,
};

const SELECT_EXPENSE: &str =
    "SELECT id, ymd, description, tags, method, inflow, outflow, entry_id FROM expense";

/// Stores expenses in a SQLite database.
///
/// Expenses reference the `entry` table, so the entry table must exist before
/// the expense table is created.
#[derive(Debug, Clone)]
pub struct SQLiteExpenseStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteExpenseStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl ExpenseStore for SQLiteExpenseStore {
    /// Create a new expense in the database.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidEntryId] if `entry_id` does not refer to a valid entry,
    /// - [Error::SqlError] if there is some other SQL error.
    fn create(&self, new_expense: NewExpense) -> Result<Expense, Error> {
        let connection = lock_connection(&self.connection)?;

        insert_expense(new_expense, &connection)
    }

    fn create_many(&self, new_expenses: Vec<NewExpense>) -> Result<Vec<Expense>, Error> {
        let connection = lock_connection(&self.connection)?;
        let tx = connection.unchecked_transaction()?;

        let expenses = new_expenses
            .into_iter()
            .map(|new_expense| insert_expense(new_expense, &tx))
            .collect::<Result<Vec<_>, _>>()?;

        tx.commit()?;

        Ok(expenses)
    }

    fn get(&self, id: ExpenseId) -> Result<Expense, Error> {
        let expense = lock_connection(&self.connection)?
            .prepare(&format!("{SELECT_EXPENSE} WHERE id = :id"))?
            .query_row(&[(":id", &id)], map_expense_row)?;

        Ok(expense)
    }

    fn get_by_entries(&self, entry_ids: &[EntryId]) -> Result<Vec<Expense>, Error> {
        if entry_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut parameters = SqlParameters::default();
        let placeholders = id_list_placeholders(entry_ids, &mut parameters);
        let query_string = format!(
            "{SELECT_EXPENSE} WHERE entry_id IN ({placeholders}){}",
            order_and_limit_clause(SortOrder::Descending, None, 0, &mut parameters)
        );

        lock_connection(&self.connection)?
            .prepare(&query_string)?
            .query_map(parameters.as_params(), map_expense_row)?
            .map(|maybe_expense| maybe_expense.map_err(Error::from))
            .collect()
    }

    fn get_query(&self, query: &ListQuery<ExpenseFilter>) -> Result<Vec<Expense>, Error> {
        let mut parameters = SqlParameters::default();
        let conditions = filter_conditions(&query.filter, &mut parameters);
        let query_string = format!(
            "{SELECT_EXPENSE}{}{}",
            where_clause(&conditions),
            order_and_limit_clause(query.sort, query.limit, query.offset, &mut parameters)
        );

        lock_connection(&self.connection)?
            .prepare(&query_string)?
            .query_map(parameters.as_params(), map_expense_row)?
            .map(|maybe_expense| maybe_expense.map_err(Error::from))
            .collect()
    }

    fn count(&self, filter: &ExpenseFilter) -> Result<usize, Error> {
        let mut parameters = SqlParameters::default();
        let conditions = filter_conditions(filter, &mut parameters);

        lock_connection(&self.connection)?
            .query_row(
                &format!("SELECT COUNT(id) FROM expense{}", where_clause(&conditions)),
                parameters.as_params(),
                |row| row.get(0),
            )
            .map_err(|error| error.into())
    }

    fn latest_date(&self) -> Result<Date, Error> {
        lock_connection(&self.connection)?
            .query_row(
                "SELECT ymd FROM expense ORDER BY ymd DESC, id DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(Error::EmptyResult)
    }

    fn update(&self, id: ExpenseId, patch: &ExpensePatch) -> Result<(), Error> {
        if patch.is_empty() {
            return match self.get(id) {
                Ok(_) => Ok(()),
                Err(Error::NotFound) => Err(Error::UpdateMissingExpense),
                Err(error) => Err(error),
            };
        }

        let mut parameters = SqlParameters::default();
        let assignments = patch_assignments(patch, &mut parameters)?;
        let id_placeholder = parameters.bind(id);

        let rows_affected = lock_connection(&self.connection)?
            .execute(
                &format!(
                    "UPDATE expense SET {} WHERE id = {id_placeholder}",
                    assignments.join(", ")
                ),
                parameters.as_params(),
            )
            .map_err(|error| map_link_error(error, patch.entry_id.flatten()))?;

        if rows_affected == 0 {
            return Err(Error::UpdateMissingExpense);
        }

        Ok(())
    }

    fn update_where(&self, filter: &ExpenseFilter, patch: &ExpensePatch) -> Result<usize, Error> {
        if patch.is_empty() {
            return self.count(filter);
        }

        let mut parameters = SqlParameters::default();
        let assignments = patch_assignments(patch, &mut parameters)?;
        let conditions = filter_conditions(filter, &mut parameters);

        lock_connection(&self.connection)?
            .execute(
                &format!(
                    "UPDATE expense SET {}{}",
                    assignments.join(", "),
                    where_clause(&conditions)
                ),
                parameters.as_params(),
            )
            .map_err(|error| map_link_error(error, patch.entry_id.flatten()))
    }

    fn replace(&self, id: ExpenseId, new_expense: NewExpense) -> Result<(), Error> {
        let entry_id = new_expense.entry_id;
        let tags = encode_tags(&new_expense.tags)?;

        let rows_affected = lock_connection(&self.connection)?
            .execute(
                "UPDATE expense
                 SET ymd = ?1, description = ?2, tags = ?3, method = ?4, inflow = ?5, outflow = ?6,
                     entry_id = ?7
                 WHERE id = ?8",
                (
                    new_expense.ymd,
                    new_expense.description,
                    tags,
                    new_expense.method,
                    new_expense.inflow,
                    new_expense.outflow,
                    new_expense.entry_id,
                    id,
                ),
            )
            .map_err(|error| map_link_error(error, entry_id))?;

        if rows_affected == 0 {
            return Err(Error::UpdateMissingExpense);
        }

        Ok(())
    }

    fn delete(&self, id: ExpenseId) -> Result<(), Error> {
        let rows_affected = lock_connection(&self.connection)?
            .execute("DELETE FROM expense WHERE id = ?1", [id])?;

        if rows_affected == 0 {
            return Err(Error::DeleteMissingExpense);
        }

        Ok(())
    }

    fn delete_where(&self, filter: &ExpenseFilter) -> Result<usize, Error> {
        let mut parameters = SqlParameters::default();
        let conditions = filter_conditions(filter, &mut parameters);

        lock_connection(&self.connection)?
            .execute(
                &format!("DELETE FROM expense{}", where_clause(&conditions)),
                parameters.as_params(),
            )
            .map_err(|error| error.into())
    }
}

impl CreateTable for SQLiteExpenseStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ymd TEXT NOT NULL,
                description TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                method TEXT NOT NULL,
                inflow REAL NOT NULL,
                outflow REAL NOT NULL,
                entry_id INTEGER,
                FOREIGN KEY(entry_id) REFERENCES entry(id) ON UPDATE CASCADE ON DELETE SET NULL
            );

            CREATE INDEX IF NOT EXISTS idx_expense_ymd ON expense(ymd);
            CREATE INDEX IF NOT EXISTS idx_expense_entry_id ON expense(entry_id);",
        )
    }
}

fn insert_expense(new_expense: NewExpense, connection: &Connection) -> Result<Expense, Error> {
    let entry_id = new_expense.entry_id;
    let tags = encode_tags(&new_expense.tags)?;

    connection
        .prepare(
            "INSERT INTO expense (ymd, description, tags, method, inflow, outflow, entry_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING id, ymd, description, tags, method, inflow, outflow, entry_id",
        )?
        .query_row(
            (
                new_expense.ymd,
                new_expense.description,
                tags,
                new_expense.method,
                new_expense.inflow,
                new_expense.outflow,
                new_expense.entry_id,
            ),
            map_expense_row,
        )
        .map_err(|error| map_link_error(error, entry_id))
}

/// Convert a failed write into [Error::InvalidEntryId] when it was rejected
/// because `entry_id` does not refer to an entry.
fn map_link_error(error: rusqlite::Error, entry_id: Option<EntryId>) -> Error {
    match (error, entry_id) {
        (
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ),
            Some(entry_id),
        ) => Error::InvalidEntryId(entry_id),
        (error, _) => error.into(),
    }
}

fn encode_tags(tags: &[String]) -> Result<String, rusqlite::Error> {
    serde_json::to_string(tags).map_err(|error| rusqlite::Error::ToSqlConversionFailure(Box::new(error)))
}

fn filter_conditions(filter: &ExpenseFilter, parameters: &mut SqlParameters) -> Vec<String> {
    let mut conditions = Vec::new();

    if let Some(since) = filter.since {
        conditions.push(format!("ymd >= {}", parameters.bind(since.to_string())));
    }

    if let Some(until) = filter.until {
        conditions.push(format!("ymd < {}", parameters.bind(until.to_string())));
    }

    if let Some(ymd) = filter.ymd {
        conditions.push(format!("ymd = {}", parameters.bind(ymd.to_string())));
    }

    if let Some(method) = &filter.method {
        conditions.push(format!("method = {}", parameters.bind(method.clone())));
    }

    if let Some(description) = &filter.description {
        conditions.push(format!(
            "description = {}",
            parameters.bind(description.clone())
        ));
    }

    if let Some(entry_id) = filter.entry_id {
        conditions.push(format!("entry_id = {}", parameters.bind(entry_id)));
    }

    if filter.unassigned {
        conditions.push("entry_id IS NULL".to_owned());
    }

    conditions
}

fn patch_assignments(
    patch: &ExpensePatch,
    parameters: &mut SqlParameters,
) -> Result<Vec<String>, Error> {
    let mut assignments = Vec::new();

    if let Some(ymd) = patch.ymd {
        assignments.push(format!("ymd = {}", parameters.bind(ymd.to_string())));
    }

    if let Some(description) = &patch.description {
        assignments.push(format!(
            "description = {}",
            parameters.bind(description.clone())
        ));
    }

    if let Some(tags) = &patch.tags {
        assignments.push(format!("tags = {}", parameters.bind(encode_tags(tags)?)));
    }

    if let Some(method) = &patch.method {
        assignments.push(format!("method = {}", parameters.bind(method.clone())));
    }

    if let Some(inflow) = patch.inflow {
        assignments.push(format!("inflow = {}", parameters.bind(inflow)));
    }

    if let Some(outflow) = patch.outflow {
        assignments.push(format!("outflow = {}", parameters.bind(outflow)));
    }

    match patch.entry_id {
        Some(Some(entry_id)) => {
            assignments.push(format!("entry_id = {}", parameters.bind(entry_id)));
        }
        Some(None) => assignments.push("entry_id = NULL".to_owned()),
        None => {}
    }

    Ok(assignments)
}

/// Map a database row to an [Expense].
fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let raw_tags: String = row.get(3)?;
    let tags = serde_json::from_str(&raw_tags)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(error)))?;

    Ok(Expense {
        id: row.get(0)?,
        ymd: row.get(1)?,
        description: row.get(2)?,
        tags,
        method: row.get(4)?,
        inflow: row.get(5)?,
        outflow: row.get(6)?,
        entry_id: row.get(7)?,
    })
}

#[cfg(test)]
mod sqlite_expense_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{Date, macros::date};

    use crate::{
        Error,
        db::initialize,
        models::{ExpensePatch, NewEntry, NewExpense},
        query::{ExpenseFilter, ListQuery},
        stores::{EntryStore, ExpenseStore, sqlite::SQLiteEntryStore},
    };

    use super::SQLiteExpenseStore;

    fn get_stores() -> (SQLiteEntryStore, SQLiteExpenseStore) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));

        (
            SQLiteEntryStore::new(connection.clone()),
            SQLiteExpenseStore::new(connection),
        )
    }

    fn new_expense(ymd: Date, description: &str) -> NewExpense {
        NewExpense {
            ymd,
            description: description.to_owned(),
            tags: vec!["food".to_owned(), "work".to_owned()],
            method: "card".to_owned(),
            inflow: 0.0,
            outflow: 4.5,
            entry_id: None,
        }
    }

    fn new_entry(ymd: Date) -> NewEntry {
        NewEntry {
            ymd,
            description: "groceries".to_owned(),
            tags: "".to_owned(),
            method: "card".to_owned(),
            inflow: 0.0,
            outflow: 9.0,
        }
    }

    #[test]
    fn create_keeps_tag_order() {
        let (_, store) = get_stores();
        let want = new_expense(date!(2024 - 02 - 01), "coffee");

        let expense = store.create(want.clone()).unwrap();

        assert_eq!(expense, want.finalise(expense.id));
        assert_eq!(store.get(expense.id), Ok(expense));
    }

    #[test]
    fn create_with_entry_id() {
        let (entry_store, store) = get_stores();
        let entry = entry_store.create(new_entry(date!(2024 - 02 - 01))).unwrap();

        let expense = store
            .create(new_expense(date!(2024 - 02 - 01), "").entry_id(Some(entry.id)))
            .unwrap();

        assert_eq!(expense.entry_id, Some(entry.id));
    }

    #[test]
    fn create_fails_on_invalid_entry_id() {
        let (_, store) = get_stores();

        let result = store.create(new_expense(date!(2024 - 02 - 01), "").entry_id(Some(42)));

        assert_eq!(result, Err(Error::InvalidEntryId(42)));
    }

    #[test]
    fn create_many_is_atomic() {
        let (_, store) = get_stores();
        let batch = vec![
            new_expense(date!(2024 - 02 - 01), "ok"),
            new_expense(date!(2024 - 02 - 02), "bad").entry_id(Some(1234)),
        ];

        let result = store.create_many(batch);

        assert_eq!(result, Err(Error::InvalidEntryId(1234)));
        assert_eq!(store.count(&ExpenseFilter::default()), Ok(0));
    }

    #[test]
    fn get_fails_on_invalid_id() {
        let (_, store) = get_stores();

        assert_eq!(store.get(1), Err(Error::NotFound));
    }

    #[test]
    fn get_by_entries() {
        let (entry_store, store) = get_stores();
        let first = entry_store.create(new_entry(date!(2024 - 02 - 01))).unwrap();
        let second = entry_store.create(new_entry(date!(2024 - 02 - 02))).unwrap();
        let a = store
            .create(new_expense(date!(2024 - 02 - 01), "a").entry_id(Some(first.id)))
            .unwrap();
        let b = store
            .create(new_expense(date!(2024 - 02 - 03), "b").entry_id(Some(second.id)))
            .unwrap();
        store.create(new_expense(date!(2024 - 02 - 04), "c")).unwrap();

        let got = store.get_by_entries(&[first.id, second.id]).unwrap();

        assert_eq!(got, vec![b, a]);
        assert_eq!(store.get_by_entries(&[]), Ok(vec![]));
    }

    #[test]
    fn get_query_unassigned_only() {
        let (entry_store, store) = get_stores();
        let entry = entry_store.create(new_entry(date!(2024 - 02 - 01))).unwrap();
        store
            .create(new_expense(date!(2024 - 02 - 01), "").entry_id(Some(entry.id)))
            .unwrap();
        let unassigned = store.create(new_expense(date!(2024 - 02 - 02), "")).unwrap();

        let got = store
            .get_query(&ListQuery::new(ExpenseFilter {
                unassigned: true,
                ..Default::default()
            }))
            .unwrap();

        assert_eq!(got, vec![unassigned]);
    }

    #[test]
    fn latest_date_on_empty_table() {
        let (_, store) = get_stores();

        assert_eq!(store.latest_date(), Err(Error::EmptyResult));
    }

    #[test]
    fn latest_date_returns_max_date() {
        let (_, store) = get_stores();
        store.create(new_expense(date!(2024 - 02 - 01), "")).unwrap();
        store.create(new_expense(date!(2024 - 03 - 15), "")).unwrap();
        store.create(new_expense(date!(2024 - 03 - 02), "")).unwrap();

        assert_eq!(store.latest_date(), Ok(date!(2024 - 03 - 15)));
    }

    #[test]
    fn update_can_unlink_entry() {
        let (entry_store, store) = get_stores();
        let entry = entry_store.create(new_entry(date!(2024 - 02 - 01))).unwrap();
        let expense = store
            .create(new_expense(date!(2024 - 02 - 01), "").entry_id(Some(entry.id)))
            .unwrap();

        store
            .update(
                expense.id,
                &ExpensePatch {
                    entry_id: Some(None),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(store.get(expense.id).unwrap().entry_id, None);
    }

    #[test]
    fn update_tags_only() {
        let (_, store) = get_stores();
        let expense = store.create(new_expense(date!(2024 - 02 - 01), "x")).unwrap();

        store
            .update(
                expense.id,
                &ExpensePatch {
                    tags: Some(vec!["b".to_owned(), "a".to_owned()]),
                    ..Default::default()
                },
            )
            .unwrap();

        let got = store.get(expense.id).unwrap();
        assert_eq!(got.tags, vec!["b".to_owned(), "a".to_owned()]);
        assert_eq!(got.description, "x");
    }

    #[test]
    fn update_fails_on_invalid_entry_id() {
        let (_, store) = get_stores();
        let expense = store.create(new_expense(date!(2024 - 02 - 01), "")).unwrap();

        let result = store.update(
            expense.id,
            &ExpensePatch {
                entry_id: Some(Some(99)),
                ..Default::default()
            },
        );

        assert_eq!(result, Err(Error::InvalidEntryId(99)));
    }

    #[test]
    fn update_fails_on_invalid_id() {
        let (_, store) = get_stores();

        let result = store.update(
            3,
            &ExpensePatch {
                outflow: Some(1.0),
                ..Default::default()
            },
        );

        assert_eq!(result, Err(Error::UpdateMissingExpense));
    }

    #[test]
    fn replace_without_entry_unlinks() {
        let (entry_store, store) = get_stores();
        let entry = entry_store.create(new_entry(date!(2024 - 02 - 01))).unwrap();
        let expense = store
            .create(new_expense(date!(2024 - 02 - 01), "").entry_id(Some(entry.id)))
            .unwrap();
        let replacement = new_expense(date!(2024 - 02 - 05), "replaced");

        store.replace(expense.id, replacement.clone()).unwrap();

        assert_eq!(store.get(expense.id), Ok(replacement.finalise(expense.id)));
    }

    #[test]
    fn deleting_entry_unlinks_expenses() {
        let (entry_store, store) = get_stores();
        let entry = entry_store.create(new_entry(date!(2024 - 02 - 01))).unwrap();
        let expense = store
            .create(new_expense(date!(2024 - 02 - 01), "").entry_id(Some(entry.id)))
            .unwrap();

        entry_store.delete(entry.id).unwrap();

        assert_eq!(store.get(expense.id).unwrap().entry_id, None);
    }

    #[test]
    fn delete_where_removes_matching() {
        let (entry_store, store) = get_stores();
        let entry = entry_store.create(new_entry(date!(2024 - 02 - 01))).unwrap();
        store
            .create(new_expense(date!(2024 - 02 - 01), "").entry_id(Some(entry.id)))
            .unwrap();
        let kept = store.create(new_expense(date!(2024 - 02 - 02), "")).unwrap();

        let deleted = store
            .delete_where(&ExpenseFilter::default().linked_to(entry.id))
            .unwrap();

        assert_eq!(deleted, 1);
        assert_eq!(
            store.get_query(&ListQuery::new(ExpenseFilter::default())),
            Ok(vec![kept])
        );
    }

    #[test]
    fn delete_fails_on_invalid_id() {
        let (_, store) = get_stores();

        assert_eq!(store.delete(5), Err(Error::DeleteMissingExpense));
    }
}
