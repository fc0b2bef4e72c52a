//! Implements a SQLite backed entry store.

use std::sync::{Arc, Mutex};

use rusqlite::{Connection, Row};

use crate::{
    Error,
    database_id::EntryId,
    db::CreateTable,
    models::{Entry, EntryPatch, NewEntry},
    query::{EntryFilter, ListQuery},
    stores::EntryStore,
};

use super::{
    SqlParameters, id_list_placeholders, lock_connection, order_and_limit_clause, where_clause,
};

const SELECT_ENTRY: &str =
    "SELECT id, ymd, description, tags, method, inflow, outflow FROM entry";

/// Stores entries in a SQLite database.
#[derive(Debug, Clone)]
pub struct SQLiteEntryStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteEntryStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl EntryStore for SQLiteEntryStore {
    fn create(&self, new_entry: NewEntry) -> Result<Entry, Error> {
        let connection = lock_connection(&self.connection)?;

        insert_entry(new_entry, &connection)
    }

    fn create_many(&self, new_entries: Vec<NewEntry>) -> Result<Vec<Entry>, Error> {
        let connection = lock_connection(&self.connection)?;
        let tx = connection.unchecked_transaction()?;

        let entries = new_entries
            .into_iter()
            .map(|new_entry| insert_entry(new_entry, &tx))
            .collect::<Result<Vec<_>, _>>()?;

        tx.commit()?;

        Ok(entries)
    }

    /// Retrieve an entry in the database by its `id`.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to a valid entry,
    /// - or [Error::SqlError] there is some other SQL error.
    fn get(&self, id: EntryId) -> Result<Entry, Error> {
        let entry = lock_connection(&self.connection)?
            .prepare(&format!("{SELECT_ENTRY} WHERE id = :id"))?
            .query_row(&[(":id", &id)], map_entry_row)?;

        Ok(entry)
    }

    fn get_many(&self, ids: &[EntryId]) -> Result<Vec<Entry>, Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut parameters = SqlParameters::default();
        let placeholders = id_list_placeholders(ids, &mut parameters);

        lock_connection(&self.connection)?
            .prepare(&format!("{SELECT_ENTRY} WHERE id IN ({placeholders})"))?
            .query_map(parameters.as_params(), map_entry_row)?
            .map(|maybe_entry| maybe_entry.map_err(Error::from))
            .collect()
    }

    /// Query for entries in the database.
    ///
    /// # Errors
    /// This function will return a [Error::SqlError] there is a SQL error.
    fn get_query(&self, query: &ListQuery<EntryFilter>) -> Result<Vec<Entry>, Error> {
        let mut parameters = SqlParameters::default();
        let conditions = filter_conditions(&query.filter, &mut parameters);
        let query_string = format!(
            "{SELECT_ENTRY}{}{}",
            where_clause(&conditions),
            order_and_limit_clause(query.sort, query.limit, query.offset, &mut parameters)
        );

        lock_connection(&self.connection)?
            .prepare(&query_string)?
            .query_map(parameters.as_params(), map_entry_row)?
            .map(|maybe_entry| maybe_entry.map_err(Error::from))
            .collect()
    }

    fn count(&self, filter: &EntryFilter) -> Result<usize, Error> {
        let mut parameters = SqlParameters::default();
        let conditions = filter_conditions(filter, &mut parameters);

        lock_connection(&self.connection)?
            .query_row(
                &format!("SELECT COUNT(id) FROM entry{}", where_clause(&conditions)),
                parameters.as_params(),
                |row| row.get(0),
            )
            .map_err(|error| error.into())
    }

    fn update(&self, id: EntryId, patch: &EntryPatch) -> Result<(), Error> {
        if patch.is_empty() {
            return match self.get(id) {
                Ok(_) => Ok(()),
                Err(Error::NotFound) => Err(Error::UpdateMissingEntry),
                Err(error) => Err(error),
            };
        }

        let mut parameters = SqlParameters::default();
        let assignments = patch_assignments(patch, &mut parameters);
        let id_placeholder = parameters.bind(id);

        let rows_affected = lock_connection(&self.connection)?.execute(
            &format!(
                "UPDATE entry SET {} WHERE id = {id_placeholder}",
                assignments.join(", ")
            ),
            parameters.as_params(),
        )?;

        if rows_affected == 0 {
            return Err(Error::UpdateMissingEntry);
        }

        Ok(())
    }

    fn update_where(&self, filter: &EntryFilter, patch: &EntryPatch) -> Result<usize, Error> {
        if patch.is_empty() {
            return self.count(filter);
        }

        let mut parameters = SqlParameters::default();
        let assignments = patch_assignments(patch, &mut parameters);
        let conditions = filter_conditions(filter, &mut parameters);

        lock_connection(&self.connection)?
            .execute(
                &format!(
                    "UPDATE entry SET {}{}",
                    assignments.join(", "),
                    where_clause(&conditions)
                ),
                parameters.as_params(),
            )
            .map_err(|error| error.into())
    }

    fn replace(&self, id: EntryId, new_entry: NewEntry) -> Result<(), Error> {
        let rows_affected = lock_connection(&self.connection)?.execute(
            "UPDATE entry
             SET ymd = ?1, description = ?2, tags = ?3, method = ?4, inflow = ?5, outflow = ?6
             WHERE id = ?7",
            (
                new_entry.ymd,
                new_entry.description,
                new_entry.tags,
                new_entry.method,
                new_entry.inflow,
                new_entry.outflow,
                id,
            ),
        )?;

        if rows_affected == 0 {
            return Err(Error::UpdateMissingEntry);
        }

        Ok(())
    }

    fn delete(&self, id: EntryId) -> Result<(), Error> {
        let rows_affected =
            lock_connection(&self.connection)?.execute("DELETE FROM entry WHERE id = ?1", [id])?;

        if rows_affected == 0 {
            return Err(Error::DeleteMissingEntry);
        }

        Ok(())
    }
}

impl CreateTable for SQLiteEntryStore {
    fn create_table(connection: &Connection) -> Result<(), rusqlite::Error> {
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS entry (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                ymd TEXT NOT NULL,
                description TEXT NOT NULL,
                tags TEXT NOT NULL,
                method TEXT NOT NULL,
                inflow REAL NOT NULL,
                outflow REAL NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_entry_ymd ON entry(ymd);",
        )
    }
}

fn insert_entry(new_entry: NewEntry, connection: &Connection) -> Result<Entry, Error> {
    let entry = connection
        .prepare(
            "INSERT INTO entry (ymd, description, tags, method, inflow, outflow)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, ymd, description, tags, method, inflow, outflow",
        )?
        .query_row(
            (
                new_entry.ymd,
                new_entry.description,
                new_entry.tags,
                new_entry.method,
                new_entry.inflow,
                new_entry.outflow,
            ),
            map_entry_row,
        )?;

    Ok(entry)
}

fn filter_conditions(filter: &EntryFilter, parameters: &mut SqlParameters) -> Vec<String> {
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

    conditions
}

fn patch_assignments(patch: &EntryPatch, parameters: &mut SqlParameters) -> Vec<String> {
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
        assignments.push(format!("tags = {}", parameters.bind(tags.clone())));
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

    assignments
}

/// Map a database row to an [Entry].
fn map_entry_row(row: &Row) -> Result<Entry, rusqlite::Error> {
    Ok(Entry {
        id: row.get(0)?,
        ymd: row.get(1)?,
        description: row.get(2)?,
        tags: row.get(3)?,
        method: row.get(4)?,
        inflow: row.get(5)?,
        outflow: row.get(6)?,
    })
}

#[cfg(test)]
mod sqlite_entry_store_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::{Date, macros::date};

    use crate::{
        Error,
        db::initialize,
        models::{EntryPatch, NewEntry},
        query::{DateRange, EntryFilter, ListQuery, SortOrder},
        stores::EntryStore,
    };

    use super::SQLiteEntryStore;

    fn get_store() -> SQLiteEntryStore {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();

        SQLiteEntryStore::new(Arc::new(Mutex::new(connection)))
    }

    fn new_entry(ymd: Date, description: &str) -> NewEntry {
        NewEntry {
            ymd,
            description: description.to_owned(),
            tags: "groceries".to_owned(),
            method: "cash".to_owned(),
            inflow: 0.0,
            outflow: 12.5,
        }
    }

    #[test]
    fn create_succeeds() {
        let store = get_store();
        let want = new_entry(date!(2024 - 02 - 01), "Feb");

        let entry = store.create(want.clone()).expect("Could not create entry");

        assert!(entry.id > 0);
        assert_eq!(entry, want.finalise(entry.id));
    }

    #[test]
    fn create_many_succeeds() {
        let store = get_store();
        let want = vec![
            new_entry(date!(2024 - 02 - 01), "first"),
            new_entry(date!(2024 - 02 - 02), "second"),
        ];

        let got = store.create_many(want.clone()).expect("Could not create entries");

        assert_eq!(got.len(), 2);
        want.into_iter()
            .zip(got.iter())
            .for_each(|(want, got)| assert_eq!(want.finalise(got.id), *got));
    }

    #[test]
    fn get_entry_by_id_succeeds() {
        let store = get_store();
        let entry = store.create(new_entry(date!(2024 - 02 - 01), "")).unwrap();

        let selected_entry = store.get(entry.id);

        assert_eq!(Ok(entry), selected_entry);
    }

    #[test]
    fn get_entry_fails_on_invalid_id() {
        let store = get_store();
        let entry = store.create(new_entry(date!(2024 - 02 - 01), "")).unwrap();

        let maybe_entry = store.get(entry.id + 654);

        assert_eq!(maybe_entry, Err(Error::NotFound));
    }

    #[test]
    fn get_many_skips_missing_ids() {
        let store = get_store();
        let first = store.create(new_entry(date!(2024 - 02 - 01), "1")).unwrap();
        let second = store.create(new_entry(date!(2024 - 02 - 02), "2")).unwrap();

        let mut got = store.get_many(&[second.id, first.id, 999]).unwrap();
        got.sort_by_key(|entry| entry.id);

        assert_eq!(got, vec![first, second]);
    }

    #[test]
    fn get_entries_in_month_most_recent_first() {
        let store = get_store();
        let feb_first = store.create(new_entry(date!(2024 - 02 - 01), "")).unwrap();
        let feb_last = store.create(new_entry(date!(2024 - 02 - 29), "")).unwrap();
        store.create(new_entry(date!(2024 - 01 - 31), "")).unwrap();
        store.create(new_entry(date!(2024 - 03 - 01), "")).unwrap();

        let range = DateRange::month(2024, time::Month::February).unwrap();
        let got = store
            .get_query(&ListQuery::new(EntryFilter::default().within(range)))
            .unwrap();

        assert_eq!(got, vec![feb_last, feb_first]);
    }

    #[test]
    fn get_entries_with_limit_and_offset() {
        let store = get_store();
        let mut want = Vec::new();
        for day in 1..=10 {
            let ymd = Date::from_calendar_date(2024, time::Month::March, day).unwrap();
            let entry = store.create(new_entry(ymd, &format!("#{day}"))).unwrap();

            if (3..=5).contains(&day) {
                want.push(entry);
            }
        }

        let got = store
            .get_query(&ListQuery {
                sort: SortOrder::Ascending,
                ..ListQuery::new(EntryFilter::default())
            }
            .paginate(Some(3), Some(2))
            .unwrap())
            .unwrap();

        assert_eq!(got, want);
    }

    #[test]
    fn count_with_filter() {
        let store = get_store();
        store.create(new_entry(date!(2024 - 02 - 01), "")).unwrap();
        store
            .create(NewEntry {
                method: "card".to_owned(),
                ..new_entry(date!(2024 - 02 - 02), "")
            })
            .unwrap();

        let all = store.count(&EntryFilter::default()).unwrap();
        let card = store
            .count(&EntryFilter {
                method: Some("card".to_owned()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(all, 2);
        assert_eq!(card, 1);
    }

    #[test]
    fn update_merges_fields() {
        let store = get_store();
        let entry = store.create(new_entry(date!(2024 - 02 - 01), "Feb")).unwrap();

        store
            .update(
                entry.id,
                &EntryPatch {
                    outflow: Some(99.0),
                    ..Default::default()
                },
            )
            .expect("Could not update entry");

        let got = store.get(entry.id).unwrap();
        assert_eq!(got.outflow, 99.0);
        assert_eq!(got.description, "Feb");
        assert_eq!(got.ymd, entry.ymd);
    }

    #[test]
    fn update_fails_on_invalid_id() {
        let store = get_store();
        let patch = EntryPatch {
            tags: Some("foo".to_owned()),
            ..Default::default()
        };

        assert_eq!(store.update(42, &patch), Err(Error::UpdateMissingEntry));
        assert_eq!(
            store.update(42, &EntryPatch::default()),
            Err(Error::UpdateMissingEntry)
        );
    }

    #[test]
    fn update_where_returns_count() {
        let store = get_store();
        store.create(new_entry(date!(2024 - 02 - 01), "a")).unwrap();
        store.create(new_entry(date!(2024 - 02 - 02), "b")).unwrap();
        let other = store
            .create(NewEntry {
                method: "card".to_owned(),
                ..new_entry(date!(2024 - 02 - 03), "c")
            })
            .unwrap();

        let count = store
            .update_where(
                &EntryFilter {
                    method: Some("cash".to_owned()),
                    ..Default::default()
                },
                &EntryPatch {
                    tags: Some("reviewed".to_owned()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(store.get(other.id).unwrap().tags, "groceries");
    }

    #[test]
    fn replace_overwrites_all_fields() {
        let store = get_store();
        let entry = store.create(new_entry(date!(2024 - 02 - 01), "Feb")).unwrap();
        let replacement = NewEntry {
            ymd: date!(2024 - 03 - 01),
            description: "Mar".to_owned(),
            tags: "".to_owned(),
            method: "card".to_owned(),
            inflow: 100.0,
            outflow: 0.0,
        };

        store.replace(entry.id, replacement.clone()).unwrap();

        assert_eq!(store.get(entry.id), Ok(replacement.finalise(entry.id)));
    }

    #[test]
    fn replace_fails_on_invalid_id() {
        let store = get_store();

        let result = store.replace(7, new_entry(date!(2024 - 02 - 01), ""));

        assert_eq!(result, Err(Error::UpdateMissingEntry));
    }

    #[test]
    fn delete_succeeds() {
        let store = get_store();
        let entry = store.create(new_entry(date!(2024 - 02 - 01), "")).unwrap();

        store.delete(entry.id).expect("Could not delete entry");

        assert_eq!(store.get(entry.id), Err(Error::NotFound));
        assert_eq!(store.delete(entry.id), Err(Error::DeleteMissingEntry));
    }
}
