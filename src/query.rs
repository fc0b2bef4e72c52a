//! Builds the predicates used to select entries and expenses: calendar month
//! ranges, record filters, sort order and pagination.

use serde::Deserialize;
use time::{Date, Month};

use crate::{Error, database_id::EntryId};

/// A half-open range of dates: `start` is included, `end` is excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// The first date in the range.
    pub start: Date,
    /// The first date after the range, or `None` if the range runs up to the
    /// last representable date.
    pub end: Option<Date>,
}

impl DateRange {
    /// The range covering every day of `month` in `year`.
    ///
    /// The end of the range is the first day of the following month, so the
    /// range is correct for months of any length.
    ///
    /// December of the last supported year has no following month, so its
    /// range is left open at the end.
    ///
    /// # Errors
    /// Returns [Error::InvalidYear] if the month cannot be represented as a
    /// calendar date.
    pub fn month(year: i32, month: Month) -> Result<Self, Error> {
        let start =
            Date::from_calendar_date(year, month, 1).map_err(|_| Error::InvalidYear(year))?;

        let end = match month {
            Month::December => Date::from_calendar_date(year + 1, Month::January, 1).ok(),
            month => Some(
                Date::from_calendar_date(year, month.next(), 1)
                    .map_err(|_| Error::InvalidYear(year))?,
            ),
        };

        Ok(Self { start, end })
    }

    /// Whether `date` falls inside the range.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && self.end.is_none_or(|end| date < end)
    }
}

/// An optional year and month used to select a calendar month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct MonthQuery {
    /// The year, defaults to the current year.
    pub year: Option<i32>,
    /// The month from 1 to 12, defaults to the current month.
    pub month: Option<u8>,
}

impl MonthQuery {
    /// Resolve the query into the date range of the selected month.
    ///
    /// Missing fields are taken from `today` independently of each other, so
    /// giving only a year keeps the current month and vice versa.
    ///
    /// # Errors
    /// Returns [Error::InvalidMonth] if the month is not between 1 and 12, or
    /// [Error::InvalidYear] if the year is outside the supported range.
    pub fn resolve(&self, today: Date) -> Result<DateRange, Error> {
        let year = self.year.unwrap_or(today.year());
        let month = match self.month {
            Some(month) => Month::try_from(month).map_err(|_| Error::InvalidMonth(month))?,
            None => today.month(),
        };

        DateRange::month(year, month)
    }

    /// Whether neither the year nor the month was given.
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.month.is_none()
    }
}

/// The order to sort records by date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first.
    Ascending,
    /// Most recent first.
    #[default]
    Descending,
}

impl SortOrder {
    /// The SQL keyword for the sort direction.
    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Selects entries. Unset fields match every entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryFilter {
    /// Only entries on or after this date.
    pub since: Option<Date>,
    /// Only entries before this date.
    pub until: Option<Date>,
    /// Only entries on exactly this date.
    pub ymd: Option<Date>,
    /// Only entries with exactly this method.
    pub method: Option<String>,
    /// Only entries with exactly this description.
    pub description: Option<String>,
}

impl EntryFilter {
    /// Narrow the filter to entries inside `range`.
    pub fn within(mut self, range: DateRange) -> Self {
        (self.since, self.until) = narrow(self.since, self.until, range);
        self
    }
}

/// Selects expenses. Unset fields match every expense.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseFilter {
    /// Only expenses on or after this date.
    pub since: Option<Date>,
    /// Only expenses before this date.
    pub until: Option<Date>,
    /// Only expenses on exactly this date.
    pub ymd: Option<Date>,
    /// Only expenses with exactly this method.
    pub method: Option<String>,
    /// Only expenses with exactly this description.
    pub description: Option<String>,
    /// Only expenses linked to this entry.
    pub entry_id: Option<EntryId>,
    /// Only expenses that are not linked to any entry.
    pub unassigned: bool,
}

impl ExpenseFilter {
    /// Narrow the filter to expenses inside `range`.
    pub fn within(mut self, range: DateRange) -> Self {
        (self.since, self.until) = narrow(self.since, self.until, range);
        self
    }

    /// Narrow the filter to expenses linked to `entry_id`.
    pub fn linked_to(mut self, entry_id: EntryId) -> Self {
        self.entry_id = Some(entry_id);
        self
    }
}

fn narrow(since: Option<Date>, until: Option<Date>, range: DateRange) -> (Option<Date>, Option<Date>) {
    let since = since.map_or(range.start, |since| since.max(range.start));
    let until = match (until, range.end) {
        (Some(until), Some(end)) => Some(until.min(end)),
        (until, end) => until.or(end),
    };

    (Some(since), until)
}

/// Defines how records are fetched from a store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery<F> {
    /// Which records to select.
    pub filter: F,
    /// The order of the records by date. Records on the same date are ordered
    /// by ID in the same direction.
    pub sort: SortOrder,
    /// Selects up to the first N (`limit`) records.
    pub limit: Option<i64>,
    /// Skips the first N (`offset`) records.
    pub offset: i64,
}

impl<F> ListQuery<F> {
    /// A query for every record matching `filter`, most recent first.
    pub fn new(filter: F) -> Self {
        Self {
            filter,
            sort: SortOrder::Descending,
            limit: None,
            offset: 0,
        }
    }

    /// Apply pagination to the query.
    ///
    /// # Errors
    /// Returns [Error::ValidationError] if `limit` or `offset` is larger than
    /// the database can store.
    pub fn paginate(mut self, limit: Option<u64>, offset: Option<u64>) -> Result<Self, Error> {
        self.limit = limit.map(|limit| to_sql_integer("limit", limit)).transpose()?;
        self.offset = to_sql_integer("offset", offset.unwrap_or(0))?;
        Ok(self)
    }
}

fn to_sql_integer(name: &str, value: u64) -> Result<i64, Error> {
    i64::try_from(value)
        .map_err(|_| Error::ValidationError(format!("{name} must be at most {}", i64::MAX)))
}

/// Whether related records should be fetched along with the requested ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inclusion {
    /// Return bare records.
    Flat,
    /// Attach related records.
    WithRelations,
}

impl Inclusion {
    /// Map the `flat` request flag to an inclusion mode. A missing flag
    /// includes relations.
    pub fn from_flat(flat: Option<bool>) -> Self {
        if flat.unwrap_or(false) {
            Inclusion::Flat
        } else {
            Inclusion::WithRelations
        }
    }
}
