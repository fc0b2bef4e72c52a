//! Defines the expense model and the payloads used to create and modify expenses.

use serde::{Deserialize, Deserializer, Serialize};
use time::Date;

use crate::{
    database_id::{EntryId, ExpenseId},
    models::Entry,
};

/// A single transaction, optionally linked to the [Entry] it belongs to.
///
/// An expense without an `entry_id` is *unassigned*.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// When the expense happened.
    pub ymd: Date,
    /// A text description of what the expense was for.
    pub description: String,
    /// Tags in the order they were given.
    #[serde(default)]
    pub tags: Vec<String>,
    /// How the money moved, e.g. "cash" or "card".
    pub method: String,
    /// The money received.
    pub inflow: f64,
    /// The money spent.
    pub outflow: f64,
    /// The entry this expense is linked to, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<EntryId>,
}

impl Expense {
    /// Whether the expense is not linked to any entry.
    pub fn is_unassigned(&self) -> bool {
        self.entry_id.is_none()
    }
}

/// The fields needed to create an [Expense], or to replace all of the fields
/// of an existing one.
///
/// Replacing an expense with a `NewExpense` that has no `entry_id` unlinks
/// it from its entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    /// When the expense happened.
    pub ymd: Date,
    /// A text description of what the expense was for.
    pub description: String,
    /// Tags in the order they were given.
    #[serde(default)]
    pub tags: Vec<String>,
    /// How the money moved.
    pub method: String,
    /// The money received.
    pub inflow: f64,
    /// The money spent.
    pub outflow: f64,
    /// The entry to link the expense to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<EntryId>,
}

impl NewExpense {
    /// Link the expense to `entry_id`.
    pub fn entry_id(mut self, entry_id: Option<EntryId>) -> Self {
        self.entry_id = entry_id;
        self
    }

    /// Create an [Expense] with the ID assigned by the store.
    pub fn finalise(self, id: ExpenseId) -> Expense {
        Expense {
            id,
            ymd: self.ymd,
            description: self.description,
            tags: self.tags,
            method: self.method,
            inflow: self.inflow,
            outflow: self.outflow,
            entry_id: self.entry_id,
        }
    }
}

/// A partial update for an [Expense]. Fields set to `None` are left unchanged.
///
/// `entry_id` distinguishes between a missing field (`None`), which leaves the
/// link unchanged, and an explicit `null` (`Some(None)`), which unlinks the
/// expense.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpensePatch {
    /// The new date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ymd: Option<Date>,
    /// The new description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The new tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// The new method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// The new inflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflow: Option<f64>,
    /// The new outflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outflow: Option<f64>,
    /// The new entry link.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub entry_id: Option<Option<EntryId>>,
}

impl ExpensePatch {
    /// Whether the patch would leave an expense unchanged.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Maps a field that is present in the input to `Some`, even when its value is `null`.
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// The request body for replacing only the tags of an [Expense].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseTags {
    /// The new tags.
    pub tags: Vec<String>,
}

/// An [Expense] together with the [Entry] it is linked to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseWithEntry {
    /// The expense.
    #[serde(flatten)]
    pub expense: Expense,
    /// The linked entry, absent for unassigned expenses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<Entry>,
}
