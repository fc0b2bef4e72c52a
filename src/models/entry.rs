//! Defines the ledger entry model and the payloads used to create and modify entries.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{database_id::EntryId, models::Expense};

/// A daily summary in the ledger.
///
/// An entry owns zero or more [Expense]s. Deleting an entry leaves its
/// expenses in place, unlinked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// The ID of the entry.
    pub id: EntryId,
    /// The day the entry summarises.
    pub ymd: Date,
    /// A text description of the entry.
    pub description: String,
    /// Freeform tags, stored as a single string.
    pub tags: String,
    /// How the money moved, e.g. "cash" or "card".
    pub method: String,
    /// The total money received.
    pub inflow: f64,
    /// The total money spent.
    pub outflow: f64,
}

/// The fields needed to create an [Entry], or to replace all of the fields
/// of an existing one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEntry {
    /// The day the entry summarises.
    pub ymd: Date,
    /// A text description of the entry.
    pub description: String,
    /// Freeform tags, stored as a single string.
    pub tags: String,
    /// How the money moved.
    pub method: String,
    /// The total money received.
    pub inflow: f64,
    /// The total money spent.
    pub outflow: f64,
}

impl NewEntry {
    /// Create an [Entry] with the ID assigned by the store.
    pub fn finalise(self, id: EntryId) -> Entry {
        Entry {
            id,
            ymd: self.ymd,
            description: self.description,
            tags: self.tags,
            method: self.method,
            inflow: self.inflow,
            outflow: self.outflow,
        }
    }
}

/// A partial update for an [Entry]. Fields set to `None` are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntryPatch {
    /// The new date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ymd: Option<Date>,
    /// The new description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The new tags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    /// The new method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// The new inflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inflow: Option<f64>,
    /// The new outflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outflow: Option<f64>,
}

impl EntryPatch {
    /// Whether the patch would leave an entry unchanged.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// The request body for replacing only the tags of an [Entry].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryTags {
    /// The new tags.
    pub tags: String,
}

/// An [Entry] together with the expenses linked to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryWithExpenses {
    /// The entry.
    #[serde(flatten)]
    pub entry: Entry,
    /// The expenses linked to the entry, most recent first.
    pub expenses: Vec<Expense>,
}
