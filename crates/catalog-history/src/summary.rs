//! The per-item summary mapping, ordered by name.
//!
//! Items are identified by their exact display name and nothing else: two
//! unrelated catalog entries sharing a name are treated as one item, and their
//! histories are merged.

use std::collections::btree_map::{self, BTreeMap};

use chrono::{DateTime, Utc};

use crate::availability::Availability;

/// What is known about one item at a point in the fold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSummary {
    pub name: String,
    /// Time of the most recent observation confirming the item was present.
    pub last_known_availability: DateTime<Utc>,
    pub existence: Availability,
}

impl ItemSummary {
    pub fn new(
        name: impl Into<String>,
        last_known_availability: DateTime<Utc>,
        existence: Availability,
    ) -> Self {
        Self {
            name: name.into(),
            last_known_availability,
            existence,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    items: BTreeMap<String, ItemSummary>,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item, merging with any existing entry of the same name.
    ///
    /// An existing entry is replaced by one carrying the new
    /// `last_known_availability` and `old.existence.concat(new.existence)`.
    pub fn insert(&mut self, item: ItemSummary) {
        match self.items.entry(item.name.clone()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(item);
            }
            btree_map::Entry::Occupied(mut slot) => {
                let entry = slot.get_mut();
                let existence = entry.existence.clone().concat(item.existence);
                entry.last_known_availability = item.last_known_availability;
                entry.existence = existence;
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ItemSummary> {
        self.items.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.items.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = &ItemSummary> {
        self.items.values()
    }
}

impl IntoIterator for Summary {
    type Item = ItemSummary;
    type IntoIter = btree_map::IntoValues<String, ItemSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_values()
    }
}

impl FromIterator<ItemSummary> for Summary {
    fn from_iter<I: IntoIterator<Item = ItemSummary>>(iter: I) -> Self {
        let mut summary = Summary::new();
        for item in iter {
            summary.insert(item);
        }
        summary
    }
}
