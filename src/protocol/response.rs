//! Response definitions
//!
//! Raw responses as read off the wire, and the typed records they decode to.

use std::collections::{BTreeMap, HashMap};

use serde::ser::{Serialize, SerializeMap, Serializer};

/// One complete response unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// A single line: a scalar token or an error message
    Line(String),

    /// The lines between `START` and `END`, sentinels excluded
    Block(Vec<String>),
}

impl Response {
    /// The single line, if this is not a block
    pub fn as_line(&self) -> Option<&str> {
        match self {
            Response::Line(line) => Some(line),
            Response::Block(_) => None,
        }
    }

    /// The block body, if this is a block
    pub fn as_block(&self) -> Option<&[String]> {
        match self {
            Response::Line(_) => None,
            Response::Block(lines) => Some(lines),
        }
    }
}

/// One row of a `list` response
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FilterRecord {
    /// Filter name
    pub name: String,

    /// Configured false positive probability
    pub probability: f64,

    /// Storage size in bytes
    pub size: u64,

    /// Item capacity
    pub capacity: u64,

    /// Items currently held
    pub items: u64,
}

/// Key/value counters from an `info` response
///
/// Values stay as the server sent them. An empty map means the filter
/// does not exist.
pub type FilterInfo = BTreeMap<String, String>;

/// Per-item outcomes of a `bulk` or `multi`, keyed by the original item
///
/// Iteration follows the order items were first inserted. Inserting an item
/// that is already present replaces its outcome but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemStatusMap {
    /// Outcomes in first-insertion order
    entries: Vec<(String, bool)>,

    /// Item -> position in `entries`
    index: HashMap<String, usize>,
}

impl ItemStatusMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Record an outcome, returning the previous one for a repeated item
    pub fn insert(&mut self, item: impl Into<String>, status: bool) -> Option<bool> {
        let item = item.into();
        match self.index.get(&item) {
            Some(&position) => Some(std::mem::replace(&mut self.entries[position].1, status)),
            None => {
                self.index.insert(item.clone(), self.entries.len());
                self.entries.push((item, status));
                None
            }
        }
    }

    pub fn get(&self, item: &str) -> Option<bool> {
        self.index.get(item).map(|&position| self.entries[position].1)
    }

    pub fn contains_key(&self, item: &str) -> bool {
        self.get(item).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// True if at least one item reported `Yes`
    pub fn any(&self) -> bool {
        self.entries.iter().any(|(_, v)| *v)
    }

    /// True if every item reported `Yes` (vacuously true when empty)
    pub fn all(&self) -> bool {
        self.entries.iter().all(|(_, v)| *v)
    }
}

impl IntoIterator for ItemStatusMap {
    type Item = (String, bool);
    type IntoIter = std::vec::IntoIter<(String, bool)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for ItemStatusMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (item, status) in &self.entries {
            map.serialize_entry(item, status)?;
        }
        map.end()
    }
}
