//! Dataset model: cell values, flat records and tree records.
//!
//! A dataset is an ordered sequence of records. Flat records map a field key
//! to a scalar; tree records map a field key to a [`TreeNode`] that points at
//! its parent through `pid`.

pub mod format;
pub mod transform;
pub mod tree;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use format::{display_text, labelled_header, strip_markup, PLACEHOLDER};
pub use transform::{sort_records, sort_value, SortOrder};
pub use tree::{sort_flat_tree, NodeId, TreeNode, TreeRecord, TreeVisibility};

/// A scalar cell value as delivered by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Explicit `null`. Renders as an empty string.
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Numeric view of the value, parsing text when possible.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) if n.is_finite() => Some(*n),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Whether the value is the empty string.
    pub fn is_empty_text(&self) -> bool {
        matches!(self, Self::Text(s) if s.is_empty())
    }

    /// Whether the value is a number below zero (text numbers included).
    pub fn is_negative(&self) -> bool {
        self.as_f64().is_some_and(|n| n < 0.0)
    }

    /// Plain string form without any formatting applied.
    pub fn to_plain_string(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => format!("{n}"),
            Self::Text(s) => s.clone(),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// One flat record: field key to scalar, in source order.
pub type Record = IndexMap<String, CellValue>;

/// The `data` payload of a table configuration.
///
/// Tree records are tried first so that `{id, pid, level, value, rank}`
/// objects are never mistaken for scalars.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableData {
    Tree(Vec<TreeRecord>),
    Flat(Vec<Record>),
}

impl Default for TableData {
    fn default() -> Self {
        Self::Flat(Vec::new())
    }
}

impl TableData {
    /// Number of records.
    pub fn len(&self) -> usize {
        match self {
            Self::Tree(records) => records.len(),
            Self::Flat(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat records, if the dataset is flat. An empty list counts as flat.
    pub fn flat(&self) -> Option<&[Record]> {
        match self {
            Self::Flat(records) => Some(records),
            Self::Tree(records) if records.is_empty() => Some(&[]),
            Self::Tree(_) => None,
        }
    }

    /// Tree records, if the dataset is tree-shaped. An empty list counts as a tree.
    pub fn tree(&self) -> Option<&[TreeRecord]> {
        match self {
            Self::Tree(records) => Some(records),
            Self::Flat(records) if records.is_empty() => Some(&[]),
            Self::Flat(_) => None,
        }
    }
}
