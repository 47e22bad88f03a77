//! Column sort state machine.
//!
//! Each sortable column cycles `original → ascending → descending → original`.
//! At most one column is away from `original` at any time; [`SortState::sort_key`]
//! names it.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::data::{sort_records, Record, SortOrder};

/// Tri-state sort of a single column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortType {
    #[default]
    Original,
    Ascending,
    Descending,
}

impl SortType {
    /// The next state in the cycle.
    pub const fn next(self) -> Self {
        match self {
            Self::Original => Self::Ascending,
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Original,
        }
    }

    pub const fn order(self) -> Option<SortOrder> {
        match self {
            Self::Original => None,
            Self::Ascending => Some(SortOrder::Ascending),
            Self::Descending => Some(SortOrder::Descending),
        }
    }
}

/// Sort state of every sortable column.
#[derive(Debug, Clone, Default)]
pub struct SortState {
    /// Sortable column key to its state, with whether it holds dates.
    states: IndexMap<String, (SortType, bool)>,
    sort_key: Option<String>,
}

impl SortState {
    /// Build the state for `(key, is_date)` columns, all `original`.
    pub fn new<I, K>(columns: I) -> Self
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        Self {
            states: columns
                .into_iter()
                .map(|(k, is_date)| (k.into(), (SortType::Original, is_date)))
                .collect(),
            sort_key: None,
        }
    }

    /// Column currently driving the order, if any.
    pub fn sort_key(&self) -> Option<&str> {
        self.sort_key.as_deref()
    }

    pub fn is_sortable(&self, key: &str) -> bool {
        self.states.contains_key(key)
    }

    /// State of one column. Unknown columns report `original`.
    pub fn sort_type(&self, key: &str) -> SortType {
        self.states.get(key).map_or(SortType::Original, |(t, _)| *t)
    }

    /// Advance `key` one step, resetting every column first when the active
    /// column changes. Returns the new state, or `None` for unknown columns.
    pub fn advance(&mut self, key: &str) -> Option<SortType> {
        if !self.states.contains_key(key) {
            log::warn!("sort requested on non-sortable column {key}");
            return None;
        }
        if self.sort_key.as_deref() != Some(key) {
            for (state, _) in self.states.values_mut() {
                *state = SortType::Original;
            }
            self.sort_key = Some(key.to_string());
        }

        let (state, _) = self.states.get_mut(key)?;
        *state = state.next();
        let next = *state;
        log::debug!("sort {key} -> {next:?}");
        Some(next)
    }

    /// Apply the active sort to a fresh copy of the pristine records.
    ///
    /// `pristine` is never reordered; returning to `original` yields the
    /// input order exactly.
    pub fn apply(&self, pristine: &[Record]) -> Vec<Record> {
        let active = self
            .sort_key
            .as_deref()
            .and_then(|key| self.states.get(key).map(|state| (key, state)));
        match active {
            Some((key, (sort_type, is_date))) => match sort_type.order() {
                Some(order) => sort_records(pristine, key, order, *is_date),
                None => pristine.to_vec(),
            },
            None => pristine.to_vec(),
        }
    }
}
