//! Aggregation data types for tasklens
//!
//! Pure data structures describing grouped duration totals. They carry no
//! presentation logic; renderers turn them into charts.

use crate::types::Record;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical field a dataset can be grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Category,
    Subcategory,
    Outcome,
}

impl GroupKey {
    /// The record value this key groups on
    pub fn value_of<'a>(&self, record: &'a Record) -> &'a str {
        match self {
            GroupKey::Category => &record.category,
            GroupKey::Subcategory => &record.subcategory,
            GroupKey::Outcome => &record.outcome,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Category => write!(f, "category"),
            GroupKey::Subcategory => write!(f, "subcategory"),
            GroupKey::Outcome => write!(f, "outcome"),
        }
    }
}

/// One group and its summed duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateRow {
    /// Level-one key
    pub key: String,
    /// Level-two key, present only for two-level results
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subkey: Option<String>,
    /// Summed duration in minutes
    pub total_minutes: f64,
}

/// Ordered duration totals, one or two levels deep
///
/// Rows appear in the order their key (or key pair) was first seen in the
/// source dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationResult {
    /// Field used for the first level
    pub level1: GroupKey,
    /// Field used for the second level, if any
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub level2: Option<GroupKey>,
    /// Grouped totals
    pub rows: Vec<AggregateRow>,
}

impl AggregationResult {
    /// A result with no rows
    pub fn empty(level1: GroupKey, level2: Option<GroupKey>) -> Self {
        Self {
            level1,
            level2,
            rows: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AggregateRow> {
        self.rows.iter()
    }

    pub fn is_hierarchical(&self) -> bool {
        self.level2.is_some()
    }

    /// Grand total across all rows
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|r| r.total_minutes).sum()
    }

    /// Distinct level-one keys in first-seen order
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for row in &self.rows {
            if !keys.iter().any(|k| k == &row.key) {
                keys.push(row.key.clone());
            }
        }
        keys
    }

    /// Total for a level-one key (summed over its children when two-level)
    pub fn get(&self, key: &str) -> Option<f64> {
        let mut matched = self.rows.iter().filter(|r| r.key == key).peekable();
        matched.peek()?;
        Some(matched.map(|r| r.total_minutes).sum())
    }

    /// Fraction of the grand total held by `key`; zero when the total is zero
    pub fn share(&self, key: &str) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        self.get(key).unwrap_or(0.0) / total
    }

    /// `(key, total)` pairs of a one-level result
    pub fn pairs(&self) -> Vec<(String, f64)> {
        self.rows
            .iter()
            .map(|r| (r.key.clone(), r.total_minutes))
            .collect()
    }

    /// `(key, subkey, total)` triples of a two-level result
    pub fn triples(&self) -> Vec<(String, String, f64)> {
        self.rows
            .iter()
            .filter_map(|r| {
                r.subkey
                    .as_ref()
                    .map(|sub| (r.key.clone(), sub.clone(), r.total_minutes))
            })
            .collect()
    }

    /// Level-one totals rolled up from the rows, in first-seen order
    pub fn parent_totals(&self) -> Vec<(String, f64)> {
        let mut totals: Vec<(String, f64)> = Vec::new();
        for row in &self.rows {
            match totals.iter_mut().find(|(k, _)| k == &row.key) {
                Some((_, total)) => *total += row.total_minutes,
                None => totals.push((row.key.clone(), row.total_minutes)),
            }
        }
        totals
    }
}

impl<'a> IntoIterator for &'a AggregationResult {
    type Item = &'a AggregateRow;
    type IntoIter = std::slice::Iter<'a, AggregateRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
