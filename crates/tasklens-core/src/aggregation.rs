//! Aggregation module for summarizing durations
//!
//! Groups records by one or two categorical fields and sums their
//! durations. Output keys follow the order in which they first appear in the
//! input, so repeated renders of the same dataset always list groups the same
//! way. Records whose grouping value is blank are left out of the groups.
//!
//! # Examples
//!
//! ```
//! use tasklens_core::aggregation::{Aggregator, subcategory_breakdown};
//! use tasklens_core::sample::sample_dataset;
//! use tasklens_core::GroupKey;
//!
//! let dataset = sample_dataset();
//!
//! let by_category = Aggregator::new(GroupKey::Category).aggregate(&dataset);
//! assert_eq!(by_category.keys(), vec!["Task A", "Task B", "Task C"]);
//!
//! let task_a = subcategory_breakdown(&dataset, "Task A");
//! assert_eq!(task_a.get("Sub A"), Some(4.5));
//! ```

use crate::aggregation_types::{AggregateRow, AggregationResult, GroupKey};
use crate::types::{Dataset, Record};
use std::collections::HashMap;
use tracing::trace;

/// Accumulator that remembers first-seen order of group keys
struct GroupAccumulator {
    index: HashMap<(String, Option<String>), usize>,
    rows: Vec<AggregateRow>,
}

impl GroupAccumulator {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            rows: Vec::new(),
        }
    }

    fn add(&mut self, key: &str, subkey: Option<&str>, minutes: f64) {
        let lookup = (key.to_string(), subkey.map(str::to_string));
        match self.index.get(&lookup) {
            Some(&pos) => self.rows[pos].total_minutes += minutes,
            None => {
                self.index.insert(lookup, self.rows.len());
                self.rows.push(AggregateRow {
                    key: key.to_string(),
                    subkey: subkey.map(str::to_string),
                    total_minutes: minutes,
                });
            }
        }
    }

    fn into_rows(self) -> Vec<AggregateRow> {
        self.rows
    }
}

/// Grouping engine over one or two levels
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    level1: GroupKey,
    level2: Option<GroupKey>,
}

impl Aggregator {
    /// One-level grouping by `level1`
    pub fn new(level1: GroupKey) -> Self {
        Self {
            level1,
            level2: None,
        }
    }

    /// Add a second grouping level
    pub fn with_level2(mut self, level2: GroupKey) -> Self {
        self.level2 = Some(level2);
        self
    }

    fn group_of<'a>(&self, record: &'a Record) -> Option<(&'a str, Option<&'a str>)> {
        let key = self.level1.value_of(record);
        if key.is_empty() {
            return None;
        }

        match self.level2 {
            Some(level2) => {
                let subkey = level2.value_of(record);
                if subkey.is_empty() {
                    None
                } else {
                    Some((key, Some(subkey)))
                }
            }
            None => Some((key, None)),
        }
    }

    /// Aggregate every record of `dataset`
    pub fn aggregate(&self, dataset: &Dataset) -> AggregationResult {
        self.aggregate_records(dataset.iter())
    }

    /// Aggregate an arbitrary sequence of records
    pub fn aggregate_records<'a>(
        &self,
        records: impl IntoIterator<Item = &'a Record>,
    ) -> AggregationResult {
        let mut acc = GroupAccumulator::new();
        let mut count = 0usize;

        for record in records {
            if let Some((key, subkey)) = self.group_of(record) {
                acc.add(key, subkey, record.duration_minutes);
                count += 1;
            }
        }

        let rows = acc.into_rows();
        trace!(
            "Aggregated {} records into {} groups by {}{}",
            count,
            rows.len(),
            self.level1,
            self.level2.map(|k| format!("/{k}")).unwrap_or_default()
        );

        AggregationResult {
            level1: self.level1,
            level2: self.level2,
            rows,
        }
    }
}

/// Group `dataset` by `level1` (and `level2` when given) and sum durations
pub fn aggregate(
    dataset: &Dataset,
    level1: GroupKey,
    level2: Option<GroupKey>,
) -> AggregationResult {
    let aggregator = match level2 {
        Some(level2) => Aggregator::new(level1).with_level2(level2),
        None => Aggregator::new(level1),
    };
    aggregator.aggregate(dataset)
}

/// Share of time per category
pub fn category_breakdown(dataset: &Dataset) -> AggregationResult {
    Aggregator::new(GroupKey::Category).aggregate(dataset)
}

/// Share of time per subcategory within one category
pub fn subcategory_breakdown(dataset: &Dataset, category: &str) -> AggregationResult {
    Aggregator::new(GroupKey::Subcategory)
        .aggregate_records(dataset.iter().filter(|r| r.category == category))
}

/// Category → subcategory totals for a treemap
pub fn hierarchical_breakdown(dataset: &Dataset) -> AggregationResult {
    Aggregator::new(GroupKey::Category)
        .with_level2(GroupKey::Subcategory)
        .aggregate(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_dataset;
    use crate::test_utils::RecordBuilder;

    fn rec(category: &str, subcategory: &str, minutes: f64) -> Record {
        RecordBuilder::new()
            .category(category)
            .subcategory(subcategory)
            .minutes(minutes)
            .build()
    }

    #[test]
    fn test_category_totals_in_first_seen_order() {
        let dataset = Dataset::new(vec![
            rec("Writing", "Draft", 30.0),
            rec("Meetings", "Standup", 15.0),
            rec("Writing", "Review", 20.0),
            rec("Admin", "Email", 5.0),
        ]);

        let result = category_breakdown(&dataset);
        assert_eq!(
            result.pairs(),
            vec![
                ("Writing".to_string(), 50.0),
                ("Meetings".to_string(), 15.0),
                ("Admin".to_string(), 5.0),
            ]
        );
        assert!(!result.is_hierarchical());
    }

    #[test]
    fn test_order_is_not_alphabetic() {
        let dataset = Dataset::new(vec![rec("Zeta", "x", 1.0), rec("Alpha", "x", 1.0)]);
        assert_eq!(category_breakdown(&dataset).keys(), vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn test_empty_dataset_gives_empty_result() {
        let result = aggregate(&Dataset::empty(), GroupKey::Category, None);
        assert!(result.is_empty());

        let result = hierarchical_breakdown(&Dataset::empty());
        assert!(result.is_empty());
        assert_eq!(result.level2, Some(GroupKey::Subcategory));
    }

    #[test]
    fn test_subcategory_breakdown_restricts_first() {
        let dataset = Dataset::new(vec![
            rec("Task A", "Sub A", 1.0),
            rec("Task B", "Sub B", 7.0),
            rec("Task A", "Sub B", 2.0),
            rec("Task A", "Sub A", 3.0),
        ]);

        let result = subcategory_breakdown(&dataset, "Task A");
        assert_eq!(
            result.pairs(),
            vec![("Sub A".to_string(), 4.0), ("Sub B".to_string(), 2.0)]
        );
        assert_eq!(result.level1, GroupKey::Subcategory);

        assert!(subcategory_breakdown(&dataset, "Task Z").is_empty());
    }

    #[test]
    fn test_hierarchical_breakdown_leaf_pairs() {
        let dataset = Dataset::new(vec![
            rec("Task A", "Sub A", 1.0),
            rec("Task B", "Sub A", 2.0),
            rec("Task A", "Sub C", 4.0),
            rec("Task A", "Sub A", 8.0),
        ]);

        let result = hierarchical_breakdown(&dataset);
        assert_eq!(
            result.triples(),
            vec![
                ("Task A".to_string(), "Sub A".to_string(), 9.0),
                ("Task B".to_string(), "Sub A".to_string(), 2.0),
                ("Task A".to_string(), "Sub C".to_string(), 4.0),
            ]
        );
        assert_eq!(result.get("Task A"), Some(13.0));
    }

    #[test]
    fn test_key_match_is_exact() {
        let dataset = Dataset::new(vec![rec("task a", "x", 1.0), rec("Task A", "x", 2.0)]);
        assert_eq!(category_breakdown(&dataset).len(), 2);
    }

    #[test]
    fn test_blank_keys_are_skipped() {
        let dataset = Dataset::new(vec![
            rec("", "Sub A", 5.0),
            rec("Task A", "", 3.0),
            rec("Task A", "Sub A", 1.0),
        ]);

        assert_eq!(category_breakdown(&dataset).total(), 4.0);
        assert_eq!(hierarchical_breakdown(&dataset).total(), 1.0);
    }

    #[test]
    fn test_group_by_outcome() {
        let dataset = Dataset::new(vec![
            RecordBuilder::new().outcome("Shipped").minutes(10.0).build(),
            RecordBuilder::new().outcome("Blocked").minutes(5.0).build(),
            RecordBuilder::new().outcome("Shipped").minutes(2.5).build(),
        ]);

        let result = aggregate(&dataset, GroupKey::Outcome, None);
        assert_eq!(result.get("Shipped"), Some(12.5));
        assert_eq!(result.keys(), vec!["Shipped", "Blocked"]);
    }

    #[test]
    fn test_sample_totals() {
        let dataset = sample_dataset();
        let result = category_breakdown(&dataset);
        assert_eq!(
            result.pairs(),
            vec![
                ("Task A".to_string(), 6.0),
                ("Task B".to_string(), 4.0),
                ("Task C".to_string(), 6.0),
            ]
        );

        let task_a = subcategory_breakdown(&dataset, "Task A");
        assert_eq!(
            task_a.pairs(),
            vec![("Sub A".to_string(), 4.5), ("Sub C".to_string(), 1.5)]
        );
    }

    #[test]
    fn test_repeated_aggregation_is_stable() {
        let dataset = sample_dataset();
        let first = hierarchical_breakdown(&dataset);
        let second = hierarchical_breakdown(&dataset);
        assert_eq!(first, second);
    }
}
