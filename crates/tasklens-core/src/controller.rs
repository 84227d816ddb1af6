//! View state controller
//!
//! Owns the session's `{active dataset, date range, selected category}` and,
//! for every input event, recomputes all derived views from scratch:
//!
//! - category breakdown of the filtered active dataset
//! - subcategory breakdown of the selected category
//! - category → subcategory hierarchy
//! - the filtered records themselves, for the table
//!
//! A failed upload leaves the state untouched and only attaches an error
//! message to the views. A selection that no longer matches the filtered
//! data is repaired by falling back to the first available category.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use tasklens_core::{Dataset, Event, Result, RecordNormalizer, Session};
//! use tasklens_core::sample::sample_dataset;
//!
//! struct NoUploads;
//!
//! impl RecordNormalizer for NoUploads {
//!     fn normalize(&self, _raw: &[u8], filename: &str) -> Result<Dataset> {
//!         Err(tasklens_core::TasklensError::UnsupportedFormat(filename.to_string()))
//!     }
//! }
//!
//! let mut session = Session::new(Arc::new(sample_dataset()), NoUploads);
//! assert_eq!(session.views().selected_category.as_deref(), Some("Task A"));
//!
//! let views = session.apply(Event::select("Task C"));
//! assert_eq!(views.subcategory_breakdown.keys(), vec!["Sub A", "Sub B"]);
//! ```

use crate::aggregation::{category_breakdown, hierarchical_breakdown, subcategory_breakdown};
use crate::aggregation_types::{AggregationResult, GroupKey};
use crate::error::Result;
use crate::filters::{DateRange, parse_iso_date};
use crate::normalizer::RecordNormalizer;
use crate::sample::SAMPLE_INITIAL_CATEGORY;
use crate::types::{Dataset, DatasetId, Record};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Where the active dataset came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSource {
    /// The built-in sample data
    Sample,
    /// A successfully parsed upload
    Uploaded { filename: String },
}

impl DataSource {
    /// Heading for the record table
    pub fn label(&self) -> &str {
        match self {
            DataSource::Sample => "Sample Data",
            DataSource::Uploaded { filename } => filename,
        }
    }
}

/// The dataset currently backing all views
#[derive(Debug, Clone)]
pub struct ActiveDataset {
    id: DatasetId,
    source: DataSource,
    dataset: Arc<Dataset>,
}

impl ActiveDataset {
    /// Activate the shared sample dataset
    pub fn sample(dataset: Arc<Dataset>) -> Self {
        Self {
            id: DatasetId::new(),
            source: DataSource::Sample,
            dataset,
        }
    }

    /// Activate a freshly parsed upload
    pub fn uploaded(filename: impl Into<String>, dataset: Dataset) -> Self {
        Self {
            id: DatasetId::new(),
            source: DataSource::Uploaded {
                filename: filename.into(),
            },
            dataset: Arc::new(dataset),
        }
    }

    pub fn id(&self) -> DatasetId {
        self.id
    }

    pub fn source(&self) -> &DataSource {
        &self.source
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }
}

/// The session's filter, selection and dataset configuration
///
/// Only constructed through [`ViewState::initial`] and [`reduce`], so the
/// selected category always names a category of the filtered data (or is
/// `None` when that data is empty).
#[derive(Debug, Clone)]
pub struct ViewState {
    active: ActiveDataset,
    date_range: DateRange,
    selected_category: Option<String>,
}

impl ViewState {
    /// Session start: sample data, no date range, "Task A" selected
    pub fn initial(sample: Arc<Dataset>) -> Self {
        settle(
            ActiveDataset::sample(sample),
            DateRange::new(),
            Some(SAMPLE_INITIAL_CATEGORY),
        )
        .state
    }

    pub fn active(&self) -> &ActiveDataset {
        &self.active
    }

    pub fn dataset(&self) -> &Dataset {
        self.active.dataset()
    }

    pub fn source(&self) -> &DataSource {
        self.active.source()
    }

    pub fn date_range(&self) -> DateRange {
        self.date_range
    }

    pub fn selected_category(&self) -> Option<&str> {
        self.selected_category.as_deref()
    }

    /// Active dataset restricted to the current date range
    pub fn filtered(&self) -> Dataset {
        self.date_range.apply(self.active.dataset())
    }

    /// Derive every view from this state
    pub fn views(&self) -> Views {
        settle(
            self.active.clone(),
            self.date_range,
            self.selected_category.as_deref(),
        )
        .views
    }
}

/// User input that can change the views
#[derive(Clone, PartialEq)]
pub enum Event {
    /// A file arrived from the upload widget
    UploadReceived { bytes: Vec<u8>, filename: String },
    /// Either date picker changed
    DateRangeChanged {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    /// The category selector changed
    CategorySelected(String),
}

impl Event {
    pub fn upload(bytes: impl Into<Vec<u8>>, filename: impl Into<String>) -> Self {
        Event::UploadReceived {
            bytes: bytes.into(),
            filename: filename.into(),
        }
    }

    pub fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Event::DateRangeChanged { start, end }
    }

    /// Build a date-range event from ISO-8601 (`YYYY-MM-DD`) strings
    ///
    /// Missing or blank strings mean "no bound".
    pub fn date_range_from_iso(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let start = match start {
            Some(s) => parse_iso_date(s)?,
            None => None,
        };
        let end = match end {
            Some(s) => parse_iso_date(s)?,
            None => None,
        };
        Ok(Event::DateRangeChanged { start, end })
    }

    pub fn select(category: impl Into<String>) -> Self {
        Event::CategorySelected(category.into())
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::UploadReceived { bytes, filename } => f
                .debug_struct("UploadReceived")
                .field("filename", filename)
                .field("bytes", &bytes.len())
                .finish(),
            Event::DateRangeChanged { start, end } => f
                .debug_struct("DateRangeChanged")
                .field("start", start)
                .field("end", end)
                .finish(),
            Event::CategorySelected(category) => {
                f.debug_tuple("CategorySelected").field(category).finish()
            }
        }
    }
}

/// Everything a renderer needs after an event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Views {
    /// Which dataset backs the views
    pub source: DataSource,
    /// Identity of the active dataset
    pub dataset_id: DatasetId,
    /// Date range the views were filtered with
    pub date_range: DateRange,
    /// Category driving the subcategory view
    pub selected_category: Option<String>,
    /// Categories of the filtered data, for the selector
    pub available_categories: Vec<String>,
    /// Minutes per category
    pub category_breakdown: AggregationResult,
    /// Minutes per subcategory of the selected category
    pub subcategory_breakdown: AggregationResult,
    /// Minutes per (category, subcategory)
    pub hierarchical_breakdown: AggregationResult,
    /// Filtered records in dataset order
    pub table_rows: Vec<Record>,
    /// Message for a rejected upload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Views {
    /// True when the filters left nothing to show
    pub fn is_empty(&self) -> bool {
        self.table_rows.is_empty()
    }

    /// Minutes across the filtered records
    pub fn total_minutes(&self) -> f64 {
        self.table_rows.iter().map(|r| r.duration_minutes).sum()
    }
}

/// New state plus the views derived from it
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: ViewState,
    pub views: Views,
}

/// Keep `requested` if it is available, otherwise take the first category
fn resolve_selection(requested: Option<&str>, available: &[String]) -> Option<String> {
    requested
        .and_then(|wanted| available.iter().find(|c| c.as_str() == wanted))
        .or_else(|| available.first())
        .cloned()
}

/// Filter, aggregate and repair the selection in one pass
fn settle(active: ActiveDataset, date_range: DateRange, requested: Option<&str>) -> Transition {
    let filtered = date_range.apply(active.dataset());
    let category_breakdown = category_breakdown(&filtered);
    let available_categories = category_breakdown.keys();
    let selected_category = resolve_selection(requested, &available_categories);

    let subcategory_breakdown = match &selected_category {
        Some(category) => subcategory_breakdown(&filtered, category),
        None => AggregationResult::empty(GroupKey::Subcategory, None),
    };
    let hierarchical_breakdown = hierarchical_breakdown(&filtered);

    let views = Views {
        source: active.source().clone(),
        dataset_id: active.id(),
        date_range,
        selected_category: selected_category.clone(),
        available_categories,
        category_breakdown,
        subcategory_breakdown,
        hierarchical_breakdown,
        table_rows: filtered.into_records(),
        error_message: None,
    };

    Transition {
        state: ViewState {
            active,
            date_range,
            selected_category,
        },
        views,
    }
}

/// Apply one event to `state`
///
/// Pure with respect to `state`: the caller decides whether to keep the
/// returned state. Uploads are decoded with `normalizer`.
pub fn reduce<N: RecordNormalizer + ?Sized>(
    normalizer: &N,
    state: &ViewState,
    event: Event,
) -> Transition {
    debug!("Applying {:?}", event);

    let transition = match event {
        Event::UploadReceived { bytes, filename } => {
            match normalizer.normalize(&bytes, &filename) {
                Ok(dataset) => {
                    info!("Loaded {} records from {}", dataset.len(), filename);
                    settle(
                        ActiveDataset::uploaded(filename, dataset),
                        state.date_range,
                        None,
                    )
                }
                Err(err) => {
                    if err.is_parse_error() {
                        warn!("Rejected upload {}: {}", filename, err);
                    } else {
                        error!("Could not process upload {}: {}", filename, err);
                    }
                    let mut views = state.views();
                    views.error_message = Some(err.to_string());
                    Transition {
                        state: state.clone(),
                        views,
                    }
                }
            }
        }
        Event::DateRangeChanged { start, end } => settle(
            state.active.clone(),
            DateRange::between(start, end),
            state.selected_category(),
        ),
        Event::CategorySelected(category) => settle(
            state.active.clone(),
            state.date_range,
            Some(category.as_str()),
        ),
    };

    debug!(
        "Views now show {} rows across {} categories, selected {:?}",
        transition.views.table_rows.len(),
        transition.views.available_categories.len(),
        transition.views.selected_category
    );

    transition
}

/// One user's session: its state, its normalizer and the latest views
///
/// Sessions never share mutable data; the sample dataset is shared only
/// through an immutable `Arc`.
pub struct Session<N> {
    normalizer: N,
    state: ViewState,
    views: Views,
}

impl<N: RecordNormalizer> Session<N> {
    /// Start a session on the sample dataset
    pub fn new(sample: Arc<Dataset>, normalizer: N) -> Self {
        let state = ViewState::initial(sample);
        let views = state.views();
        Self {
            normalizer,
            state,
            views,
        }
    }

    /// Handle one event to completion and return the refreshed views
    pub fn apply(&mut self, event: Event) -> &Views {
        let Transition { state, views } = reduce(&self.normalizer, &self.state, event);
        self.state = state;
        self.views = views;
        &self.views
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn views(&self) -> &Views {
        &self.views
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TasklensError;
    use crate::sample::sample_dataset;
    use crate::test_utils::{RecordBuilder, StubNormalizer, date};

    fn two_category_upload() -> Dataset {
        let entry = |category: &str, subcategory: &str, minutes: f64, day: u32| {
            RecordBuilder::new()
                .category(category)
                .subcategory(subcategory)
                .minutes(minutes)
                .on(date(2024, 3, day))
                .build()
        };
        Dataset::new(vec![
            entry("A", "x", 10.0, 1),
            entry("B", "y", 20.0, 2),
            entry("A", "z", 5.0, 3),
        ])
    }

    fn session_with(upload: Dataset) -> Session<StubNormalizer> {
        Session::new(Arc::new(sample_dataset()), StubNormalizer::returning(upload))
    }

    #[test]
    fn test_initial_state_uses_sample() {
        let session = session_with(Dataset::empty());
        let views = session.views();

        assert_eq!(views.source, DataSource::Sample);
        assert_eq!(views.selected_category.as_deref(), Some("Task A"));
        assert_eq!(views.available_categories, vec!["Task A", "Task B", "Task C"]);
        assert_eq!(views.table_rows.len(), 10);
        assert!(views.error_message.is_none());
    }

    #[test]
    fn test_initial_selection_prefers_task_a() {
        let dataset = Dataset::new(vec![
            RecordBuilder::new().category("Task B").build(),
            RecordBuilder::new().category("Task A").build(),
        ]);
        let state = ViewState::initial(Arc::new(dataset));
        assert_eq!(state.selected_category(), Some("Task A"));

        // Data without Task A falls back to its first category
        let dataset = Dataset::new(vec![RecordBuilder::new().category("Other").build()]);
        let state = ViewState::initial(Arc::new(dataset));
        assert_eq!(state.selected_category(), Some("Other"));
    }

    #[test]
    fn test_sample_views_without_filters() {
        let session = session_with(Dataset::empty());
        let views = session.views();

        assert_eq!(
            views.category_breakdown.pairs(),
            vec![
                ("Task A".to_string(), 6.0),
                ("Task B".to_string(), 4.0),
                ("Task C".to_string(), 6.0),
            ]
        );
        assert_eq!(views.subcategory_breakdown.get("Sub A"), Some(4.5));
        assert_eq!(views.subcategory_breakdown.get("Sub C"), Some(1.5));
        assert_eq!(views.hierarchical_breakdown.total(), 16.0);
    }

    #[test]
    fn test_upload_success_replaces_dataset_and_selects_first() {
        let mut session = session_with(two_category_upload());
        session.apply(Event::select("Task B"));

        let views = session.apply(Event::upload(vec![1, 2, 3], "log.xlsx"));
        assert_eq!(
            views.source,
            DataSource::Uploaded {
                filename: "log.xlsx".to_string()
            }
        );
        assert_eq!(views.available_categories, vec!["A", "B"]);
        assert_eq!(views.selected_category.as_deref(), Some("A"));
        assert_eq!(views.subcategory_breakdown.keys(), vec!["x", "z"]);
        assert_eq!(session.state().dataset().len(), 3);
    }

    #[test]
    fn test_upload_keeps_date_range() {
        let mut session = session_with(two_category_upload());
        session.apply(Event::date_range(Some(date(2024, 3, 2)), None));

        let views = session.apply(Event::upload(Vec::new(), "log.xlsx"));
        assert_eq!(views.table_rows.len(), 2);
        assert_eq!(views.date_range.start, Some(date(2024, 3, 2)));
        assert_eq!(views.selected_category.as_deref(), Some("B"));
    }

    #[test]
    fn test_upload_failure_leaves_state_unchanged() {
        let mut session = session_with(two_category_upload());
        session.apply(Event::select("Task C"));
        let before_id = session.state().active().id();

        let views = session
            .apply(Event::upload(b"a,b,c".to_vec(), "log.csv"))
            .clone();

        assert_eq!(views.error_message.as_deref(), Some("Unsupported file format: log.csv"));
        assert_eq!(views.source, DataSource::Sample);
        assert_eq!(views.selected_category.as_deref(), Some("Task C"));
        assert_eq!(session.state().active().id(), before_id);
        assert_eq!(session.state().selected_category(), Some("Task C"));
    }

    #[test]
    fn test_failed_upload_after_success_keeps_upload() {
        let mut session = session_with(two_category_upload());
        session.apply(Event::upload(Vec::new(), "log.xlsx"));

        let views = session.apply(Event::upload(Vec::new(), "log.broken.xls"));
        assert!(views.error_message.as_deref().unwrap().contains("row 0"));
        assert_eq!(views.available_categories, vec!["A", "B"]);
    }

    #[test]
    fn test_error_message_cleared_by_next_event() {
        let mut session = session_with(Dataset::empty());
        session.apply(Event::upload(Vec::new(), "notes.txt"));
        assert!(session.views().error_message.is_some());

        let views = session.apply(Event::select("Task B"));
        assert!(views.error_message.is_none());
    }

    #[test]
    fn test_absent_selection_falls_back_to_first() {
        let mut session = session_with(two_category_upload());
        session.apply(Event::upload(Vec::new(), "log.xlsx"));

        let views = session.apply(Event::select("C"));
        assert_eq!(views.available_categories, vec!["A", "B"]);
        assert_eq!(views.selected_category.as_deref(), Some("A"));
        assert_eq!(session.state().selected_category(), Some("A"));
    }

    #[test]
    fn test_date_range_keeps_present_selection() {
        let mut session = session_with(Dataset::empty());
        session.apply(Event::select("Task C"));

        let views = session.apply(Event::date_range(
            Some(date(2023, 1, 3)),
            Some(date(2023, 1, 6)),
        ));
        assert_eq!(views.selected_category.as_deref(), Some("Task C"));
        assert_eq!(views.table_rows.len(), 4);
    }

    #[test]
    fn test_date_range_repairs_missing_selection() {
        let mut session = session_with(Dataset::empty());
        session.apply(Event::select("Task C"));

        // 2023-01-01..02 holds only Task A and Task B
        let views = session.apply(Event::date_range(
            Some(date(2023, 1, 1)),
            Some(date(2023, 1, 2)),
        ));
        assert_eq!(views.available_categories, vec!["Task A", "Task B"]);
        assert_eq!(views.selected_category.as_deref(), Some("Task A"));
    }

    #[test]
    fn test_inverted_range_degrades_to_empty_views() {
        let mut session = session_with(Dataset::empty());
        let views = session.apply(Event::date_range(
            Some(date(2023, 1, 5)),
            Some(date(2023, 1, 3)),
        ));

        assert!(views.is_empty());
        assert!(views.category_breakdown.is_empty());
        assert!(views.subcategory_breakdown.is_empty());
        assert!(views.hierarchical_breakdown.is_empty());
        assert!(views.available_categories.is_empty());
        assert_eq!(views.selected_category, None);
        assert!(views.error_message.is_none());

        // Widening the range brings the first category back
        let views = session.apply(Event::date_range(None, None));
        assert_eq!(views.selected_category.as_deref(), Some("Task A"));
    }

    #[test]
    fn test_empty_upload_has_no_selection() {
        let mut session = session_with(Dataset::empty());
        let views = session.apply(Event::upload(Vec::new(), "empty.xlsx"));
        assert_eq!(views.selected_category, None);
        assert!(views.is_empty());
    }

    #[test]
    fn test_reduce_does_not_touch_input_state() {
        let normalizer = StubNormalizer::returning(two_category_upload());
        let state = ViewState::initial(Arc::new(sample_dataset()));

        let transition = reduce(&normalizer, &state, Event::upload(Vec::new(), "log.xlsx"));
        assert_eq!(state.source(), &DataSource::Sample);
        assert_ne!(transition.state.active().id(), state.active().id());
    }

    #[test]
    fn test_sessions_are_isolated() {
        let sample = Arc::new(sample_dataset());
        let mut first = Session::new(
            sample.clone(),
            StubNormalizer::returning(two_category_upload()),
        );
        let second = Session::new(sample.clone(), StubNormalizer::returning(Dataset::empty()));

        first.apply(Event::upload(Vec::new(), "log.xlsx"));
        assert_eq!(second.views().source, DataSource::Sample);
        assert_eq!(second.state().dataset().len(), 10);
        assert_eq!(sample.len(), 10);
    }

    #[test]
    fn test_date_range_from_iso() {
        let event = Event::date_range_from_iso(Some("2023-01-05"), Some("")).unwrap();
        assert_eq!(event, Event::date_range(Some(date(2023, 1, 5)), None));

        assert!(matches!(
            Event::date_range_from_iso(Some("05/01/2023"), None),
            Err(TasklensError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_event_debug_hides_bytes() {
        let event = Event::upload(vec![0u8; 4096], "big.xlsx");
        let debug = format!("{event:?}");
        assert!(debug.contains("big.xlsx"));
        assert!(debug.contains("4096"));
    }

    #[test]
    fn test_views_serialize() {
        let session = session_with(Dataset::empty());
        let json = serde_json::to_value(session.views()).unwrap();
        assert_eq!(json["source"]["kind"], "sample");
        assert_eq!(json["selected_category"], "Task A");
        assert_eq!(json["table_rows"].as_array().unwrap().len(), 10);
        assert!(json.get("error_message").is_none());
    }
}
