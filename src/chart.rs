//! Chart descriptions for the dashboard views
//!
//! The core hands out ordered duration totals; this module shapes them into
//! the three charts of the dashboard: a pie of categories, a pie of the
//! selected category's subcategories and a category → subcategory treemap.
//! Nothing here draws; the output formatters decide how a chart looks.

use serde::Serialize;
use tasklens_core::{AggregationResult, Views};

/// Title of the category pie chart
pub const CATEGORY_CHART_TITLE: &str = "業務内容の割合";

/// Title of the category → subcategory treemap
pub const HIERARCHY_CHART_TITLE: &str = "業務内容とサブカテゴリの階層構造";

/// Title of the subcategory pie chart for `category`
pub fn subcategory_chart_title(category: &str) -> String {
    format!("{category}のサブカテゴリの割合")
}

/// One labelled share of a chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slice {
    pub label: String,
    pub minutes: f64,
    /// Share of the chart total, 0–100
    pub percent: f64,
}

impl Slice {
    fn new(label: impl Into<String>, minutes: f64, total: f64) -> Self {
        Self {
            label: label.into(),
            minutes,
            percent: percent_of(minutes, total),
        }
    }

    /// Caption shown on the slice: label, share and minutes
    pub fn text(&self) -> String {
        format!(
            "{} / {:.1}% / {} 分",
            self.label,
            self.percent,
            format_minutes(self.minutes)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<Slice>,
    pub total_minutes: f64,
}

impl PieChart {
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }
}

/// Parent tile of a treemap with its child tiles
///
/// Child percentages are relative to the parent, the parent's percentage is
/// relative to the whole map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreemapNode {
    #[serde(flatten)]
    pub parent: Slice,
    pub children: Vec<Slice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Treemap {
    pub title: String,
    pub nodes: Vec<TreemapNode>,
    pub total_minutes: f64,
}

impl Treemap {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Pie chart of the level-one totals of `result`
pub fn pie_chart(title: impl Into<String>, result: &AggregationResult) -> PieChart {
    let total = result.total();
    PieChart {
        title: title.into(),
        slices: result
            .parent_totals()
            .into_iter()
            .map(|(label, minutes)| Slice::new(label, minutes, total))
            .collect(),
        total_minutes: total,
    }
}

/// Treemap of a two-level result; a one-level result gives childless tiles
pub fn treemap(title: impl Into<String>, result: &AggregationResult) -> Treemap {
    let total = result.total();
    let nodes = result
        .parent_totals()
        .into_iter()
        .map(|(label, minutes)| {
            let children = result
                .iter()
                .filter(|row| row.key == label)
                .filter_map(|row| {
                    row.subkey
                        .as_ref()
                        .map(|sub| Slice::new(sub.clone(), row.total_minutes, minutes))
                })
                .collect();
            TreemapNode {
                parent: Slice::new(label, minutes, total),
                children,
            }
        })
        .collect();

    Treemap {
        title: title.into(),
        nodes,
        total_minutes: total,
    }
}

/// The three dashboard charts for one set of views
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub categories: PieChart,
    /// Absent when no category is selected
    pub subcategories: Option<PieChart>,
    pub hierarchy: Treemap,
}

impl Dashboard {
    pub fn from_views(views: &Views) -> Self {
        Self {
            categories: pie_chart(CATEGORY_CHART_TITLE, &views.category_breakdown),
            subcategories: views.selected_category.as_deref().map(|category| {
                pie_chart(
                    subcategory_chart_title(category),
                    &views.subcategory_breakdown,
                )
            }),
            hierarchy: treemap(HIERARCHY_CHART_TITLE, &views.hierarchical_breakdown),
        }
    }
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

/// Minutes without a trailing `.0` when whole
pub fn format_minutes(minutes: f64) -> String {
    if minutes.fract() == 0.0 {
        format!("{minutes:.0}")
    } else {
        format!("{minutes:.1}")
    }
}
