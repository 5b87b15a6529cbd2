//! Data types of the analysis report.

use crate::analyzers::aggregate::GroupSummary;
use crate::analyzers::correlation::Correlation;
use crate::analyzers::metrics::{CommentStats, GapSummary, RoomGap, ValueScore};
use crate::analyzers::regression::{LinearFit, RatingResidual};
use crate::cleaner::CleaningSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Headline numbers of both cleaned datasets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overview {
    pub booking_hotels: usize,
    pub tripadvisor_hotels: usize,
    pub booking_median_price_eur: Option<f64>,
    pub booking_mean_rating: Option<f64>,
    pub tripadvisor_median_price_eur: Option<f64>,
}

/// Pearson and Spearman for the same pair of series; `None` where undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationPair {
    pub pearson: Option<Correlation>,
    pub spearman: Option<Correlation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomGapReport {
    pub summary: GapSummary,
    pub largest_negative: Vec<RoomGap>,
}

/// Price and quality of one location, with its value index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationValue {
    pub location: String,
    pub count: usize,
    pub median_price_eur: Option<f64>,
    pub mean_rating: Option<f64>,
    pub mean_room_score: Option<f64>,
    pub value_index: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationReport {
    /// Every location with enough hotels, cheapest first.
    pub locations: Vec<LocationValue>,
    pub best_value: Vec<LocationValue>,
    pub worst_value: Vec<LocationValue>,
    pub most_expensive: Vec<LocationValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegressionReport {
    pub fit: LinearFit,
    pub price_cutoff: f64,
    pub most_overpriced: Vec<RatingResidual>,
    pub best_surprises: Vec<RatingResidual>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentReport {
    pub stats: CommentStats,
    pub by_price_bracket: Vec<GroupSummary>,
    pub price_vs_words: Option<Correlation>,
}

/// Everything the reporting layer draws from, written as `analysis_report.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub schema_version: u8,
    pub generated_at: DateTime<Utc>,
    pub cleaning: Vec<CleaningSummary>,
    pub overview: Overview,
    pub price_vs_rating: CorrelationPair,
    pub rating_by_price_bracket: Vec<GroupSummary>,
    pub rating_by_summary_price_bracket: Vec<GroupSummary>,
    pub review_labels: Vec<GroupSummary>,
    pub room_gap: RoomGapReport,
    pub locations: LocationReport,
    pub regression: Option<RegressionReport>,
    pub bed_types: Vec<GroupSummary>,
    pub room_categories: Vec<GroupSummary>,
    pub review_count_brackets: Vec<GroupSummary>,
    pub reviews_vs_rating: Option<Correlation>,
    pub top_value_hotels: Vec<ValueScore>,
    pub comments: CommentReport,
}

impl AnalysisReport {
    /// Attach the summaries of the cleaning runs that produced the inputs.
    pub fn with_cleaning(mut self, summaries: Vec<CleaningSummary>) -> Self {
        self.cleaning = summaries;
        self
    }
}
