use crate::analyzers::aggregate::{
    Field, GroupKey, GroupSummary, Groupable, Measure, Statistic, aggregate,
};
use crate::analyzers::bracket::{
    Bracketing, COMMENT_PRICE_BRACKETS, PRICE_BRACKETS, REVIEW_COUNT_BRACKETS,
    SUMMARY_PRICE_BRACKETS,
};
use crate::analyzers::correlation::{Correlation, pearson, spearman};
use crate::analyzers::metrics::{
    comment_stats, largest_negative_gaps, price_comment_pairs, room_gaps, summarize_gaps,
    top_value_hotels, value_index,
};
use crate::analyzers::regression::{
    best_surprises, most_overpriced, price_rating_fit, rating_residuals,
};
use crate::analyzers::types::{
    AnalysisReport, CommentReport, CorrelationPair, LocationReport, LocationValue, Overview,
    RegressionReport, RoomGapReport,
};
use crate::analyzers::utility::{mean, median};
use crate::config::AnalysisConfig;
use crate::error::MetricError;
use crate::output::{BOOKING_CLEANED_FILE, TRIPADVISOR_CLEANED_FILE, read_records};
use crate::records::{CleanedHotelRecord, CleanedReviewRecord};
use anyhow::Result;
use chrono::Utc;
use std::cmp::Ordering;
use std::path::Path;
use tracing::{info, warn};

const MEAN_RATING: Measure = Measure::new(Statistic::Mean, Field::Rating);
const MEDIAN_RATING: Measure = Measure::new(Statistic::Median, Field::Rating);
const STD_RATING: Measure = Measure::new(Statistic::Std, Field::Rating);
const MIN_RATING: Measure = Measure::new(Statistic::Min, Field::Rating);
const MAX_RATING: Measure = Measure::new(Statistic::Max, Field::Rating);
const MEDIAN_PRICE: Measure = Measure::new(Statistic::Median, Field::PriceEur);
const MEAN_ROOM_SCORE: Measure = Measure::new(Statistic::Mean, Field::RoomScore);
const MEAN_WORDS: Measure = Measure::new(Statistic::Mean, Field::CommentWords);

/// Logs an undefined metric and turns it into `None`.
fn defined<T>(metric: &str, result: Result<T, MetricError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(metric, error = %e, "Metric undefined");
            None
        }
    }
}

fn by_stat(a: &GroupSummary, b: &GroupSummary, measure: Measure) -> Ordering {
    let key = |g: &GroupSummary| g.get(measure.statistic, measure.field);
    key(a)
        .unwrap_or(f64::NAN)
        .total_cmp(&key(b).unwrap_or(f64::NAN))
}

fn sort_by_bracket(groups: &mut [GroupSummary], bracketing: Bracketing) {
    groups.sort_by_key(|g| bracketing.position(&g.group));
}

fn bracket_report<R: Groupable>(
    records: &[R],
    key: GroupKey,
    bracketing: Bracketing,
    measures: &[Measure],
) -> Vec<GroupSummary> {
    let mut groups = aggregate(records, &key, measures, 1);
    sort_by_bracket(&mut groups, bracketing);
    groups
}

fn overview(booking: &[CleanedHotelRecord], reviews: &[CleanedReviewRecord]) -> Overview {
    let booking_prices: Vec<f64> = booking.iter().map(|r| r.price_eur).collect();
    let ratings: Vec<f64> = booking.iter().map(|r| r.rating).collect();
    let review_prices: Vec<f64> = reviews.iter().map(|r| r.price_eur).collect();

    Overview {
        booking_hotels: booking.len(),
        tripadvisor_hotels: reviews.len(),
        booking_median_price_eur: median(&booking_prices),
        booking_mean_rating: mean(&ratings),
        tripadvisor_median_price_eur: median(&review_prices),
    }
}

fn correlation_pair(name: &str, x: &[f64], y: &[f64]) -> CorrelationPair {
    CorrelationPair {
        pearson: defined(&format!("pearson {name}"), pearson(x, y)),
        spearman: defined(&format!("spearman {name}"), spearman(x, y)),
    }
}

fn location_report(booking: &[CleanedHotelRecord], config: &AnalysisConfig) -> LocationReport {
    let groups = aggregate(
        booking,
        &GroupKey::Location,
        &[MEDIAN_PRICE, MEAN_RATING, MEAN_ROOM_SCORE],
        config.min_location_hotels,
    );

    let mut locations: Vec<LocationValue> = groups
        .into_iter()
        .map(|g| {
            let median_price_eur = g.get(Statistic::Median, Field::PriceEur);
            let mean_rating = g.get(Statistic::Mean, Field::Rating);
            let mean_room_score = g.get(Statistic::Mean, Field::RoomScore);
            let index = defined(
                &format!("value index of {}", g.group),
                value_index(mean_rating, median_price_eur),
            );
            LocationValue {
                location: g.group,
                count: g.count,
                median_price_eur,
                mean_rating,
                mean_room_score,
                value_index: index,
            }
        })
        .collect();
    let price = |l: &LocationValue| l.median_price_eur.unwrap_or(f64::NAN);
    locations.sort_by(|a, b| price(a).total_cmp(&price(b)));

    let mut valued: Vec<(f64, &LocationValue)> = locations
        .iter()
        .filter_map(|l| Some((l.value_index?, l)))
        .collect();
    valued.sort_by(|a, b| b.0.total_cmp(&a.0));
    let best_value = valued
        .iter()
        .take(config.top_locations)
        .map(|(_, l)| (*l).clone())
        .collect();
    let worst_value = valued
        .iter()
        .rev()
        .take(config.top_locations)
        .map(|(_, l)| (*l).clone())
        .collect();
    let most_expensive = locations
        .iter()
        .rev()
        .take(config.most_expensive_locations)
        .cloned()
        .collect();

    LocationReport {
        locations,
        best_value,
        worst_value,
        most_expensive,
    }
}

fn regression_report(
    booking: &[CleanedHotelRecord],
    config: &AnalysisConfig,
) -> Option<RegressionReport> {
    let cutoff = config.regression_price_cutoff;
    let fit = defined("price/rating fit", price_rating_fit(booking, cutoff))?;
    info!(
        slope = fit.slope,
        intercept = fit.intercept,
        n = fit.n,
        "Price/rating line fitted"
    );

    let residuals = rating_residuals(booking, &fit, cutoff);
    Some(RegressionReport {
        fit,
        price_cutoff: cutoff,
        most_overpriced: most_overpriced(&residuals, config.review_floor, config.top_residuals),
        best_surprises: best_surprises(&residuals, config.review_floor, config.top_residuals),
    })
}

fn comment_report(reviews: &[CleanedReviewRecord]) -> CommentReport {
    let (prices, words) = price_comment_pairs(reviews);
    let with_comment: Vec<CleanedReviewRecord> = reviews
        .iter()
        .filter(|r| r.comment_words().is_some())
        .cloned()
        .collect();

    CommentReport {
        stats: comment_stats(reviews),
        by_price_bracket: bracket_report(
            &with_comment,
            GroupKey::PriceBracket(COMMENT_PRICE_BRACKETS),
            COMMENT_PRICE_BRACKETS,
            &[MEAN_WORDS, MEDIAN_PRICE],
        ),
        price_vs_words: defined("spearman price/comment words", spearman(&prices, &words)),
    }
}

/// Builds the full analysis report from the two cleaned datasets.
///
/// The report's `cleaning` section is left empty; see
/// [`AnalysisReport::with_cleaning`].
pub fn analyze(
    booking: &[CleanedHotelRecord],
    reviews: &[CleanedReviewRecord],
    config: &AnalysisConfig,
) -> AnalysisReport {
    let prices: Vec<f64> = booking.iter().map(|r| r.price_eur).collect();
    let ratings: Vec<f64> = booking.iter().map(|r| r.rating).collect();
    let price_vs_rating = correlation_pair("price/rating", &prices, &ratings);

    let mut review_labels = aggregate(
        booking,
        &GroupKey::ReviewScore,
        &[MEAN_RATING, STD_RATING, MIN_RATING, MAX_RATING, MEDIAN_PRICE],
        config.min_label_hotels,
    );
    review_labels.sort_by(|a, b| by_stat(b, a, MEAN_RATING));

    let gaps = room_gaps(booking);
    let room_gap = RoomGapReport {
        summary: summarize_gaps(&gaps),
        largest_negative: largest_negative_gaps(&gaps, config.top_gaps),
    };

    let mut bed_types = aggregate(
        booking,
        &GroupKey::BedType,
        &[MEDIAN_PRICE, MEAN_RATING],
        config.min_bed_type_hotels,
    );
    bed_types.sort_by(|a, b| by_stat(b, a, MEDIAN_PRICE));

    let mut room_categories = aggregate(
        booking,
        &GroupKey::RoomCategory,
        &[MEDIAN_PRICE, MEAN_RATING, MEAN_ROOM_SCORE],
        config.min_room_category_hotels,
    );
    room_categories.sort_by(|a, b| by_stat(a, b, MEDIAN_PRICE));

    let (review_counts, review_ratings): (Vec<f64>, Vec<f64>) = booking
        .iter()
        .filter_map(|r| Some((r.num_reviews? as f64, r.rating)))
        .unzip();
    let reviews_vs_rating: Option<Correlation> = defined(
        "spearman reviews/rating",
        spearman(&review_counts, &review_ratings),
    );

    AnalysisReport {
        schema_version: 1,
        generated_at: Utc::now(),
        cleaning: Vec::new(),
        overview: overview(booking, reviews),
        price_vs_rating,
        rating_by_price_bracket: bracket_report(
            booking,
            GroupKey::PriceBracket(PRICE_BRACKETS),
            PRICE_BRACKETS,
            &[MEAN_RATING, MEDIAN_RATING, MEAN_ROOM_SCORE],
        ),
        rating_by_summary_price_bracket: bracket_report(
            booking,
            GroupKey::PriceBracket(SUMMARY_PRICE_BRACKETS),
            SUMMARY_PRICE_BRACKETS,
            &[MEAN_RATING],
        ),
        review_labels,
        room_gap,
        locations: location_report(booking, config),
        regression: regression_report(booking, config),
        bed_types,
        room_categories,
        review_count_brackets: bracket_report(
            booking,
            GroupKey::NumReviewsBracket(REVIEW_COUNT_BRACKETS),
            REVIEW_COUNT_BRACKETS,
            &[MEAN_RATING, MEDIAN_PRICE],
        ),
        reviews_vs_rating,
        top_value_hotels: top_value_hotels(booking, config.review_floor, config.top_value_hotels),
        comments: comment_report(reviews),
    }
}

/// Loads both cleaned datasets from `cleaned_dir` and analyzes them.
#[tracing::instrument(skip(config), fields(cleaned_dir = %cleaned_dir.display()))]
pub fn analyze_dir(cleaned_dir: &Path, config: &AnalysisConfig) -> Result<AnalysisReport> {
    let booking: Vec<CleanedHotelRecord> =
        read_records(&cleaned_dir.join(BOOKING_CLEANED_FILE))?;
    let reviews: Vec<CleanedReviewRecord> =
        read_records(&cleaned_dir.join(TRIPADVISOR_CLEANED_FILE))?;

    info!(
        booking = booking.len(),
        tripadvisor = reviews.len(),
        "Cleaned datasets loaded"
    );
    Ok(analyze(&booking, &reviews, config))
}
