//! Derived value and gap metrics.

use crate::analyzers::utility::{mean, median, pct};
use crate::error::MetricError;
use crate::records::{CleanedHotelRecord, CleanedReviewRecord};
use serde::Serialize;

/// Mean rating per 100 EUR of median price for a group.
///
/// # Errors
///
/// [`MetricError::Undefined`] when either input is missing or the median
/// price is zero.
pub fn value_index(mean_rating: Option<f64>, median_price: Option<f64>) -> Result<f64, MetricError> {
    let mean_rating = mean_rating.ok_or(MetricError::Undefined("mean rating missing"))?;
    let median_price = median_price.ok_or(MetricError::Undefined("median price missing"))?;
    if median_price == 0.0 {
        return Err(MetricError::Undefined("median price is zero"));
    }
    finite(mean_rating / median_price * 100.0)
}

fn finite(value: f64) -> Result<f64, MetricError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MetricError::Undefined("result is not finite"))
    }
}

/// Rating per 100 EUR paid for one hotel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueScore {
    pub hotel_name: String,
    pub location: Option<String>,
    pub price_eur: f64,
    pub rating: f64,
    pub num_reviews: Option<u64>,
    pub value_score: f64,
}

pub fn value_score(rating: f64, price_eur: f64) -> Result<f64, MetricError> {
    if price_eur == 0.0 {
        return Err(MetricError::Undefined("price is zero"));
    }
    finite(rating / price_eur * 100.0)
}

/// Value scores of every record; records whose score is undefined are skipped.
pub fn value_scores(records: &[CleanedHotelRecord]) -> Vec<ValueScore> {
    records
        .iter()
        .filter_map(|r| {
            let score = value_score(r.rating, r.price_eur).ok()?;
            Some(ValueScore {
                hotel_name: r.hotel_name.clone(),
                location: r.location.clone(),
                price_eur: r.price_eur,
                rating: r.rating,
                num_reviews: r.num_reviews,
                value_score: score,
            })
        })
        .collect()
}

/// The `n` best value scores among hotels with at least `min_reviews` reviews.
pub fn top_value_hotels(
    records: &[CleanedHotelRecord],
    min_reviews: u64,
    n: usize,
) -> Vec<ValueScore> {
    let mut scores: Vec<_> = value_scores(records)
        .into_iter()
        .filter(|s| s.num_reviews.is_some_and(|r| r >= min_reviews))
        .collect();
    scores.sort_by(|a, b| b.value_score.total_cmp(&a.value_score));
    scores.truncate(n);
    scores
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapClass {
    RoomHigher,
    Equal,
    RoomLower,
}

impl GapClass {
    pub fn of(gap: f64) -> Self {
        if gap > 0.0 {
            GapClass::RoomHigher
        } else if gap < 0.0 {
            GapClass::RoomLower
        } else {
            GapClass::Equal
        }
    }
}

/// Room score minus overall rating for one hotel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomGap {
    pub hotel_name: String,
    pub location: Option<String>,
    pub rating: f64,
    pub room_score: f64,
    pub price_eur: f64,
    pub gap: f64,
    pub class: GapClass,
}

/// Gaps of every record that has a room score.
pub fn room_gaps(records: &[CleanedHotelRecord]) -> Vec<RoomGap> {
    records
        .iter()
        .filter_map(|r| {
            let room_score = r.room_score?;
            let gap = room_score - r.rating;
            Some(RoomGap {
                hotel_name: r.hotel_name.clone(),
                location: r.location.clone(),
                rating: r.rating,
                room_score,
                price_eur: r.price_eur,
                gap,
                class: GapClass::of(gap),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapSummary {
    pub count: usize,
    pub mean_gap: Option<f64>,
    pub room_higher: usize,
    pub equal: usize,
    pub room_lower: usize,
    pub room_higher_pct: f64,
    pub room_lower_pct: f64,
}

pub fn summarize_gaps(gaps: &[RoomGap]) -> GapSummary {
    let count_of = |class| gaps.iter().filter(|g| g.class == class).count();
    let room_higher = count_of(GapClass::RoomHigher);
    let room_lower = count_of(GapClass::RoomLower);
    let values: Vec<f64> = gaps.iter().map(|g| g.gap).collect();

    GapSummary {
        count: gaps.len(),
        mean_gap: mean(&values),
        room_higher,
        equal: count_of(GapClass::Equal),
        room_lower,
        room_higher_pct: pct(room_higher, gaps.len()),
        room_lower_pct: pct(room_lower, gaps.len()),
    }
}

/// The `n` most negative gaps, where the room disappoints most.
pub fn largest_negative_gaps(gaps: &[RoomGap], n: usize) -> Vec<RoomGap> {
    let mut sorted = gaps.to_vec();
    sorted.sort_by(|a, b| a.gap.total_cmp(&b.gap));
    sorted.truncate(n);
    sorted
}

/// Length statistics of the non-blank TripAdvisor comments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentStats {
    pub with_comment: usize,
    pub without_comment: usize,
    pub mean_words: Option<f64>,
    pub median_words: Option<f64>,
    pub mean_chars: Option<f64>,
}

pub fn comment_stats(reviews: &[CleanedReviewRecord]) -> CommentStats {
    let words: Vec<f64> = reviews
        .iter()
        .filter_map(|r| r.comment_words())
        .map(|w| w as f64)
        .collect();
    let chars: Vec<f64> = reviews
        .iter()
        .filter_map(|r| r.comment_chars())
        .map(|c| c as f64)
        .collect();

    CommentStats {
        with_comment: words.len(),
        without_comment: reviews.len() - words.len(),
        mean_words: mean(&words),
        median_words: median(&words),
        mean_chars: mean(&chars),
    }
}

/// `(price_eur, comment word count)` pairs of the reviews that have a comment.
pub fn price_comment_pairs(reviews: &[CleanedReviewRecord]) -> (Vec<f64>, Vec<f64>) {
    reviews
        .iter()
        .filter_map(|r| Some((r.price_eur, r.comment_words()? as f64)))
        .unzip()
}
