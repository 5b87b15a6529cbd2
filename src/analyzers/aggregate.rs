use crate::analyzers::bracket::Bracketing;
use crate::analyzers::utility::{max, mean, median, min, stddev};
use crate::records::{CleanedHotelRecord, CleanedReviewRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Categorical dimension records are grouped by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroupKey {
    Location,
    ReviewScore,
    RoomCategory,
    BedType,
    PriceBracket(Bracketing),
    NumReviewsBracket(Bracketing),
}

/// Numeric field a statistic is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Rating,
    PriceEur,
    RoomScore,
    NumReviews,
    CommentWords,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Rating => "rating",
            Field::PriceEur => "price_eur",
            Field::RoomScore => "room_score",
            Field::NumReviews => "num_reviews",
            Field::CommentWords => "comment_words",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    Mean,
    Median,
    Std,
    Min,
    Max,
}

impl Statistic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Mean => "mean",
            Statistic::Median => "median",
            Statistic::Std => "std",
            Statistic::Min => "min",
            Statistic::Max => "max",
        }
    }

    fn compute(&self, values: &[f64]) -> Option<f64> {
        match self {
            Statistic::Mean => mean(values),
            Statistic::Median => median(values),
            Statistic::Std => stddev(values),
            Statistic::Min => min(values),
            Statistic::Max => max(values),
        }
    }
}

/// One statistic over one field, e.g. the median of `price_eur`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Measure {
    pub statistic: Statistic,
    pub field: Field,
}

impl Measure {
    pub const fn new(statistic: Statistic, field: Field) -> Self {
        Self { statistic, field }
    }

    /// Column name of the measure, e.g. `median_price_eur`.
    pub fn name(&self) -> String {
        format!("{}_{}", self.statistic.as_str(), self.field.as_str())
    }
}

/// A record the aggregation engine can group and measure.
pub trait Groupable {
    /// Group the record belongs to under `key`, or `None` if it has no value for it.
    fn group_value(&self, key: &GroupKey) -> Option<String>;

    fn field_value(&self, field: Field) -> Option<f64>;
}

/// Summary statistics of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub group: String,
    pub count: usize,
    /// Measure name to value; `None` when the group has no values for the field.
    pub stats: BTreeMap<String, Option<f64>>,
}

impl GroupSummary {
    pub fn get(&self, statistic: Statistic, field: Field) -> Option<f64> {
        self.stats
            .get(&Measure::new(statistic, field).name())
            .copied()
            .flatten()
    }
}

/// Groups `records` by `key` and computes `measures` for every group holding
/// at least `min_group_size` records.
///
/// Records without a value for `key` are left out. Missing field values are
/// skipped by each statistic. The order of the returned groups is not part of
/// the contract; callers sort.
pub fn aggregate<R: Groupable>(
    records: &[R],
    key: &GroupKey,
    measures: &[Measure],
    min_group_size: usize,
) -> Vec<GroupSummary> {
    let mut groups: BTreeMap<String, Vec<&R>> = BTreeMap::new();
    for record in records {
        if let Some(group) = record.group_value(key) {
            groups.entry(group).or_default().push(record);
        }
    }

    groups
        .into_iter()
        .filter(|(_, members)| members.len() >= min_group_size)
        .map(|(group, members)| {
            let stats = measures
                .iter()
                .map(|measure| {
                    let values: Vec<f64> = members
                        .iter()
                        .filter_map(|r| r.field_value(measure.field))
                        .collect();
                    (measure.name(), measure.statistic.compute(&values))
                })
                .collect();

            GroupSummary {
                group,
                count: members.len(),
                stats,
            }
        })
        .collect()
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.filter(|t| !t.is_empty()).map(str::to_string)
}

impl Groupable for CleanedHotelRecord {
    fn group_value(&self, key: &GroupKey) -> Option<String> {
        match key {
            GroupKey::Location => non_blank(self.location.as_deref()),
            GroupKey::ReviewScore => non_blank(self.review_score.as_ref().map(|l| l.as_str())),
            GroupKey::RoomCategory => Some(self.room_category.as_str().to_string()),
            GroupKey::BedType => non_blank(self.bed_type.as_deref()),
            GroupKey::PriceBracket(b) => b.label_of(self.price_eur).map(str::to_string),
            GroupKey::NumReviewsBracket(b) => self
                .num_reviews
                .and_then(|n| b.label_of(n as f64))
                .map(str::to_string),
        }
    }

    fn field_value(&self, field: Field) -> Option<f64> {
        match field {
            Field::Rating => Some(self.rating),
            Field::PriceEur => Some(self.price_eur),
            Field::RoomScore => self.room_score,
            Field::NumReviews => self.num_reviews.map(|n| n as f64),
            Field::CommentWords => None,
        }
    }
}

impl Groupable for CleanedReviewRecord {
    fn group_value(&self, key: &GroupKey) -> Option<String> {
        match key {
            GroupKey::PriceBracket(b) => b.label_of(self.price_eur).map(str::to_string),
            GroupKey::NumReviewsBracket(b) => self
                .num_reviews
                .and_then(|n| b.label_of(n as f64))
                .map(str::to_string),
            GroupKey::Location
            | GroupKey::ReviewScore
            | GroupKey::RoomCategory
            | GroupKey::BedType => None,
        }
    }

    fn field_value(&self, field: Field) -> Option<f64> {
        match field {
            Field::PriceEur => Some(self.price_eur),
            Field::NumReviews => self.num_reviews.map(|n| n as f64),
            Field::CommentWords => self.comment_words().map(|w| w as f64),
            Field::Rating | Field::RoomScore => None,
        }
    }
}
