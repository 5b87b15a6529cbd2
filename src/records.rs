//! Typed rows of the cleaned datasets.
//!
//! Field order is the CSV column order of the persisted files.

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

pub const BOOKING_SOURCE: &str = "Booking.com";
pub const TRIPADVISOR_SOURCE: &str = "TripAdvisor";

/// A Booking.com listing that passed cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedHotelRecord {
    pub hotel_name: String,
    pub location: Option<String>,
    pub rating: f64,
    pub review_score: Option<ReviewLabel>,
    pub num_reviews: Option<u64>,
    pub room_score: Option<f64>,
    pub room_type: Option<String>,
    pub bed_type: Option<String>,
    pub price_bdt: f64,
    #[serde(serialize_with = "two_decimals")]
    pub price_eur: f64,
    pub source: String,
    pub room_category: RoomCategory,
}

/// A TripAdvisor listing that passed cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanedReviewRecord {
    pub hotel_name: String,
    pub price_bdt: f64,
    #[serde(serialize_with = "two_decimals")]
    pub price_eur: f64,
    pub num_reviews: Option<u64>,
    pub comment: Option<String>,
    pub source: String,
}

impl CleanedReviewRecord {
    /// Whitespace-separated words in the comment; `None` for a null or blank comment.
    pub fn comment_words(&self) -> Option<usize> {
        self.comment
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(|c| c.split_whitespace().count())
    }

    pub fn comment_chars(&self) -> Option<usize> {
        self.comment
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(|c| c.chars().count())
    }
}

fn two_decimals<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:.2}"))
}

/// Booking.com review label attached to the numeric rating.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ReviewLabel {
    Exceptional,
    Wonderful,
    Superb,
    Fabulous,
    VeryGood,
    Good,
    Pleasant,
    /// Booking's placeholder label shown next to an unlabelled score.
    ReviewScore,
    Unrecognized(String),
}

impl ReviewLabel {
    /// The recognized labels, best first.
    pub const KNOWN: [ReviewLabel; 8] = [
        ReviewLabel::Exceptional,
        ReviewLabel::Wonderful,
        ReviewLabel::Superb,
        ReviewLabel::Fabulous,
        ReviewLabel::VeryGood,
        ReviewLabel::Good,
        ReviewLabel::Pleasant,
        ReviewLabel::ReviewScore,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ReviewLabel::Exceptional => "Exceptional",
            ReviewLabel::Wonderful => "Wonderful",
            ReviewLabel::Superb => "Superb",
            ReviewLabel::Fabulous => "Fabulous",
            ReviewLabel::VeryGood => "Very Good",
            ReviewLabel::Good => "Good",
            ReviewLabel::Pleasant => "Pleasant",
            ReviewLabel::ReviewScore => "Review score",
            ReviewLabel::Unrecognized(text) => text,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, ReviewLabel::Unrecognized(_))
    }
}

impl From<String> for ReviewLabel {
    fn from(text: String) -> Self {
        ReviewLabel::KNOWN
            .into_iter()
            .find(|label| label.as_str() == text)
            .unwrap_or(ReviewLabel::Unrecognized(text))
    }
}

impl From<ReviewLabel> for String {
    fn from(label: ReviewLabel) -> Self {
        label.as_str().to_string()
    }
}

impl fmt::Display for ReviewLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Simplified room type used for grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoomCategory {
    Suite,
    Villa,
    Deluxe,
    Superior,
    Standard,
    Double,
    Twin,
    Single,
    Family,
    Studio,
    Other,
}

/// Keyword checked against the lower-cased room type, in priority order.
/// The first keyword found decides the category.
pub const ROOM_CATEGORY_PRIORITY: [(&str, RoomCategory); 10] = [
    ("suite", RoomCategory::Suite),
    ("villa", RoomCategory::Villa),
    ("deluxe", RoomCategory::Deluxe),
    ("superior", RoomCategory::Superior),
    ("standard", RoomCategory::Standard),
    ("double", RoomCategory::Double),
    ("twin", RoomCategory::Twin),
    ("single", RoomCategory::Single),
    ("family", RoomCategory::Family),
    ("studio", RoomCategory::Studio),
];

impl RoomCategory {
    pub fn classify(room_type: Option<&str>) -> Self {
        let Some(room_type) = room_type else {
            return RoomCategory::Other;
        };
        let lowered = room_type.to_lowercase();
        ROOM_CATEGORY_PRIORITY
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword))
            .map(|(_, category)| *category)
            .unwrap_or(RoomCategory::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomCategory::Suite => "Suite",
            RoomCategory::Villa => "Villa",
            RoomCategory::Deluxe => "Deluxe",
            RoomCategory::Superior => "Superior",
            RoomCategory::Standard => "Standard",
            RoomCategory::Double => "Double",
            RoomCategory::Twin => "Twin",
            RoomCategory::Single => "Single",
            RoomCategory::Family => "Family",
            RoomCategory::Studio => "Studio",
            RoomCategory::Other => "Other",
        }
    }
}
