//! Ordinary least squares fit of rating against price, and the residuals
//! that flag overpriced hotels.

use crate::error::MetricError;
use crate::records::CleanedHotelRecord;
use serde::Serialize;

/// `rating = slope * price + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Number of points the line was fitted on.
    pub n: usize,
}

impl LinearFit {
    pub fn expected(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Actual minus expected; negative means below the line.
    pub fn residual(&self, x: f64, y: f64) -> f64 {
        y - self.expected(x)
    }
}

/// Fits a line through `(x, y)` points by least squares.
///
/// # Errors
///
/// [`MetricError::Undefined`] for fewer than two points or when every `x`
/// is the same.
pub fn fit_ols(points: &[(f64, f64)]) -> Result<LinearFit, MetricError> {
    if points.len() < 2 {
        return Err(MetricError::Undefined("fewer than two points"));
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (sxy, sxx) = points.iter().fold((0.0, 0.0), |(sxy, sxx), (x, y)| {
        let dx = x - mean_x;
        (sxy + dx * (y - mean_y), sxx + dx * dx)
    });
    if sxx == 0.0 {
        return Err(MetricError::Undefined("x has no variance"));
    }

    let slope = sxy / sxx;
    Ok(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
        n: points.len(),
    })
}

/// Fits rating on price over the hotels priced strictly below `price_cutoff`.
pub fn price_rating_fit(
    records: &[CleanedHotelRecord],
    price_cutoff: f64,
) -> Result<LinearFit, MetricError> {
    let points: Vec<(f64, f64)> = records
        .iter()
        .filter(|r| r.price_eur < price_cutoff)
        .map(|r| (r.price_eur, r.rating))
        .collect();
    fit_ols(&points)
}

/// How far one hotel's rating sits from the price/rating line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingResidual {
    pub hotel_name: String,
    pub location: Option<String>,
    pub price_eur: f64,
    pub rating: f64,
    pub expected_rating: f64,
    pub residual: f64,
    pub num_reviews: Option<u64>,
}

/// Residuals of the hotels priced below `price_cutoff`, the set the line was fitted on.
pub fn rating_residuals(
    records: &[CleanedHotelRecord],
    fit: &LinearFit,
    price_cutoff: f64,
) -> Vec<RatingResidual> {
    records
        .iter()
        .filter(|r| r.price_eur < price_cutoff)
        .map(|r| RatingResidual {
            hotel_name: r.hotel_name.clone(),
            location: r.location.clone(),
            price_eur: r.price_eur,
            rating: r.rating,
            expected_rating: fit.expected(r.price_eur),
            residual: fit.residual(r.price_eur, r.rating),
            num_reviews: r.num_reviews,
        })
        .collect()
}

fn ranked(
    residuals: &[RatingResidual],
    min_reviews: u64,
    n: usize,
    ascending: bool,
) -> Vec<RatingResidual> {
    let mut kept: Vec<_> = residuals
        .iter()
        .filter(|r| r.num_reviews.is_some_and(|c| c >= min_reviews))
        .cloned()
        .collect();
    kept.sort_by(|a, b| {
        if ascending {
            a.residual.total_cmp(&b.residual)
        } else {
            b.residual.total_cmp(&a.residual)
        }
    });
    kept.truncate(n);
    kept
}

/// The `n` most negative residuals among hotels with at least `min_reviews` reviews.
pub fn most_overpriced(
    residuals: &[RatingResidual],
    min_reviews: u64,
    n: usize,
) -> Vec<RatingResidual> {
    ranked(residuals, min_reviews, n, true)
}

/// The `n` most positive residuals among hotels with at least `min_reviews` reviews.
pub fn best_surprises(
    residuals: &[RatingResidual],
    min_reviews: u64,
    n: usize,
) -> Vec<RatingResidual> {
    ranked(residuals, min_reviews, n, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{BOOKING_SOURCE, RoomCategory};

    fn hotel(name: &str, price_eur: f64, rating: f64, num_reviews: u64) -> CleanedHotelRecord {
        CleanedHotelRecord {
            hotel_name: name.to_string(),
            location: None,
            rating,
            review_score: None,
            num_reviews: Some(num_reviews),
            room_score: None,
            room_type: None,
            bed_type: None,
            price_bdt: price_eur * 120.0,
            price_eur,
            source: BOOKING_SOURCE.to_string(),
            room_category: RoomCategory::Other,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_line_through_collinear_points() {
        let fit = fit_ols(&[(100.0, 8.0), (200.0, 8.2), (300.0, 8.4)]).unwrap();

        assert!(close(fit.slope, 0.002));
        assert!(close(fit.intercept, 7.8));
        assert!(close(fit.expected(250.0), 8.3));
        assert!(fit.residual(150.0, 7.0) < 0.0);
        assert!(close(fit.residual(150.0, 7.0), -1.1));
    }

    #[test]
    fn test_fit_needs_two_distinct_x() {
        assert!(fit_ols(&[(1.0, 2.0)]).is_err());
        assert!(fit_ols(&[(5.0, 2.0), (5.0, 3.0)]).is_err());
    }

    #[test]
    fn test_price_rating_fit_ignores_prices_at_cutoff() {
        let records = vec![
            hotel("a", 100.0, 8.0, 60),
            hotel("b", 200.0, 8.2, 60),
            hotel("c", 300.0, 8.4, 60),
            hotel("lux", 5000.0, 1.0, 60),
        ];

        let fit = price_rating_fit(&records, 5000.0).unwrap();

        assert_eq!(fit.n, 3);
        assert!(close(fit.slope, 0.002));
        assert_eq!(rating_residuals(&records, &fit, 5000.0).len(), 3);
    }

    #[test]
    fn test_overpriced_and_surprises_respect_review_floor() {
        let mut records = vec![
            hotel("a", 100.0, 8.0, 60),
            hotel("b", 200.0, 8.2, 60),
            hotel("c", 300.0, 8.4, 60),
        ];
        let fit = price_rating_fit(&records, 5000.0).unwrap();
        records.push(hotel("Letdown", 150.0, 7.0, 120));
        records.push(hotel("Gem", 150.0, 9.5, 80));
        records.push(hotel("Obscure", 150.0, 3.0, 49));

        let residuals = rating_residuals(&records, &fit, 5000.0);
        let overpriced = most_overpriced(&residuals, 50, 1);
        let surprises = best_surprises(&residuals, 50, 1);

        assert_eq!(overpriced[0].hotel_name, "Letdown");
        assert!(overpriced[0].residual < 0.0);
        assert_eq!(surprises[0].hotel_name, "Gem");
        assert!(surprises[0].residual > 0.0);
    }
}
