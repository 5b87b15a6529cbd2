/// Fixed labelled bins over a numeric field.
///
/// Bin `i` covers `[edges[i], edges[i + 1])`; the last bin has no upper bound.
/// Values below the first edge fall in no bin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracketing {
    pub edges: &'static [f64],
    pub labels: &'static [&'static str],
}

/// Booking.com price per night in EUR.
pub const PRICE_BRACKETS: Bracketing = Bracketing {
    edges: &[0.0, 50.0, 100.0, 200.0, 500.0, 1000.0],
    labels: &["<50", "50-100", "100-200", "200-500", "500-1000", "1000+"],
};

/// Coarser price bins for the headline price/rating chart.
pub const SUMMARY_PRICE_BRACKETS: Bracketing = Bracketing {
    edges: &[0.0, 500.0, 1000.0, 2000.0, 5000.0],
    labels: &["<500", "500-1k", "1k-2k", "2k-5k", "5k+"],
};

pub const REVIEW_COUNT_BRACKETS: Bracketing = Bracketing {
    edges: &[0.0, 50.0, 200.0, 500.0, 1000.0, 5000.0],
    labels: &["<50", "50-200", "200-500", "500-1k", "1k-5k", "5k+"],
};

/// TripAdvisor price bins used for comment length.
pub const COMMENT_PRICE_BRACKETS: Bracketing = Bracketing {
    edges: &[0.0, 30.0, 60.0, 100.0, 200.0],
    labels: &["<30", "30-60", "60-100", "100-200", "200+"],
};

impl Bracketing {
    /// Index of the bin holding `value`.
    pub fn index_of(&self, value: f64) -> Option<usize> {
        if !value.is_finite() {
            return None;
        }
        self.edges.iter().rposition(|&edge| value >= edge)
    }

    pub fn label_of(&self, value: f64) -> Option<&'static str> {
        self.index_of(value).map(|i| self.labels[i])
    }

    /// Position of `label` in bin order, used to sort grouped results.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| *l == label)
    }
}
