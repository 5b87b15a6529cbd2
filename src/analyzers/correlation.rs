//! Pearson and Spearman correlation with two-sided p-values.
//!
//! The p-value comes from the Student t distribution with `n - 2` degrees of
//! freedom, evaluated through the regularized incomplete beta function:
//! `p = I(1 - r², (n - 2) / 2, 1 / 2)`.

use crate::error::MetricError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correlation {
    pub coefficient: f64,
    pub p_value: f64,
    pub n: usize,
}

/// Pearson product-moment correlation of paired series.
///
/// # Errors
///
/// [`MetricError::Undefined`] if the series differ in length, hold fewer than
/// three pairs, or either one is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<Correlation, MetricError> {
    if x.len() != y.len() {
        return Err(MetricError::Undefined("series lengths differ"));
    }
    let n = x.len();
    if n < 3 {
        return Err(MetricError::Undefined("fewer than three pairs"));
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return Err(MetricError::Undefined("constant series"));
    }

    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);
    Ok(Correlation {
        coefficient: r,
        p_value: two_sided_p(r, n),
        n,
    })
}

/// Spearman rank correlation; tied values share their average rank.
pub fn spearman(x: &[f64], y: &[f64]) -> Result<Correlation, MetricError> {
    if x.len() != y.len() {
        return Err(MetricError::Undefined("series lengths differ"));
    }
    pearson(&rank(x), &rank(y))
}

/// 1-based ranks, ties averaged.
pub fn rank(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        // positions start..end hold ranks start+1..=end
        let avg = (start + 1 + end) as f64 / 2.0;
        for &i in &order[start..end] {
            ranks[i] = avg;
        }
        start = end;
    }
    ranks
}

fn two_sided_p(r: f64, n: usize) -> f64 {
    let one_minus_r2 = 1.0 - r * r;
    if one_minus_r2 <= 0.0 {
        return 0.0;
    }
    let df = (n - 2) as f64;
    incomplete_beta(df / 2.0, 0.5, one_minus_r2).clamp(0.0, 1.0)
}

/// Regularized incomplete beta function `I_x(a, b)`.
fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();

    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// Lentz evaluation of the continued fraction for the incomplete beta.
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 300;
    const EPS: f64 = 1e-15;
    const TINY: f64 = 1e-300;

    let guard = |v: f64| if v.abs() < TINY { TINY } else { v };

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 / guard(1.0 - qab * x / qap);
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        h *= d * c;

        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 / guard(1.0 + aa * d);
        c = guard(1.0 + aa / c);
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

/// Natural log of the gamma function (Lanczos approximation).
fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 6] = [
        76.180_091_729_471_46,
        -86.505_320_329_416_77,
        24.014_098_240_830_91,
        -1.231_739_572_450_155,
        0.120_865_097_386_617_9e-2,
        -0.539_523_938_495_3e-5,
    ];
    let tmp = x + 5.5;
    let tmp = tmp - (x + 0.5) * tmp.ln();
    let mut y = x;
    let mut series = 1.000_000_000_190_015;
    for c in COEFFS {
        y += 1.0;
        series += c / y;
    }
    -tmp + (2.506_628_274_631_000_5 * series / x).ln()
}
