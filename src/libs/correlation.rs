//! Pairwise correlation between aligned trait vectors.
//!
//! The distance builder only depends on the [`Correlation`] trait; [`Pearson`]
//! is the implementation used by the command line tools.

use std::f64::consts::PI;

/// Result of one correlation: coefficient, number of shared samples, p-value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationResult {
    pub coefficient: f64,
    pub sample_count: usize,
    pub p_value: f64,
}

/// Correlation between two equally long vectors.
///
/// Positions where either side is `None` are dropped pairwise.
/// Implementations are expected to be symmetric in their arguments.
pub trait Correlation {
    fn correlate(&self, a: &[Option<f64>], b: &[Option<f64>]) -> CorrelationResult;
}

impl<F> Correlation for F
where
    F: Fn(&[Option<f64>], &[Option<f64>]) -> CorrelationResult,
{
    fn correlate(&self, a: &[Option<f64>], b: &[Option<f64>]) -> CorrelationResult {
        self(a, b)
    }
}

/// Pearson product-moment correlation with a two-tailed t-test p-value
#[derive(Debug, Clone, Copy, Default)]
pub struct Pearson;

impl Correlation for Pearson {
    fn correlate(&self, a: &[Option<f64>], b: &[Option<f64>]) -> CorrelationResult {
        let (xs, ys): (Vec<f64>, Vec<f64>) = a
            .iter()
            .zip(b.iter())
            .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
            .unzip();
        let n = xs.len();

        let undefined = CorrelationResult {
            coefficient: 0.0,
            sample_count: n,
            p_value: 1.0,
        };
        if n < 3 {
            return undefined;
        }

        let nf = n as f64;
        let mean_x = xs.iter().sum::<f64>() / nf;
        let mean_y = ys.iter().sum::<f64>() / nf;

        let mut cov = 0.0;
        let mut var_x = 0.0;
        let mut var_y = 0.0;
        for (x, y) in xs.iter().zip(ys.iter()) {
            let dx = x - mean_x;
            let dy = y - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        let denom = (var_x * var_y).sqrt();
        if denom == 0.0 {
            return undefined;
        }
        let r = cov / denom;

        let df = nf - 2.0;
        let p_value = if r.abs() >= 1.0 {
            0.0
        } else {
            let t = r * (df / (1.0 - r * r)).sqrt();
            t_two_tailed_p(t, df)
        };

        CorrelationResult {
            coefficient: r,
            sample_count: n,
            p_value,
        }
    }
}

fn t_two_tailed_p(t: f64, df: f64) -> f64 {
    let x = df / (df + t * t);
    betai(df / 2.0, 0.5, x).clamp(0.0, 1.0)
}

// Lanczos approximation, g = 7
fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 8] = [
        676.5203681218851,
        -1259.1392167224028,
        771.32342877765313,
        -176.61502916214059,
        12.507343278686905,
        -0.13857109526572012,
        9.9843695780195716e-6,
        1.5056327351493116e-7,
    ];

    if x < 0.5 {
        (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x)
    } else {
        let x = x - 1.0;
        let mut ag = 0.99999999999980993_f64;
        for (i, &c) in COEFFS.iter().enumerate() {
            ag += c / (x + i as f64 + 1.0);
        }
        let t = x + 7.5;
        0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + ag.ln()
    }
}

/// Regularized incomplete beta function I_x(a, b), modified Lentz continued fraction.
fn betai(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    if x > (a + 1.0) / (a + b + 2.0) {
        return 1.0 - betai(b, a, 1.0 - x);
    }

    let prefactor =
        (ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln()).exp();

    let tiny = 1e-30_f64;
    let eps = 1e-12_f64;

    let mut c = 1.0_f64;
    let mut d = 1.0 - (a + b) * x / (a + 1.0);
    if d.abs() < tiny {
        d = tiny;
    }
    d = d.recip();
    let mut h = d;

    for m in 1..=200 {
        let m = m as f64;

        let num = m * (b - m) * x / ((a + 2.0 * m - 1.0) * (a + 2.0 * m));
        d = 1.0 + num * d;
        if d.abs() < tiny {
            d = tiny;
        }
        d = d.recip();
        c = 1.0 + num / c;
        if c.abs() < tiny {
            c = tiny;
        }
        h *= d * c;

        let num = -((a + m) * (a + b + m) * x) / ((a + 2.0 * m) * (a + 2.0 * m + 1.0));
        d = 1.0 + num * d;
        if d.abs() < tiny {
            d = tiny;
        }
        d = d.recip();
        c = 1.0 + num / c;
        if c.abs() < tiny {
            c = tiny;
        }
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < eps {
            break;
        }
    }

    prefactor * h / a
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().map(|v| Some(*v)).collect()
    }

    #[test]
    fn test_pearson_perfect() {
        let a = some(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = some(&[2.0, 4.0, 6.0, 8.0, 10.0]);
        let res = Pearson.correlate(&a, &b);
        assert_abs_diff_eq!(res.coefficient, 1.0, epsilon = 1e-12);
        assert_eq!(res.sample_count, 5);
        assert_abs_diff_eq!(res.p_value, 0.0, epsilon = 1e-12);

        let c = some(&[5.0, 4.0, 3.0, 2.0, 1.0]);
        let res = Pearson.correlate(&a, &c);
        assert_abs_diff_eq!(res.coefficient, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_pairwise_missing() {
        let a = vec![Some(1.0), None, Some(3.0), Some(4.0), Some(5.0)];
        let b = vec![Some(1.0), Some(100.0), Some(3.0), None, Some(5.0)];
        let res = Pearson.correlate(&a, &b);
        assert_eq!(res.sample_count, 3);
        assert_abs_diff_eq!(res.coefficient, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_pearson_known_value() {
        // r = 0.8, n = 5 => t = 2.3094, df = 3, p = 0.1041
        let a = some(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        let b = some(&[2.0, 1.0, 4.0, 3.0, 5.0]);
        let res = Pearson.correlate(&a, &b);
        assert_abs_diff_eq!(res.coefficient, 0.8, epsilon = 1e-12);
        assert_abs_diff_eq!(res.p_value, 0.1041, epsilon = 1e-3);
    }

    #[test]
    fn test_pearson_degenerate() {
        let a = some(&[1.0, 2.0]);
        let b = some(&[2.0, 1.0]);
        let res = Pearson.correlate(&a, &b);
        assert_eq!(res.coefficient, 0.0);
        assert_eq!(res.p_value, 1.0);

        let a = some(&[3.0, 3.0, 3.0, 3.0]);
        let b = some(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(Pearson.correlate(&a, &b).coefficient, 0.0);
    }

    #[test]
    fn test_pearson_symmetric() {
        let a = vec![Some(1.3), None, Some(2.2), Some(0.4), Some(5.1), Some(2.0)];
        let b = vec![Some(0.3), Some(1.0), Some(2.9), Some(1.4), None, Some(0.7)];
        let ab = Pearson.correlate(&a, &b);
        let ba = Pearson.correlate(&b, &a);
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_closure_as_correlation() {
        let constant = |_: &[Option<f64>], _: &[Option<f64>]| CorrelationResult {
            coefficient: 0.25,
            sample_count: 0,
            p_value: 1.0,
        };
        assert_eq!(constant.correlate(&[], &[]).coefficient, 0.25);
    }
}
