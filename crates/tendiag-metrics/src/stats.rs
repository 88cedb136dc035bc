//! Welch's two-sample t-test and the per-component class-separation scan.
//!
//! The p-value comes from the Student t survival function, evaluated
//! through the regularized incomplete beta function. The special
//! functions are implemented here directly (Lanczos log-gamma and a
//! Lentz-style continued fraction); no external stats crate is involved.

use scirs2_core::ndarray_ext::Array2;
use std::collections::BTreeSet;

use crate::error::MetricError;

/// Result of Welch's unequal-variance t-test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WelchTTest {
    pub statistic: f64,
    /// Welch-Satterthwaite degrees of freedom.
    pub df: f64,
    /// Two-sided p-value.
    pub p_value: f64,
}

/// Best (minimum) class-separation p-value across components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestPValue {
    pub p_value: f64,
    /// Component whose loading column separates the classes best.
    pub component: usize,
}

/// Welch's t-test for two independent samples with unequal variances.
///
/// # Errors
///
/// `InvalidInput` when either sample has fewer than two observations.
pub fn welch_ttest(a: &[f64], b: &[f64]) -> Result<WelchTTest, MetricError> {
    if a.len() < 2 || b.len() < 2 {
        return Err(MetricError::InvalidInput(format!(
            "t-test needs at least two observations per sample, got {} and {}",
            a.len(),
            b.len()
        )));
    }

    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (ma, mb) = (mean(a), mean(b));
    let (va, vb) = (sample_variance(a, ma), sample_variance(b, mb));

    let se_sq = va / na + vb / nb;
    if se_sq <= 0.0 {
        // Both samples are constant: identical means are a perfect
        // non-separation, differing means a perfect separation.
        let (statistic, p_value) = if (ma - mb).abs() == 0.0 {
            (0.0, 1.0)
        } else {
            ((ma - mb).signum() * f64::INFINITY, 0.0)
        };
        return Ok(WelchTTest {
            statistic,
            df: na + nb - 2.0,
            p_value,
        });
    }

    let statistic = (ma - mb) / se_sq.sqrt();

    // Welch-Satterthwaite approximation
    let df_denom = (va / na).powi(2) / (na - 1.0) + (vb / nb).powi(2) / (nb - 1.0);
    let df = if df_denom > 0.0 {
        se_sq * se_sq / df_denom
    } else {
        na + nb - 2.0
    };

    let p_value = student_t_two_sided(statistic, df);

    Ok(WelchTTest {
        statistic,
        df,
        p_value,
    })
}

/// Scan the columns of a factor matrix for the component that best
/// separates a two-class labeling, Welch-tested per column.
///
/// # Errors
///
/// `ShapeMismatch` when labels and factor rows disagree; `InvalidInput`
/// unless the labeling has exactly two distinct classes with at least
/// two members each.
pub fn best_p_value(factor: &Array2<f64>, classes: &[i64]) -> Result<BestPValue, MetricError> {
    if classes.len() != factor.nrows() {
        return Err(MetricError::ShapeMismatch(format!(
            "{} class labels for a factor matrix with {} rows",
            classes.len(),
            factor.nrows()
        )));
    }

    let distinct: BTreeSet<i64> = classes.iter().copied().collect();
    if distinct.len() != 2 {
        return Err(MetricError::InvalidInput(format!(
            "class-separation test needs exactly two classes, got {}",
            distinct.len()
        )));
    }
    let Some(first_class) = distinct.into_iter().next() else {
        return Err(MetricError::InvalidInput("no class labels".into()));
    };

    let group_a: Vec<usize> = (0..classes.len())
        .filter(|&i| classes[i] == first_class)
        .collect();
    let group_b: Vec<usize> = (0..classes.len())
        .filter(|&i| classes[i] != first_class)
        .collect();

    let mut best: Option<BestPValue> = None;
    for r in 0..factor.ncols() {
        let a: Vec<f64> = group_a.iter().map(|&i| factor[[i, r]]).collect();
        let b: Vec<f64> = group_b.iter().map(|&i| factor[[i, r]]).collect();

        let test = welch_ttest(&a, &b)?;
        let better = match &best {
            Some(current) => test.p_value < current.p_value,
            None => true,
        };
        if better {
            best = Some(BestPValue {
                p_value: test.p_value,
                component: r,
            });
        }
    }

    // ncols >= 1 is guaranteed by the decomposition invariant
    best.ok_or_else(|| MetricError::InvalidInput("factor matrix has no columns".into()))
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

fn sample_variance(xs: &[f64], mean: f64) -> f64 {
    let sum_sq: f64 = xs.iter().map(|x| (x - mean) * (x - mean)).sum();
    sum_sq / (xs.len() as f64 - 1.0)
}

/// Two-sided p-value of a Student t statistic: I_x(df/2, 1/2) with
/// x = df / (df + t²).
fn student_t_two_sided(t: f64, df: f64) -> f64 {
    if !t.is_finite() {
        return 0.0;
    }
    let x = df / (df + t * t);
    regularized_incomplete_beta(0.5 * df, 0.5, x).clamp(0.0, 1.0)
}

/// Lanczos approximation of ln Γ(x), g = 7, n = 9.
fn ln_gamma(x: f64) -> f64 {
    const COEFFS: [f64; 8] = [
        676.5203681218851,
        -1259.1392167224028,
        771.323_428_777_653_1,
        -176.615_029_162_140_6,
        12.507343278686905,
        -0.13857109526572012,
        9.984_369_578_019_572e-6,
        1.5056327351493116e-7,
    ];

    if x < 0.5 {
        // Reflection formula
        return std::f64::consts::PI.ln() - (std::f64::consts::PI * x).sin().ln()
            - ln_gamma(1.0 - x);
    }

    let x = x - 1.0;
    let mut acc = 0.99999999999980993;
    for (i, &c) in COEFFS.iter().enumerate() {
        acc += c / (x + (i + 1) as f64);
    }
    let t = x + 7.5;

    0.5 * (2.0 * std::f64::consts::PI).ln() + (x + 0.5) * t.ln() - t + acc.ln()
}

/// Regularized incomplete beta function I_x(a, b) via the symmetric
/// continued fraction expansion.
fn regularized_incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }

    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();

    // The continued fraction converges fastest for x < (a+1)/(a+b+2);
    // use the symmetry I_x(a,b) = 1 - I_{1-x}(b,a) otherwise.
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - regularized_incomplete_beta(b, a, 1.0 - x)
    }
}

/// Modified Lentz evaluation of the incomplete beta continued fraction.
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 200;
    const EPS: f64 = 1e-14;
    const TINY: f64 = 1e-300;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;

    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < TINY {
        d = TINY;
    }
    d = 1.0 / d;
    let mut h = d;

    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;

        // Even step
        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        h *= d * c;

        // Odd step
        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let delta = d * c;
        h *= delta;

        if (delta - 1.0).abs() < EPS {
            break;
        }
    }

    h
}

#[cfg(test)]
mod tests {
    use super::*;
    use scirs2_core::ndarray_ext::array;

    #[test]
    fn test_ln_gamma_known_values() {
        // Γ(5) = 24, Γ(0.5) = sqrt(pi)
        assert!((ln_gamma(5.0) - 24.0_f64.ln()).abs() < 1e-10);
        assert!((ln_gamma(0.5) - std::f64::consts::PI.sqrt().ln()).abs() < 1e-10);
        assert!((ln_gamma(1.0)).abs() < 1e-10);
    }

    #[test]
    fn test_incomplete_beta_boundaries() {
        assert_eq!(regularized_incomplete_beta(2.0, 3.0, 0.0), 0.0);
        assert_eq!(regularized_incomplete_beta(2.0, 3.0, 1.0), 1.0);
        // I_x(1, 1) = x
        assert!((regularized_incomplete_beta(1.0, 1.0, 0.3) - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_student_t_tail_known_values() {
        // Two-sided p for t = 2.0, df = 10 is approximately 0.0734
        let p = student_t_two_sided(2.0, 10.0);
        assert!((p - 0.0734).abs() < 1e-3, "got {}", p);

        // t = 0 is no evidence at all
        assert!((student_t_two_sided(0.0, 10.0) - 1.0).abs() < 1e-12);

        // Symmetric in t
        let p_neg = student_t_two_sided(-2.0, 10.0);
        assert!((p - p_neg).abs() < 1e-12);
    }

    #[test]
    fn test_welch_identical_samples() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let test = welch_ttest(&a, &a).unwrap();
        assert!(test.statistic.abs() < 1e-12);
        assert!((test.p_value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_welch_separated_samples() {
        let a = [10.0, 10.1, 9.9, 10.2, 9.8];
        let b = [0.0, 0.1, -0.1, 0.2, -0.2];
        let test = welch_ttest(&a, &b).unwrap();
        assert!(test.statistic > 10.0);
        assert!(test.p_value < 1e-6);
    }

    #[test]
    fn test_welch_constant_samples() {
        let a = [1.0, 1.0, 1.0];
        let b = [2.0, 2.0, 2.0];
        let test = welch_ttest(&a, &b).unwrap();
        assert_eq!(test.p_value, 0.0);

        let same = welch_ttest(&a, &a).unwrap();
        assert_eq!(same.p_value, 1.0);
    }

    #[test]
    fn test_welch_sample_too_small() {
        let err = welch_ttest(&[1.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, MetricError::InvalidInput(_)));
    }

    #[test]
    fn test_best_p_value_picks_separating_component() {
        // Component 1 separates the classes cleanly, component 0 does not.
        let factor = array![
            [0.5, 10.0],
            [0.4, 10.2],
            [0.6, 9.9],
            [0.5, 0.1],
            [0.4, -0.1],
            [0.6, 0.0]
        ];
        let classes = [0, 0, 0, 1, 1, 1];

        let best = best_p_value(&factor, &classes).unwrap();
        assert_eq!(best.component, 1);
        assert!(best.p_value < 1e-4);
    }

    #[test]
    fn test_best_p_value_class_count_enforced() {
        let factor = Array2::<f64>::ones((4, 2));
        let err = best_p_value(&factor, &[0, 1, 2, 2]).unwrap_err();
        assert!(matches!(err, MetricError::InvalidInput(_)));
    }

    #[test]
    fn test_best_p_value_label_length_enforced() {
        let factor = Array2::<f64>::ones((4, 2));
        let err = best_p_value(&factor, &[0, 1]).unwrap_err();
        assert!(matches!(err, MetricError::ShapeMismatch(_)));
    }
}
