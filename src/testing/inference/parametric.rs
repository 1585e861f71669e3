//! Parametric tests: Welch's t-test and one-way ANOVA.
//!
//! Both follow the conventions of the common scientific stacks for degenerate input:
//! undefined statistics are reported as `NaN` rather than as an error, and a
//! zero-variance denominator with a non-zero effect yields an infinite statistic
//! with a p-value of zero.

use statrs::distribution::{ContinuousCDF, FisherSnedecor, StudentsT};

use crate::testing::TestResult;

pub(crate) fn mean(x: &[f64]) -> f64 {
    x.iter().sum::<f64>() / x.len() as f64
}

/// Sample variance (n - 1 denominator)
pub(crate) fn sample_variance(x: &[f64]) -> f64 {
    let m = mean(x);
    x.iter().map(|&v| (v - m).powi(2)).sum::<f64>() / (x.len() as f64 - 1.0)
}

/// Perform Welch's t-test comparing two samples.
///
/// The statistic is positive when `x` has the larger mean.
///
/// # Arguments
///
/// * `x` - First sample
/// * `y` - Second sample
///
/// # Returns
///
/// `TestResult` with the t-statistic, two-sided p-value and the
/// Welch–Satterthwaite degrees of freedom.
pub fn welch_t_test(x: &[f64], y: &[f64]) -> TestResult {
    let nx = x.len() as f64;
    let ny = y.len() as f64;

    if x.len() < 2 || y.len() < 2 {
        return TestResult::new(f64::NAN, f64::NAN);
    }

    let term1 = sample_variance(x) / nx;
    let term2 = sample_variance(y) / ny;
    let combined_var = term1 + term2;

    let t_stat = (mean(x) - mean(y)) / combined_var.sqrt();

    // Welch-Satterthwaite equation for degrees of freedom
    let mut df = combined_var * combined_var / (term1 * term1 / (nx - 1.0) + term2 * term2 / (ny - 1.0));
    if df.is_nan() {
        // both variances are zero; any valid df gives the same p-value
        df = 1.0;
    }

    TestResult::new(t_stat, t_test_p_value(t_stat, df)).with_degrees_of_freedom(df)
}

#[inline]
fn t_test_p_value(t_stat: f64, df: f64) -> f64 {
    if t_stat.is_nan() {
        return f64::NAN;
    }
    if t_stat.is_infinite() {
        return 0.0;
    }

    match StudentsT::new(0.0, 1.0, df) {
        Ok(t_dist) => (2.0 * t_dist.sf(t_stat.abs())).min(1.0),
        Err(_) => f64::NAN,
    }
}

/// One-way analysis of variance across `groups`.
///
/// Every group must be non-empty; with no within-group degrees of freedom the
/// result is `NaN`.
pub fn one_way_anova(groups: &[&[f64]]) -> TestResult {
    let k = groups.len();
    let n_total: usize = groups.iter().map(|g| g.len()).sum();

    if k < 2 || groups.iter().any(|g| g.is_empty()) || n_total <= k {
        return TestResult::new(f64::NAN, f64::NAN);
    }

    let grand_mean = groups.iter().flat_map(|g| g.iter()).sum::<f64>() / n_total as f64;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for g in groups {
        let group_mean = mean(g);
        ss_between += g.len() as f64 * (group_mean - grand_mean).powi(2);
        ss_within += g.iter().map(|&x| (x - group_mean).powi(2)).sum::<f64>();
    }

    let df_between = (k - 1) as f64;
    let df_within = (n_total - k) as f64;

    let ms_between = ss_between / df_between;
    let ms_within = ss_within / df_within;

    let f_stat = ms_between / ms_within;

    let p_value = if f_stat.is_nan() {
        f64::NAN
    } else if f_stat.is_infinite() {
        0.0
    } else {
        match FisherSnedecor::new(df_between, df_within) {
            Ok(f_dist) => f_dist.sf(f_stat),
            Err(_) => f64::NAN,
        }
    };

    TestResult::new(f_stat, p_value).with_degrees_of_freedom(df_between)
}
