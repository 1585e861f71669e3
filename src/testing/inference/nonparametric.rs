use std::cmp::Ordering;

use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

use crate::testing::TestResult;

/// Ranks (1-based) of the pooled samples, ties averaged.
///
/// Returns the ranks in the order the samples were passed in, together with the
/// tie group sizes.
pub(crate) fn pooled_ranks(samples: &[&[f64]]) -> (Vec<f64>, Vec<usize>) {
    let total: usize = samples.iter().map(|s| s.len()).sum();
    let mut combined: Vec<(f64, usize)> = Vec::with_capacity(total);
    for &v in samples.iter().flat_map(|s| s.iter()) {
        let idx = combined.len();
        combined.push((v, idx));
    }

    // Sort by value
    combined.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));

    let mut ranks = vec![0.0; total];
    let mut ties = Vec::new();
    let mut i = 0;
    while i < combined.len() {
        let val = combined[i].0;
        let mut j = i + 1;

        // Find tied values
        while j < combined.len() && combined[j].0 == val {
            j += 1;
        }

        // Assign average rank to ties
        let rank = (i + j - 1) as f64 / 2.0 + 1.0;
        for entry in &combined[i..j] {
            ranks[entry.1] = rank;
        }
        ties.push(j - i);

        i = j;
    }

    (ranks, ties)
}

/// Wilcoxon rank-sum test for two independent samples.
///
/// Uses the large-sample normal approximation of the rank sum of `x`, without
/// continuity or tie correction. The statistic is the z-score; it is positive
/// when `x` tends to be larger than `y`.
pub fn rank_sum(x: &[f64], y: &[f64]) -> TestResult {
    let nx = x.len();
    let ny = y.len();

    if nx == 0 || ny == 0 {
        return TestResult::new(f64::NAN, f64::NAN); // Insufficient data
    }

    let (ranks, _) = pooled_ranks(&[x, y]);
    let rank_sum_x: f64 = ranks[..nx].iter().sum();

    let n1 = nx as f64;
    let n2 = ny as f64;
    let expected = n1 * (n1 + n2 + 1.0) / 2.0;
    let sd = (n1 * n2 * (n1 + n2 + 1.0) / 12.0).sqrt();
    let z = (rank_sum_x - expected) / sd;

    let p_value = match Normal::new(0.0, 1.0) {
        Ok(normal) => 2.0 * normal.sf(z.abs()),
        Err(_) => f64::NAN,
    };

    TestResult::new(z, p_value)
}

/// Kruskal-Wallis H-test for k independent samples.
///
/// H is corrected for ties and compared against a chi-squared distribution with
/// k - 1 degrees of freedom. If every value is tied the statistic is undefined
/// and `NaN` is returned.
pub fn kruskal_wallis(groups: &[&[f64]]) -> TestResult {
    let k = groups.len();
    if k < 2 || groups.iter().any(|g| g.is_empty()) {
        return TestResult::new(f64::NAN, f64::NAN);
    }

    let (ranks, ties) = pooled_ranks(groups);
    let n = ranks.len() as f64;

    let mut offset = 0;
    let mut h = 0.0;
    for g in groups {
        let rank_sum: f64 = ranks[offset..offset + g.len()].iter().sum();
        h += rank_sum * rank_sum / g.len() as f64;
        offset += g.len();
    }
    h = 12.0 / (n * (n + 1.0)) * h - 3.0 * (n + 1.0);

    let tie_sum: f64 = ties.iter().map(|&t| (t * t * t - t) as f64).sum();
    let correction = 1.0 - tie_sum / (n * n * n - n);
    if correction <= 0.0 {
        return TestResult::new(f64::NAN, f64::NAN);
    }
    h /= correction;

    let df = (k - 1) as f64;
    let p_value = match ChiSquared::new(df) {
        Ok(chi2) => chi2.sf(h),
        Err(_) => f64::NAN,
    };

    TestResult::new(h, p_value).with_degrees_of_freedom(df)
}
