//! Multiple testing correction for the per-gene p-values of one run.

/// Apply the Bonferroni-style correction used for results tables.
///
/// Each p-value is multiplied by the number of tests actually performed, i.e. the
/// number of p-values passed in. Adjusted values are not capped at 1.0, and a
/// `NaN` p-value stays `NaN`.
///
/// # Arguments
/// * `p_values` - Raw p-values of the genes that were tested
///
/// # Returns
/// * `Vec<f64>` - Adjusted p-values, same order as the input
///
/// # Example
/// ```
/// use rnaseq_dge::testing::correction::bonferroni_uncapped;
///
/// let adjusted = bonferroni_uncapped(&[0.01, 0.3, 0.5]);
/// assert_eq!(adjusted, vec![0.03, 0.8999999999999999, 1.5]);
/// ```
pub fn bonferroni_uncapped(p_values: &[f64]) -> Vec<f64> {
    let n = p_values.len() as f64;
    p_values.iter().map(|&p| p * n).collect()
}
