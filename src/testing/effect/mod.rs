use crate::testing::inference::parametric::mean;

/// Calculate log2 fold change between two groups of expression values.
///
/// `log2(mean(treatment) + pseudo_count) - log2(mean(reference) + pseudo_count)`,
/// so the result is positive when the treatment group is higher. Empty groups
/// give `NaN`.
///
/// # Arguments
///
/// * `reference` - Values of the reference group (the denominator)
/// * `treatment` - Values of the group compared against it (the numerator)
/// * `pseudo_count` - Offset added to both means, 1.0 for the results tables
pub fn log2_fold_change(reference: &[f64], treatment: &[f64], pseudo_count: f64) -> f64 {
    if reference.is_empty() || treatment.is_empty() {
        return f64::NAN;
    }
    (mean(treatment) + pseudo_count).log2() - (mean(reference) + pseudo_count).log2()
}
