//! Choice of the test family from the group structure.

use log::info;

use crate::data::GroupLabels;
use crate::error::{DgeError, Result};
use crate::testing::TestMethod;

/// Per-group sample size from which the parametric tests are preferred
pub const MIN_PARAMETRIC_GROUP_SIZE: usize = 20;

/// A selected method with the reason it was chosen
#[derive(Debug, Clone, PartialEq)]
pub struct MethodChoice {
    pub method: TestMethod,
    pub reason: String,
}

/// Select a test method from the number of groups and their sizes.
///
/// * two groups, both with at least 20 samples: Welch's t-test, otherwise rank-sum
/// * more than two groups, all with at least 20 samples: ANOVA, otherwise Kruskal-Wallis
///
/// Fails with [`DgeError::InvalidGrouping`] when fewer than two groups are present.
pub fn suggest_method_with_reason(labels: &GroupLabels) -> Result<MethodChoice> {
    let sizes = labels.group_sizes();
    let large_enough = |n: &usize| *n >= MIN_PARAMETRIC_GROUP_SIZE;

    let (method, reason) = match sizes.len() {
        2 => {
            if sizes.iter().map(|(_, n)| n).all(large_enough) {
                (
                    TestMethod::TTest,
                    format!(
                        "Two groups with sufficient sample size (>={}) per group, using t-test.",
                        MIN_PARAMETRIC_GROUP_SIZE
                    ),
                )
            } else {
                (
                    TestMethod::RankSum,
                    "Two groups with small sample sizes, using Wilcoxon rank-sum test.".to_string(),
                )
            }
        }
        k if k > 2 => {
            if sizes.iter().map(|(_, n)| n).all(large_enough) {
                (
                    TestMethod::Anova,
                    format!("{} groups with decent sample sizes, using ANOVA.", k),
                )
            } else {
                (
                    TestMethod::KruskalWallis,
                    format!("{} groups with small samples, using Kruskal-Wallis test.", k),
                )
            }
        }
        k => {
            return Err(DgeError::invalid_grouping(format!(
                "at least 2 distinct groups are needed for a comparison, found {}",
                k
            )));
        }
    };

    Ok(MethodChoice { method, reason })
}

/// Select a test method and log the reasoning.
pub fn suggest_method(labels: &GroupLabels) -> Result<TestMethod> {
    let choice = suggest_method_with_reason(labels)?;
    info!("Suggested method: {}", choice.method.to_string().to_uppercase());
    info!("Reason: {}", choice.reason);
    Ok(choice.method)
}
