use crate::error::{DgeError, Result};
use crate::testing::{TestMethod, TestResult};

pub mod nonparametric;

pub mod parametric;

/// Statistics back end used by the per-gene engine.
pub trait HypothesisTests: Sync {
    /// Compare two samples with a two-group method (t-test or rank-sum).
    fn run_two_sample(&self, method: TestMethod, a: &[f64], b: &[f64]) -> Result<TestResult>;

    /// Compare k > 2 samples with a multi-group method (ANOVA or Kruskal-Wallis).
    fn run_k_sample(&self, method: TestMethod, groups: &[&[f64]]) -> Result<TestResult>;
}

/// Default back end: test statistics computed here, reference distributions from statrs.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatrsTests;

impl HypothesisTests for StatrsTests {
    fn run_two_sample(&self, method: TestMethod, a: &[f64], b: &[f64]) -> Result<TestResult> {
        match method {
            TestMethod::TTest => Ok(parametric::welch_t_test(a, b)),
            TestMethod::RankSum => Ok(nonparametric::rank_sum(a, b)),
            other => Err(DgeError::unsupported_method(
                other.to_string(),
                "not a two-group test; use 'ttest' or 'wilcoxon'",
            )),
        }
    }

    fn run_k_sample(&self, method: TestMethod, groups: &[&[f64]]) -> Result<TestResult> {
        match method {
            TestMethod::Anova => Ok(parametric::one_way_anova(groups)),
            TestMethod::KruskalWallis => Ok(nonparametric::kruskal_wallis(groups)),
            other => Err(DgeError::unsupported_method(
                other.to_string(),
                "not a multi-group test; use 'anova' or 'kruskal'",
            )),
        }
    }
}
