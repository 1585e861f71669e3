//! Hypothesis testing for differential expression.
//!
//! This module holds the result types shared by the method selector, the statistics
//! back end and the per-gene engine.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DgeError, Result};

pub mod correction;
pub mod effect;
pub mod engine;
pub mod inference;
pub mod selection;

pub mod utils;

/// Statistical test family used for a run
///
/// Serialized names match `Display`: `ttest`, `wilcoxon`, `anova`, `kruskal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestMethod {
    /// Welch's two-sample t-test (unequal variances)
    #[serde(rename = "ttest", alias = "t-test")]
    TTest,
    /// Wilcoxon rank-sum test
    #[serde(rename = "wilcoxon", alias = "rank-sum")]
    RankSum,
    /// One-way analysis of variance
    #[serde(rename = "anova")]
    Anova,
    /// Kruskal-Wallis H-test
    #[serde(rename = "kruskal", alias = "kruskal-wallis")]
    KruskalWallis,
}

impl TestMethod {
    /// Whether the method compares exactly two groups
    pub fn is_two_group(&self) -> bool {
        matches!(self, TestMethod::TTest | TestMethod::RankSum)
    }

    /// Check that the method can be applied to `n_groups` distinct groups.
    pub fn check_group_count(&self, n_groups: usize) -> Result<()> {
        let compatible = if self.is_two_group() {
            n_groups == 2
        } else {
            n_groups > 2
        };
        if compatible {
            Ok(())
        } else {
            let expected = if self.is_two_group() { "exactly 2" } else { "more than 2" };
            Err(DgeError::unsupported_method(
                self.to_string(),
                format!("requires {} groups, found {}", expected, n_groups),
            ))
        }
    }
}

impl FromStr for TestMethod {
    type Err = DgeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ttest" | "t-test" | "welch" => Ok(TestMethod::TTest),
            "wilcoxon" | "rank-sum" | "ranksum" | "ranksums" => Ok(TestMethod::RankSum),
            "anova" => Ok(TestMethod::Anova),
            "kruskal" | "kruskal-wallis" => Ok(TestMethod::KruskalWallis),
            _ => Err(DgeError::unsupported_method(
                s,
                "use 'ttest', 'wilcoxon', 'anova' or 'kruskal'",
            )),
        }
    }
}

impl fmt::Display for TestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TestMethod::TTest => "ttest",
            TestMethod::RankSum => "wilcoxon",
            TestMethod::Anova => "anova",
            TestMethod::KruskalWallis => "kruskal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestResult {
    /// The test statistic value (t, z, F or H)
    pub statistic: f64,
    /// The p-value of the test
    pub p_value: f64,
    /// Degrees of freedom (for parametric inference)
    pub degrees_of_freedom: Option<f64>,
}

impl TestResult {
    /// Create a new test result with minimal information
    pub fn new(statistic: f64, p_value: f64) -> Self {
        TestResult {
            statistic,
            p_value,
            degrees_of_freedom: None,
        }
    }

    /// Add degrees of freedom to the result
    pub fn with_degrees_of_freedom(mut self, df: f64) -> Self {
        self.degrees_of_freedom = Some(df);
        self
    }
}

/// One row of a results table
#[derive(Debug, Clone, PartialEq)]
pub struct GeneResult {
    pub gene_id: String,
    /// Only present for two-group comparisons
    pub log2_fold_change: Option<f64>,
    pub statistic: f64,
    pub p_value: f64,
    pub adjusted_p_value: f64,
}

/// Why a gene produced no row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// At least one group had no non-missing values
    AllMissing,
    /// Every remaining value was identical (multi-group tests only)
    Degenerate,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AllMissing => f.write_str("all values missing in a group"),
            SkipReason::Degenerate => f.write_str("constant values"),
        }
    }
}

fn cmp_adjusted(a: &GeneResult, b: &GeneResult) -> Ordering {
    // NaN p-values go last
    match (a.adjusted_p_value.is_nan(), b.adjusted_p_value.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a
            .adjusted_p_value
            .partial_cmp(&b.adjusted_p_value)
            .unwrap_or(Ordering::Equal),
    }
}

/// Ordered collection of per-gene results from one run
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsTable {
    method: TestMethod,
    groups: Vec<String>,
    rows: Vec<GeneResult>,
}

impl ResultsTable {
    pub fn new(method: TestMethod, groups: Vec<String>, rows: Vec<GeneResult>) -> Self {
        Self {
            method,
            groups,
            rows,
        }
    }

    pub fn method(&self) -> TestMethod {
        self.method
    }

    /// Groups compared, in first-occurrence order. For two-group runs the first
    /// entry is the fold-change reference.
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn rows(&self) -> &[GeneResult] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GeneResult> {
        self.rows.iter()
    }

    pub fn get(&self, gene_id: &str) -> Option<&GeneResult> {
        self.rows.iter().find(|r| r.gene_id == gene_id)
    }

    pub fn gene_ids(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.gene_id.as_str()).collect()
    }

    /// Stable sort by ascending adjusted p-value, `NaN` last
    pub fn sorted_by_adjusted_p(mut self) -> Self {
        self.rows.sort_by(cmp_adjusted);
        self
    }

    /// Keep the rows matching `predicate`, preserving order
    pub fn filter<F>(&self, predicate: F) -> Self
    where
        F: Fn(&GeneResult) -> bool,
    {
        Self {
            method: self.method,
            groups: self.groups.clone(),
            rows: self.rows.iter().filter(|r| predicate(r)).cloned().collect(),
        }
    }

    /// The `n` rows with the smallest adjusted p-values
    pub fn top_n(&self, n: usize) -> Vec<&GeneResult> {
        let mut rows: Vec<&GeneResult> = self.rows.iter().collect();
        rows.sort_by(|a, b| cmp_adjusted(a, b));
        rows.truncate(n);
        rows
    }
}
