use approx::{assert_abs_diff_eq, assert_relative_eq};
use rnaseq_dge::prelude::*;
use rnaseq_dge::testing::correction::bonferroni_uncapped;
use rnaseq_dge::testing::effect::log2_fold_change;
use rnaseq_dge::testing::inference::nonparametric::{kruskal_wallis, rank_sum};
use rnaseq_dge::testing::inference::parametric::{one_way_anova, welch_t_test};

fn ids(prefix: &str, n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{}{}", prefix, i)).collect()
}

#[cfg(test)]
mod quick_test {
    use super::*;

    #[test]
    fn check_if_ttest_works() {
        // Group 1: [1, 2, 3] -> mean=2, Group 2: [7, 8, 9] -> mean=8, both variance 1
        let result = welch_t_test(&[1.0, 2.0, 3.0], &[7.0, 8.0, 9.0]);

        println!("T-statistic: {}", result.statistic);
        println!("P-value: {}", result.p_value);

        assert!(result.p_value < 0.05);
        assert!(result.statistic < -2.0);
        assert_relative_eq!(result.degrees_of_freedom.unwrap(), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn check_identical_groups() {
        let result = welch_t_test(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert_abs_diff_eq!(result.statistic, 0.0, epsilon = 1e-12);
        assert_relative_eq!(result.p_value, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn check_rank_sum_separated_groups() {
        let result = rank_sum(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]);
        assert_relative_eq!(result.statistic, -1.9639610121239315, epsilon = 1e-12);
        assert_relative_eq!(result.p_value, 0.04953461343562674, epsilon = 1e-9);
    }

    #[test]
    fn check_k_sample_tests() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        let c = [7.0, 8.0, 9.0];
        let groups: Vec<&[f64]> = vec![&a, &b, &c];

        let anova = one_way_anova(&groups);
        assert_relative_eq!(anova.statistic, 27.0, epsilon = 1e-9);
        assert!(anova.p_value < 0.01);

        let kruskal = kruskal_wallis(&groups);
        assert_relative_eq!(kruskal.statistic, 7.2, epsilon = 1e-9);
        assert_relative_eq!(kruskal.p_value, 0.02732372244729252, epsilon = 1e-9);
    }
}

#[cfg(test)]
mod fold_change_tests {
    use super::*;

    #[test]
    fn test_log2_fold_change_doubling() {
        // (3 + 1) / (1 + 1) = 2
        let lfc = log2_fold_change(&[1.0, 1.0, 1.0], &[3.0, 3.0, 3.0], 1.0);
        assert_relative_eq!(lfc, 1.0, epsilon = 1e-12);
        assert!(log2_fold_change(&[3.0, 3.0, 3.0], &[1.0, 1.0, 1.0], 1.0) < 0.0);
    }

    #[test]
    fn test_engine_fold_change_direction() {
        let matrix = ExpressionMatrix::from_rows(
            vec![vec![1.0, 1.0, 1.0, 3.0, 3.0, 3.0]],
            ids("g", 1),
            ids("s", 6),
        )
        .unwrap();
        let labels = GroupLabels::from_pairs([
            ("s1", "ctrl"),
            ("s2", "ctrl"),
            ("s3", "ctrl"),
            ("s4", "case"),
            ("s5", "case"),
            ("s6", "case"),
        ])
        .unwrap();

        let out = differential_expression(&matrix, &labels, TestMethod::RankSum, 1.0, 0.05).unwrap();
        let row = out.full.get("g1").unwrap();
        assert_relative_eq!(row.log2_fold_change.unwrap(), 1.0, epsilon = 1e-12);
    }
}

#[cfg(test)]
mod correction_tests {
    use super::*;

    #[test]
    fn test_bonferroni_is_uncapped() {
        let adjusted = bonferroni_uncapped(&[0.01, 0.3, 0.5, f64::NAN]);
        assert_relative_eq!(adjusted[0], 0.04, epsilon = 1e-15);
        assert_relative_eq!(adjusted[2], 2.0, epsilon = 1e-15);
        assert!(adjusted[3].is_nan());
    }

    #[test]
    fn test_adjusted_is_p_times_row_count() {
        let matrix = ExpressionMatrix::from_rows(
            vec![
                vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0],
                vec![5.0, 1.0, 3.0, 2.0, 4.0, 6.0],
                vec![9.0, 8.0, 7.0, 1.0, 2.0, 3.0],
                vec![f64::NAN, f64::NAN, f64::NAN, 1.0, 2.0, 3.0],
            ],
            ids("g", 4),
            ids("s", 6),
        )
        .unwrap();
        let labels = GroupLabels::from_pairs([
            ("s1", "a"),
            ("s2", "a"),
            ("s3", "a"),
            ("s4", "b"),
            ("s5", "b"),
            ("s6", "b"),
        ])
        .unwrap();

        let out = differential_expression(&matrix, &labels, TestMethod::TTest, 1.0, 0.05).unwrap();
        // g4 has no values in group a
        assert_eq!(out.full.len(), 3);
        assert!(out.full.get("g4").is_none());
        assert!(out.significant.get("g4").is_none());
        for row in out.full.iter() {
            assert_relative_eq!(row.adjusted_p_value, row.p_value * 3.0, epsilon = 1e-15);
        }
    }
}

#[cfg(test)]
mod preprocessing_tests {
    use super::*;

    fn matrix() -> ExpressionMatrix {
        ExpressionMatrix::from_rows(
            vec![
                vec![1.0, 4.0, 9.0, 16.0],
                vec![2.0, 2.5, 2.0, 2.5],
                vec![0.0, 10.0, 0.0, 10.0],
            ],
            ids("g", 3),
            ids("s", 4),
        )
        .unwrap()
    }

    #[test]
    fn test_z_score_rows_are_standardized() {
        let z = z_score(&matrix()).unwrap();
        for row in z.values().rows() {
            let n = row.len() as f64;
            let mean = row.sum() / n;
            let var = row.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
            assert_abs_diff_eq!(mean, 0.0, epsilon = 1e-12);
            assert_relative_eq!(var.sqrt(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_variance_filter_extremes() {
        let m = matrix();
        assert!(filter_low_variance(&m, f64::INFINITY).unwrap().is_empty());
        assert_eq!(filter_low_variance(&m, -1.0).unwrap().n_genes(), m.n_genes());
    }

    #[test]
    fn test_normalize_and_log_are_deterministic() {
        let lengths: GeneLengths = vec![
            ("g1".to_string(), 1000.0),
            ("g2".to_string(), 250.0),
            ("g3".to_string(), 4000.0),
        ]
        .into_iter()
        .collect();

        let first = log_transform(&normalize(&matrix(), &lengths, NormalizationMethod::ScaledDepth, 0.0).unwrap()).unwrap();
        let second = log_transform(&normalize(&matrix(), &lengths, NormalizationMethod::ScaledDepth, 0.0).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
