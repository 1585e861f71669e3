use ndarray::ArrayView1;

/// Column indices for each group, groups ordered by first occurrence in `labels`.
pub fn get_group_indices(labels: &[String], groups: &[&str]) -> Vec<Vec<usize>> {
    groups
        .iter()
        .map(|&g| {
            labels
                .iter()
                .enumerate()
                .filter_map(|(i, l)| if l == g { Some(i) } else { None })
                .collect()
        })
        .collect()
}

/// Non-missing values of one gene for each group
pub fn partition_values(row: ArrayView1<'_, f64>, group_indices: &[Vec<usize>]) -> Vec<Vec<f64>> {
    group_indices
        .iter()
        .map(|indices| {
            indices
                .iter()
                .map(|&i| row[i])
                .filter(|v| !v.is_nan())
                .collect()
        })
        .collect()
}

/// True when every value across all groups is the same
pub fn all_identical(groups: &[Vec<f64>]) -> bool {
    let mut values = groups.iter().flat_map(|g| g.iter());
    match values.next() {
        Some(&first) => values.all(|&v| v == first),
        None => true,
    }
}
