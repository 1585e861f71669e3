//! Reading input tables and writing result tables.

mod csv;
mod results;

pub use self::csv::{read_expression_matrix, read_gene_lengths, read_sample_info};
pub use self::results::{read_results, results_filename, write_records, write_results, ResultRecord};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DgeError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_read_expression_csv_with_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expr.csv");
        fs::write(&path, ",s1,s2,s3\ng1,1,NA,3\ng2,4,5,\n").unwrap();

        let m = read_expression_matrix(&path).unwrap();
        assert_eq!(m.n_genes(), 2);
        assert_eq!(m.sample_ids(), &["s1", "s2", "s3"]);
        assert!(m.row(0)[1].is_nan());
        assert!(m.row(1)[2].is_nan());
        assert_eq!(m.row(1)[0], 4.0);
    }

    #[test]
    fn test_read_expression_tab_delimited() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expr.tsv");
        fs::write(&path, "gene\ts1\ts2\ng1\t1.5\t2.5\n").unwrap();

        let m = read_expression_matrix(&path).unwrap();
        assert_eq!(m.gene_ids(), &["g1"]);
        assert_eq!(m.row(0)[1], 2.5);
    }

    #[test]
    fn test_read_expression_rejects_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("expr.csv");
        fs::write(&path, ",s1\ng1,abc\n").unwrap();
        assert!(matches!(read_expression_matrix(&path), Err(DgeError::InvalidInput { .. })));
    }

    #[test]
    fn test_read_sample_info() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("info.csv");
        fs::write(&path, "Sample,integration,batch\ns1,ctrl,1\ns2,ctrl,1\ns3,case,2\n").unwrap();

        let labels = read_sample_info(&path, "Sample", "integration").unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.get("s3"), Some("case"));

        let missing = read_sample_info(&path, "Sample", "fusion");
        assert!(matches!(missing, Err(DgeError::InvalidInput { .. })));
    }

    #[test]
    fn test_read_gene_lengths() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lengths.csv");
        fs::write(&path, "gene,length\ng1,1500\ng2,300\n").unwrap();

        let lengths = read_gene_lengths(&path).unwrap();
        assert_eq!(lengths.len(), 2);
        assert_eq!(lengths.get("g1"), Some(1500.0));

        fs::write(&path, "gene,length\ng1,-4\n").unwrap();
        assert!(read_gene_lengths(&path).is_err());
    }
}
