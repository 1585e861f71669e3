//! Result table output

use std::path::Path;

use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::testing::{GeneResult, ResultsTable};

/// One CSV row of a written results table.
///
/// `log2FC` is empty for multi-group tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub gene: String,
    #[serde(rename = "log2FC")]
    pub log2_fc: Option<f64>,
    pub pval: f64,
    pub adj_pval: f64,
}

impl From<&GeneResult> for ResultRecord {
    fn from(row: &GeneResult) -> Self {
        ResultRecord {
            gene: row.gene_id.clone(),
            log2_fc: row.log2_fold_change,
            pval: row.p_value,
            adj_pval: row.adjusted_p_value,
        }
    }
}

/// Write a results table as CSV with header `gene,log2FC,pval,adj_pval`.
pub fn write_results<P: AsRef<Path>>(table: &ResultsTable, path: P) -> Result<()> {
    write_records(table.iter(), path)
}

/// Write any sequence of rows in the results layout
pub fn write_records<'a, I, P>(rows: I, path: P) -> Result<()>
where
    I: IntoIterator<Item = &'a GeneResult>,
    P: AsRef<Path>,
{
    let mut writer = csv::Writer::from_path(path)?;
    let mut wrote_any = false;
    for row in rows {
        writer.serialize(ResultRecord::from(row))?;
        wrote_any = true;
    }
    if !wrote_any {
        // serde only emits the header alongside the first record
        writer.write_record(["gene", "log2FC", "pval", "adj_pval"])?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a table written by [`write_results`].
pub fn read_results<P: AsRef<Path>>(path: P) -> Result<Vec<ResultRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

/// File name for a results table: `<prefix>_<group_col>_<YYYYmmdd_HHMMSS>.csv`
pub fn results_filename<Tz>(prefix: &str, group_col: &str, timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_{}_{}.csv",
        prefix,
        group_col,
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestMethod;
    use chrono::Utc;
    use tempfile::NamedTempFile;

    #[test]
    fn test_results_filename() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(
            results_filename("DEG", "integration", &ts),
            "DEG_integration_20240307_090501.csv"
        );
    }

    #[test]
    fn test_write_and_read_back() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path();
        let table = ResultsTable::new(
            TestMethod::RankSum,
            vec!["a".to_string(), "b".to_string()],
            vec![
                GeneResult {
                    gene_id: "g1".to_string(),
                    log2_fold_change: Some(1.5),
                    statistic: 2.0,
                    p_value: 0.01,
                    adjusted_p_value: 0.02,
                },
                GeneResult {
                    gene_id: "g2".to_string(),
                    log2_fold_change: None,
                    statistic: 0.0,
                    p_value: 0.5,
                    adjusted_p_value: 1.0,
                },
            ],
        );
        write_results(&table, path).unwrap();

        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.starts_with("gene,log2FC,pval,adj_pval\n"));
        assert!(text.contains("g2,,0.5,1.0"));

        let records = read_results(path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].log2_fc, Some(1.5));
        assert_eq!(records[1].log2_fc, None);
    }

    #[test]
    fn test_empty_table_still_has_header() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path();
        let table = ResultsTable::new(TestMethod::Anova, vec![], vec![]);
        write_results(&table, path).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert_eq!(text.trim_end(), "gene,log2FC,pval,adj_pval");
        assert!(read_results(path).unwrap().is_empty());
    }
}
