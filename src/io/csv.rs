//! CSV reading for expression matrices, sample metadata and gene lengths

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use ndarray::Array2;

use crate::data::{ExpressionMatrix, GeneLengths, GroupLabels};
use crate::error::{DgeError, Result};

/// Tab if the header line contains one, comma otherwise
fn detect_delimiter(path: &Path) -> Result<u8> {
    let mut first_line = String::new();
    BufReader::new(File::open(path)?).read_line(&mut first_line)?;
    if first_line.trim().is_empty() {
        return Err(DgeError::EmptyData {
            reason: format!("{} is empty", path.display()),
        });
    }
    Ok(if first_line.contains('\t') { b'\t' } else { b',' })
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
    let delimiter = detect_delimiter(path)?;
    Ok(ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?)
}

/// Parse an expression value; empty cells and NA markers are missing.
fn parse_value(field: &str) -> Result<f64> {
    match field {
        "" | "NA" | "NaN" | "nan" | "null" => Ok(f64::NAN),
        _ => field.parse::<f64>().map_err(|_| {
            DgeError::invalid_input(format!("Invalid expression value: {}", field))
        }),
    }
}

fn column_index(headers: &StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers.iter().position(|h| h == name).ok_or_else(|| {
        DgeError::invalid_input(format!(
            "column '{}' not found in {} (columns: {})",
            name,
            path.display(),
            headers.iter().collect::<Vec<_>>().join(", ")
        ))
    })
}

/// Read an expression matrix.
///
/// Expected format: first column is gene IDs, first row is sample IDs (the
/// header of the first column is ignored). Comma and tab delimiters are
/// detected from the header line.
pub fn read_expression_matrix<P: AsRef<Path>>(path: P) -> Result<ExpressionMatrix> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;

    let headers = reader.headers()?.clone();
    if headers.len() < 2 {
        return Err(DgeError::invalid_input(format!(
            "{} needs a gene column and at least one sample column",
            path.display()
        )));
    }
    let sample_ids: Vec<String> = headers.iter().skip(1).map(|s| s.to_string()).collect();
    let n_samples = sample_ids.len();

    let mut gene_ids = Vec::new();
    let mut flat = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        gene_ids.push(record.get(0).unwrap_or_default().to_string());
        for field in record.iter().skip(1) {
            flat.push(parse_value(field)?);
        }
    }

    if gene_ids.is_empty() {
        return Err(DgeError::EmptyData {
            reason: format!("no genes found in {}", path.display()),
        });
    }

    let values = Array2::from_shape_vec((gene_ids.len(), n_samples), flat)
        .map_err(|e| DgeError::invalid_input(e.to_string()))?;

    ExpressionMatrix::new(values, gene_ids, sample_ids)
}

/// Read group labels from a sample metadata table.
///
/// # Arguments
///
/// * `path` - Metadata file with one row per sample
/// * `sample_col` - Column holding sample IDs
/// * `group_col` - Column holding the group of each sample
pub fn read_sample_info<P: AsRef<Path>>(path: P, sample_col: &str, group_col: &str) -> Result<GroupLabels> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;

    let headers = reader.headers()?.clone();
    let sample_idx = column_index(&headers, sample_col, path)?;
    let group_idx = column_index(&headers, group_col, path)?;

    let mut samples = Vec::new();
    let mut labels = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        samples.push(record.get(sample_idx).unwrap_or_default().to_string());
        labels.push(record.get(group_idx).unwrap_or_default().to_string());
    }

    if samples.is_empty() {
        return Err(DgeError::EmptyData {
            reason: format!("no samples found in {}", path.display()),
        });
    }

    GroupLabels::new(samples, labels)
}

/// Read gene lengths: first column gene ID, second column length in bp.
pub fn read_gene_lengths<P: AsRef<Path>>(path: P) -> Result<GeneLengths> {
    let path = path.as_ref();
    let mut reader = open_reader(path)?;

    let mut lengths = GeneLengths::new();
    for record in reader.records() {
        let record = record?;
        let (Some(gene), Some(length)) = (record.get(0), record.get(1)) else {
            return Err(DgeError::invalid_input(format!(
                "gene length rows need two columns in {}",
                path.display()
            )));
        };
        let length = length
            .parse::<f64>()
            .map_err(|_| DgeError::invalid_input(format!("Invalid gene length: {}", length)))?;
        lengths.insert(gene, length)?;
    }

    Ok(lengths)
}
