//! Core data structures: expression matrix, group labels and gene lengths

mod labels;
mod matrix;

pub use labels::{GeneLengths, GroupLabels};
pub use matrix::ExpressionMatrix;
