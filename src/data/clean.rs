use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::model::{CellValue, Column, Dataset};

// ---------------------------------------------------------------------------
// Cleaning operations
// ---------------------------------------------------------------------------

/// The two canned repairs offered for an uploaded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleaningOp {
    RemoveDuplicates,
    FillMissingNumeric,
}

impl CleaningOp {
    /// Every operation, in the order [`apply_cleaning`] runs them.
    pub const ALL: [CleaningOp; 2] = [CleaningOp::RemoveDuplicates, CleaningOp::FillMissingNumeric];

    pub fn apply(self, dataset: &Dataset) -> Dataset {
        match self {
            CleaningOp::RemoveDuplicates => remove_duplicates(dataset),
            CleaningOp::FillMissingNumeric => fill_missing_numeric(dataset),
        }
    }
}

impl fmt::Display for CleaningOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CleaningOp::RemoveDuplicates => f.write_str("Remove duplicates"),
            CleaningOp::FillMissingNumeric => f.write_str("Fill missing values"),
        }
    }
}

/// Run the requested operations on `dataset`.
///
/// Each operation runs at most once and always in the fixed order
/// duplicates first, then missing-value fill, whatever order `ops` lists
/// them in. Deduplicating first keeps repeated rows from weighting the
/// column means.
pub fn apply_cleaning(dataset: &Dataset, ops: &[CleaningOp]) -> Dataset {
    let mut current = dataset.clone();
    for op in CleaningOp::ALL {
        if ops.contains(&op) {
            current = op.apply(&current);
            log::debug!("{op}: {} rows remain", current.num_rows());
        }
    }
    current
}

/// Drop every row that exactly repeats an earlier row (all columns),
/// keeping the first occurrence and the order of the survivors.
pub fn remove_duplicates(dataset: &Dataset) -> Dataset {
    let mut seen: HashSet<Vec<&CellValue>> = HashSet::with_capacity(dataset.num_rows());
    let keep: Vec<usize> = (0..dataset.num_rows())
        .filter(|&i| seen.insert(dataset.row(i)))
        .collect();
    dataset.take_rows(&keep)
}

/// Replace missing cells of every numeric column with that column's mean.
///
/// The mean is taken over the non-missing cells before any replacement.
/// Columns without a single non-missing value are left as they are, as are
/// non-numeric columns.
pub fn fill_missing_numeric(dataset: &Dataset) -> Dataset {
    let columns = dataset
        .columns()
        .iter()
        .map(|col| match column_mean(col) {
            Some(mean) if col.is_numeric() && col.null_count() > 0 => Column {
                name: col.name.clone(),
                kind: col.kind,
                values: col
                    .values
                    .iter()
                    .map(|v| {
                        if v.is_null() {
                            CellValue::Float(mean)
                        } else {
                            v.clone()
                        }
                    })
                    .collect(),
            },
            _ => col.clone(),
        })
        .collect();
    Dataset::with_columns(columns, dataset.num_rows())
}

/// Arithmetic mean of the non-missing numeric cells, `None` when there are none.
pub fn column_mean(column: &Column) -> Option<f64> {
    let (sum, count) = column
        .values
        .iter()
        .filter_map(CellValue::as_f64)
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}
