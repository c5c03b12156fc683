use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::error::PipelineError;
use super::model::Dataset;

// ---------------------------------------------------------------------------
// Column selection: which columns survive into the export
// ---------------------------------------------------------------------------

/// Names of the columns to keep.
///
/// An empty selection means "no restriction": projecting with it keeps every
/// column, it never produces a zero-column table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSelection(Vec<String>);

impl ColumnSelection {
    /// Build a selection, dropping repeated names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = BTreeSet::new();
        let names = names
            .into_iter()
            .map(Into::<String>::into)
            .filter(|n| seen.insert(n.clone()))
            .collect();
        ColumnSelection(names)
    }

    /// Select every column of `dataset`.
    pub fn all(dataset: &Dataset) -> Self {
        ColumnSelection(dataset.column_names())
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }
}

/// Restrict `dataset` to the selected columns.
///
/// Row order and row count are untouched and the columns keep the order
/// they have in `dataset`. An empty selection returns the whole dataset; a
/// name the dataset does not have is an error.
pub fn project(dataset: &Dataset, selection: &ColumnSelection) -> Result<Dataset, PipelineError> {
    if selection.is_empty() {
        return Ok(dataset.clone());
    }
    if let Some(missing) = selection
        .names()
        .iter()
        .find(|n| dataset.column(n).is_none())
    {
        return Err(PipelineError::UnknownColumn(missing.clone()));
    }

    let columns = dataset
        .columns()
        .iter()
        .filter(|c| selection.contains(&c.name))
        .cloned()
        .collect();
    Ok(Dataset::with_columns(columns, dataset.num_rows()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column, ColumnKind};

    fn abc() -> Dataset {
        let col = |name: &str| {
            Column::new(
                name,
                ColumnKind::Numeric,
                vec![CellValue::Integer(1), CellValue::Integer(2)],
            )
        };
        Dataset::from_columns(vec![col("A"), col("B"), col("C")]).unwrap()
    }

    #[test]
    fn full_selection_is_identity() {
        let ds = abc();
        assert_eq!(project(&ds, &ColumnSelection::all(&ds)).unwrap(), ds);
    }

    #[test]
    fn empty_selection_keeps_everything() {
        let ds = abc();
        assert_eq!(project(&ds, &ColumnSelection::default()).unwrap(), ds);
    }

    #[test]
    fn keeps_dataset_column_order_and_rows() {
        let ds = abc();
        let out = project(&ds, &ColumnSelection::new(["C", "A"])).unwrap();
        assert_eq!(out.column_names(), vec!["A", "C"]);
        assert_eq!(out.num_rows(), 2);
    }

    #[test]
    fn unknown_column_is_rejected() {
        let err = project(&abc(), &ColumnSelection::new(["Z"])).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownColumn(name) if name == "Z"));
    }

    #[test]
    fn repeated_names_collapse() {
        let sel = ColumnSelection::new(["A", "A", "B"]);
        assert_eq!(sel.names(), ["A".to_string(), "B".to_string()]);
    }
}
