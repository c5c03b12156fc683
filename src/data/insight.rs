use super::error::PipelineError;
use super::loader::SourceFormat;
use super::model::Dataset;

/// Rows shown in the quick preview.
pub const PREVIEW_ROWS: usize = 5;

/// Numeric columns plotted in the summary chart.
pub const CHART_COLUMNS: usize = 2;

// ---------------------------------------------------------------------------
// File details
// ---------------------------------------------------------------------------

/// What the shell shows about an upload before any processing.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSummary {
    pub file_name: String,
    pub size_bytes: usize,
    pub format: SourceFormat,
}

impl FileSummary {
    /// Fails with `UnsupportedFormat` for anything but `.csv` / `.xlsx`.
    pub fn new(file_name: &str, size_bytes: usize) -> Result<Self, PipelineError> {
        Ok(FileSummary {
            file_name: file_name.to_string(),
            size_bytes,
            format: SourceFormat::from_file_name(file_name)?,
        })
    }

    /// Size in KB, rounded to two decimals.
    pub fn size_kb(&self) -> f64 {
        (self.size_bytes as f64 / 1024.0 * 100.0).round() / 100.0
    }
}

// ---------------------------------------------------------------------------
// Preview and chart data
// ---------------------------------------------------------------------------

/// First `rows` rows of the table.
pub fn preview(dataset: &Dataset, rows: usize) -> Dataset {
    dataset.head(rows)
}

/// One bar series: a numeric column's values by row, `None` where missing.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericSeries {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

/// The first `limit` numeric columns, ready for a bar chart.
///
/// Empty when the table has no numeric column at all.
pub fn chart_series(dataset: &Dataset, limit: usize) -> Vec<NumericSeries> {
    dataset
        .columns()
        .iter()
        .filter(|c| c.is_numeric())
        .take(limit)
        .map(|c| NumericSeries {
            name: c.name.clone(),
            values: c.values.iter().map(|v| v.as_f64()).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column, ColumnKind};

    #[test]
    fn summary_reports_kb_and_format() {
        let summary = FileSummary::new("Sales.XLSX", 2560).unwrap();
        assert_eq!(summary.format, SourceFormat::Xlsx);
        assert_eq!(summary.size_kb(), 2.5);
        assert_eq!(summary.format.to_string(), ".XLSX");
    }

    #[test]
    fn summary_rejects_unknown_format() {
        assert!(FileSummary::new("notes.txt", 10).is_err());
    }

    #[test]
    fn chart_takes_first_numeric_columns_only() {
        let ds = Dataset::from_columns(vec![
            Column::new("name", ColumnKind::Text, vec![CellValue::Text("a".into())]),
            Column::new("x", ColumnKind::Numeric, vec![CellValue::Integer(1)]),
            Column::new("y", ColumnKind::Numeric, vec![CellValue::Null]),
            Column::new("z", ColumnKind::Numeric, vec![CellValue::Float(0.5)]),
        ])
        .unwrap();
        let series = chart_series(&ds, CHART_COLUMNS);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].name, "x");
        assert_eq!(series[0].values, vec![Some(1.0)]);
        assert_eq!(series[1].values, vec![None]);
    }

    #[test]
    fn no_numeric_columns_means_no_chart() {
        let ds = Dataset::from_columns(vec![Column::new(
            "name",
            ColumnKind::Text,
            vec![CellValue::Text("a".into())],
        )])
        .unwrap();
        assert!(chart_series(&ds, CHART_COLUMNS).is_empty());
    }

    #[test]
    fn preview_is_capped() {
        let ds = Dataset::from_columns(vec![Column::new(
            "n",
            ColumnKind::Numeric,
            (0..12).map(CellValue::Integer).collect(),
        )])
        .unwrap();
        assert_eq!(preview(&ds, PREVIEW_ROWS).num_rows(), 5);
        assert_eq!(preview(&ds.head(3), PREVIEW_ROWS).num_rows(), 3);
    }
}
