use std::fmt;
use std::path::Path;

use rust_xlsxwriter::{Format, Workbook};
use serde::{Deserialize, Serialize};

use super::error::{PipelineError, SerializeFailure};
use super::model::{CellValue, Dataset};

pub const CSV_MIME: &str = "text/csv";
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

// ---------------------------------------------------------------------------
// Export target
// ---------------------------------------------------------------------------

/// Output format offered for download.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportTarget {
    #[default]
    Csv,
    #[serde(alias = "xlsx", alias = "excel")]
    Spreadsheet,
}

impl ExportTarget {
    pub fn mime(&self) -> &'static str {
        match self {
            ExportTarget::Csv => CSV_MIME,
            ExportTarget::Spreadsheet => XLSX_MIME,
        }
    }

    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportTarget::Csv => "csv",
            ExportTarget::Spreadsheet => "xlsx",
        }
    }

    /// Short label for buttons and messages.
    pub fn label(&self) -> &'static str {
        match self {
            ExportTarget::Csv => "CSV",
            ExportTarget::Spreadsheet => "Excel",
        }
    }
}

impl fmt::Display for ExportTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Exported file
// ---------------------------------------------------------------------------

/// A serialized table ready to be offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Serialize `dataset` for `target`.
///
/// `source_name` is the uploaded file's name; the output keeps its base name
/// with the target's extension. Nothing is returned on failure, so a caller
/// never sees a half-written buffer.
pub fn export(
    dataset: &Dataset,
    source_name: &str,
    target: ExportTarget,
) -> Result<ExportedFile, PipelineError> {
    let bytes = match target {
        ExportTarget::Csv => write_csv(dataset),
        ExportTarget::Spreadsheet => write_xlsx(dataset),
    }
    .map_err(|e| PipelineError::serialization(target, e))?;

    let file_name = output_file_name(source_name, target);
    log::debug!("Encoded {file_name} ({} bytes)", bytes.len());
    Ok(ExportedFile {
        file_name,
        mime: target.mime(),
        bytes,
    })
}

/// Output name: the source's base name with its last extension replaced by
/// (or, if it has none, extended with) the target's extension.
pub fn output_file_name(source_name: &str, target: ExportTarget) -> String {
    let base = Path::new(source_name)
        .file_name()
        .map(Path::new)
        .unwrap_or_else(|| Path::new("export"));
    base.with_extension(target.extension())
        .to_string_lossy()
        .into_owned()
}

// ---------------------------------------------------------------------------
// Encoders
// ---------------------------------------------------------------------------

/// Header row, then one record per row; no index column, `\n` endings.
fn write_csv(dataset: &Dataset) -> Result<Vec<u8>, SerializeFailure> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(dataset.columns().iter().map(|c| c.name.as_str()))?;
    for row in 0..dataset.num_rows() {
        writer.write_record(dataset.row(row).iter().map(|v| v.to_field()))?;
    }

    writer
        .into_inner()
        .map_err(|e| SerializeFailure::Csv(csv::Error::from(e.into_error())))
}

/// A single `Sheet1` worksheet with a bold header row. Missing cells stay
/// empty; non-finite numbers have no spreadsheet representation.
fn write_xlsx(dataset: &Dataset) -> Result<Vec<u8>, SerializeFailure> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Sheet1")?;

        for (c, column) in dataset.columns().iter().enumerate() {
            let col = u16::try_from(c).map_err(|_| {
                SerializeFailure::Unsupported(format!("too many columns ({})", dataset.num_columns()))
            })?;
            sheet.write_string_with_format(0, col, &column.name, &header)?;

            for (r, value) in column.values.iter().enumerate() {
                let row = u32::try_from(r + 1).map_err(|_| {
                    SerializeFailure::Unsupported(format!("too many rows ({})", dataset.num_rows()))
                })?;
                match value {
                    v if v.is_null() => {}
                    CellValue::Null => {}
                    CellValue::Integer(i) => {
                        sheet.write_number(row, col, *i as f64)?;
                    }
                    CellValue::Float(v) if !v.is_finite() => {
                        return Err(SerializeFailure::Unsupported(format!(
                            "column `{}` row {r}: {v} cannot be stored in a spreadsheet",
                            column.name
                        )));
                    }
                    CellValue::Float(v) => {
                        sheet.write_number(row, col, *v)?;
                    }
                    CellValue::Bool(b) => {
                        sheet.write_boolean(row, col, *b)?;
                    }
                    CellValue::Text(s) | CellValue::Date(s) => {
                        sheet.write_string(row, col, s)?;
                    }
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, ColumnKind};

    fn one_row() -> Dataset {
        Dataset::from_columns(vec![
            Column::new("A", ColumnKind::Numeric, vec![CellValue::Integer(1)]),
            Column::new("B", ColumnKind::Text, vec![CellValue::Text("x".into())]),
        ])
        .unwrap()
    }

    #[test]
    fn csv_export_names_and_mime() {
        let out = export(&one_row(), "data.csv", ExportTarget::Csv).unwrap();
        assert_eq!(out.file_name, "data.csv");
        assert_eq!(out.mime, "text/csv");
        assert_eq!(String::from_utf8(out.bytes).unwrap(), "A,B\n1,x\n");
    }

    #[test]
    fn spreadsheet_export_swaps_extension() {
        let out = export(&one_row(), "report.CSV", ExportTarget::Spreadsheet).unwrap();
        assert_eq!(out.file_name, "report.xlsx");
        assert_eq!(out.mime, XLSX_MIME);
        // xlsx files are zip archives
        assert_eq!(&out.bytes[..2], b"PK");
    }

    #[test]
    fn output_name_handles_odd_inputs() {
        assert_eq!(output_file_name("archive.tar.xlsx", ExportTarget::Csv), "archive.tar.csv");
        assert_eq!(output_file_name("noext", ExportTarget::Csv), "noext.csv");
        assert_eq!(output_file_name("dir/sub/data.xlsx", ExportTarget::Csv), "data.csv");
        assert_eq!(output_file_name("csv.csv", ExportTarget::Spreadsheet), "csv.xlsx");
    }

    #[test]
    fn csv_quotes_fields_and_blanks_missing() {
        let ds = Dataset::from_columns(vec![
            Column::new(
                "note",
                ColumnKind::Text,
                vec![CellValue::Text("a,b".into()), CellValue::Null],
            ),
            Column::new(
                "v",
                ColumnKind::Numeric,
                vec![CellValue::Float(3.0), CellValue::Float(0.5)],
            ),
        ])
        .unwrap();
        let out = export(&ds, "n.csv", ExportTarget::Csv).unwrap();
        assert_eq!(
            String::from_utf8(out.bytes).unwrap(),
            "note,v\n\"a,b\",3.0\n,0.5\n"
        );
    }

    #[test]
    fn non_finite_numbers_fail_spreadsheet_export() {
        let ds = Dataset::from_columns(vec![Column::new(
            "v",
            ColumnKind::Numeric,
            vec![CellValue::Float(f64::INFINITY)],
        )])
        .unwrap();
        let err = export(&ds, "v.csv", ExportTarget::Spreadsheet).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Serialization {
                target: ExportTarget::Spreadsheet,
                ..
            }
        ));
    }

    #[test]
    fn nan_cells_are_written_as_blanks() {
        let ds = Dataset::from_columns(vec![Column::new(
            "v",
            ColumnKind::Numeric,
            vec![CellValue::Float(f64::NAN), CellValue::Float(1.5)],
        )])
        .unwrap();
        let out = export(&ds, "v.csv", ExportTarget::Spreadsheet).unwrap();
        let reread = crate::data::load_bytes(&out.file_name, &out.bytes).unwrap();
        assert!(reread.columns()[0].values[0].is_null());
        assert_eq!(reread.columns()[0].values[1], CellValue::Float(1.5));
    }

    #[test]
    fn target_parses_from_recipe_names() {
        let t: ExportTarget = serde_json::from_str("\"xlsx\"").unwrap();
        assert_eq!(t, ExportTarget::Spreadsheet);
        let t: ExportTarget = serde_json::from_str("\"csv\"").unwrap();
        assert_eq!(t, ExportTarget::Csv);
    }
}
