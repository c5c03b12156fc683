use std::collections::{HashMap, HashSet};
use std::fmt;
use std::io::Cursor;
use std::path::Path;

use calamine::{Data, DataType, Reader, Xlsx};

use super::error::{ParseFailure, PipelineError};
use super::model::{CellValue, Column, ColumnKind, Dataset};

/// Field texts read as a missing value, the same set the dataframe
/// libraries recognise by default.
pub const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Source format
// ---------------------------------------------------------------------------

/// Formats accepted on upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Csv,
    Xlsx,
}

impl SourceFormat {
    /// Derive the format from a file name's extension (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Result<Self, PipelineError> {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "xlsx" => Ok(SourceFormat::Xlsx),
            other => Err(PipelineError::UnsupportedFormat {
                file_name: file_name.to_string(),
                extension: if other.is_empty() {
                    String::new()
                } else {
                    format!(".{other}")
                },
            }),
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}", self.extension().to_ascii_uppercase())
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Parse an uploaded buffer into a [`Dataset`].  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`  – header row with column names, one record per line
/// * `.xlsx` – first worksheet, first row is the header
pub fn load_bytes(file_name: &str, bytes: &[u8]) -> Result<Dataset, PipelineError> {
    let dataset = match SourceFormat::from_file_name(file_name)? {
        SourceFormat::Csv => load_csv(file_name, bytes)?,
        SourceFormat::Xlsx => load_xlsx(file_name, bytes)?,
    };
    log::debug!(
        "Parsed `{file_name}`: {} rows x {} columns",
        dataset.num_rows(),
        dataset.num_columns()
    );
    Ok(dataset)
}

/// Read a file from disk and parse it with [`load_bytes`].
pub fn load_file(path: &Path) -> Result<Dataset, PipelineError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    // Reject the extension before touching the disk.
    SourceFormat::from_file_name(&file_name)?;
    let bytes = std::fs::read(path).map_err(|e| PipelineError::parse(&file_name, e))?;
    load_bytes(&file_name, &bytes)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(file_name: &str, bytes: &[u8]) -> Result<Dataset, PipelineError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| PipelineError::parse(file_name, e))?
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if h.is_empty() {
                format!("Unnamed: {i}")
            } else {
                h.to_string()
            }
        })
        .collect();

    if headers.is_empty() {
        return Err(PipelineError::parse(
            file_name,
            ParseFailure::Layout("no columns to parse from file".into()),
        ));
    }

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for result in reader.records() {
        let record = result.map_err(|e| PipelineError::parse(file_name, e))?;
        if record.len() > headers.len() {
            let line = record.position().map_or(0, |p| p.line());
            return Err(PipelineError::parse(
                file_name,
                ParseFailure::Layout(format!(
                    "expected {} fields on line {line}, saw {}",
                    headers.len(),
                    record.len()
                )),
            ));
        }
        // Short records are padded with missing values.
        for (i, col) in raw.iter_mut().enumerate() {
            col.push(record.get(i).unwrap_or_default().to_string());
        }
    }

    let columns = unique_names(headers)
        .into_iter()
        .zip(raw)
        .map(|(name, fields)| csv_column(name, fields))
        .collect();

    Dataset::from_columns(columns)
}

/// Type a column of raw CSV fields. Mixed columns keep the original text.
fn csv_column(name: String, fields: Vec<String>) -> Column {
    let cells = fields.iter().map(|f| guess_cell_type(f)).collect();
    let column = Column::from_cells(name, cells);
    if column.kind != ColumnKind::Text {
        return column;
    }
    let values = fields
        .into_iter()
        .map(|f| {
            if is_missing(&f) {
                CellValue::Null
            } else {
                CellValue::Text(f)
            }
        })
        .collect();
    Column::new(column.name, ColumnKind::Text, values)
}

fn is_missing(s: &str) -> bool {
    MISSING_TOKENS.contains(&s)
}

fn guess_cell_type(s: &str) -> CellValue {
    if is_missing(s) {
        return CellValue::Null;
    }
    let trimmed = s.trim();
    if let Ok(i) = trimmed.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        return if f.is_nan() {
            CellValue::Null
        } else {
            CellValue::Float(f)
        };
    }
    match trimmed {
        "True" | "TRUE" | "true" => CellValue::Bool(true),
        "False" | "FALSE" | "false" => CellValue::Bool(false),
        _ => CellValue::Text(s.to_string()),
    }
}

/// Disambiguate repeated header names as `name`, `name.1`, `name.2`, …
fn unique_names(headers: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut names = Vec::with_capacity(headers.len());
    for header in headers {
        let mut candidate = header.clone();
        while taken.contains(&candidate) {
            let n = counts.entry(header.clone()).or_insert(0);
            *n += 1;
            candidate = format!("{header}.{n}");
        }
        taken.insert(candidate.clone());
        names.push(candidate);
    }
    names
}

// ---------------------------------------------------------------------------
// XLSX loader
// ---------------------------------------------------------------------------

fn load_xlsx(file_name: &str, bytes: &[u8]) -> Result<Dataset, PipelineError> {
    let mut workbook: Xlsx<_> =
        Xlsx::new(Cursor::new(bytes)).map_err(|e| PipelineError::parse(file_name, e))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| {
            PipelineError::parse(
                file_name,
                ParseFailure::Layout("workbook has no worksheets".into()),
            )
        })?
        .map_err(|e| PipelineError::parse(file_name, e))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Err(PipelineError::parse(
            file_name,
            ParseFailure::Layout("no columns to parse from file".into()),
        ));
    };

    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Data::Empty => format!("Unnamed: {i}"),
            other => header_text(other),
        })
        .collect();

    let mut cells: Vec<Vec<CellValue>> = vec![Vec::new(); headers.len()];
    for row in rows {
        for (col, cell) in cells.iter_mut().zip(row.iter()) {
            col.push(xlsx_cell(cell));
        }
    }

    let columns = unique_names(headers)
        .into_iter()
        .zip(cells)
        .map(|(name, values)| Column::from_cells(name, values))
        .collect();

    Dataset::from_columns(columns)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

/// Convert a spreadsheet cell. Integral floats become integers, error cells
/// and missing-value text become `Null`.
fn xlsx_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Null,
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => CellValue::Integer(*f as i64),
        Data::Float(f) if f.is_nan() => CellValue::Null,
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) if is_missing(s) => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(_) | Data::DateTimeIso(_) => match cell.as_datetime() {
            Some(dt) => CellValue::Date(dt.to_string()),
            None => CellValue::Text(cell.to_string()),
        },
        other => CellValue::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_format_case_insensitively() {
        assert_eq!(SourceFormat::from_file_name("a.csv").unwrap(), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_file_name("B.XLSX").unwrap(), SourceFormat::Xlsx);
    }

    #[test]
    fn rejects_unknown_extensions() {
        let err = load_bytes("data.txt", b"A\n1\n").unwrap_err();
        match err {
            PipelineError::UnsupportedFormat { extension, .. } => assert_eq!(extension, ".txt"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(
            SourceFormat::from_file_name("README"),
            Err(PipelineError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn infers_column_types_from_csv() {
        let ds = load_bytes("t.csv", b"A,B,C,D\n1,x,1.5,True\n2,,2,false\n").unwrap();
        let kinds: Vec<ColumnKind> = ds.columns().iter().map(|c| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ColumnKind::Numeric,
                ColumnKind::Text,
                ColumnKind::Numeric,
                ColumnKind::Boolean
            ]
        );
        assert_eq!(ds.column("A").unwrap().values[1], CellValue::Integer(2));
        assert!(ds.column("B").unwrap().values[1].is_null());
        assert_eq!(ds.column("C").unwrap().values[1], CellValue::Float(2.0));
    }

    #[test]
    fn mixed_csv_column_keeps_original_text() {
        let ds = load_bytes("t.csv", b"code\n007\nabc\nNA\n").unwrap();
        let col = ds.column("code").unwrap();
        assert_eq!(col.kind, ColumnKind::Text);
        assert_eq!(col.values[0], CellValue::Text("007".into()));
        assert!(col.values[2].is_null());
    }

    #[test]
    fn repeated_headers_are_made_unique() {
        let ds = load_bytes("t.csv", b"a,a,a\n1,2,3\n").unwrap();
        assert_eq!(ds.column_names(), vec!["a", "a.1", "a.2"]);
    }

    #[test]
    fn ragged_csv_is_a_parse_error() {
        let err = load_bytes("t.csv", b"a,b\n1,2,3\n").unwrap_err();
        assert!(matches!(err, PipelineError::Parse { .. }));
    }

    #[test]
    fn short_csv_rows_are_padded_with_missing_values() {
        let ds = load_bytes("t.csv", b"A,B\n1,x\n2\n").unwrap();
        assert_eq!(ds.num_rows(), 2);
        assert!(ds.column("B").unwrap().values[1].is_null());
        assert_eq!(ds.column("A").unwrap().values[1], CellValue::Integer(2));
    }

    #[test]
    fn blank_csv_headers_are_named_by_position() {
        let ds = load_bytes("t.csv", b"A,,\n1,2,3\n").unwrap();
        assert_eq!(ds.column_names(), vec!["A", "Unnamed: 1", "Unnamed: 2"]);
    }

    #[test]
    fn nan_fields_load_as_missing() {
        let ds = load_bytes("t.csv", b"A\n2\nNAN\n+nan\n4\n").unwrap();
        let col = ds.column("A").unwrap();
        assert_eq!(col.kind, ColumnKind::Numeric);
        assert_eq!(col.null_count(), 2);
        assert_eq!(col.values[0], CellValue::Float(2.0));
    }

    #[test]
    fn spreadsheet_dates_load_as_date_column() {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        let format = Format::new().set_num_format("yyyy-mm-dd");
        let when = ExcelDateTime::from_ymd(2024, 3, 15).unwrap();
        sheet.write_string(0, 0, "shipped").unwrap();
        sheet.write_datetime_with_format(1, 0, &when, &format).unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let ds = load_bytes("t.xlsx", &bytes).unwrap();
        let col = ds.column("shipped").unwrap();
        assert_eq!(col.kind, ColumnKind::Date);
        assert_eq!(col.values[0], CellValue::Date("2024-03-15 00:00:00".into()));
    }

    #[test]
    fn empty_csv_is_a_parse_error() {
        let err = load_bytes("t.csv", b"").unwrap_err();
        assert!(matches!(err, PipelineError::Parse { .. }));
    }

    #[test]
    fn garbage_xlsx_is_a_parse_error() {
        let err = load_bytes("t.xlsx", b"definitely not a zip archive").unwrap_err();
        assert!(matches!(err, PipelineError::Parse { .. }));
    }
}
