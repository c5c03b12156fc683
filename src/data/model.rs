use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

use super::error::PipelineError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the common dataframe dtypes.
///
/// Equality, ordering and hashing are total (floats compare by
/// `total_cmp` / bit pattern, with `-0.0` folded into `0.0`) so whole rows
/// can be used as set keys when looking for duplicates. Two missing cells
/// compare equal.
#[derive(Debug, Clone)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Date/time read from a spreadsheet, kept as `YYYY-MM-DD HH:MM:SS` text.
    Date(String),
    Null,
}

impl CellValue {
    fn rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Bool(_) => 1,
            CellValue::Integer(_) => 2,
            CellValue::Float(_) => 3,
            CellValue::Text(_) => 4,
            CellValue::Date(_) => 5,
        }
    }

    /// Interpret the value as an `f64` (numeric cells only).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Missing value: `Null`, or a float NaN that slipped past ingestion.
    pub fn is_null(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }

    /// Text written into a CSV field for this value.
    ///
    /// Integral floats keep a trailing `.0` so the column reads back as
    /// floating point; missing values become an empty field.
    pub fn to_field(&self) -> String {
        match self {
            CellValue::Text(s) | CellValue::Date(s) => s.clone(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(v) => format_float(*v),
            CellValue::Bool(true) => "True".to_string(),
            CellValue::Bool(false) => "False".to_string(),
            CellValue::Null => String::new(),
        }
    }
}

fn format_float(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else if v.is_infinite() {
        if v > 0.0 { "inf".to_string() } else { "-inf".to_string() }
    } else if v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{v:.1}")
    } else {
        format!("{v}")
    }
}

/// One bit pattern per float value: signed zeros and NaN payloads collapse.
fn canonical(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use CellValue::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => canonical(*a).total_cmp(&canonical(*b)),
            (Text(a), Text(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => canonical(*f).to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Column – a named, typed sequence of cells
// ---------------------------------------------------------------------------

/// Declared type of a column, inferred once at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Numeric,
    Boolean,
    Date,
    Text,
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Numeric => "number",
            ColumnKind::Boolean => "bool",
            ColumnKind::Date => "date",
            ColumnKind::Text => "text",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind, values: Vec<CellValue>) -> Self {
        Column {
            name: name.into(),
            kind,
            values,
        }
    }

    /// Build a column from loosely typed cells, inferring its kind.
    ///
    /// * every non-missing cell numeric → `Numeric`; stored as floats when
    ///   any cell is missing or fractional, otherwise as integers
    /// * every non-missing cell boolean (or date) → `Boolean` (`Date`)
    /// * anything else → `Text`, with non-text cells rendered as text
    ///
    /// A column without any non-missing cell is `Numeric`. NaN cells are
    /// stored as `Null`.
    pub fn from_cells(name: impl Into<String>, cells: Vec<CellValue>) -> Self {
        let cells: Vec<CellValue> = cells
            .into_iter()
            .map(|c| if c.is_null() { CellValue::Null } else { c })
            .collect();
        let kind = infer_kind(&cells);
        let values = match kind {
            ColumnKind::Numeric => {
                let as_float = cells
                    .iter()
                    .any(|c| matches!(c, CellValue::Null | CellValue::Float(_)));
                if as_float {
                    cells
                        .into_iter()
                        .map(|c| match c.as_f64() {
                            Some(v) => CellValue::Float(v),
                            None => CellValue::Null,
                        })
                        .collect()
                } else {
                    cells
                }
            }
            ColumnKind::Boolean | ColumnKind::Date => cells,
            ColumnKind::Text => cells
                .into_iter()
                .map(|c| match c {
                    CellValue::Null | CellValue::Text(_) => c,
                    other => CellValue::Text(other.to_field()),
                })
                .collect(),
        };
        Column::new(name, kind, values)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Numeric
    }

    /// Number of missing cells.
    pub fn null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_null()).count()
    }
}

fn infer_kind(cells: &[CellValue]) -> ColumnKind {
    let mut present = cells.iter().filter(|c| !c.is_null()).peekable();
    let Some(first) = present.peek() else {
        return ColumnKind::Numeric;
    };
    let candidate = match first {
        CellValue::Integer(_) | CellValue::Float(_) => ColumnKind::Numeric,
        CellValue::Bool(_) => ColumnKind::Boolean,
        CellValue::Date(_) => ColumnKind::Date,
        _ => return ColumnKind::Text,
    };
    let consistent = present.all(|c| match candidate {
        ColumnKind::Numeric => c.is_numeric(),
        ColumnKind::Boolean => matches!(c, CellValue::Bool(_)),
        ColumnKind::Date => matches!(c, CellValue::Date(_)),
        ColumnKind::Text => true,
    });
    if consistent {
        candidate
    } else {
        ColumnKind::Text
    }
}

// ---------------------------------------------------------------------------
// Dataset – ordered, equal-length, uniquely named columns
// ---------------------------------------------------------------------------

/// The pipeline's working unit. Every transform takes a `&Dataset` and
/// returns a new one; nothing mutates a dataset in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: Vec<Column>,
    rows: usize,
}

impl Dataset {
    /// Assemble a dataset, checking that names are unique and that every
    /// column has the same number of rows.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, PipelineError> {
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(PipelineError::DuplicateColumn(col.name.clone()));
            }
        }
        let rows = columns.first().map(Column::len).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != rows) {
            return Err(PipelineError::ColumnLength {
                column: bad.name.clone(),
                expected: rows,
                got: bad.len(),
            });
        }
        Ok(Dataset { columns, rows })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn num_rows(&self) -> usize {
        self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Cells of row `index`, in column order.
    pub fn row(&self, index: usize) -> Vec<&CellValue> {
        self.columns.iter().map(|c| &c.values[index]).collect()
    }

    /// Keep only the rows at `indices` (in the given order).
    pub fn take_rows(&self, indices: &[usize]) -> Dataset {
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                kind: c.kind,
                values: indices.iter().map(|&i| c.values[i].clone()).collect(),
            })
            .collect();
        Dataset {
            columns,
            rows: indices.len(),
        }
    }

    /// First `n` rows.
    pub fn head(&self, n: usize) -> Dataset {
        let indices: Vec<usize> = (0..n.min(self.rows)).collect();
        self.take_rows(&indices)
    }

    /// Assemble from columns already known to hold `rows` cells each.
    pub(crate) fn with_columns(columns: Vec<Column>, rows: usize) -> Dataset {
        debug_assert!(columns.iter().all(|c| c.len() == rows));
        Dataset { columns, rows }
    }
}
