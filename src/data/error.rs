use thiserror::Error;

use super::export::ExportTarget;

// ---------------------------------------------------------------------------
// Pipeline errors
// ---------------------------------------------------------------------------

/// Everything that can go wrong while sweeping a single file.
///
/// All variants are local to one file: callers report them and move on to
/// the next upload.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("unsupported file format: `{extension}` (expected .csv or .xlsx)")]
    UnsupportedFormat { file_name: String, extension: String },

    #[error("error reading `{file_name}`: {source}")]
    Parse {
        file_name: String,
        #[source]
        source: ParseFailure,
    },

    #[error("error during conversion to {target}: {source}")]
    Serialization {
        target: ExportTarget,
        #[source]
        source: SerializeFailure,
    },

    #[error("unknown column `{0}`")]
    UnknownColumn(String),

    #[error("duplicate column name `{0}`")]
    DuplicateColumn(String),

    #[error("column `{column}` has {got} values, expected {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        got: usize,
    },
}

impl PipelineError {
    pub(crate) fn parse(file_name: &str, source: impl Into<ParseFailure>) -> Self {
        PipelineError::Parse {
            file_name: file_name.to_string(),
            source: source.into(),
        }
    }

    pub(crate) fn serialization(target: ExportTarget, source: impl Into<SerializeFailure>) -> Self {
        PipelineError::Serialization {
            target,
            source: source.into(),
        }
    }
}

/// Underlying decode failure wrapped by [`PipelineError::Parse`].
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Xlsx(#[from] calamine::XlsxError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Layout(String),
}

/// Underlying encode failure wrapped by [`PipelineError::Serialization`].
#[derive(Debug, Error)]
pub enum SerializeFailure {
    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("{0}")]
    Unsupported(String),
}
