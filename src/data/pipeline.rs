use serde::{Deserialize, Serialize};

use super::clean::{apply_cleaning, CleaningOp};
use super::error::PipelineError;
use super::export::{export, ExportTarget, ExportedFile};
use super::insight::FileSummary;
use super::loader::load_bytes;
use super::select::{project, ColumnSelection};

// ---------------------------------------------------------------------------
// Options for one run
// ---------------------------------------------------------------------------

/// What to do with every uploaded file. Also the on-disk recipe format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepOptions {
    /// Cleaning operations; run once each, duplicates before fill.
    pub cleaning: Vec<CleaningOp>,
    /// Columns to keep; empty keeps all.
    pub columns: ColumnSelection,
    pub target: ExportTarget,
}

/// Result of sweeping one file.
#[derive(Debug, Clone)]
pub struct SweepReport {
    pub summary: FileSummary,
    pub rows_in: usize,
    pub rows_out: usize,
    pub columns_out: usize,
    pub output: ExportedFile,
}

/// One entry of a batch run; the error, if any, belongs to this file only.
#[derive(Debug)]
pub struct SweepOutcome {
    pub file_name: String,
    pub result: Result<SweepReport, PipelineError>,
}

// ---------------------------------------------------------------------------
// Runs
// ---------------------------------------------------------------------------

/// Ingest, clean, project and export a single upload.
pub fn sweep(
    file_name: &str,
    bytes: &[u8],
    options: &SweepOptions,
) -> Result<SweepReport, PipelineError> {
    let summary = FileSummary::new(file_name, bytes.len())?;
    let dataset = load_bytes(file_name, bytes)?;
    log::info!(
        "Loaded `{file_name}` ({} KB): {} rows, columns {:?}",
        summary.size_kb(),
        dataset.num_rows(),
        dataset.column_names()
    );

    let cleaned = apply_cleaning(&dataset, &options.cleaning);
    let projected = project(&cleaned, &options.columns)?;
    let output = export(&projected, file_name, options.target)?;

    log::info!(
        "Converted `{file_name}` to {} as `{}` ({} of {} rows kept)",
        options.target,
        output.file_name,
        projected.num_rows(),
        dataset.num_rows()
    );

    Ok(SweepReport {
        summary,
        rows_in: dataset.num_rows(),
        rows_out: projected.num_rows(),
        columns_out: projected.num_columns(),
        output,
    })
}

/// Sweep every file in turn. A failing file is logged and reported in its
/// outcome; the remaining files are still processed.
pub fn sweep_all<'a, I>(files: I, options: &SweepOptions) -> Vec<SweepOutcome>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    files
        .into_iter()
        .map(|(file_name, bytes)| {
            let result = sweep(file_name, bytes, options);
            if let Err(e) = &result {
                log::error!("Skipping `{file_name}`: {e}");
            }
            SweepOutcome {
                file_name: file_name.to_string(),
                result,
            }
        })
        .collect()
}
