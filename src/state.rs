use std::collections::BTreeSet;
use std::path::Path;

use data_sweeper::data::{
    apply_cleaning, load_bytes, project, CleaningOp, ColumnSelection, Dataset, ExportTarget,
    ExportedFile, FileSummary, PipelineError,
};

// ---------------------------------------------------------------------------
// Per-file state
// ---------------------------------------------------------------------------

/// Outcome of the last action on a file, shown under its section.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Everything the UI keeps for one uploaded file.
///
/// `source` is never modified; `view` is recomputed from it through the
/// pipeline whenever a cleaning toggle or the column selection changes.
pub struct FileSession {
    pub summary: FileSummary,
    pub source: Dataset,

    /// Whether the cleaning options are shown / in effect.
    pub cleaning_enabled: bool,
    pub remove_duplicates: bool,
    pub fill_missing: bool,

    /// Columns ticked for export (all by default).
    pub selected: BTreeSet<String>,

    pub show_insights: bool,
    pub target: ExportTarget,

    /// Cleaned and projected table (cached).
    pub view: Dataset,
    pub notice: Option<Notice>,
}

impl FileSession {
    pub fn new(summary: FileSummary, source: Dataset) -> Self {
        let selected = source.column_names().into_iter().collect();
        let view = source.clone();
        FileSession {
            summary,
            source,
            cleaning_enabled: false,
            remove_duplicates: false,
            fill_missing: false,
            selected,
            show_insights: false,
            target: ExportTarget::default(),
            view,
            notice: None,
        }
    }

    pub fn cleaning_ops(&self) -> Vec<CleaningOp> {
        if !self.cleaning_enabled {
            return Vec::new();
        }
        let mut ops = Vec::new();
        if self.remove_duplicates {
            ops.push(CleaningOp::RemoveDuplicates);
        }
        if self.fill_missing {
            ops.push(CleaningOp::FillMissingNumeric);
        }
        ops
    }

    /// Selection in dataset column order. Nothing ticked means everything.
    pub fn selection(&self) -> ColumnSelection {
        ColumnSelection::new(
            self.source
                .column_names()
                .into_iter()
                .filter(|name| self.selected.contains(name)),
        )
    }

    /// Recompute `view` after a toggle changed.
    pub fn refresh(&mut self) {
        let cleaned = apply_cleaning(&self.source, &self.cleaning_ops());
        self.view = match project(&cleaned, &self.selection()) {
            Ok(view) => view,
            Err(e) => {
                log::warn!("{}: {e}", self.summary.file_name);
                cleaned
            }
        };
    }

    /// Toggle one cleaning operation and report what it did.
    pub fn set_cleaning(&mut self, op: CleaningOp, on: bool) {
        match op {
            CleaningOp::RemoveDuplicates => self.remove_duplicates = on,
            CleaningOp::FillMissingNumeric => self.fill_missing = on,
        }
        let rows_before = self.view.num_rows();
        self.refresh();
        self.notice = on.then(|| {
            Notice::Success(match op {
                CleaningOp::RemoveDuplicates => format!(
                    "Duplicates removed: {} row(s) dropped",
                    rows_before.saturating_sub(self.view.num_rows())
                ),
                CleaningOp::FillMissingNumeric => {
                    "Missing values replaced with column averages".to_string()
                }
            })
        });
    }

    pub fn toggle_column(&mut self, name: &str) {
        if !self.selected.remove(name) {
            self.selected.insert(name.to_string());
        }
        self.refresh();
    }

    /// Serialize the current view for the chosen target.
    pub fn export(&self) -> Result<ExportedFile, PipelineError> {
        data_sweeper::data::export(&self.view, &self.summary.file_name, self.target)
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// A file that could not be loaded, kept so the UI can list it.
#[derive(Debug, Clone)]
pub struct LoadFailure {
    pub file_name: String,
    pub message: String,
}

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    pub sessions: Vec<FileSession>,
    pub failures: Vec<LoadFailure>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl AppState {
    /// Parse an upload and add it as a new session; failures are recorded
    /// and never affect the files already loaded.
    pub fn ingest(&mut self, file_name: &str, bytes: &[u8]) {
        let loaded = FileSummary::new(file_name, bytes.len())
            .and_then(|summary| Ok((summary, load_bytes(file_name, bytes)?)));
        match loaded {
            Ok((summary, dataset)) => {
                log::info!(
                    "Loaded {} rows with columns {:?} from `{file_name}`",
                    dataset.num_rows(),
                    dataset.column_names()
                );
                self.sessions.push(FileSession::new(summary, dataset));
            }
            Err(e) => {
                log::error!("Failed to load `{file_name}`: {e}");
                self.failures.push(LoadFailure {
                    file_name: file_name.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    /// Read and ingest files picked from disk.
    pub fn open_paths(&mut self, paths: &[impl AsRef<Path>]) {
        let failures_before = self.failures.len();
        for path in paths {
            let path = path.as_ref();
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            match std::fs::read(path) {
                Ok(bytes) => self.ingest(&file_name, &bytes),
                Err(e) => {
                    log::error!("Failed to read {}: {e}", path.display());
                    self.failures.push(LoadFailure {
                        file_name,
                        message: e.to_string(),
                    });
                }
            }
        }
        let failed = self.failures.len() - failures_before;
        self.status_message = (failed > 0).then(|| format!("{failed} file(s) could not be loaded"));
    }

    pub fn remove(&mut self, index: usize) {
        if index < self.sessions.len() {
            let session = self.sessions.remove(index);
            log::debug!("Closed `{}`", session.summary.file_name);
        }
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
        self.failures.clear();
        self.status_message = None;
    }
}
