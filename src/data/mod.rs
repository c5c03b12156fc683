//! Data layer: the tabular pipeline behind both shells.
//!
//! Architecture:
//! ```text
//!  upload bytes + file name (.csv / .xlsx)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse bytes → Dataset (typed columns)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  clean    │  drop duplicate rows, fill numeric gaps with the mean
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  select   │  keep the chosen columns
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  export   │  Dataset → CSV / XLSX bytes + MIME + file name
//!   └──────────┘
//! ```
//!
//! `pipeline` chains the stages for one file or a batch; `insight` holds the
//! read-only views (file details, preview, chart series).

pub mod clean;
pub mod error;
pub mod export;
pub mod insight;
pub mod loader;
pub mod model;
pub mod pipeline;
pub mod select;

pub use clean::{apply_cleaning, fill_missing_numeric, remove_duplicates, CleaningOp};
pub use error::PipelineError;
pub use export::{export, output_file_name, ExportTarget, ExportedFile};
pub use insight::{chart_series, preview, FileSummary, NumericSeries};
pub use loader::{load_bytes, load_file, SourceFormat};
pub use model::{CellValue, Column, ColumnKind, Dataset};
pub use pipeline::{sweep, sweep_all, SweepOptions, SweepOutcome, SweepReport};
pub use select::{project, ColumnSelection};
