//! Headless batch conversion with the same pipeline as the desktop app.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use data_sweeper::data::{
    load_bytes, preview, sweep_all, CleaningOp, ColumnSelection, ExportTarget, SweepOptions,
};

const EXAMPLES: &str = "\
Examples:
  Deduplicate and convert to Excel:
    sweep --dedupe --to xlsx sales.csv

  Reuse a saved recipe, keeping two columns:
    sweep --recipe tidy.json -c region,amount -o out/ *.xlsx";

/// Clean, trim and convert CSV / Excel files.
#[derive(Parser, Debug)]
#[command(name = "sweep", version, about, long_about = None, after_help = EXAMPLES)]
struct Cli {
    /// Input files (.csv or .xlsx)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// JSON recipe with cleaning, columns and target; flags override it
    #[arg(short = 'r', long)]
    recipe: Option<PathBuf>,

    /// Remove duplicate rows
    #[arg(long)]
    dedupe: bool,

    /// Fill missing numeric values with the column mean
    #[arg(long)]
    fill_missing: bool,

    /// Columns to keep (comma separated); default keeps all
    #[arg(short = 'c', long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Output format
    #[arg(short = 't', long, value_enum)]
    to: Option<TargetArg>,

    /// Directory for the converted files
    #[arg(short = 'o', long, default_value = ".")]
    out_dir: PathBuf,

    /// Print the first N rows of each input and exit without converting
    #[arg(long, value_name = "N")]
    preview: Option<usize>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TargetArg {
    Csv,
    #[value(alias = "excel")]
    Xlsx,
}

impl From<TargetArg> for ExportTarget {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::Csv => ExportTarget::Csv,
            TargetArg::Xlsx => ExportTarget::Spreadsheet,
        }
    }
}

impl Cli {
    /// Recipe (if any) with the command-line flags applied on top.
    fn options(&self) -> Result<SweepOptions> {
        let mut options = match &self.recipe {
            Some(path) => SweepOptions::from_path(path)?,
            None => SweepOptions::default(),
        };
        if self.dedupe && !options.cleaning.contains(&CleaningOp::RemoveDuplicates) {
            options.cleaning.push(CleaningOp::RemoveDuplicates);
        }
        if self.fill_missing && !options.cleaning.contains(&CleaningOp::FillMissingNumeric) {
            options.cleaning.push(CleaningOp::FillMissingNumeric);
        }
        if !self.columns.is_empty() {
            options.columns = ColumnSelection::new(self.columns.iter().map(|c| c.trim()));
        }
        if let Some(to) = self.to {
            options.target = to.into();
        }
        Ok(options)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            log::warn!("{failed} file(s) could not be processed");
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns the number of files that failed.
fn run(cli: &Cli) -> Result<usize> {
    let inputs = read_inputs(&cli.files);
    let mut failed = cli.files.len() - inputs.len();

    if let Some(rows) = cli.preview {
        for (name, bytes) in &inputs {
            match load_bytes(name, bytes) {
                Ok(dataset) => print_preview(name, &preview(&dataset, rows)),
                Err(e) => {
                    log::error!("{e}");
                    failed += 1;
                }
            }
        }
        return Ok(failed);
    }

    let options = cli.options()?;
    std::fs::create_dir_all(&cli.out_dir)
        .with_context(|| format!("creating {}", cli.out_dir.display()))?;

    let mut destinations = Destinations::new(&cli.files);
    let outcomes = sweep_all(
        inputs.iter().map(|(name, bytes)| (name.as_str(), bytes.as_slice())),
        &options,
    );
    for outcome in outcomes {
        let report = match outcome.result {
            Ok(report) => report,
            Err(_) => {
                // already logged by sweep_all
                failed += 1;
                continue;
            }
        };
        let dest = cli.out_dir.join(&report.output.file_name);
        if let Err(e) = destinations
            .claim(&dest)
            .and_then(|()| write_output(&dest, &report.output.bytes))
        {
            log::error!("{}: {e:#}", outcome.file_name);
            failed += 1;
            continue;
        }
        println!(
            "{} -> {} ({} rows, {} columns, {})",
            outcome.file_name,
            dest.display(),
            report.rows_out,
            report.columns_out,
            report.output.mime
        );
    }
    Ok(failed)
}

/// Read every input; unreadable files are logged and left out.
fn read_inputs(paths: &[PathBuf]) -> Vec<(String, Vec<u8>)> {
    paths
        .iter()
        .filter_map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            match std::fs::read(path).with_context(|| format!("reading {}", path.display())) {
                Ok(bytes) => Some((name, bytes)),
                Err(e) => {
                    log::error!("{e:#}");
                    None
                }
            }
        })
        .collect()
}

/// Output paths already spoken for: the inputs and everything written so far.
struct Destinations {
    inputs: HashSet<PathBuf>,
    written: HashSet<PathBuf>,
}

impl Destinations {
    fn new(inputs: &[PathBuf]) -> Self {
        Destinations {
            inputs: inputs.iter().map(|p| resolve(p)).collect(),
            written: HashSet::new(),
        }
    }

    /// Reserve `dest`, refusing to clobber an input or an earlier output.
    fn claim(&mut self, dest: &Path) -> Result<()> {
        let resolved = resolve(dest);
        if self.inputs.contains(&resolved) {
            bail!("refusing to overwrite input file {}", dest.display());
        }
        if !self.written.insert(resolved) {
            bail!("{} was already written in this run", dest.display());
        }
        Ok(())
    }
}

/// Absolute form of `path`; the file itself need not exist yet.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(full) = path.canonicalize() {
        return full;
    }
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    match (dir.canonicalize(), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path.to_path_buf(),
    }
}

fn write_output(dest: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(dest, bytes).with_context(|| format!("writing {}", dest.display()))
}

fn print_preview(name: &str, dataset: &data_sweeper::data::Dataset) {
    println!("== {name}");
    let header: Vec<String> = dataset
        .columns()
        .iter()
        .map(|c| format!("{} ({})", c.name, c.kind))
        .collect();
    println!("{}", header.join(" | "));
    for row in 0..dataset.num_rows() {
        let cells: Vec<String> = dataset.row(row).iter().map(|v| v.to_string()).collect();
        println!("{}", cells.join(" | "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inputs_are_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.csv");
        std::fs::write(&input, "A\n1\n").unwrap();

        let mut destinations = Destinations::new(&[input.clone()]);
        assert!(destinations.claim(&input).is_err());
        assert!(destinations.claim(&dir.path().join(".").join("data.csv")).is_err());
        assert!(destinations.claim(&dir.path().join("data.xlsx")).is_ok());
    }

    #[test]
    fn second_output_with_the_same_name_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let a_csv = dir.path().join("a.csv");
        let a_xlsx = dir.path().join("a.xlsx");
        std::fs::write(&a_csv, "A\n1\n").unwrap();
        std::fs::write(&a_xlsx, "").unwrap();

        let out = dir.path().join("out");
        std::fs::create_dir(&out).unwrap();
        let mut destinations = Destinations::new(&[a_csv, a_xlsx]);
        assert!(destinations.claim(&out.join("a.csv")).is_ok());
        assert!(destinations.claim(&out.join("a.csv")).is_err());
    }

    #[test]
    fn help_lists_examples() {
        use clap::CommandFactory;
        let help = Cli::command().render_help().to_string();
        assert!(help.contains("sweep --dedupe --to xlsx sales.csv"));
    }
}
