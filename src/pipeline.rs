use crate::canonical::FinalTable;
use crate::error::Result;
use crate::staging::{find_report_files, stage_file};
use crate::writer::{output_filename, write_table};
use crate::{normalize_file, NormalizeOptions};
use chrono::Local;
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// One file that contributed nothing to the output, and why.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    /// Files staged and normalized successfully.
    pub processed: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
    /// The aggregate workbook, when any rows were produced.
    pub output: Option<PathBuf>,
    pub rows_written: usize,
}

/// Processes every report in the input directory: stage, normalize, merge,
/// write one aggregate workbook.
///
/// Files are isolated from each other; a failure is recorded in the summary
/// and the run continues. Only I/O trouble with the directories themselves
/// aborts the run.
pub fn run_batch(
    input_dir: &Path,
    processed_dir: &Path,
    output_dir: &Path,
    options: &NormalizeOptions,
) -> Result<RunSummary> {
    let files = find_report_files(input_dir)?;
    if files.is_empty() {
        info!("no report files in {}", input_dir.display());
        return Ok(RunSummary::default());
    }

    let mut summary = RunSummary::default();
    let mut tables: Vec<FinalTable> = Vec::new();

    for path in files {
        let staged = match stage_file(&path, processed_dir, &options.load) {
            Ok(staged) => staged,
            Err(e) => {
                error!("failed to stage {}: {}", path.display(), e);
                summary.failures.push(FileFailure {
                    path,
                    error: e.to_string(),
                });
                continue;
            }
        };

        match normalize_file(&staged, options) {
            Ok(table) => {
                if table.is_empty() {
                    warn!("{}: no case tables survived", staged.display());
                }
                summary.processed.push(staged);
                tables.push(table);
            }
            Err(e) => {
                error!("failed to normalize {}: {}", staged.display(), e);
                summary.failures.push(FileFailure {
                    path: staged,
                    error: e.to_string(),
                });
            }
        }
    }

    let merged = FinalTable::merge(tables);
    if merged.is_empty() {
        warn!("no rows produced; skipping output workbook");
        return Ok(summary);
    }

    fs::create_dir_all(output_dir)?;
    let output = output_dir.join(output_filename(Local::now().date_naive()));
    write_table(&merged, &output)?;
    summary.rows_written = merged.rows.len();
    summary.output = Some(output);
    Ok(summary)
}
