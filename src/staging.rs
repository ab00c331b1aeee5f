use crate::error::Result;
use crate::grid::{parse_date_text, CellGrid};
use crate::loader::{load_grid, LoadOptions};
use chrono::{DateTime, Local, NaiveDate};
use glob::glob;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Enumerates report workbooks (`*.xls*`) in a directory, sorted for a
/// deterministic processing order.
pub fn find_report_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = dir.join("*.xls*");
    let mut files = Vec::new();
    for entry in glob(&pattern.to_string_lossy())? {
        match entry {
            Ok(path) if path.is_file() => {
                info!("found report file: {}", path.display());
                files.push(path);
            }
            Ok(_) => {}
            Err(e) => warn!("skipping unreadable directory entry: {}", e),
        }
    }
    files.sort();
    Ok(files)
}

/// Moves a report into the processed directory under an identifying
/// date prefix: the workbook's embedded "Date :" label when present,
/// otherwise filesystem creation (or modification) time.
pub fn stage_file(path: &Path, processed_dir: &Path, options: &LoadOptions) -> Result<PathBuf> {
    let date = report_date(path, options);

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staged_name = format!("{}_{}", date.format("%Y-%m-%d"), file_name);

    fs::create_dir_all(processed_dir)?;
    let staged = processed_dir.join(&staged_name);
    fs::rename(path, &staged)?;
    info!("staged {} -> {}", file_name, staged.display());
    Ok(staged)
}

fn report_date(path: &Path, options: &LoadOptions) -> NaiveDate {
    // The label lives in the report preamble, so read without skipping rows.
    let full_sheet = LoadOptions {
        sheet: options.sheet.clone(),
        skip_rows: 0,
    };
    if let Ok(grid) = load_grid(path, &full_sheet) {
        if let Some(date) = embedded_report_date(&grid) {
            debug!("{}: using embedded report date {}", path.display(), date);
            return date;
        }
    }

    match filesystem_date(path) {
        Some(date) => {
            debug!("{}: using filesystem date {}", path.display(), date);
            date
        }
        None => Local::now().date_naive(),
    }
}

/// Scans for a "Date :" label and parses the text after the colon, or the
/// cell to the label's right.
pub fn embedded_report_date(grid: &CellGrid) -> Option<NaiveDate> {
    for row in 0..grid.height() {
        for col in 0..grid.width() {
            let Some(text) = grid.cell(row, col).text() else {
                continue;
            };
            let trimmed = text.trim();
            let Some(prefix) = trimmed.get(..4) else {
                continue;
            };
            if !prefix.eq_ignore_ascii_case("date") {
                continue;
            }
            let rest = trimmed[4..].trim_start();
            let Some(value) = rest.strip_prefix(':') else {
                continue;
            };
            if let Some(date) = parse_date_text(value) {
                return Some(date);
            }
            if let Some(date) = grid.cell(row, col + 1).as_date() {
                return Some(date);
            }
        }
    }
    None
}

fn filesystem_date(path: &Path) -> Option<NaiveDate> {
    let metadata = fs::metadata(path).ok()?;
    // Creation time is unavailable on some Linux filesystems.
    let time = metadata.created().or_else(|_| metadata.modified()).ok()?;
    Some(DateTime::<Local>::from(time).date_naive())
}
