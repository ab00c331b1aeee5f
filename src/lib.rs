//! # Oildata Normalizer
//!
//! Extracts financial/production forecast data from semi-structured
//! reservoir-economics report workbooks and reshapes it into one normalized
//! long-format table.
//!
//! A report sheet holds an unknown number of independently laid-out "case"
//! sub-tables, one per economic scenario, found by scanning for marker rows.
//! Each sub-table's compound headers ("Oil Net\n(MSTB)") are decomposed into
//! (ValueType, Units) keys, the per-date rows are pivoted into long form, and
//! the combined result is ordered by a fixed line-item taxonomy and
//! chronological date axis.
//!
//! ## Example
//!
//! ```rust,ignore
//! use oildata_normalizer::{normalize_file, NormalizeOptions};
//!
//! let options = NormalizeOptions::default();
//! let table = normalize_file("reports/2024-03-01_economics.xls".as_ref(), &options)?;
//! for row in &table.rows {
//!     println!("{} / {} ({})", row.case_name, row.value_type, row.units);
//! }
//! ```

pub mod canonical;
pub mod error;
pub mod grid;
pub mod header;
pub mod loader;
pub mod pipeline;
pub mod reshape;
pub mod segment;
pub mod staging;
pub mod writer;

pub use canonical::{canonicalize, FinalTable, TableRow, ValueTypeTaxonomy};
pub use error::{NormalizeError, Result};
pub use grid::{Cell, CellGrid};
pub use header::{decompose_header, ColumnKey, HeaderLayout};
pub use loader::{load_grid, LoadOptions};
pub use pipeline::{run_batch, FileFailure, RunSummary};
pub use reshape::{reshape_block, BlockRows, LongRow};
pub use segment::{segment_grid, CaseBlock, LayoutOptions};
pub use staging::{find_report_files, stage_file};
pub use writer::{output_filename, write_table};

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Everything the pipeline needs to know about a template: how to load it,
/// where its landmarks sit, and how to order the output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    pub load: LoadOptions,
    pub layout: LayoutOptions,
    pub taxonomy: ValueTypeTaxonomy,
}

impl NormalizeOptions {
    /// Loads options from a JSON document; absent fields keep their
    /// defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }
}

/// Normalizes one loaded grid into a final table.
///
/// Block-level failures (an ambiguous case column, a duplicate column key)
/// drop that block and continue; a grid without any marker rows is a
/// file-level error.
pub fn normalize_grid(grid: &CellGrid, options: &NormalizeOptions) -> Result<FinalTable> {
    let blocks = segment_grid(grid, &options.layout)?;
    info!("segmented {} case block(s)", blocks.len());

    let mut block_rows = Vec::new();
    for block in &blocks {
        let layout = match decompose_header(block) {
            Ok(layout) => layout,
            Err(e) => {
                warn!("dropping block {} ({}): {}", block.index, block.company, e);
                continue;
            }
        };
        match reshape_block(block, &layout) {
            Ok(rows) => {
                debug!(
                    "block {} ({}): {} value row(s)",
                    block.index,
                    block.company,
                    rows.len()
                );
                block_rows.push(BlockRows {
                    block_index: block.index,
                    rows,
                });
            }
            Err(e) => {
                warn!("dropping block {} ({}): {}", block.index, block.company, e);
            }
        }
    }

    Ok(canonicalize(&block_rows, &options.taxonomy))
}

/// Loads and normalizes one report workbook.
pub fn normalize_file(path: &Path, options: &NormalizeOptions) -> Result<FinalTable> {
    info!("normalizing {}", path.display());
    let grid = load_grid(path, &options.load)?;
    normalize_grid(&grid, options)
}
