use crate::error::{NormalizeError, Result};
use crate::grid::CellGrid;
use calamine::{open_workbook_auto, Reader};
use log::debug;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rows of report boilerplate before the first case table in the source
/// template.
pub const DEFAULT_SKIP_ROWS: usize = 388;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Sheet to read; the first sheet when unset.
    pub sheet: Option<String>,
    /// Number of leading sheet rows discarded before segmentation.
    pub skip_rows: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sheet: None,
            skip_rows: DEFAULT_SKIP_ROWS,
        }
    }
}

/// Reads one worksheet into an untyped cell grid. No interpretation happens
/// here; the segmenter owns all layout knowledge.
pub fn load_grid(path: &Path, options: &LoadOptions) -> Result<CellGrid> {
    debug!(
        "loading {} (sheet: {:?}, skip_rows: {})",
        path.display(),
        options.sheet,
        options.skip_rows
    );

    let mut workbook = open_workbook_auto(path)?;
    let sheet = match &options.sheet {
        Some(name) => name.clone(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| NormalizeError::NoSheets(path.display().to_string()))?,
    };

    let range = workbook.worksheet_range(&sheet)?;
    let grid = CellGrid::from_range(&range, options.skip_rows);
    debug!(
        "loaded {} rows x {} columns from sheet {:?}",
        grid.height(),
        grid.width(),
        sheet
    );
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_match_template() {
        let options = LoadOptions::default();
        assert_eq!(options.skip_rows, DEFAULT_SKIP_ROWS);
        assert!(options.sheet.is_none());
    }

    #[test]
    fn test_options_deserialize_partially() {
        let options: LoadOptions = serde_json::from_str(r#"{"skip_rows": 0}"#).unwrap();
        assert_eq!(options.skip_rows, 0);
        assert!(options.sheet.is_none());
    }
}
