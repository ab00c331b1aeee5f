use crate::error::{NormalizeError, Result};
use crate::grid::{Cell, CellGrid};
use log::debug;
use serde::{Deserialize, Serialize};

/// Positional conventions of the report template. Sibling templates are a
/// config change, not a code change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Case-insensitive substring marking the header row of a case table in
    /// column 0.
    pub marker: String,
    /// The company name sits this many rows above the marker row.
    pub company_row_offset: usize,
    /// Column holding the company name.
    pub company_col: usize,
    /// Columns conventionally holding the Oil/Gas/NGL net figures. A block
    /// with no data in any of them is a layout artifact, not a case table.
    pub net_value_cols: Vec<usize>,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            marker: "Year".to_string(),
            company_row_offset: 4,
            company_col: 1,
            net_value_cols: vec![1, 2, 3],
        }
    }
}

/// One scenario's sub-table: the header row followed by its data rows, with
/// empty rows dropped and all-empty columns pruned. Owned copy; nothing
/// aliases back into the grid.
#[derive(Debug, Clone)]
pub struct CaseBlock {
    /// Ordinal position of the block within the file, used for the final
    /// row ordering.
    pub index: usize,
    pub company: String,
    pub rows: Vec<Vec<Cell>>,
}

/// Partitions the grid into case blocks at marker rows and recovers company
/// names from the configured offset, forward- then backward-filling gaps.
pub fn segment_grid(grid: &CellGrid, layout: &LayoutOptions) -> Result<Vec<CaseBlock>> {
    let marker = layout.marker.to_lowercase();
    let marker_rows: Vec<usize> = (0..grid.height())
        .filter(|&row| {
            grid.cell(row, 0)
                .text()
                .is_some_and(|text| text.to_lowercase().contains(&marker))
        })
        .collect();

    if marker_rows.is_empty() {
        return Err(NormalizeError::NoTablesFound {
            marker: layout.marker.clone(),
        });
    }

    let companies = recover_companies(grid, layout, &marker_rows);

    let mut blocks = Vec::new();
    for (ordinal, &start) in marker_rows.iter().enumerate() {
        let end = marker_rows
            .get(ordinal + 1)
            .copied()
            .unwrap_or_else(|| grid.height());

        let row_indices: Vec<usize> =
            (start..end).filter(|&row| !grid.is_row_empty(row)).collect();

        // The marker row only carries headers; viability is judged on the
        // data rows below it.
        let has_net_data = row_indices.iter().skip(1).any(|&row| {
            layout
                .net_value_cols
                .iter()
                .any(|&col| !grid.cell(row, col).is_empty())
        });
        if !has_net_data {
            debug!("dropping empty block at row {} (no net-column data)", start);
            continue;
        }

        let rows = copy_block_rows(grid, &row_indices);
        blocks.push(CaseBlock {
            index: blocks.len(),
            company: companies[ordinal].clone().unwrap_or_default(),
            rows,
        });
    }

    debug!(
        "segmented {} marker row(s) into {} usable block(s)",
        marker_rows.len(),
        blocks.len()
    );
    Ok(blocks)
}

fn recover_companies(
    grid: &CellGrid,
    layout: &LayoutOptions,
    marker_rows: &[usize],
) -> Vec<Option<String>> {
    let mut companies: Vec<Option<String>> = marker_rows
        .iter()
        .map(|&row| {
            row.checked_sub(layout.company_row_offset)
                .map(|company_row| grid.cell(company_row, layout.company_col).display_text())
                .filter(|name| !name.is_empty())
        })
        .collect();

    for i in 1..companies.len() {
        if companies[i].is_none() {
            companies[i] = companies[i - 1].clone();
        }
    }
    for i in (0..companies.len().saturating_sub(1)).rev() {
        if companies[i].is_none() {
            companies[i] = companies[i + 1].clone();
        }
    }
    companies
}

/// Copies the kept rows, keeping only columns that are non-empty somewhere in
/// the block. Column 0 always survives since it holds the marker.
fn copy_block_rows(grid: &CellGrid, row_indices: &[usize]) -> Vec<Vec<Cell>> {
    let kept_cols: Vec<usize> = (0..grid.width())
        .filter(|&col| {
            row_indices
                .iter()
                .any(|&row| !grid.cell(row, col).is_empty())
        })
        .collect();

    row_indices
        .iter()
        .map(|&row| {
            kept_cols
                .iter()
                .map(|&col| grid.cell(row, col).clone())
                .collect()
        })
        .collect()
}
