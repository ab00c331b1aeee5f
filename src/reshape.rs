use crate::error::{NormalizeError, Result};
use crate::header::HeaderLayout;
use crate::segment::CaseBlock;
use chrono::NaiveDate;
use log::debug;
use std::collections::BTreeMap;

/// One normalized output record: a (case, line item, unit) series over dates.
/// The date map stays sparse until the canonicalizer zero-fills it.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub case_name: String,
    pub value_type: String,
    pub units: String,
    pub values: BTreeMap<NaiveDate, f64>,
}

/// The long rows of one block, tagged with the block's position in the file
/// so the final sort can preserve per-case grouping.
#[derive(Debug, Clone)]
pub struct BlockRows {
    pub block_index: usize,
    pub rows: Vec<LongRow>,
}

/// Pivots a block into long form: one LongRow per column key, carrying that
/// key's full date series.
///
/// Rows whose date cell does not coerce are trailing artifacts and are
/// dropped. If the same key sees the same date twice the later row wins;
/// that situation is tolerated, not endorsed.
pub fn reshape_block(block: &CaseBlock, layout: &HeaderLayout) -> Result<Vec<LongRow>> {
    let mut series: Vec<BTreeMap<NaiveDate, f64>> = vec![BTreeMap::new(); layout.columns.len()];
    let mut case_names: Vec<String> = Vec::new();
    let mut dropped_rows = 0usize;

    for row in block.rows.iter().skip(1) {
        let date = match row.get(layout.date_col).and_then(|cell| cell.as_date()) {
            Some(date) => date,
            None => {
                dropped_rows += 1;
                continue;
            }
        };

        let case = row
            .get(layout.case_col)
            .map(|cell| cell.display_text())
            .unwrap_or_default();
        if !case.is_empty() && !case_names.contains(&case) {
            case_names.push(case);
        }

        for (slot, (col, _)) in layout.columns.iter().enumerate() {
            if let Some(value) = row.get(*col).and_then(|cell| cell.as_number()) {
                series[slot].insert(date, value);
            }
        }
    }

    if dropped_rows > 0 {
        debug!(
            "block {}: dropped {} row(s) with unparseable dates",
            block.index, dropped_rows
        );
    }

    if case_names.len() > 1 {
        return Err(NormalizeError::AmbiguousCaseName {
            block: block.index,
            names: case_names,
        });
    }
    let case_name = case_names.pop().unwrap_or_default();

    Ok(layout
        .columns
        .iter()
        .zip(series)
        .map(|((_, key), values)| LongRow {
            case_name: case_name.clone(),
            value_type: key.value_type.clone(),
            units: key.units.clone(),
            values,
        })
        .collect())
}
