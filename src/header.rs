use crate::error::{NormalizeError, Result};
use crate::segment::CaseBlock;
use std::collections::BTreeSet;

/// The (line-item label, unit of measure) pair a data column reports under.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ColumnKey {
    pub value_type: String,
    pub units: String,
}

/// Which block columns carry what: the leading date column, the trailing
/// case-identifier column, and a key for every data column in between.
#[derive(Debug, Clone)]
pub struct HeaderLayout {
    pub date_col: usize,
    pub case_col: usize,
    /// (column index within the block, key), in header order.
    pub columns: Vec<(usize, ColumnKey)>,
}

/// Splits one compound header cell into its key.
///
/// All lines but the last, joined with a space, form the ValueType; the last
/// line, stripped of surrounding parentheses, is the Unit. A header without a
/// line break is all ValueType and carries an empty Unit.
pub fn split_header_cell(text: &str) -> ColumnKey {
    let lines: Vec<&str> = text.split('\n').map(|l| l.trim_matches('\r')).collect();
    if lines.len() < 2 {
        return ColumnKey {
            value_type: text.trim().to_string(),
            units: String::new(),
        };
    }

    let value_type = lines[..lines.len() - 1].join(" ").trim().to_string();
    let units = lines[lines.len() - 1]
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim()
        .to_string();
    ColumnKey { value_type, units }
}

/// Decomposes a block's header row into a column key per data column.
///
/// The first column is the date axis and the last is the case identifier;
/// neither gets a key. Two data columns resolving to the same key make the
/// pivot ill-defined, so that block is rejected.
pub fn decompose_header(block: &CaseBlock) -> Result<HeaderLayout> {
    let header = match block.rows.first() {
        Some(row) => row,
        None => {
            return Ok(HeaderLayout {
                date_col: 0,
                case_col: 0,
                columns: Vec::new(),
            })
        }
    };

    let width = header.len();
    let case_col = width.saturating_sub(1);

    let mut columns = Vec::new();
    let mut seen = BTreeSet::new();
    for col in 1..case_col {
        let key = match header[col].text() {
            Some(text) => split_header_cell(text),
            None => ColumnKey {
                value_type: header[col].display_text(),
                units: String::new(),
            },
        };

        if !seen.insert(key.clone()) {
            return Err(NormalizeError::DuplicateColumnKey {
                block: block.index,
                value_type: key.value_type,
                units: key.units,
            });
        }
        columns.push((col, key));
    }

    Ok(HeaderLayout {
        date_col: 0,
        case_col,
        columns,
    })
}
