use crate::reshape::{BlockRows, LongRow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The sixteen recognized line-item labels, in report order.
const CANONICAL_VALUE_TYPES: [&str; 16] = [
    "Oil Net",
    "Gas Net",
    "NGL Net",
    "Oil Price",
    "Gas Price",
    "NGL Price",
    "Oil & Gas Rev. Net",
    "Misc. Rev. Net",
    "Costs Net",
    "Taxes Net",
    "Gas Gross",
    "NGL Gross",
    "Oil Gross",
    "Invest. Net",
    "NonDisc. CF Annual",
    "Cum Disc. CF",
];

/// Frozen ValueType ordering table. Determines output row order only; rows
/// with unlisted labels are kept and sort after every listed one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueTypeTaxonomy {
    order: Vec<String>,
}

impl Default for ValueTypeTaxonomy {
    fn default() -> Self {
        Self::new(CANONICAL_VALUE_TYPES.iter().map(|s| s.to_string()).collect())
    }
}

impl ValueTypeTaxonomy {
    pub fn new(order: Vec<String>) -> Self {
        Self { order }
    }

    /// Zero-based rank of an exactly-matching label.
    pub fn rank(&self, value_type: &str) -> Option<usize> {
        self.order.iter().position(|label| label == value_type)
    }

    /// Sort key: listed labels by rank, everything else after them.
    fn sort_rank(&self, value_type: &str) -> usize {
        self.rank(value_type).unwrap_or(self.order.len())
    }
}

/// One row of the final table; `values` is parallel to the table's dates.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub case_name: String,
    pub value_type: String,
    pub units: String,
    pub values: Vec<f64>,
}

/// The normalized output: a frozen chronological date axis and rows ordered
/// by (originating block, taxonomy rank).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalTable {
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<TableRow>,
}

impl FinalTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header row handed to the serialization collaborator, dates formatted
    /// DD/MM/YYYY.
    pub fn header(&self) -> Vec<String> {
        let mut header = vec![
            "CaseName".to_string(),
            "ValueType".to_string(),
            "Units".to_string(),
        ];
        header.extend(self.dates.iter().map(|d| d.format("%d/%m/%Y").to_string()));
        header
    }

    /// Merges per-file tables into one aggregate, re-unioning the date axes
    /// and zero-filling. Row order follows table order, which already encodes
    /// the per-file (block, taxonomy) ordering.
    pub fn merge(tables: Vec<FinalTable>) -> FinalTable {
        let dates: Vec<NaiveDate> = tables
            .iter()
            .flat_map(|t| t.dates.iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut rows = Vec::new();
        for table in tables {
            for row in table.rows {
                let by_date: BTreeMap<NaiveDate, f64> =
                    table.dates.iter().copied().zip(row.values).collect();
                rows.push(TableRow {
                    case_name: row.case_name,
                    value_type: row.value_type,
                    units: row.units,
                    values: dates
                        .iter()
                        .map(|d| by_date.get(d).copied().unwrap_or(0.0))
                        .collect(),
                });
            }
        }
        FinalTable { dates, rows }
    }
}

/// Builds the final table from every block's long rows.
///
/// Dates are unioned across blocks and sorted chronologically; a row missing
/// a value for a unioned date gets an explicit 0, which makes a missing
/// observation indistinguishable from a reported zero. The row sort is
/// stable on (block index, taxonomy rank), so per-case grouping survives and
/// unlisted labels trail in source order.
pub fn canonicalize(blocks: &[BlockRows], taxonomy: &ValueTypeTaxonomy) -> FinalTable {
    let dates: Vec<NaiveDate> = blocks
        .iter()
        .flat_map(|b| b.rows.iter())
        .flat_map(|row| row.values.keys().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut ordered: Vec<(usize, usize, &LongRow)> = blocks
        .iter()
        .flat_map(|block| {
            block
                .rows
                .iter()
                .map(|row| (block.block_index, taxonomy.sort_rank(&row.value_type), row))
        })
        .collect();
    ordered.sort_by_key(|(block, rank, _)| (*block, *rank));

    let rows = ordered
        .into_iter()
        .map(|(_, _, row)| TableRow {
            case_name: row.case_name.clone(),
            value_type: row.value_type.clone(),
            units: row.units.clone(),
            values: dates
                .iter()
                .map(|d| row.values.get(d).copied().unwrap_or(0.0))
                .collect(),
        })
        .collect();

    FinalTable { dates, rows }
}
