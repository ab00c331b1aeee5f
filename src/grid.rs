use calamine::{Data, DataType, Range};
use chrono::{NaiveDate, NaiveDateTime};

/// A single untyped cell value as it came out of the workbook.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
}

static EMPTY_CELL: Cell = Cell::Empty;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Borrowed text content, for text cells only.
    pub fn text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Renders any cell as display text. Empty cells render as "".
    pub fn display_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) => n.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Bool(b) => b.to_string(),
        }
    }

    /// Numeric coercion: numbers as-is, numeric text with thousands
    /// separators stripped.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n),
            Cell::Text(s) => s.trim().replace(',', "").parse().ok(),
            _ => None,
        }
    }

    /// Date coercion: date cells as-is, text cells against a fixed set of
    /// formats. Everything else is not a date.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Cell::Date(d) => Some(*d),
            Cell::Text(s) => parse_date_text(s),
            _ => None,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<NaiveDate> for Cell {
    fn from(d: NaiveDate) -> Self {
        Cell::Date(d)
    }
}

/// Lenient text-to-date coercion used for date columns and embedded report
/// dates.
pub fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }
    None
}

/// An immutable 2-D grid of raw cell values, addressed by zero-based
/// (row, column) in sheet coordinates.
#[derive(Debug, Clone, Default)]
pub struct CellGrid {
    rows: Vec<Vec<Cell>>,
    width: usize,
}

impl CellGrid {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        Self { rows, width }
    }

    /// Builds a grid from a calamine range, re-anchored to sheet coordinates
    /// (calamine ranges start at the first used cell, not at A1) with the
    /// first `skip_rows` sheet rows discarded.
    pub fn from_range(range: &Range<Data>, skip_rows: usize) -> Self {
        let (start_row, start_col) = match range.start() {
            Some((r, c)) => (r as usize, c as usize),
            None => return Self::default(),
        };

        let mut rows: Vec<Vec<Cell>> = Vec::new();
        for _ in 0..start_row.saturating_sub(skip_rows) {
            rows.push(Vec::new());
        }
        let skip_in_range = skip_rows.saturating_sub(start_row);
        for source_row in range.rows().skip(skip_in_range) {
            let mut row = vec![Cell::Empty; start_col];
            row.extend(source_row.iter().map(convert_cell));
            rows.push(row);
        }
        Self::new(rows)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Cell at (row, col); out-of-range addresses read as empty.
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY_CELL)
    }

    pub fn is_row_empty(&self, row: usize) -> bool {
        match self.rows.get(row) {
            Some(r) => r.iter().all(Cell::is_empty),
            None => true,
        }
    }
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty | Data::Error(_) | Data::DurationIso(_) => Cell::Empty,
        Data::String(s) => {
            if s.trim().is_empty() {
                Cell::Empty
            } else {
                Cell::Text(s.clone())
            }
        }
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => match data.as_datetime() {
            Some(datetime) => Cell::Date(datetime.date()),
            None => Cell::Empty,
        },
    }
}
