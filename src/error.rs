use thiserror::Error;

#[derive(Error, Debug)]
pub enum NormalizeError {
    #[error("no case tables found in grid: marker {marker:?} never matched in column 0")]
    NoTablesFound { marker: String },

    #[error("block {block}: case column holds more than one name: {names:?}")]
    AmbiguousCaseName { block: usize, names: Vec<String> },

    #[error("block {block}: two columns share the key ({value_type:?}, {units:?})")]
    DuplicateColumnKey {
        block: usize,
        value_type: String,
        units: String,
    },

    #[error("workbook {0} has no readable sheets")]
    NoSheets(String),

    #[error("spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("workbook write error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),

    #[error("glob pattern error: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
