use thiserror::Error;

/// Rejections raised before a request reaches the adjuster or the store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("select at least one feature to adjust")]
    EmptySelection,

    #[error("table has no identifier column")]
    MissingIdentifier,

    #[error("identifier column '{0}' cannot be adjusted")]
    IdentifierSelected(String),

    #[error("unknown column: {0}")]
    UnknownColumn(String),

    #[error("duplicate column: {0}")]
    DuplicateColumn(String),

    #[error("column '{0}' cannot be renamed to an empty name")]
    EmptyColumnName(String),

    #[error("column '{column}' cannot be renamed: only columns starting with '{prefix}' are renamable")]
    NotRenamable { column: String, prefix: String },

    #[error("row {row}, column '{column}': '{value}' is not a number")]
    InvalidCell {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("invalid magnitude {0}: must be a finite, non-negative number")]
    InvalidMagnitude(f64),

    #[error("invalid sign '{0}': expected '+' or '-'")]
    InvalidSign(String),
}

#[derive(Debug, Error)]
pub enum NudgeError {
    #[error("not initialized: run 'nudge init'")]
    NotInitialized,

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("history store is closed")]
    StoreClosed,

    #[error("history store: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("spreadsheet: {0}")]
    SpreadsheetRead(#[from] calamine::Error),

    #[error("spreadsheet: {0}")]
    SpreadsheetWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NudgeError>;
