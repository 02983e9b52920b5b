use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("No data rows in {0}")]
    EmptyFile(String),

    #[error("Could not split {0} with delimiter '{1}'")]
    Delimiter(String, char),

    #[error("Unknown format: {0} (expected 'csv' or 'xlsx')")]
    UnknownFormat(String),

    #[error("Invalid column mapping: {0}")]
    BadMapping(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TallyError>;
