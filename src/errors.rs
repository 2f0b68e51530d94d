use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    IO(String),
    #[error("csv error: {0}")]
    Csv(String),
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
    #[error("lookup configuration error: {0}")]
    Lookup(#[from] LookupError),
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self { AppError::IO(format!("{}", e)) }
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self { AppError::Csv(format!("{}", e)) }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self { AppError::IO(format!("json: {}", e)) }
}

/// Structural problems in a site or talkgroup lookup table.
/// Line numbers are 1-based and count the header line.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("{table}: id {id} on line {line} already defined on line {first_line}")]
    Duplicate { table: String, id: i64, first_line: u64, line: u64 },
    #[error("{table}: malformed entry on line {line}: {reason}")]
    Malformed { table: String, line: u64, reason: String },
    #[error("{table}: no entries")]
    Empty { table: String },
    #[error("{table}: {source}")]
    Read { table: String, source: csv::Error },
}
