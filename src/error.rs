use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown item: {0}")]
    UnknownItem(i64),

    #[error("Invalid score '{0}'. Use: 1 (poor), 2 (ok) or 3 (good)")]
    InvalidScore(String),

    #[error("Catalog repeats item id {0}")]
    DuplicateItem(i64),

    #[error("Invalid import: {0}")]
    InvalidImport(String),
}

pub type Result<T> = std::result::Result<T, Error>;
