use std::fmt;

/// Errors surfaced by the Index Store.
#[derive(Debug)]
pub enum StoreError {
    Pool(r2d2::Error),
    Sqlite(rusqlite::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Pool(err) => write!(f, "connection pool error: {err}"),
            StoreError::Sqlite(err) => write!(f, "storage error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<r2d2::Error> for StoreError {
    fn from(err: r2d2::Error) -> Self {
        StoreError::Pool(err)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Sqlite(err)
    }
}
