use thiserror::Error;

/// Failures raised by a [`crate::store::SampleStore`]
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("invalid timestamp {value:?} in row {row}")]
    Timestamp { row: i64, value: String },

    #[error("store i/o: {0}")]
    Io(#[from] std::io::Error),
}

/// Crate-level error for the outer surfaces (CLI, config, export)
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_failures_read_as_store_errors() {
        let err = StoreError::from(std::io::Error::other("disk full"));
        assert_eq!(err.to_string(), "store i/o: disk full");

        let err = Error::from(err);
        assert_eq!(err.to_string(), "store i/o: disk full");
    }
}
