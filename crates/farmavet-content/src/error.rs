//! Error types for farmavet-content

/// Result type alias for farmavet-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading content from outside sources.
///
/// Grouping, counting and organising never fail; only spreadsheet import
/// (workbook or CSV) touches external input that can be malformed.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Errors from farmavet-core
    #[error(transparent)]
    Core(#[from] farmavet_core::Error),

    /// The CSV reader failed (I/O or malformed record)
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The workbook could not be opened or read
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::XlsxError),

    /// The workbook has no worksheet
    #[error("Workbook has no worksheets")]
    EmptyWorkbook,

    /// The sheet header does not name a required column
    #[error("Missing column '{column}' in methodology sheet")]
    MissingColumn {
        /// Column that was expected
        column: String,
    },
}

impl Error {
    /// Creates a missing-column error.
    pub fn missing_column(column: impl Into<String>) -> Self {
        Error::MissingColumn {
            column: column.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_display() {
        let err = Error::missing_column("analito");
        assert_eq!(
            err.to_string(),
            "Missing column 'analito' in methodology sheet"
        );
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: Error = farmavet_core::Error::validation("bad").into();
        assert_eq!(err.to_string(), "Validation error: bad");
    }
}
