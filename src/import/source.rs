//! Defines where statement content is fetched from.

use std::fs;

use crate::Error;

/// Fetches the raw text of a statement given its location.
///
/// The upload layer that turns browser uploads into fetchable locations
/// lives outside this library, implementations of this trait bridge the
/// two. Tests supply an in-memory implementation.
pub trait StatementSource {
    /// Fetch the statement content at `location`.
    ///
    /// # Errors
    /// This function will return an [Error::SourceUnavailable] if the
    /// content could not be fetched.
    fn fetch(&self, location: &str) -> Result<String, Error>;
}

/// Reads statements from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileStatementSource;

impl StatementSource for FileStatementSource {
    fn fetch(&self, location: &str) -> Result<String, Error> {
        fs::read_to_string(location)
            .map_err(|error| Error::SourceUnavailable(format!("{location}: {error}")))
    }
}

#[cfg(test)]
mod file_statement_source_tests {
    use super::{FileStatementSource, StatementSource};
    use crate::Error;

    #[test]
    fn missing_file_is_source_unavailable() {
        let result = FileStatementSource.fetch("/no/such/file.csv");

        assert!(matches!(result, Err(Error::SourceUnavailable(_))));
    }
}
