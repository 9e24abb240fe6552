//! Runs the statement import pipeline end to end.

use crate::{
    Error,
    models::{
        DatabaseID, Import, ImportKind, ImportMetadata, ImportResult, ImportStatus, ImportUpdate,
        NewImport, NewTransaction, TransactionStatus, UserId,
    },
    stores::{CategoryStore, ImportStore, TransactionStore},
};

use super::{Classifier, Institution, ParsedRow, StatementSource, is_duplicate, parse_statement};

/// A request to import a statement file.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    /// The location of the statement file, understood by the configured
    /// [StatementSource].
    pub filename: String,
    /// The size of the statement file in bytes, when known.
    pub filesize: Option<i64>,
    /// The kind of statement being imported.
    pub kind: ImportKind,
    /// A free-text institution hint, e.g. "chase". `None` selects the
    /// generic parsing profile.
    pub institution_hint: Option<String>,
    /// The user performing the import.
    pub owner: UserId,
}

/// Coordinates fetching, parsing, classifying, deduplicating and
/// persisting a statement import.
///
/// Each row is processed independently: a row that fails to parse or
/// persist is recorded as an error string in the import metadata and the
/// remaining rows continue. Only failures before row processing starts
/// (fetching or statement-level parsing) fail the import as a whole.
pub struct Importer<'a> {
    transactions: &'a dyn TransactionStore,
    categories: &'a dyn CategoryStore,
    imports: &'a dyn ImportStore,
    source: &'a dyn StatementSource,
}

impl<'a> Importer<'a> {
    /// Create an importer over the given stores and statement source.
    pub fn new(
        transactions: &'a dyn TransactionStore,
        categories: &'a dyn CategoryStore,
        imports: &'a dyn ImportStore,
        source: &'a dyn StatementSource,
    ) -> Self {
        Self {
            transactions,
            categories,
            imports,
            source,
        }
    }

    /// Run the pipeline for `request`.
    ///
    /// The import record is created in the processing status before any
    /// work happens, and always reaches a terminal status: completed,
    /// completed with errors, or failed.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::ImportFailed] if the statement could not be fetched or
    ///   parsed, after marking the import record as failed,
    /// - or [Error::SqlError] if the import record itself could not be
    ///   created or finalised.
    pub fn process(&self, request: ImportRequest) -> Result<ImportResult, Error> {
        let record = self.imports.create(NewImport {
            filename: request.filename.clone(),
            filesize: request.filesize,
            kind: request.kind,
            owner: request.owner.clone(),
            metadata: ImportMetadata {
                institution: request.institution_hint.clone(),
                ..Default::default()
            },
        })?;

        tracing::info!(
            "import {}: processing {} for user {}",
            record.id,
            request.filename,
            request.owner
        );

        match self.run(&record, &request) {
            Ok(result) => Ok(result),
            Err(error) => {
                tracing::error!("import {} failed: {}", record.id, error);

                let marked_failed = self.imports.update(
                    record.id,
                    ImportUpdate {
                        status: Some(ImportStatus::Failed),
                        metadata: Some(ImportMetadata {
                            institution: request.institution_hint.clone(),
                            error: Some(error.to_string()),
                            ..Default::default()
                        }),
                        ..Default::default()
                    },
                    &request.owner,
                );

                if let Err(update_error) = marked_failed {
                    tracing::error!(
                        "import {}: could not record failure: {}",
                        record.id,
                        update_error
                    );
                }

                Err(Error::ImportFailed(error.to_string()))
            }
        }
    }

    fn run(&self, record: &Import, request: &ImportRequest) -> Result<ImportResult, Error> {
        let institution = request
            .institution_hint
            .as_deref()
            .map(Institution::from_hint)
            .unwrap_or(Institution::Other);

        let content = self.source.fetch(&request.filename)?;
        let rows = parse_statement(&content, request.kind, institution)?;

        let categories = self.categories.get_all(&request.owner)?;
        let classifier = Classifier::from_categories(&categories);

        let mut transaction_ids = Vec::new();
        let mut errors = Vec::new();
        let mut duplicates_skipped: u32 = 0;

        for row in rows {
            let row = match row {
                Ok(row) => row,
                Err(row_error) => {
                    errors.push(format!(
                        "Error processing transaction '{}': {}",
                        row_error.description, row_error.message
                    ));
                    continue;
                }
            };

            match self.import_row(&request.owner, &classifier, &row) {
                Ok(Some(transaction_id)) => transaction_ids.push(transaction_id),
                Ok(None) => duplicates_skipped += 1,
                Err(error) => {
                    tracing::warn!(
                        "import {}: row '{}' failed: {}",
                        record.id,
                        row.description,
                        error
                    );
                    errors.push(format!(
                        "Error processing transaction '{}': {}",
                        row.description, error
                    ));
                }
            }
        }

        let status = if errors.is_empty() {
            ImportStatus::Completed
        } else {
            ImportStatus::CompletedWithErrors
        };
        let transactions_imported = transaction_ids.len();

        self.imports.update(
            record.id,
            ImportUpdate {
                status: Some(status),
                transaction_count: Some(transactions_imported as i64),
                metadata: Some(ImportMetadata {
                    institution: request.institution_hint.clone(),
                    transaction_ids,
                    errors: errors.clone(),
                    duplicates_skipped: Some(duplicates_skipped),
                    error: None,
                }),
            },
            &request.owner,
        )?;

        tracing::info!(
            "import {}: {} imported, {} duplicates skipped, {} errors",
            record.id,
            transactions_imported,
            duplicates_skipped,
            errors.len()
        );

        Ok(ImportResult {
            import_id: record.id,
            transactions_imported,
            duplicates_skipped: duplicates_skipped as usize,
            errors,
        })
    }

    fn import_row(
        &self,
        owner: &UserId,
        classifier: &Classifier,
        row: &ParsedRow,
    ) -> Result<Option<DatabaseID>, Error> {
        if is_duplicate(self.transactions, owner, row)? {
            return Ok(None);
        }

        let category_id = classifier
            .classify(&row.description)
            .ok_or(Error::InvalidCategory)?;

        let transaction = self.transactions.create(NewTransaction {
            description: row.description.clone(),
            amount: row.amount,
            date: row.date,
            kind: row.kind,
            category_id,
            account_id: None,
            notes: Some(row.notes.clone()),
            receipt_url: None,
            status: TransactionStatus::Completed,
            owner: owner.clone(),
        })?;

        Ok(Some(transaction.id))
    }

    /// Delete the import `id` along with the transactions it created.
    ///
    /// Transaction deletion reverses balance effects as usual.
    /// Transactions that were deleted by hand since the import are
    /// skipped.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::NotFound] if `id` does not refer to an import owned by
    ///   `owner`,
    /// - or [Error::SqlError] if there is some other SQL error.
    pub fn delete_import(&self, id: DatabaseID, owner: &UserId) -> Result<(), Error> {
        let record = self.imports.get(id, owner)?;

        for transaction_id in &record.metadata.transaction_ids {
            match self.transactions.delete(*transaction_id, owner) {
                Ok(()) => {}
                Err(Error::NotFound) => {
                    tracing::debug!(
                        "import {}: transaction {} was already deleted",
                        id,
                        transaction_id
                    );
                }
                Err(error) => return Err(error),
            }
        }

        self.imports.delete(id, owner)
    }
}

#[cfg(test)]
mod importer_tests {
    use std::{
        collections::HashMap,
        sync::{Arc, Mutex},
    };

    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        import::{StatementSource, seed_default_categories},
        models::{ImportKind, ImportStatus, UserId},
        stores::{
            ImportStore, SqliteCategoryStore, SqliteImportStore, SqliteTransactionStore,
            TransactionFilter, TransactionStore,
        },
    };

    use super::{ImportRequest, Importer};

    struct StaticSource(HashMap<String, String>);

    impl StatementSource for StaticSource {
        fn fetch(&self, location: &str) -> Result<String, Error> {
            self.0
                .get(location)
                .cloned()
                .ok_or_else(|| Error::SourceUnavailable(location.to_owned()))
        }
    }

    struct Fixture {
        transactions: SqliteTransactionStore,
        categories: SqliteCategoryStore,
        imports: SqliteImportStore,
        owner: UserId,
    }

    fn get_fixture() -> Fixture {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));
        let owner = UserId::new("user-1");

        let categories = SqliteCategoryStore::new(connection.clone());
        seed_default_categories(&categories, &owner).unwrap();

        Fixture {
            transactions: SqliteTransactionStore::new(connection.clone()),
            categories,
            imports: SqliteImportStore::new(connection),
            owner,
        }
    }

    fn request(fixture: &Fixture, filename: &str) -> ImportRequest {
        ImportRequest {
            filename: filename.to_owned(),
            filesize: Some(1024),
            kind: ImportKind::BankStatement,
            institution_hint: None,
            owner: fixture.owner.clone(),
        }
    }

    const STATEMENT: &str = "Date,Description,Amount\n\
        03/01/2024,ACME Payroll Deposit,2500.00\n\
        03/10/2024,Whole Foods Grocery,-54.20\n";

    #[test]
    fn import_creates_classified_transactions() {
        let fixture = get_fixture();
        let source = StaticSource(HashMap::from([(
            "statement.csv".to_owned(),
            STATEMENT.to_owned(),
        )]));
        let importer = Importer::new(
            &fixture.transactions,
            &fixture.categories,
            &fixture.imports,
            &source,
        );

        let result = importer.process(request(&fixture, "statement.csv")).unwrap();

        assert_eq!(result.transactions_imported, 2);
        assert_eq!(result.duplicates_skipped, 0);
        assert!(result.errors.is_empty());

        let record = fixture.imports.get(result.import_id, &fixture.owner).unwrap();
        assert_eq!(record.status, ImportStatus::Completed);
        assert_eq!(record.transaction_count, 2);
        assert_eq!(record.metadata.transaction_ids.len(), 2);
        assert_eq!(record.metadata.duplicates_skipped, Some(0));

        let transactions = fixture
            .transactions
            .query(&fixture.owner, &TransactionFilter::default())
            .unwrap();
        assert_eq!(transactions.len(), 2);
        assert!(
            transactions
                .iter()
                .all(|transaction| transaction.notes.as_deref()
                    == Some("Imported from bank statement"))
        );
    }

    #[test]
    fn repeated_import_skips_every_row() {
        let fixture = get_fixture();
        let source = StaticSource(HashMap::from([(
            "statement.csv".to_owned(),
            STATEMENT.to_owned(),
        )]));
        let importer = Importer::new(
            &fixture.transactions,
            &fixture.categories,
            &fixture.imports,
            &source,
        );

        importer.process(request(&fixture, "statement.csv")).unwrap();
        let second = importer.process(request(&fixture, "statement.csv")).unwrap();

        assert_eq!(second.transactions_imported, 0);
        assert_eq!(second.duplicates_skipped, 2);
        assert!(second.errors.is_empty());

        let record = fixture.imports.get(second.import_id, &fixture.owner).unwrap();
        assert_eq!(record.status, ImportStatus::Completed);

        let transactions = fixture
            .transactions
            .query(&fixture.owner, &TransactionFilter::default())
            .unwrap();
        assert_eq!(transactions.len(), 2);
    }

    #[test]
    fn bad_rows_are_recorded_and_the_rest_import() {
        let fixture = get_fixture();
        let statement = "Date,Description,Amount\n\
            03/01/2024,ACME Payroll Deposit,2500.00\n\
            not a date,Mystery Row,10.00\n\
            03/10/2024,Whole Foods Grocery,-54.20\n";
        let source = StaticSource(HashMap::from([(
            "statement.csv".to_owned(),
            statement.to_owned(),
        )]));
        let importer = Importer::new(
            &fixture.transactions,
            &fixture.categories,
            &fixture.imports,
            &source,
        );

        let result = importer.process(request(&fixture, "statement.csv")).unwrap();

        assert_eq!(result.transactions_imported, 2);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Error processing transaction 'Mystery Row':"));

        let record = fixture.imports.get(result.import_id, &fixture.owner).unwrap();
        assert_eq!(record.status, ImportStatus::CompletedWithErrors);
        assert_eq!(record.transaction_count, 2);
        assert_eq!(record.metadata.errors.len(), 1);
    }

    #[test]
    fn unavailable_source_fails_the_import() {
        let fixture = get_fixture();
        let source = StaticSource(HashMap::new());
        let importer = Importer::new(
            &fixture.transactions,
            &fixture.categories,
            &fixture.imports,
            &source,
        );

        let result = importer.process(request(&fixture, "missing.csv"));

        assert!(matches!(result, Err(Error::ImportFailed(_))));

        let imports = fixture.imports.get_all(&fixture.owner).unwrap();
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].status, ImportStatus::Failed);
        assert!(imports[0].metadata.error.is_some());
    }

    #[test]
    fn delete_import_removes_its_transactions() {
        let fixture = get_fixture();
        let source = StaticSource(HashMap::from([(
            "statement.csv".to_owned(),
            STATEMENT.to_owned(),
        )]));
        let importer = Importer::new(
            &fixture.transactions,
            &fixture.categories,
            &fixture.imports,
            &source,
        );

        let result = importer.process(request(&fixture, "statement.csv")).unwrap();

        importer.delete_import(result.import_id, &fixture.owner).unwrap();

        assert_eq!(
            fixture.imports.get(result.import_id, &fixture.owner),
            Err(Error::NotFound)
        );
        let transactions = fixture
            .transactions
            .query(&fixture.owner, &TransactionFilter::default())
            .unwrap();
        assert!(transactions.is_empty());
    }

    #[test]
    fn delete_import_tolerates_already_deleted_transactions() {
        let fixture = get_fixture();
        let source = StaticSource(HashMap::from([(
            "statement.csv".to_owned(),
            STATEMENT.to_owned(),
        )]));
        let importer = Importer::new(
            &fixture.transactions,
            &fixture.categories,
            &fixture.imports,
            &source,
        );

        let result = importer.process(request(&fixture, "statement.csv")).unwrap();
        let record = fixture.imports.get(result.import_id, &fixture.owner).unwrap();
        fixture
            .transactions
            .delete(record.metadata.transaction_ids[0], &fixture.owner)
            .unwrap();

        assert_eq!(
            importer.delete_import(result.import_id, &fixture.owner),
            Ok(())
        );
    }
}
