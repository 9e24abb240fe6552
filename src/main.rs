use std::{
    fs,
    sync::{Arc, Mutex},
};

use clap::{Parser, Subcommand};
use rusqlite::Connection;
use time::OffsetDateTime;
use tracing_subscriber::EnvFilter;

use spendwise::{
    Error,
    dashboard::get_dashboard_summary,
    db,
    import::{FileStatementSource, ImportRequest, Importer, seed_default_categories},
    models::{ImportKind, UserId},
    range::TimeRange,
    stores::{SqliteAccountStore, SqliteCategoryStore, SqliteImportStore, SqliteTransactionStore},
};

/// Command line harness for the spendwise finance tracker core.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database schema.
    Init,
    /// Create the default category set for a user.
    SeedCategories {
        /// The user to create categories for.
        #[arg(long)]
        owner: String,
    },
    /// Import a CSV statement file.
    Import {
        /// The user to import transactions for.
        #[arg(long)]
        owner: String,

        /// File path to the CSV statement.
        #[arg(long)]
        file: String,

        /// The statement kind: bank_statement or credit_card.
        #[arg(long, default_value = "bank_statement")]
        kind: String,

        /// An institution hint such as "chase" or "amex".
        #[arg(long)]
        institution: Option<String>,
    },
    /// Print the dashboard summary as JSON.
    Summary {
        /// The user to summarise.
        #[arg(long)]
        owner: String,

        /// The period to summarise: week, month or year.
        #[arg(long, default_value = "month")]
        range: String,
    },
}

fn main() {
    setup_logging();

    let args = Args::parse();

    if let Err(error) = run(args) {
        tracing::error!("{error}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Error> {
    let connection = Connection::open(&args.db_path)?;
    let connection = Arc::new(Mutex::new(connection));

    match args.command {
        Command::Init => {
            db::initialize(&connection.lock().unwrap())?;
            tracing::info!("database schema created");
        }
        Command::SeedCategories { owner } => {
            let store = SqliteCategoryStore::new(connection);
            let categories = seed_default_categories(&store, &UserId::new(owner))?;
            tracing::info!("created {} categories", categories.len());
        }
        Command::Import {
            owner,
            file,
            kind,
            institution,
        } => {
            let kind = ImportKind::from_str(&kind)
                .ok_or_else(|| Error::InvalidStatement(format!("unknown statement kind {kind:?}")))?;
            let filesize = fs::metadata(&file).ok().map(|metadata| metadata.len() as i64);

            let transactions = SqliteTransactionStore::new(connection.clone());
            let categories = SqliteCategoryStore::new(connection.clone());
            let imports = SqliteImportStore::new(connection);
            let source = FileStatementSource;
            let importer = Importer::new(&transactions, &categories, &imports, &source);

            let result = importer.process(ImportRequest {
                filename: file,
                filesize,
                kind,
                institution_hint: institution,
                owner: UserId::new(owner),
            })?;

            println!(
                "import {}: {} imported, {} duplicates skipped, {} errors",
                result.import_id,
                result.transactions_imported,
                result.duplicates_skipped,
                result.errors.len()
            );
            for error in &result.errors {
                println!("  {error}");
            }
        }
        Command::Summary { owner, range } => {
            let transactions = SqliteTransactionStore::new(connection.clone());
            let accounts = SqliteAccountStore::new(connection);

            let summary = get_dashboard_summary(
                &transactions,
                &accounts,
                &UserId::new(owner),
                TimeRange::from_name(&range),
                OffsetDateTime::now_utc().date(),
            )?;

            match serde_json::to_string_pretty(&summary) {
                Ok(json) => println!("{json}"),
                Err(error) => return Err(error.into()),
            }
        }
    }

    Ok(())
}

fn setup_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
