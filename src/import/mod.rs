//! The statement import pipeline: fetch, parse, classify, deduplicate and
//! persist.

mod classifier;
mod dedupe;
mod orchestrator;
mod parser;
mod source;

pub use classifier::{Classifier, seed_default_categories};
pub use dedupe::is_duplicate;
pub use orchestrator::{ImportRequest, Importer};
pub use parser::{Institution, ParsedRow, RowError, parse_statement};
pub use source::{FileStatementSource, StatementSource};
