//! Spendwise is the core library of a personal finance tracker.
//!
//! It provides owner-scoped storage for transactions, accounts, categories
//! and import records on SQLite, a statement import pipeline (parse,
//! classify, deduplicate, persist) and a dashboard aggregator.
//!
//! The HTTP layer, authentication and file uploads are expected to live in
//! a separate application that consumes this library through the traits in
//! [stores] and the [import::StatementSource] trait.

#![warn(missing_docs)]

pub mod dashboard;
pub mod db;
mod error;
pub mod import;
pub mod models;
pub mod range;
pub mod stores;

pub use error::Error;
