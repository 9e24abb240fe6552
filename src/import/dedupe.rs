//! Detects statement rows that have already been imported.

use crate::{
    Error,
    models::UserId,
    range::DateRange,
    stores::{TransactionFilter, TransactionStore},
};

use super::ParsedRow;

/// Whether the owner already has a transaction with the row's exact
/// description, amount and calendar date.
///
/// The search narrows candidates by description and date before the exact
/// comparison, so re-importing an overlapping statement stays cheap.
///
/// # Errors
/// This function will return an [Error::SqlError] if the candidate query
/// fails.
pub fn is_duplicate(
    store: &dyn TransactionStore,
    owner: &UserId,
    row: &ParsedRow,
) -> Result<bool, Error> {
    let candidates = store.query(
        owner,
        &TransactionFilter {
            search: Some(row.description.clone()),
            date_range: Some(DateRange::Custom {
                start: row.date,
                end: row.date,
            }),
            ..Default::default()
        },
    )?;

    Ok(candidates.iter().any(|transaction| {
        transaction.description == row.description
            && transaction.amount == row.amount
            && transaction.date == row.date
    }))
}

#[cfg(test)]
mod is_duplicate_tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        import::ParsedRow,
        models::{
            CategoryType, NewCategory, NewTransaction, TransactionStatus, TransactionType, UserId,
        },
        stores::{CategoryStore, SqliteCategoryStore, SqliteTransactionStore, TransactionStore},
    };

    use super::is_duplicate;

    fn get_fixture() -> (SqliteTransactionStore, UserId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let connection = Arc::new(Mutex::new(connection));
        let owner = UserId::new("user-1");

        let category = SqliteCategoryStore::new(connection.clone())
            .create(NewCategory {
                name: "Food".to_owned(),
                icon: None,
                color: None,
                kind: CategoryType::Expense,
                owner: owner.clone(),
            })
            .unwrap();

        let store = SqliteTransactionStore::new(connection);
        store
            .create(NewTransaction {
                description: "Whole Foods".to_owned(),
                amount: 54.2,
                date: date!(2024 - 03 - 10),
                kind: TransactionType::Expense,
                category_id: category.id,
                account_id: None,
                notes: None,
                receipt_url: None,
                status: TransactionStatus::Completed,
                owner: owner.clone(),
            })
            .unwrap();

        (store, owner)
    }

    fn row(description: &str, amount: f64, date: time::Date) -> ParsedRow {
        ParsedRow {
            description: description.to_owned(),
            amount,
            date,
            kind: TransactionType::Expense,
            notes: String::new(),
        }
    }

    #[test]
    fn exact_match_is_a_duplicate() {
        let (store, owner) = get_fixture();

        let result = is_duplicate(&store, &owner, &row("Whole Foods", 54.2, date!(2024 - 03 - 10)));

        assert_eq!(result, Ok(true));
    }

    #[test]
    fn different_amount_is_not_a_duplicate() {
        let (store, owner) = get_fixture();

        let result = is_duplicate(&store, &owner, &row("Whole Foods", 54.21, date!(2024 - 03 - 10)));

        assert_eq!(result, Ok(false));
    }

    #[test]
    fn different_date_is_not_a_duplicate() {
        let (store, owner) = get_fixture();

        let result = is_duplicate(&store, &owner, &row("Whole Foods", 54.2, date!(2024 - 03 - 11)));

        assert_eq!(result, Ok(false));
    }

    #[test]
    fn other_users_transactions_do_not_count() {
        let (store, _) = get_fixture();

        let result = is_duplicate(
            &store,
            &UserId::new("user-2"),
            &row("Whole Foods", 54.2, date!(2024 - 03 - 10)),
        );

        assert_eq!(result, Ok(false));
    }
}
