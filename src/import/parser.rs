//! Parses CSV bank and credit card statements into transaction rows.
//!
//! Each supported institution exports slightly different column names and
//! sign conventions, so parsing is driven by a per-institution profile.
//! Statements from unrecognised institutions fall back to a generic
//! profile that probes a list of common column names.

use csv::StringRecord;
use time::{Date, Month};

use crate::{
    Error,
    models::{ImportKind, TransactionType},
};

/// The financial institution a statement came from.
///
/// Built from the free-text hint supplied alongside an upload. Unknown
/// hints map to [Institution::Other], which uses the generic column
/// profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Institution {
    /// Chase bank exports.
    Chase,
    /// Bank of America exports.
    BankOfAmerica,
    /// American Express card exports.
    Amex,
    /// Visa card exports.
    Visa,
    /// Mastercard card exports.
    Mastercard,
    /// Any institution without a dedicated profile.
    Other,
}

impl Institution {
    /// Map a free-text institution hint to a profile.
    pub fn from_hint(hint: &str) -> Self {
        match hint.to_lowercase().as_str() {
            "chase" => Institution::Chase,
            "bank-of-america" | "bank_of_america" | "bofa" => Institution::BankOfAmerica,
            "amex" | "american-express" | "american_express" => Institution::Amex,
            "visa" => Institution::Visa,
            "mastercard" => Institution::Mastercard,
            _ => Institution::Other,
        }
    }

    /// The display name used in imported transaction notes.
    pub fn name(&self) -> &'static str {
        match self {
            Institution::Chase => "Chase",
            Institution::BankOfAmerica => "Bank of America",
            Institution::Amex => "American Express",
            Institution::Visa => "Visa",
            Institution::Mastercard => "Mastercard",
            Institution::Other => "statement",
        }
    }
}

/// A statement row parsed into transaction fields.
///
/// The category is assigned later by the classifier, parsing only extracts
/// what the statement itself provides.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    /// What the transaction was for.
    pub description: String,
    /// The unsigned amount of money moved.
    pub amount: f64,
    /// The date the transaction occurred.
    pub date: Date,
    /// Whether the row is income or an expense.
    pub kind: TransactionType,
    /// Provenance notes, e.g. "Imported from Chase - Groceries".
    pub notes: String,
}

/// A statement row that could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    /// The row's description, or "Unknown transaction" when absent.
    pub description: String,
    /// Why the row was rejected.
    pub message: String,
}

/// Parse CSV statement `content` into transaction rows.
///
/// Row-level problems (a bad amount or date) are reported per row so the
/// rest of the statement still imports. Statement-level problems (broken
/// CSV structure) abort the whole parse.
///
/// # Errors
/// This function will return an [Error::InvalidStatement] if the content
/// is not well-formed CSV.
pub fn parse_statement(
    content: &str,
    kind: ImportKind,
    institution: Institution,
) -> Result<Vec<Result<ParsedRow, RowError>>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|error| Error::InvalidStatement(error.to_string()))?
        .clone();

    let mut rows = Vec::new();

    for record in reader.records() {
        let record = record.map_err(|error| Error::InvalidStatement(error.to_string()))?;
        rows.push(parse_record(&headers, &record, kind, institution));
    }

    Ok(rows)
}

fn parse_record(
    headers: &StringRecord,
    record: &StringRecord,
    kind: ImportKind,
    institution: Institution,
) -> Result<ParsedRow, RowError> {
    let profile = Profile::for_statement(kind, institution);

    let description = field(headers, record, profile.description_columns)
        .unwrap_or("Unknown transaction")
        .to_owned();

    let row_error = |message: String| RowError {
        description: description.clone(),
        message,
    };

    let raw_amount = field(headers, record, profile.amount_columns)
        .ok_or_else(|| row_error("missing amount".to_owned()))?;
    let signed_amount = parse_amount(raw_amount)
        .ok_or_else(|| row_error(format!("could not parse amount {raw_amount:?}")))?;

    let raw_date = field(headers, record, profile.date_columns)
        .ok_or_else(|| row_error("missing date".to_owned()))?;
    let date = parse_row_date(raw_date)
        .ok_or_else(|| row_error(format!("could not parse date {raw_date:?}")))?;

    let transaction_kind = match profile.direction {
        Direction::AlwaysExpense => TransactionType::Expense,
        Direction::FromSign => {
            if signed_amount > 0.0 {
                TransactionType::Income
            } else {
                TransactionType::Expense
            }
        }
        Direction::FromCreditColumn => {
            if field(headers, record, &["Type"]) == Some("Credit") {
                TransactionType::Income
            } else {
                TransactionType::Expense
            }
        }
        Direction::FromTypeColumnOrSign => {
            match field(headers, record, &["Type"]).map(str::to_lowercase) {
                Some(type_text) if type_text.contains("credit") || type_text.contains("deposit") => {
                    TransactionType::Income
                }
                Some(type_text)
                    if type_text.contains("debit") || type_text.contains("withdrawal") =>
                {
                    TransactionType::Expense
                }
                _ => {
                    if signed_amount >= 0.0 {
                        TransactionType::Income
                    } else {
                        TransactionType::Expense
                    }
                }
            }
        }
    };

    let notes = match profile.notes {
        Notes::WithTypeColumn => {
            let type_text = field(headers, record, &["Type"]).unwrap_or("");
            format!("Imported from {} - {type_text}", institution.name())
        }
        Notes::WithCategoryColumn => {
            let category_text = field(headers, record, &["Category"]).unwrap_or("");
            format!("Imported from {} - {category_text}", institution.name())
        }
        Notes::GenericBank => "Imported from bank statement".to_owned(),
        Notes::GenericCard => "Imported from credit card statement".to_owned(),
    };

    Ok(ParsedRow {
        description,
        amount: signed_amount.abs(),
        date,
        kind: transaction_kind,
        notes,
    })
}

enum Direction {
    AlwaysExpense,
    FromSign,
    FromCreditColumn,
    FromTypeColumnOrSign,
}

enum Notes {
    WithTypeColumn,
    WithCategoryColumn,
    GenericBank,
    GenericCard,
}

struct Profile {
    description_columns: &'static [&'static str],
    amount_columns: &'static [&'static str],
    date_columns: &'static [&'static str],
    direction: Direction,
    notes: Notes,
}

impl Profile {
    fn for_statement(kind: ImportKind, institution: Institution) -> Self {
        match (kind, institution) {
            (ImportKind::BankStatement, Institution::BankOfAmerica) => Profile {
                description_columns: &["Description", "Payee"],
                amount_columns: &["Amount"],
                date_columns: &["Date", "Transaction Date"],
                direction: Direction::FromSign,
                notes: Notes::WithTypeColumn,
            },
            (ImportKind::BankStatement, Institution::Chase) => Profile {
                description_columns: &["Description", "Merchant"],
                amount_columns: &["Amount"],
                date_columns: &["Date", "Transaction Date"],
                direction: Direction::FromCreditColumn,
                notes: Notes::WithCategoryColumn,
            },
            (ImportKind::BankStatement, _) => Profile {
                description_columns: &["Description", "Payee", "Merchant"],
                amount_columns: &["Amount", "Sum"],
                date_columns: &["Date", "Transaction Date", "TransactionDate"],
                direction: Direction::FromTypeColumnOrSign,
                notes: Notes::GenericBank,
            },
            (ImportKind::CreditCard, Institution::Amex) => Profile {
                description_columns: &["Description", "Merchant"],
                amount_columns: &["Amount"],
                date_columns: &["Date"],
                direction: Direction::AlwaysExpense,
                notes: Notes::WithCategoryColumn,
            },
            (ImportKind::CreditCard, Institution::Visa | Institution::Mastercard) => Profile {
                description_columns: &["Description", "Merchant"],
                amount_columns: &["Amount"],
                date_columns: &["Date", "Transaction Date"],
                direction: Direction::AlwaysExpense,
                notes: Notes::WithCategoryColumn,
            },
            (ImportKind::CreditCard, _) => Profile {
                description_columns: &["Description", "Payee", "Merchant"],
                amount_columns: &["Amount", "Sum"],
                date_columns: &["Date", "Transaction Date", "TransactionDate"],
                direction: Direction::AlwaysExpense,
                notes: Notes::GenericCard,
            },
        }
    }
}

/// Find the first non-empty value among the candidate column names.
fn field<'a>(
    headers: &StringRecord,
    record: &'a StringRecord,
    candidates: &[&str],
) -> Option<&'a str> {
    for candidate in candidates {
        if let Some(index) = headers.iter().position(|header| header == *candidate) {
            let value = record.get(index).unwrap_or("").trim();
            if !value.is_empty() {
                return Some(value);
            }
        }
    }

    None
}

/// Parse an amount, tolerating currency symbols and thousands separators.
fn parse_amount(text: &str) -> Option<f64> {
    let sanitized: String = text
        .chars()
        .filter(|character| character.is_ascii_digit() || *character == '.' || *character == '-')
        .collect();

    sanitized.parse().ok()
}

/// Parse a statement date, trying MM/DD/YYYY, DD/MM/YYYY, YYYY-MM-DD and
/// MM-DD-YYYY in that order.
fn parse_row_date(text: &str) -> Option<Date> {
    if let Some((first, second, third)) = split_date(text, '/') {
        // MM/DD/YYYY, falling back to DD/MM/YYYY for days that cannot be
        // months.
        return date_from_parts(third, first, second).or(date_from_parts(third, second, first));
    }

    if let Some((first, second, third)) = split_date(text, '-') {
        // YYYY-MM-DD, falling back to MM-DD-YYYY.
        return date_from_parts(first, second, third).or(date_from_parts(third, first, second));
    }

    None
}

fn split_date(text: &str, separator: char) -> Option<(i32, i32, i32)> {
    let mut parts = text.split(separator);
    let first = parts.next()?.trim().parse().ok()?;
    let second = parts.next()?.trim().parse().ok()?;
    let third = parts.next()?.trim().parse().ok()?;

    if parts.next().is_some() {
        return None;
    }

    Some((first, second, third))
}

fn date_from_parts(year: i32, month: i32, day: i32) -> Option<Date> {
    let month = Month::try_from(u8::try_from(month).ok()?).ok()?;
    let day = u8::try_from(day).ok()?;

    Date::from_calendar_date(year, month, day).ok()
}

#[cfg(test)]
mod parse_statement_tests {
    use time::macros::date;

    use crate::models::{ImportKind, TransactionType};

    use super::{Institution, parse_statement};

    #[test]
    fn parses_generic_bank_row() {
        let content = "Date,Description,Amount\n03/10/2024,Whole Foods,\"-54.20\"\n";

        let rows =
            parse_statement(content, ImportKind::BankStatement, Institution::Other).unwrap();

        assert_eq!(rows.len(), 1);
        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.description, "Whole Foods");
        assert_eq!(row.amount, 54.2);
        assert_eq!(row.date, date!(2024 - 03 - 10));
        assert_eq!(row.kind, TransactionType::Expense);
        assert_eq!(row.notes, "Imported from bank statement");
    }

    #[test]
    fn generic_bank_uses_type_column_over_sign() {
        let content = "Date,Description,Amount,Type\n\
            03/10/2024,Refund,-25.00,Credit refund\n\
            03/11/2024,ATM,100.00,Cash withdrawal\n";

        let rows =
            parse_statement(content, ImportKind::BankStatement, Institution::Other).unwrap();

        assert_eq!(rows[0].as_ref().unwrap().kind, TransactionType::Income);
        assert_eq!(rows[1].as_ref().unwrap().kind, TransactionType::Expense);
    }

    #[test]
    fn chase_direction_comes_from_the_type_column() {
        let content = "Date,Description,Amount,Type,Category\n\
            03/01/2024,Payroll,1250.00,Credit,Income\n\
            03/02/2024,Coffee,4.50,Sale,Food & Drink\n";

        let rows =
            parse_statement(content, ImportKind::BankStatement, Institution::Chase).unwrap();

        let payroll = rows[0].as_ref().unwrap();
        assert_eq!(payroll.kind, TransactionType::Income);
        assert_eq!(payroll.notes, "Imported from Chase - Income");

        let coffee = rows[1].as_ref().unwrap();
        assert_eq!(coffee.kind, TransactionType::Expense);
    }

    #[test]
    fn bank_of_america_direction_comes_from_the_sign() {
        let content = "Date,Description,Amount,Type\n\
            03/01/2024,Deposit,\"$1,000.00\",ACH\n\
            03/02/2024,Groceries,-88.15,POS\n";

        let rows = parse_statement(
            content,
            ImportKind::BankStatement,
            Institution::BankOfAmerica,
        )
        .unwrap();

        let deposit = rows[0].as_ref().unwrap();
        assert_eq!(deposit.kind, TransactionType::Income);
        assert_eq!(deposit.amount, 1000.0);
        assert_eq!(deposit.notes, "Imported from Bank of America - ACH");

        let groceries = rows[1].as_ref().unwrap();
        assert_eq!(groceries.kind, TransactionType::Expense);
        assert_eq!(groceries.amount, 88.15);
    }

    #[test]
    fn credit_card_rows_are_always_expenses() {
        let content = "Date,Description,Amount,Category\n\
            03/05/2024,Airline refund,-120.00,Travel\n";

        let rows = parse_statement(content, ImportKind::CreditCard, Institution::Amex).unwrap();

        let row = rows[0].as_ref().unwrap();
        assert_eq!(row.kind, TransactionType::Expense);
        assert_eq!(row.amount, 120.0);
        assert_eq!(row.notes, "Imported from American Express - Travel");
    }

    #[test]
    fn missing_description_becomes_unknown_transaction() {
        let content = "Date,Description,Amount\n03/10/2024,,12.00\n";

        let rows =
            parse_statement(content, ImportKind::BankStatement, Institution::Other).unwrap();

        assert_eq!(rows[0].as_ref().unwrap().description, "Unknown transaction");
    }

    #[test]
    fn day_first_dates_are_recognised() {
        let content = "Date,Description,Amount\n25/12/2024,Presents,99.00\n";

        let rows =
            parse_statement(content, ImportKind::BankStatement, Institution::Other).unwrap();

        assert_eq!(rows[0].as_ref().unwrap().date, date!(2024 - 12 - 25));
    }

    #[test]
    fn iso_dates_are_recognised() {
        let content = "Date,Description,Amount\n2024-03-10,Groceries,54.20\n";

        let rows =
            parse_statement(content, ImportKind::BankStatement, Institution::Other).unwrap();

        assert_eq!(rows[0].as_ref().unwrap().date, date!(2024 - 03 - 10));
    }

    #[test]
    fn unparseable_date_is_a_row_error() {
        let content = "Date,Description,Amount\nnot a date,Groceries,54.20\n";

        let rows =
            parse_statement(content, ImportKind::BankStatement, Institution::Other).unwrap();

        let error = rows[0].as_ref().unwrap_err();
        assert_eq!(error.description, "Groceries");
        assert!(error.message.contains("date"));
    }

    #[test]
    fn missing_amount_is_a_row_error() {
        let content = "Date,Description,Amount\n03/10/2024,Groceries,\n";

        let rows =
            parse_statement(content, ImportKind::BankStatement, Institution::Other).unwrap();

        let error = rows[0].as_ref().unwrap_err();
        assert_eq!(error.message, "missing amount");
    }

    #[test]
    fn bad_row_does_not_poison_the_rest() {
        let content = "Date,Description,Amount\n\
            bad,Broken,1.00\n\
            03/10/2024,Fine,2.00\n";

        let rows =
            parse_statement(content, ImportKind::BankStatement, Institution::Other).unwrap();

        assert!(rows[0].is_err());
        assert!(rows[1].is_ok());
    }
}

#[cfg(test)]
mod institution_tests {
    use super::Institution;

    #[test]
    fn hints_are_case_insensitive() {
        assert_eq!(Institution::from_hint("Chase"), Institution::Chase);
        assert_eq!(
            Institution::from_hint("bank-of-america"),
            Institution::BankOfAmerica
        );
        assert_eq!(Institution::from_hint("AMEX"), Institution::Amex);
    }

    #[test]
    fn unknown_hints_fall_back_to_other() {
        assert_eq!(Institution::from_hint("credit union"), Institution::Other);
        assert_eq!(Institution::from_hint(""), Institution::Other);
    }

    #[test]
    fn names_are_display_cased() {
        assert_eq!(Institution::Visa.name(), "Visa");
        assert_eq!(Institution::Mastercard.name(), "Mastercard");
        assert_eq!(Institution::BankOfAmerica.name(), "Bank of America");
    }
}
