//! Assigns categories to imported transactions by keyword matching.

use crate::{
    Error,
    models::{Category, CategoryType, DatabaseID, NewCategory, UserId},
    stores::CategoryStore,
};

/// The category used when no keyword matches.
const DEFAULT_CATEGORY: &str = "Food";

/// The keyword table, checked in order. The first rule with a matching
/// keyword wins, so earlier rules take precedence.
const RULES: &[(&str, &[&str])] = &[
    ("Salary", &["salary", "payroll", "deposit"]),
    ("Investments", &["dividend", "interest"]),
    ("Housing", &["rent", "mortgage"]),
    ("Food", &["grocery", "food", "restaurant"]),
    ("Transportation", &["uber", "lyft", "gas", "transport"]),
    ("Entertainment", &["movie", "entertainment", "game"]),
    ("Utilities", &["electric", "water", "internet"]),
    ("Health", &["doctor", "pharmacy", "health"]),
    ("Debt", &["credit card", "loan", "payment"]),
];

/// Matches transaction descriptions to a user's categories.
///
/// Rules only apply when the user actually has a category with the rule's
/// name, so a user who deleted their "Debt" category simply never gets
/// debt classifications.
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<(DatabaseID, &'static [&'static str])>,
    default_category: Option<DatabaseID>,
}

impl Classifier {
    /// Build a classifier from the user's categories.
    pub fn from_categories(categories: &[Category]) -> Self {
        let find = |name: &str| {
            categories
                .iter()
                .find(|category| category.name.eq_ignore_ascii_case(name))
                .map(|category| category.id)
        };

        let rules = RULES
            .iter()
            .filter_map(|(name, keywords)| find(name).map(|id| (id, *keywords)))
            .collect();

        Self {
            rules,
            default_category: find(DEFAULT_CATEGORY),
        }
    }

    /// The category for `description`, or `None` when the user has no
    /// usable categories.
    ///
    /// Matching is case-insensitive containment, first rule wins, and
    /// unmatched descriptions fall back to the default category.
    pub fn classify(&self, description: &str) -> Option<DatabaseID> {
        let description = description.to_lowercase();

        self.rules
            .iter()
            .find(|(_, keywords)| {
                keywords
                    .iter()
                    .any(|keyword| description.contains(keyword))
            })
            .map(|(id, _)| *id)
            .or(self.default_category)
    }
}

/// Create the standard category set the classifier targets.
///
/// # Errors
/// Returns an [Error::SqlError] if a category could not be created.
pub fn seed_default_categories(
    store: &dyn CategoryStore,
    owner: &UserId,
) -> Result<Vec<Category>, Error> {
    let defaults = [
        ("Salary", CategoryType::Income, "banknote", "#22c55e"),
        ("Investments", CategoryType::Income, "trending-up", "#16a34a"),
        ("Housing", CategoryType::Expense, "home", "#3b82f6"),
        ("Food", CategoryType::Expense, "utensils", "#f59e0b"),
        ("Transportation", CategoryType::Expense, "car", "#8b5cf6"),
        ("Entertainment", CategoryType::Expense, "clapperboard", "#ec4899"),
        ("Utilities", CategoryType::Expense, "plug", "#06b6d4"),
        ("Health", CategoryType::Expense, "heart-pulse", "#ef4444"),
        ("Debt", CategoryType::Expense, "credit-card", "#64748b"),
    ];

    let mut categories = Vec::with_capacity(defaults.len());

    for (name, kind, icon, color) in defaults {
        categories.push(store.create(NewCategory {
            name: name.to_owned(),
            icon: Some(icon.to_owned()),
            color: Some(color.to_owned()),
            kind,
            owner: owner.clone(),
        })?);
    }

    Ok(categories)
}
