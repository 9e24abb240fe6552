//! Aggregates transactions and balances into dashboard summaries.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    models::UserId,
    range::TimeRange,
    stores::{AccountStore, TransactionStore},
};

/// Period-over-period changes, each as a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodChange {
    /// Change in total balance against the reconstructed prior total.
    pub balance: f64,
    /// Change in income against the previous period.
    pub income: f64,
    /// Change in expenses against the previous period.
    pub expenses: f64,
    /// Change in savings against the previous period.
    pub savings: f64,
}

/// The headline numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// The sum of all account balances.
    pub total_balance: f64,
    /// Income within the selected period.
    pub income: f64,
    /// Expenses within the selected period.
    pub expenses: f64,
    /// Income minus expenses within the selected period.
    pub savings: f64,
    /// How each number moved against the previous period.
    pub period_change: PeriodChange,
}

/// The percentage change from `previous` to `current`.
///
/// A zero previous value yields zero rather than a division error, so a
/// first period with no history shows as "no change".
pub fn calculate_percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 0.0;
    }

    (current - previous) / previous.abs() * 100.0
}

/// Build the dashboard summary for the period `range` ending at `today`.
///
/// The prior total balance is not stored anywhere, so it is reconstructed
/// by subtracting the net effect of the current period's transactions from
/// the current total.
///
/// # Errors
/// This function will return an [Error::SqlError] if any of the
/// underlying queries fail.
pub fn get_dashboard_summary(
    transactions: &dyn TransactionStore,
    accounts: &dyn AccountStore,
    owner: &UserId,
    range: TimeRange,
    today: Date,
) -> Result<DashboardSummary, Error> {
    let (start, end) = range.window(today);
    let (previous_start, previous_end) = range.previous_window(today);

    let current = transactions.period_totals(owner, start, end)?;
    let previous = transactions.period_totals(owner, previous_start, previous_end)?;

    let savings = current.income - current.expenses;
    let previous_savings = previous.income - previous.expenses;

    let total_balance = accounts.total_balance(owner)?;
    let previous_total_balance = total_balance - transactions.net_change(owner, start, end)?;

    Ok(DashboardSummary {
        total_balance,
        income: current.income,
        expenses: current.expenses,
        savings,
        period_change: PeriodChange {
            balance: calculate_percent_change(total_balance, previous_total_balance),
            income: calculate_percent_change(current.income, previous.income),
            expenses: calculate_percent_change(current.expenses, previous.expenses),
            savings: calculate_percent_change(savings, previous_savings),
        },
    })
}

#[cfg(test)]
mod calculate_percent_change_tests {
    use super::calculate_percent_change;

    #[test]
    fn zero_previous_is_zero_change() {
        assert_eq!(calculate_percent_change(100.0, 0.0), 0.0);
        assert_eq!(calculate_percent_change(0.0, 0.0), 0.0);
    }

    #[test]
    fn positive_growth() {
        assert_eq!(calculate_percent_change(150.0, 100.0), 50.0);
    }

    #[test]
    fn decline_is_negative() {
        assert_eq!(calculate_percent_change(50.0, 100.0), -50.0);
    }

    #[test]
    fn negative_previous_uses_magnitude() {
        assert_eq!(calculate_percent_change(-50.0, -100.0), 50.0);
    }
}
