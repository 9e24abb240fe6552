//! Named date ranges used by transaction filters and the dashboard.

use time::{Date, Duration, Month};

/// A named date range for filtering transactions, resolved against a
/// reference date so that queries are deterministic in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    /// The 30 days up to and including the reference date.
    Last30Days,
    /// From the first of the reference date's month to the reference date.
    ThisMonth,
    /// The whole calendar month before the reference date's month.
    LastMonth,
    /// From the first of January to the reference date.
    ThisYear,
    /// An explicit inclusive range.
    Custom {
        /// The first date in the range.
        start: Date,
        /// The last date in the range.
        end: Date,
    },
}

impl DateRange {
    /// Resolve the range to inclusive start and end dates.
    pub fn resolve(&self, today: Date) -> (Date, Date) {
        match *self {
            DateRange::Last30Days => (today - Duration::days(30), today),
            DateRange::ThisMonth => (today.replace_day(1).unwrap_or(today), today),
            DateRange::LastMonth => {
                let last_month = months_back(today, 1);
                let start = last_month.replace_day(1).unwrap_or(last_month);
                let end_day = start.month().length(start.year());
                (start, start.replace_day(end_day).unwrap_or(start))
            }
            DateRange::ThisYear => (
                today.replace_day(1).and_then(|date| date.replace_month(Month::January)).unwrap_or(today),
                today,
            ),
            DateRange::Custom { start, end } => (start, end),
        }
    }
}

/// A relative time window for the dashboard and recent transaction lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    /// The 7 days up to and including the reference date.
    Week,
    /// One calendar month up to and including the reference date.
    Month,
    /// One calendar year up to and including the reference date.
    Year,
    /// The 30 days up to and including the reference date. The default.
    Last30Days,
}

impl Default for TimeRange {
    fn default() -> Self {
        TimeRange::Last30Days
    }
}

impl TimeRange {
    /// Parse a range name such as "week". Unrecognised names fall back to
    /// the default 30-day window.
    pub fn from_name(name: &str) -> Self {
        match name {
            "week" => TimeRange::Week,
            "month" => TimeRange::Month,
            "year" => TimeRange::Year,
            _ => TimeRange::Last30Days,
        }
    }

    /// The inclusive window ending at the reference date.
    pub fn window(&self, today: Date) -> (Date, Date) {
        let start = match self {
            TimeRange::Week => today - Duration::days(7),
            TimeRange::Month => months_back(today, 1),
            TimeRange::Year => months_back(today, 12),
            TimeRange::Last30Days => today - Duration::days(30),
        };

        (start, today)
    }

    /// The window of the same length immediately before [TimeRange::window].
    ///
    /// Used for period-over-period comparisons on the dashboard. Both
    /// windows are queried with inclusive bounds, so the previous window
    /// covers the same number of calendar days as the current one.
    pub fn previous_window(&self, today: Date) -> (Date, Date) {
        let (start, end) = self.window(today);
        let length = end - start;

        (start - length - Duration::days(1), start - Duration::days(1))
    }
}

/// Step a date back by whole calendar months, clamping the day to the
/// length of the target month.
pub(crate) fn months_back(date: Date, months: i32) -> Date {
    let total = date.year() * 12 + date.month() as i32 - 1 - months;
    let year = total.div_euclid(12);
    let month = Month::January.nth_next(total.rem_euclid(12) as u8);
    let day = date.day().min(month.length(year));

    // The day is clamped to the target month, so this cannot fail.
    Date::from_calendar_date(year, month, day).unwrap_or(date)
}


#[cfg(test)]
mod time_range_tests {
    use time::{Duration, macros::date};

    use super::{TimeRange, months_back};

    #[test]
    fn unknown_names_fall_back_to_30_days() {
        assert_eq!(TimeRange::from_name("fortnight"), TimeRange::Last30Days);
        assert_eq!(TimeRange::from_name("week"), TimeRange::Week);
    }

    #[test]
    fn week_window_is_seven_days() {
        let (start, end) = TimeRange::Week.window(date!(2024 - 03 - 15));

        assert_eq!(start, date!(2024 - 03 - 08));
        assert_eq!(end, date!(2024 - 03 - 15));
    }

    #[test]
    fn month_window_steps_back_one_calendar_month() {
        let (start, end) = TimeRange::Month.window(date!(2024 - 03 - 15));

        assert_eq!(start, date!(2024 - 02 - 15));
        assert_eq!(end, date!(2024 - 03 - 15));
    }

    #[test]
    fn previous_window_is_adjacent_and_equal_length() {
        let (current_start, current_end) = TimeRange::Week.window(date!(2024 - 03 - 15));
        let (start, end) = TimeRange::Week.previous_window(date!(2024 - 03 - 15));

        assert_eq!(start, date!(2024 - 02 - 29));
        assert_eq!(end, date!(2024 - 03 - 07));
        // Inclusive day counts match, so percent changes compare like
        // with like.
        assert_eq!(end - start, current_end - current_start);
        assert_eq!(current_start - end, Duration::days(1));
    }

    #[test]
    fn months_back_clamps_to_shorter_months() {
        assert_eq!(months_back(date!(2024 - 03 - 31), 1), date!(2024 - 02 - 29));
        assert_eq!(months_back(date!(2023 - 03 - 31), 1), date!(2023 - 02 - 28));
    }

    #[test]
    fn months_back_crosses_year_boundaries() {
        assert_eq!(months_back(date!(2024 - 01 - 15), 1), date!(2023 - 12 - 15));
        assert_eq!(months_back(date!(2024 - 03 - 15), 12), date!(2023 - 03 - 15));
    }
}
