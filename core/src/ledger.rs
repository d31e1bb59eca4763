//! Pure helpers over fetched expenses: month bounds, per-day totals and
//! per-day filtering for calendar and list views.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

use crate::error::ApiError;
use crate::types::Expense;

/// First and last day of `month` (1-12) in `year`.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), ApiError> {
    let invalid = || ApiError::InvalidDate(format!("{year}-{month:02}"));
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|next| next.pred_opt())
        .ok_or_else(invalid)?;
    Ok((first, last))
}

/// `YYYY-MM` for the month containing `day`.
pub fn month_key(day: NaiveDate) -> String {
    format!("{:04}-{:02}", day.year(), day.month())
}

/// The calendar day an expense was recorded on, from the date prefix.
pub fn expense_day(expense: &Expense) -> Option<NaiveDate> {
    let prefix = expense.date.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// Sum of amounts per day. Expenses with unreadable dates are skipped.
pub fn daily_totals(expenses: &[Expense]) -> BTreeMap<NaiveDate, f64> {
    let mut totals = BTreeMap::new();
    for expense in expenses {
        if let Some(day) = expense_day(expense) {
            *totals.entry(day).or_insert(0.0) += expense.amount;
        }
    }
    totals
}

pub fn on_day(expenses: Vec<Expense>, day: NaiveDate) -> Vec<Expense> {
    expenses
        .into_iter()
        .filter(|e| expense_day(e) == Some(day))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(id: &str, amount: f64, date: &str) -> Expense {
        Expense {
            id: id.to_string(),
            description: format!("item {id}"),
            amount,
            date: date.to_string(),
            category: None,
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn month_bounds_handle_lengths() {
        assert_eq!(month_bounds(2024, 2).unwrap(), (day("2024-02-01"), day("2024-02-29")));
        assert_eq!(month_bounds(2025, 2).unwrap().1, day("2025-02-28"));
        assert_eq!(month_bounds(2025, 12).unwrap(), (day("2025-12-01"), day("2025-12-31")));
        assert!(matches!(month_bounds(2025, 13), Err(ApiError::InvalidDate(_))));
        assert!(matches!(month_bounds(2025, 0), Err(ApiError::InvalidDate(_))));
    }

    #[test]
    fn month_key_pads() {
        assert_eq!(month_key(day("2025-03-09")), "2025-03");
    }

    #[test]
    fn totals_group_by_date_prefix() {
        let expenses = vec![
            expense("1", 12.5, "2025-09-11T02:00:00.000Z"),
            expense("2", 7.5, "2025-09-11T13:30:00.000Z"),
            expense("3", 30.0, "2025-09-12"),
            expense("4", 99.0, "garbage"),
        ];
        let totals = daily_totals(&expenses);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[&day("2025-09-11")], 20.0);
        assert_eq!(totals[&day("2025-09-12")], 30.0);
    }

    #[test]
    fn on_day_filters() {
        let expenses = vec![
            expense("1", 1.0, "2025-09-11T02:00:00Z"),
            expense("2", 2.0, "2025-09-12T02:00:00Z"),
        ];
        let filtered = on_day(expenses, day("2025-09-12"));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "2");
    }
}
