//! Income and expense totals for the trailing months.

use serde::Serialize;
use time::{Date, Duration, OffsetDateTime};

use crate::{format::format_month_label, transaction::TransactionKind};

use super::ReportEntry;

/// The number of months in [monthly_evolution].
pub const MONTHLY_WINDOW: usize = 6;

/// The paid totals of one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyReport {
    /// The first day of the month.
    pub month: Date,
    /// The short pt-BR month and year, e.g. "out. de 2026".
    pub month_label: String,
    /// Paid income due in the month.
    pub income_total: f64,
    /// Paid expenses due in the month.
    pub expense_total: f64,
    /// Income minus expenses.
    pub balance: f64,
}

/// The first day of the month `date` is in.
pub(super) fn month_start(date: Date) -> Date {
    date - Duration::days(i64::from(date.day()) - 1)
}

/// The last day of the month `date` is in.
pub(super) fn month_end(date: Date) -> Date {
    date.replace_day(date.month().length(date.year())).unwrap_or(date)
}

/// The first day of each month in the window ending at the month of `date`, oldest first.
///
/// The window is shorter when it would start before the earliest representable date.
fn window_months(date: Date) -> Vec<Date> {
    let mut months = Vec::with_capacity(MONTHLY_WINDOW);
    let mut month = Some(month_start(date));

    while months.len() < MONTHLY_WINDOW {
        let Some(first_day) = month else { break };
        months.push(first_day);
        month = first_day.previous_day().map(month_start);
    }

    months.reverse();
    months
}

/// The first and last day, inclusive, of the months [monthly_evolution] covers for `date`.
pub fn evolution_window(date: Date) -> (Date, Date) {
    let months = window_months(date);
    let first_day = months.first().copied().unwrap_or_else(|| month_start(date));

    (first_day, month_end(date))
}

/// The paid income and expense totals of the month `date` is in.
pub fn month_report<T: ReportEntry>(entries: &[T], date: Date) -> MonthlyReport {
    let month = month_start(date);
    let (mut income_total, mut expense_total) = (0.0, 0.0);

    for entry in entries.iter().filter(|entry| {
        entry.is_paid()
            && entry.due_date().year() == month.year()
            && entry.due_date().month() == month.month()
    }) {
        match entry.kind() {
            TransactionKind::Income => income_total += entry.amount(),
            TransactionKind::Expense => expense_total += entry.amount(),
            TransactionKind::Transfer => {}
        }
    }

    MonthlyReport {
        month,
        month_label: format_month_label(month),
        income_total,
        expense_total,
        balance: income_total - expense_total,
    }
}

/// The totals for the month of `now` and the five months before it, oldest first.
///
/// `now` should already be in the user's timezone. A transaction belongs to the
/// month of its due date, the time of day plays no part. Months without
/// transactions are still included with zero totals.
pub fn monthly_evolution<T: ReportEntry>(entries: &[T], now: OffsetDateTime) -> Vec<MonthlyReport> {
    window_months(now.date())
        .into_iter()
        .map(|month| month_report(entries, month))
        .collect()
}
