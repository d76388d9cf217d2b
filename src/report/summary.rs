//! The month at a glance: balance, income, expenses and pending transactions.

use serde::Serialize;
use time::{Date, OffsetDateTime};

use crate::transaction::{TransactionKind, TransactionStatus};

use super::{
    ReportEntry,
    monthly::{month_end, month_start},
};

/// The financial position of a user for the current month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    /// The sum of the current balances of the active accounts.
    pub total_balance: f64,
    /// Paid income due this month.
    pub month_income: f64,
    /// Paid expenses due this month.
    pub month_expense: f64,
    /// Income minus expenses for this month.
    pub month_balance: f64,
    /// The number of pending transactions of any kind due this month.
    pub pending_count: usize,
}

/// The first and last day, inclusive, of the month `date` is in.
pub fn month_window(date: Date) -> (Date, Date) {
    (month_start(date), month_end(date))
}

/// Summarize the month of `now` from the user's transactions and the total balance
/// of their active accounts.
pub fn summarize_month<T: ReportEntry>(
    entries: &[T],
    total_balance: f64,
    now: OffsetDateTime,
) -> FinancialSummary {
    let (first_day, last_day) = month_window(now.date());

    let mut summary = FinancialSummary {
        total_balance,
        month_income: 0.0,
        month_expense: 0.0,
        month_balance: 0.0,
        pending_count: 0,
    };

    for entry in entries
        .iter()
        .filter(|entry| (first_day..=last_day).contains(&entry.due_date()))
    {
        match (entry.status(), entry.kind()) {
            (TransactionStatus::Pending, _) => summary.pending_count += 1,
            (TransactionStatus::Paid, TransactionKind::Income) => {
                summary.month_income += entry.amount()
            }
            (TransactionStatus::Paid, TransactionKind::Expense) => {
                summary.month_expense += entry.amount()
            }
            _ => {}
        }
    }

    summary.month_balance = summary.month_income - summary.month_expense;

    summary
}

/// Like [summarize_month], but `None` when there is no signed in user.
///
/// `user_data` holds the user's transactions and total active balance.
pub fn summary_for_user<T: ReportEntry>(
    user_data: Option<(&[T], f64)>,
    now: OffsetDateTime,
) -> Option<FinancialSummary> {
    user_data.map(|(entries, total_balance)| summarize_month(entries, total_balance, now))
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use crate::{
        report::test_entry::Entry,
        transaction::{TransactionKind, TransactionStatus},
    };

    use super::{FinancialSummary, month_window, summarize_month, summary_for_user};

    #[test]
    fn summarizes_current_month() {
        let entries = [
            Entry::paid(3000.0, TransactionKind::Income, None, date!(2026 - 10 - 01)),
            Entry::paid(1200.0, TransactionKind::Expense, None, date!(2026 - 10 - 31)),
            Entry::paid(80.0, TransactionKind::Expense, None, date!(2026 - 10 - 20))
                .with_status(TransactionStatus::Pending),
            Entry::paid(500.0, TransactionKind::Income, None, date!(2026 - 10 - 25))
                .with_status(TransactionStatus::Pending),
            Entry::paid(60.0, TransactionKind::Expense, None, date!(2026 - 10 - 03))
                .with_status(TransactionStatus::Cancelled),
            Entry::paid(999.0, TransactionKind::Income, None, date!(2026 - 09 - 30)),
            Entry::paid(5.0, TransactionKind::Expense, None, date!(2026 - 11 - 01))
                .with_status(TransactionStatus::Pending),
        ];

        let summary = summarize_month(&entries, 10_000.0, datetime!(2026-10-17 09:30 -3));

        assert_eq!(
            summary,
            FinancialSummary {
                total_balance: 10_000.0,
                month_income: 3000.0,
                month_expense: 1200.0,
                month_balance: 1800.0,
                pending_count: 2,
            }
        );
    }

    #[test]
    fn empty_month_has_zero_totals() {
        let entries: [Entry; 0] = [];

        let summary = summarize_month(&entries, 0.0, datetime!(2026-10-17 09:30 UTC));

        assert_eq!(summary.month_balance, 0.0);
        assert_eq!(summary.pending_count, 0);
    }

    #[test]
    fn no_user_gives_no_summary() {
        let summary = summary_for_user::<Entry>(None, datetime!(2026-10-17 09:30 UTC));

        assert_eq!(summary, None);
    }

    #[test]
    fn window_covers_whole_month() {
        assert_eq!(
            month_window(date!(2026 - 02 - 14)),
            (date!(2026 - 02 - 01), date!(2026 - 02 - 28))
        );
    }
}
