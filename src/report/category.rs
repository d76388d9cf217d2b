//! Totals per category for one kind of transaction.

use serde::Serialize;

use crate::transaction::TransactionKind;

use super::ReportEntry;

/// The category name used for transactions without a category.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// The paid total of one category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryReport {
    /// The category name, or [UNCATEGORIZED_LABEL].
    pub category_name: String,
    /// The sum of the paid amounts in the category.
    pub total_amount: f64,
    /// The number of paid transactions in the category.
    pub transaction_count: usize,
    /// The share of the kind's total, from 0 to 100.
    pub percentage_of_total: f64,
}

/// Group the paid transactions of `kind` by category name.
///
/// The result is sorted by descending total. Categories with equal totals keep the
/// order in which they first appear in `entries`. An empty result is returned when
/// there are no paid transactions of `kind`.
pub fn aggregate_by_category<T: ReportEntry>(
    entries: &[T],
    kind: TransactionKind,
) -> Vec<CategoryReport> {
    let mut reports: Vec<CategoryReport> = Vec::new();

    for entry in entries
        .iter()
        .filter(|entry| entry.is_paid() && entry.kind() == kind)
    {
        let name = entry.category_name().unwrap_or(UNCATEGORIZED_LABEL);

        match reports
            .iter_mut()
            .find(|report| report.category_name == name)
        {
            Some(report) => {
                report.total_amount += entry.amount();
                report.transaction_count += 1;
            }
            None => reports.push(CategoryReport {
                category_name: name.to_owned(),
                total_amount: entry.amount(),
                transaction_count: 1,
                percentage_of_total: 0.0,
            }),
        }
    }

    let kind_total: f64 = reports.iter().map(|report| report.total_amount).sum();

    if kind_total > 0.0 {
        for report in &mut reports {
            report.percentage_of_total = report.total_amount / kind_total * 100.0;
        }
    }

    // `sort_by` is stable, so ties keep first-seen order.
    reports.sort_by(|a, b| b.total_amount.total_cmp(&a.total_amount));

    reports
}

/// The income and expense breakdowns of `entries`, in that order.
pub fn category_reports<T: ReportEntry>(
    entries: &[T],
) -> (Vec<CategoryReport>, Vec<CategoryReport>) {
    (
        aggregate_by_category(entries, TransactionKind::Income),
        aggregate_by_category(entries, TransactionKind::Expense),
    )
}
