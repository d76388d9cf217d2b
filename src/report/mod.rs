//! The aggregation engine behind the dashboard and the reports page.
//!
//! Every function here is a synchronous, pure computation over transactions that
//! have already been fetched. Anything time dependent takes the reference time as
//! an argument instead of reading the clock, so callers decide the timezone.
//!
//! Only [paid](TransactionStatus::Paid) transactions contribute to monetary
//! totals. Pending transactions are only counted, and cancelled ones are ignored.

use time::Date;

use crate::transaction::{TransactionKind, TransactionStatus};

mod category;
mod chart;
mod csv_export;
mod monthly;
mod page;
mod summary;

pub use category::{CategoryReport, UNCATEGORIZED_LABEL, aggregate_by_category, category_reports};
pub use csv_export::{CSV_HEADER, csv_filename, export_csv};
pub use monthly::{
    MONTHLY_WINDOW, MonthlyReport, evolution_window, month_report, monthly_evolution,
};
pub(crate) use page::{get_report_csv, get_reports_page};
pub use summary::{FinancialSummary, month_window, summarize_month, summary_for_user};

/// A transaction as seen by the report functions.
///
/// Implemented by the rows the data access layer returns, and by plain structs in
/// tests.
pub trait ReportEntry {
    /// The amount of money, zero or positive.
    fn amount(&self) -> f64;

    /// Whether money came in, went out or moved between accounts.
    fn kind(&self) -> TransactionKind;

    /// Only paid transactions count towards totals.
    fn status(&self) -> TransactionStatus;

    /// The date the transaction is due, which decides its month.
    fn due_date(&self) -> Date;

    /// The name of the transaction's category, `None` if it has none.
    fn category_name(&self) -> Option<&str>;

    /// Free text describing the transaction.
    fn description(&self) -> &str;

    /// Whether the transaction counts towards monetary totals.
    fn is_paid(&self) -> bool {
        self.status() == TransactionStatus::Paid
    }
}

/// Display settings for reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    /// The number of decimal places to show for category percentages.
    pub percentage_decimals: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            percentage_decimals: 1,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_entry {
    use time::Date;

    use crate::transaction::{TransactionKind, TransactionStatus};

    use super::ReportEntry;

    /// A minimal [ReportEntry] for report tests.
    #[derive(Debug, Clone)]
    pub(crate) struct Entry {
        pub amount: f64,
        pub kind: TransactionKind,
        pub status: TransactionStatus,
        pub due_date: Date,
        pub category: Option<&'static str>,
        pub description: &'static str,
    }

    impl Entry {
        pub(crate) fn paid(
            amount: f64,
            kind: TransactionKind,
            category: Option<&'static str>,
            due_date: Date,
        ) -> Self {
            Self {
                amount,
                kind,
                status: TransactionStatus::Paid,
                due_date,
                category,
                description: "",
            }
        }

        pub(crate) fn with_status(mut self, status: TransactionStatus) -> Self {
            self.status = status;
            self
        }
    }

    impl ReportEntry for Entry {
        fn amount(&self) -> f64 {
            self.amount
        }

        fn kind(&self) -> TransactionKind {
            self.kind
        }

        fn status(&self) -> TransactionStatus {
            self.status
        }

        fn due_date(&self) -> Date {
            self.due_date
        }

        fn category_name(&self) -> Option<&str> {
            self.category
        }

        fn description(&self) -> &str {
            self.description
        }
    }
}
