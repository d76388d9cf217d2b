//! Summary cards for the current month.

use maud::{Markup, html};

use crate::{format::format_currency, report::FinancialSummary};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md flex flex-col gap-2";

fn amount_style(amount: f64) -> &'static str {
    if amount < 0.0 {
        "text-red-700 dark:text-red-400"
    } else {
        "text-gray-900 dark:text-white"
    }
}

fn summary_card(id: &str, title: &str, value: &str, value_style: &str) -> Markup {
    html! {
        div id=(id) class=(CARD_STYLE)
        {
            h3 class="text-sm font-medium text-gray-600 dark:text-gray-400" { (title) }
            p class={ "text-2xl font-bold " (value_style) } { (value) }
        }
    }
}

/// Renders the five summary cards: total balance, this month's income,
/// expenses and balance, and the number of pending transactions.
pub(super) fn summary_cards_view(summary: &FinancialSummary) -> Markup {
    let pending = match summary.pending_count {
        1 => "1 transaction".to_owned(),
        count => format!("{count} transactions"),
    };

    html! {
        section
            id="summary"
            class="w-full grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-5 gap-4"
        {
            (summary_card(
                "total-balance",
                "Total balance",
                &format_currency(summary.total_balance),
                amount_style(summary.total_balance),
            ))
            (summary_card(
                "month-income",
                "Income this month",
                &format_currency(summary.month_income),
                "text-green-700 dark:text-green-400",
            ))
            (summary_card(
                "month-expense",
                "Expenses this month",
                &format_currency(summary.month_expense),
                "text-red-700 dark:text-red-400",
            ))
            (summary_card(
                "month-balance",
                "Balance this month",
                &format_currency(summary.month_balance),
                amount_style(summary.month_balance),
            ))
            (summary_card(
                "pending-count",
                "Pending",
                &pending,
                "text-yellow-700 dark:text-yellow-400",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};

    use crate::report::FinancialSummary;

    use super::summary_cards_view;

    fn card_value(html: &Html, id: &str) -> String {
        html.select(&Selector::parse(&format!("#{id} p")).unwrap())
            .next()
            .unwrap()
            .text()
            .collect::<String>()
    }

    #[test]
    fn renders_every_figure() {
        let summary = FinancialSummary {
            total_balance: 10_500.0,
            month_income: 3000.0,
            month_expense: 3250.5,
            month_balance: -250.5,
            pending_count: 1,
        };

        let html = Html::parse_fragment(&summary_cards_view(&summary).into_string());

        assert_eq!(card_value(&html, "total-balance"), "R$ 10.500,00");
        assert_eq!(card_value(&html, "month-income"), "R$ 3.000,00");
        assert_eq!(card_value(&html, "month-expense"), "R$ 3.250,50");
        assert_eq!(card_value(&html, "month-balance"), "-R$ 250,50");
        assert_eq!(card_value(&html, "pending-count"), "1 transaction");
    }
}
