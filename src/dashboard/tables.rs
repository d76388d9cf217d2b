//! The recent transactions table on the dashboard.

use maud::{Markup, html};

use crate::{
    endpoints,
    format::{format_currency, format_date},
    html::{LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, category_badge},
    transaction::{TransactionKind, TransactionRow},
};

/// The number of transactions shown on the dashboard.
pub(super) const RECENT_TRANSACTION_COUNT: u64 = 5;

fn signed_amount(row: &TransactionRow) -> String {
    match row.transaction.kind {
        TransactionKind::Expense => format_currency(-row.transaction.amount),
        TransactionKind::Income | TransactionKind::Transfer => {
            format_currency(row.transaction.amount)
        }
    }
}

pub(super) fn recent_transactions_view(rows: &[TransactionRow]) -> Markup {
    html! {
        section id="recent-transactions" class="w-full space-y-4"
        {
            div class="flex justify-between items-baseline"
            {
                h2 class="text-xl font-semibold" { "Recent transactions" }
                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "See all" }
            }

            @if rows.is_empty() {
                p class="text-gray-500"
                {
                    "No transactions yet. "
                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Add your first transaction"
                    }
                }
            } @else {
                div class="overflow-x-auto"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Due date" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Description" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Category" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                                th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                tr class=(TABLE_ROW_STYLE) data-transaction-id=(row.transaction.id)
                                {
                                    td class=(TABLE_CELL_STYLE) { (format_date(row.transaction.due_date)) }
                                    td class=(TABLE_CELL_STYLE) { (row.transaction.description) }
                                    td class=(TABLE_CELL_STYLE)
                                    {
                                        @if let (Some(name), Some(color)) = (&row.category_name, &row.category_color) {
                                            (category_badge(name, color))
                                        }
                                    }
                                    td class=(TABLE_CELL_STYLE) { (row.transaction.status.label()) }
                                    td class={ (TABLE_CELL_STYLE) " text-right" } { (signed_amount(row)) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
