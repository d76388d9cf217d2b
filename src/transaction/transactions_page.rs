//! The transactions page: a filter form and a paginated table.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::Session,
    category::{Category, get_categories},
    endpoints::{self, format_endpoint},
    format::{format_currency, format_date, format_date_for_input, parse_date},
    html::{
        BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
        category_badge, edit_delete_action_links,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, page_count, page_links, pagination_view},
    transaction::{
        TransactionKind, TransactionStatus,
        query::{TransactionFilter, TransactionRow, count_transactions, get_transactions},
    },
};

/// The state needed for the transaction pages and endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The filter form values, as sent in the query string.
///
/// Values are kept as text so that an empty or malformed filter is ignored instead
/// of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TransactionsQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub date_from: Option<String>,
    #[serde(default)]
    pub date_to: Option<String>,
    #[serde(default, skip_serializing)]
    pub page: Option<u64>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|text| !text.is_empty())
}

impl TransactionsQuery {
    fn to_filter(&self) -> TransactionFilter {
        TransactionFilter {
            category_id: non_empty(&self.category_id).and_then(|text| text.parse().ok()),
            kind: non_empty(&self.kind).and_then(|text| text.parse().ok()),
            status: non_empty(&self.status).and_then(|text| text.parse().ok()),
            date_from: non_empty(&self.date_from).and_then(|text| parse_date(text).ok()),
            date_to: non_empty(&self.date_to).and_then(|text| parse_date(text).ok()),
            search: non_empty(&self.search).map(str::to_owned),
            limit: None,
            offset: None,
        }
    }

    /// The URL of `page` with the same filters.
    fn page_url(&self, page: u64) -> String {
        match serde_urlencoded::to_string(self) {
            Ok(query) if !query.is_empty() => {
                format!("{}?{query}&page={page}", endpoints::TRANSACTIONS_VIEW)
            }
            Ok(_) => format!("{}?page={page}", endpoints::TRANSACTIONS_VIEW),
            Err(error) => {
                tracing::error!("Could not encode transaction filters: {error}");
                format!("{}?page={page}", endpoints::TRANSACTIONS_VIEW)
            }
        }
    }
}

/// Render the user's transactions matching the filters in the query string.
pub async fn get_transactions_page(
    State(state): State<TransactionState>,
    session: Session,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let page_size = state.pagination_config.default_page_size.max(1);
    let mut filter = query.to_filter();

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let row_count = session
        .scoped(|user_id| count_transactions(user_id, &filter, &connection))
        .inspect_err(|error| tracing::error!("Could not count transactions: {error}"))?;
    let page_count = page_count(row_count, page_size);
    let current_page = query.page.unwrap_or(1).clamp(1, page_count);

    filter.limit = Some(page_size);
    filter.offset = Some((current_page - 1) * page_size);

    let rows = session
        .scoped(|user_id| get_transactions(user_id, &filter, &connection))
        .inspect_err(|error| tracing::error!("Could not get transactions: {error}"))?;
    let categories = session
        .scoped(|user_id| get_categories(user_id, &connection))
        .inspect_err(|error| tracing::error!("Could not get categories: {error}"))?;

    let links = page_links(current_page, page_count, state.pagination_config.max_pages);
    let pagination = pagination_view(&links, |page| query.page_url(page));

    Ok(transactions_view(&query, &categories, &rows, row_count, &pagination).into_response())
}

fn filter_form(query: &TransactionsQuery, categories: &[Category]) -> Markup {
    let filter = query.to_filter();

    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            id="transaction-filters"
            class="grid grid-cols-1 md:grid-cols-3 lg:grid-cols-6 gap-4 items-end"
        {
            div class="md:col-span-3 lg:col-span-2"
            {
                label for="search" class=(FORM_LABEL_STYLE) { "Search" }
                input
                    id="search"
                    type="search"
                    name="search"
                    value=(query.search.as_deref().unwrap_or_default())
                    placeholder="Search descriptions"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="filter-category" class=(FORM_LABEL_STYLE) { "Category" }
                select id="filter-category" name="category_id" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "All" }
                    @for category in categories {
                        option
                            value=(category.id)
                            selected[filter.category_id == Some(category.id)]
                        {
                            (category.name)
                        }
                    }
                }
            }

            div
            {
                label for="filter-kind" class=(FORM_LABEL_STYLE) { "Type" }
                select id="filter-kind" name="kind" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "All" }
                    @for kind in TransactionKind::ALL {
                        option value=(kind.as_str()) selected[filter.kind == Some(*kind)]
                        {
                            (kind.label())
                        }
                    }
                }
            }

            div
            {
                label for="filter-status" class=(FORM_LABEL_STYLE) { "Status" }
                select id="filter-status" name="status" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "All" }
                    @for status in TransactionStatus::ALL {
                        option value=(status.as_str()) selected[filter.status == Some(*status)]
                        {
                            (status.label())
                        }
                    }
                }
            }

            div
            {
                label for="date_from" class=(FORM_LABEL_STYLE) { "From" }
                input
                    id="date_from"
                    type="date"
                    name="date_from"
                    value=[filter.date_from.map(format_date_for_input)]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="date_to" class=(FORM_LABEL_STYLE) { "To" }
                input
                    id="date_to"
                    type="date"
                    name="date_to"
                    value=[filter.date_to.map(format_date_for_input)]
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="flex gap-4 items-center"
            {
                button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Filter" }
                a href=(endpoints::TRANSACTIONS_VIEW) class=(LINK_STYLE) { "Clear" }
            }
        }
    }
}

fn amount_cell(row: &TransactionRow) -> Markup {
    let transaction = &row.transaction;

    match transaction.kind {
        TransactionKind::Income => html! {
            span class="text-green-700 dark:text-green-400" { (format_currency(transaction.amount)) }
        },
        TransactionKind::Expense => html! {
            span class="text-red-700 dark:text-red-400" { (format_currency(-transaction.amount)) }
        },
        TransactionKind::Transfer => html! { span { (format_currency(transaction.amount)) } },
    }
}

fn status_badge(status: TransactionStatus) -> Markup {
    let style = match status {
        TransactionStatus::Paid => "bg-green-100 text-green-800",
        TransactionStatus::Pending => "bg-yellow-100 text-yellow-800",
        TransactionStatus::Cancelled => "bg-gray-200 text-gray-700 line-through",
    };

    html! {
        span class={ "px-2 py-0.5 rounded text-xs font-medium " (style) } { (status.label()) }
    }
}

fn transactions_view(
    query: &TransactionsQuery,
    categories: &[Category],
    rows: &[TransactionRow],
    row_count: u64,
    pagination: &Markup,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Transactions" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Create Transaction"
                    }
                }

                (filter_form(query, categories))

                p id="transaction-count" class="text-sm text-gray-500"
                {
                    (row_count) " transactions"
                }

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
                                th scope="col" class=(TABLE_CELL_STYLE) { "Account" }
                                th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Amount" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Status" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in rows {
                                (transaction_row_with_actions(row))
                            }

                            @if rows.is_empty() {
                                tr
                                {
                                    td colspan="7" class="px-6 py-4 text-center"
                                    {
                                        "No transactions found."
                                    }
                                }
                            }
                        }
                    }
                }

                (pagination)
            }
        }
    };

    base("Transactions", &[], &content)
}

fn transaction_row_with_actions(row: &TransactionRow) -> Markup {
    let transaction = &row.transaction;

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
        {
            td class=(TABLE_CELL_STYLE) { (format_date(transaction.due_date)) }
            td class=(TABLE_CELL_STYLE)
            {
                (transaction.description)
                @if transaction.is_recurring() {
                    span class="ml-2 text-xs text-gray-500" title="Repeats" { "↻" }
                }
            }
            td class=(TABLE_CELL_STYLE)
            {
                @match (&row.category_name, &row.category_color) {
                    (Some(name), Some(color)) => (category_badge(name, color)),
                    _ => span class="text-gray-400" { "-" },
                }
            }
            td class=(TABLE_CELL_STYLE) { (row.account_name.as_deref().unwrap_or("-")) }
            td class={ (TABLE_CELL_STYLE) " text-right" } { (amount_cell(row)) }
            td class=(TABLE_CELL_STYLE) { (status_badge(transaction.status)) }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    (edit_delete_action_links(
                        &format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id),
                        &format_endpoint(endpoints::TRANSACTION, transaction.id),
                        &format!(
                            "Are you sure you want to delete '{}'? This cannot be undone.",
                            transaction.description
                        ),
                        "closest tr",
                        "delete",
                    ))
                }
            }
        }
    }
}
