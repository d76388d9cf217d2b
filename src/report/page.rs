//! The reports page and the CSV download.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{Date, Month};

use crate::{
    AppState, Error,
    auth::Session,
    endpoints,
    format::{format_currency, format_percentage},
    html::{
        BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, HeadElement, LINK_STYLE,
        PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base,
    },
    navigation::NavBar,
    timezone::local_now,
    transaction::{TransactionFilter, TransactionRow, get_transactions},
};

use super::{
    CategoryReport, MonthlyReport, ReportConfig,
    chart::{ECHARTS_SCRIPT, ReportChart, chart_view, charts_script, monthly_evolution_chart},
    category_reports, csv_filename, evolution_window, export_csv, month_report, month_window,
    monthly_evolution,
};

/// The state needed for the reports page and CSV download.
#[derive(Debug, Clone)]
pub struct ReportState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
    pub report_config: ReportConfig,
}

impl FromRef<AppState> for ReportState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
            report_config: state.report_config.clone(),
        }
    }
}

/// The month to report on, as "YYYY-MM".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub month: Option<String>,
}

/// Parse "YYYY-MM" into the first day of that month.
///
/// The year must have four digits and the month two, as sent by a month input.
fn parse_month(text: &str) -> Option<Date> {
    let (year, month) = text.trim().split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }

    let year: i32 = year.parse().ok()?;
    let month = Month::try_from(month.parse::<u8>().ok()?).ok()?;

    Date::from_calendar_date(year, month, 1).ok()
}

fn format_month_for_input(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}

/// The first day of the requested month, or of the current month when the
/// query has no valid month.
fn selected_month(query: &ReportQuery, today: Date) -> Date {
    query
        .month
        .as_deref()
        .and_then(parse_month)
        .unwrap_or_else(|| month_window(today).0)
}

/// Render the reports page for the month in the query string.
pub async fn get_reports_page(
    State(state): State<ReportState>,
    session: Session,
    Query(query): Query<ReportQuery>,
) -> Result<Response, Error> {
    let now = local_now(&state.local_timezone)?;
    let month = selected_month(&query, now.date());
    let (evolution_start, evolution_end) = evolution_window(now.date());
    let (month_start, month_end) = month_window(month);
    let filter = TransactionFilter {
        date_from: Some(evolution_start.min(month_start)),
        date_to: Some(evolution_end.max(month_end)),
        ..Default::default()
    };

    let rows = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        session
            .scoped(|user_id| get_transactions(user_id, &filter, &connection))
            .inspect_err(|error| tracing::error!("Could not get transactions for report: {error}"))?
    };

    let evolution = monthly_evolution(&rows, now);
    let month_rows: Vec<TransactionRow> = rows
        .into_iter()
        .filter(|row| (month_start..=month_end).contains(&row.transaction.due_date))
        .collect();
    let totals = month_report(&month_rows, month);
    let (income, expense) = category_reports(&month_rows);

    let chart = ReportChart {
        id: "monthly-evolution-chart",
        options: monthly_evolution_chart(&evolution).to_string(),
    };

    let content = html! {
        (NavBar::new(endpoints::REPORTS_VIEW).into_html())

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-8"
            {
                header class="flex justify-between flex-wrap items-end gap-4"
                {
                    h1 class="text-xl font-bold" { "Reports" }
                    (month_selector(month))
                }

                (month_totals_view(&totals))

                div class="grid grid-cols-1 lg:grid-cols-2 gap-8"
                {
                    (category_breakdown_view(
                        "income-by-category",
                        "Income by category",
                        &income,
                        state.report_config.percentage_decimals,
                    ))
                    (category_breakdown_view(
                        "expenses-by-category",
                        "Expenses by category",
                        &expense,
                        state.report_config.percentage_decimals,
                    ))
                }

                section class="space-y-4"
                {
                    (chart_view(&chart))
                    (evolution_table(&evolution))
                }
            }
        }
    };

    let head_elements = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT.to_owned()),
        charts_script(&[chart]),
    ];

    Ok(base("Reports", &head_elements, &content).into_response())
}

/// Download the transactions due in the requested month as CSV.
pub async fn get_report_csv(
    State(state): State<ReportState>,
    session: Session,
    Query(query): Query<ReportQuery>,
) -> Result<Response, Error> {
    let now = local_now(&state.local_timezone)?;
    let month = selected_month(&query, now.date());
    let (first_day, last_day) = month_window(month);
    let filter = TransactionFilter {
        date_from: Some(first_day),
        date_to: Some(last_day),
        ..Default::default()
    };

    let rows = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        session
            .scoped(|user_id| get_transactions(user_id, &filter, &connection))
            .inspect_err(|error| tracing::error!("Could not get transactions for CSV: {error}"))?
    };

    let body = export_csv(&rows)?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", csv_filename(month)),
            ),
        ],
        body,
    )
        .into_response())
}

fn month_selector(month: Date) -> Markup {
    let month_value = format_month_for_input(month);

    html! {
        div class="flex flex-wrap items-end gap-4"
        {
            form method="get" action=(endpoints::REPORTS_VIEW) class="flex items-end gap-2"
            {
                div
                {
                    label for="month" class=(FORM_LABEL_STYLE) { "Month" }
                    input
                        id="month"
                        type="month"
                        name="month"
                        value=(month_value)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                button type="submit" class=(BUTTON_SECONDARY_STYLE) { "Show" }
            }

            a
                id="csv-download"
                href={ (endpoints::REPORT_CSV) "?month=" (month_value) }
                class=(LINK_STYLE)
                download
            {
                "Download CSV"
            }
        }
    }
}

fn month_totals_view(totals: &MonthlyReport) -> Markup {
    let balance_style = if totals.balance < 0.0 {
        "text-red-700 dark:text-red-400"
    } else {
        "text-green-700 dark:text-green-400"
    };

    html! {
        section id="month-totals" class="grid grid-cols-1 md:grid-cols-3 gap-4"
        {
            div class="rounded bg-white dark:bg-gray-800 p-4 shadow"
            {
                h2 class="text-sm text-gray-500" { "Income" }
                p data-total="income" class="text-xl font-semibold text-green-700 dark:text-green-400"
                {
                    (format_currency(totals.income_total))
                }
            }

            div class="rounded bg-white dark:bg-gray-800 p-4 shadow"
            {
                h2 class="text-sm text-gray-500" { "Expenses" }
                p data-total="expense" class="text-xl font-semibold text-red-700 dark:text-red-400"
                {
                    (format_currency(totals.expense_total))
                }
            }

            div class="rounded bg-white dark:bg-gray-800 p-4 shadow"
            {
                h2 class="text-sm text-gray-500" { "Balance" }
                p data-total="balance" class={ "text-xl font-semibold " (balance_style) }
                {
                    (format_currency(totals.balance))
                }
            }
        }
    }
}

fn category_breakdown_view(
    id: &str,
    title: &str,
    reports: &[CategoryReport],
    percentage_decimals: usize,
) -> Markup {
    html! {
        section id=(id) class="space-y-3"
        {
            h2 class="text-lg font-semibold" { (title) }

            @if reports.is_empty() {
                p class="text-sm text-gray-500" { "No paid transactions this month." }
            }

            ul class="space-y-3"
            {
                @for report in reports {
                    li data-category=(report.category_name)
                    {
                        div class="flex justify-between text-sm"
                        {
                            span
                            {
                                (report.category_name)
                                span class="ml-2 text-gray-500"
                                {
                                    "(" (report.transaction_count) ")"
                                }
                            }
                            span
                            {
                                (format_currency(report.total_amount))
                                " · "
                                span data-percentage
                                {
                                    (format_percentage(report.percentage_of_total, percentage_decimals))
                                }
                            }
                        }

                        div class="w-full h-2 rounded bg-gray-200 dark:bg-gray-700"
                        {
                            div
                                class="h-2 rounded bg-blue-500"
                                style={ "width: " (format!("{:.2}", report.percentage_of_total)) "%;" }
                            {}
                        }
                    }
                }
            }
        }
    }
}

fn evolution_table(evolution: &[MonthlyReport]) -> Markup {
    html! {
        div class="overflow-x-auto"
        {
            table id="monthly-evolution" class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Month" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Income" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Expenses" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Balance" }
                    }
                }

                tbody
                {
                    @for report in evolution {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (report.month_label) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(report.income_total)) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(report.expense_total)) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(report.balance)) }
                        }
                    }
                }
            }
        }
    }
}
