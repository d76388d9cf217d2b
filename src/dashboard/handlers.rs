//! Dashboard HTTP handler and view rendering.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    account::get_total_active_balance,
    auth::Session,
    dashboard::{
        cards::summary_cards_view,
        tables::{RECENT_TRANSACTION_COUNT, recent_transactions_view},
    },
    endpoints,
    format::format_date_time,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    profile::{Profile, get_profile},
    report::{FinancialSummary, month_window, summarize_month},
    timezone::local_now,
    transaction::{TransactionFilter, TransactionRow, get_transactions},
    user::UserId,
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading transactions and accounts.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Everything the dashboard shows for a signed in user.
struct DashboardData {
    profile: Profile,
    summary: FinancialSummary,
    recent: Vec<TransactionRow>,
}

/// Display the month's summary and the most recent transactions.
///
/// Signed in users without a profile are sent to profile setup first.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    session: Session,
) -> Result<Response, Error> {
    let now = local_now(&state.local_timezone)?;
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let Some(user) = session.user() else {
        return Ok(signed_out_view(nav_bar).into_response());
    };

    let data = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        load_dashboard_data(user.id, now, &connection)
            .inspect_err(|error| tracing::error!("could not load dashboard: {error}"))?
    };

    match data {
        Some(data) => Ok(dashboard_view(nav_bar, &data, now).into_response()),
        None => Ok(Redirect::to(endpoints::PROFILE_SETUP_VIEW).into_response()),
    }
}

/// Fetch the dashboard data, or `None` if the user has not set up a profile.
fn load_dashboard_data(
    user_id: UserId,
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<Option<DashboardData>, Error> {
    let Some(profile) = get_profile(user_id, connection)? else {
        return Ok(None);
    };

    let (first_day, last_day) = month_window(now.date());
    let month_rows = get_transactions(
        user_id,
        &TransactionFilter {
            date_from: Some(first_day),
            date_to: Some(last_day),
            ..Default::default()
        },
        connection,
    )?;
    let total_balance = get_total_active_balance(user_id, connection)?;
    let recent = get_transactions(
        user_id,
        &TransactionFilter {
            limit: Some(RECENT_TRANSACTION_COUNT),
            ..Default::default()
        },
        connection,
    )?;

    Ok(Some(DashboardData {
        profile,
        summary: summarize_month(&month_rows, total_balance, now),
        recent,
    }))
}

fn dashboard_view(nav_bar: Markup, data: &DashboardData, now: OffsetDateTime) -> Markup {
    let greeting = match &data.profile.company_name {
        Some(company_name) => format!("{} · {company_name}", data.profile.full_name),
        None => data.profile.full_name.clone(),
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-6xl space-y-8"
            {
                header class="flex justify-between flex-wrap items-baseline gap-2"
                {
                    div
                    {
                        h1 class="text-2xl font-bold" { "Dashboard" }
                        p class="text-gray-600 dark:text-gray-400" { (greeting) }
                    }

                    p id="updated-at" class="text-sm text-gray-500"
                    {
                        "Updated at " (format_date_time(now))
                    }
                }

                (summary_cards_view(&data.summary))

                (recent_transactions_view(&data.recent))
            }
        }
    );

    base("Dashboard", &[], &content)
}

fn signed_out_view(nav_bar: Markup) -> Markup {
    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4 text-center"
            {
                h1 class="text-2xl font-bold" { "Dashboard" }
                p id="signed-out" class="text-gray-600 dark:text-gray-400"
                {
                    "You are not signed in. "
                    a href=(endpoints::DASHBOARD_VIEW) class=(LINK_STYLE) { "Try again" }
                    " after signing in through your identity provider."
                }
            }
        }
    );

    base("Dashboard", &[], &content)
}
