//! Displays accounts and their balances.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    account::{Account, get_accounts},
    auth::Session,
    endpoints::{self, format_endpoint},
    format::format_currency,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base,
    },
    navigation::NavBar,
};

/// The state needed for the account pages and endpoints.
#[derive(Debug, Clone)]
pub struct AccountState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for AccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

fn balance_style(balance: f64) -> &'static str {
    if balance < 0.0 {
        "px-6 py-4 text-right tabular-nums text-red-600 dark:text-red-400"
    } else {
        "px-6 py-4 text-right tabular-nums text-gray-900 dark:text-white"
    }
}

fn accounts_view(accounts: &[Account]) -> Markup {
    let nav_bar = NavBar::new(endpoints::ACCOUNTS_VIEW).into_html();
    let total: f64 = accounts
        .iter()
        .filter(|account| account.active)
        .map(|account| account.current_balance)
        .sum();

    let table_row = |account: &Account| {
        html!(
            tr class=(TABLE_ROW_STYLE) data-active=(account.active)
            {
                th
                    scope="row"
                    class="px-6 py-4 font-medium text-gray-900 whitespace-nowrap dark:text-white"
                {
                    (account.name)
                    @if !account.active {
                        span class="ml-2 text-xs text-gray-500" { "(inactive)" }
                    }
                }
                td class=(TABLE_CELL_STYLE) { (account.kind.label()) }
                td class=(balance_style(account.initial_balance))
                {
                    (format_currency(account.initial_balance))
                }
                td class=(balance_style(account.current_balance))
                {
                    (format_currency(account.current_balance))
                }
                td class=(TABLE_CELL_STYLE)
                {
                    a
                        href=(format_endpoint(endpoints::EDIT_ACCOUNT_VIEW, account.id))
                        class=(LINK_STYLE)
                    {
                        "Edit"
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Accounts" }

                    a href=(endpoints::NEW_ACCOUNT_VIEW) class=(LINK_STYLE)
                    {
                        "Add Account"
                    }
                }

                p class="text-gray-600 dark:text-gray-300"
                {
                    "Total balance of active accounts: "
                    strong id="total-balance" { (format_currency(total)) }
                }

                div class="w-full overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Type" }
                                th scope="col" class="px-6 py-3 text-right" { "Initial balance" }
                                th scope="col" class="px-6 py-3 text-right" { "Current balance" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for account in accounts {
                                (table_row(account))
                            }

                            @if accounts.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                                    {
                                        "No accounts found. Create an account "
                                        a href=(endpoints::NEW_ACCOUNT_VIEW) class=(LINK_STYLE)
                                        {
                                            "here"
                                        }
                                        "."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Accounts", &[], &content)
}

/// Renders the accounts page showing all of the user's accounts.
pub async fn get_accounts_page(
    State(state): State<AccountState>,
    session: Session,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let accounts = session
        .scoped(|user_id| get_accounts(user_id, &connection))
        .inspect_err(|error| tracing::error!("could not get accounts: {error}"))?;

    Ok(accounts_view(&accounts).into_response())
}
