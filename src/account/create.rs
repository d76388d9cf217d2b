//! Account creation page and endpoint.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::Deserialize;

use crate::{
    Error,
    account::{
        AccountKind, AccountName, AccountState, NewAccount, create_account, form::account_fields,
        parse_balance,
    },
    auth::Session,
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, currency_input_styles, form_error},
    navigation::NavBar,
};

/// Form data for creating an account.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAccountFormData {
    pub name: String,
    pub kind: AccountKind,
    pub initial_balance: String,
}

impl NewAccountFormData {
    fn validate(&self) -> Result<NewAccount, Error> {
        Ok(NewAccount {
            name: AccountName::new(&self.name)?,
            kind: self.kind,
            initial_balance: parse_balance(&self.initial_balance)?,
        })
    }
}

/// Render the account creation page.
pub async fn get_new_account_page() -> Response {
    let nav_bar = NavBar::new(endpoints::NEW_ACCOUNT_VIEW).into_html();
    let form = NewAccountFormData {
        name: String::new(),
        kind: AccountKind::Checking,
        initial_balance: "0,00".to_owned(),
    };

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "New Account" }
            (new_account_form_view(&form, ""))
        }
    };

    base("New Account", &[currency_input_styles()], &content).into_response()
}

/// Handle the account creation form.
pub async fn create_account_endpoint(
    State(state): State<AccountState>,
    session: Session,
    Form(form): Form<NewAccountFormData>,
) -> Response {
    let user_id = match session.require() {
        Ok(user) => user.id,
        Err(error) => return error.into_alert_response(),
    };

    let account = match form.validate() {
        Ok(account) => account,
        Err(error) => {
            return new_account_form_view(&form, &format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_account(user_id, account, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating an account: {error}");
            error.into_alert_response()
        }
    }
}

fn new_account_form_view(form: &NewAccountFormData, error_message: &str) -> Markup {
    html! {
        form
            hx-post=(endpoints::ACCOUNTS_API)
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full max-w-md space-y-4 md:space-y-6"
        {
            (account_fields(&form.name, form.kind, "initial_balance", "Initial balance", &form.initial_balance))

            (form_error(error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Create Account" }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode, response::IntoResponse};
    use axum_extra::extract::Form;
    use rusqlite::Connection;

    use crate::{
        account::{AccountKind, AccountState, get_accounts},
        auth::Session,
        db::initialize,
        endpoints,
        test_utils::{
            assert_form_error_message, assert_form_input, assert_form_submit_button,
            assert_hx_endpoint, assert_hx_redirect, assert_valid_html, must_get_form,
            parse_html_document, parse_html_fragment,
        },
        user::{User, find_or_create_user},
    };

    use super::{NewAccountFormData, create_account_endpoint, get_new_account_page};

    fn get_state() -> (AccountState, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (user, _) = find_or_create_user("ana@example.com", &connection).unwrap();

        (
            AccountState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user,
        )
    }

    fn form(name: &str, initial_balance: &str) -> NewAccountFormData {
        NewAccountFormData {
            name: name.to_owned(),
            kind: AccountKind::CreditCard,
            initial_balance: initial_balance.to_owned(),
        }
    }

    #[tokio::test]
    async fn render_page() {
        let response = get_new_account_page().await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::ACCOUNTS_API, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_input(&form, "initial_balance", "text");
        assert_form_submit_button(&form);
    }

    #[tokio::test]
    async fn can_create_account_with_negative_balance() {
        let (state, user) = get_state();

        let response = create_account_endpoint(
            State(state.clone()),
            Session::signed_in(user.clone()),
            Form(form("Card", "-1.500,00")),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::ACCOUNTS_VIEW);
        let accounts = get_accounts(user.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].current_balance, -1500.0);
        assert_eq!(accounts[0].kind, AccountKind::CreditCard);
    }

    #[tokio::test]
    async fn create_account_fails_on_empty_name() {
        let (state, user) = get_state();

        let response =
            create_account_endpoint(State(state), Session::signed_in(user), Form(form(" ", "0")))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Account name cannot be empty");
    }

    #[tokio::test]
    async fn create_account_fails_on_invalid_balance() {
        let (state, user) = get_state();

        let response = create_account_endpoint(
            State(state),
            Session::signed_in(user),
            Form(form("Bank", "lots")),
        )
        .await
        .into_response();

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: \"lots\" is not a valid amount");
    }

    #[tokio::test]
    async fn signed_out_create_is_rejected() {
        let (state, _) = get_state();

        let response =
            create_account_endpoint(State(state), Session::signed_out(), Form(form("Bank", "0")))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
