//! Account editing page and endpoint.

use axum::{
    extract::{Path, State},
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
        AccountId, AccountKind, AccountName, AccountState, AccountUpdate, form::account_fields,
        get_account, parse_balance, update_account,
    },
    auth::Session,
    endpoints::{self, format_endpoint},
    format::format_amount_for_input,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, base,
        currency_input_styles, form_error,
    },
    navigation::NavBar,
};

/// Form data for editing an account.
#[derive(Debug, Clone, Deserialize)]
pub struct EditAccountFormData {
    pub name: String,
    pub kind: AccountKind,
    pub current_balance: String,
    /// Unchecked checkboxes are not submitted.
    #[serde(default)]
    pub active: Option<String>,
}

impl EditAccountFormData {
    fn validate(&self) -> Result<AccountUpdate, Error> {
        Ok(AccountUpdate {
            name: AccountName::new(&self.name)?,
            kind: self.kind,
            current_balance: parse_balance(&self.current_balance)?,
            active: self.active.is_some(),
        })
    }
}

/// Render the edit page for one of the user's accounts.
pub async fn get_edit_account_page(
    State(state): State<AccountState>,
    session: Session,
    Path(account_id): Path<AccountId>,
) -> Result<Response, Error> {
    let user = session.require()?;
    let account = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        get_account(user.id, account_id, &connection)?
    };

    let nav_bar = NavBar::new(endpoints::EDIT_ACCOUNT_VIEW).into_html();
    let form = EditAccountFormData {
        name: account.name.to_string(),
        kind: account.kind,
        current_balance: format_amount_for_input(account.current_balance),
        active: account.active.then(|| "on".to_owned()),
    };

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Edit Account" }
            (edit_account_form_view(account_id, &form, ""))
        }
    };

    Ok(base("Edit Account", &[currency_input_styles()], &content).into_response())
}

/// Handle the account edit form.
pub async fn update_account_endpoint(
    State(state): State<AccountState>,
    session: Session,
    Path(account_id): Path<AccountId>,
    Form(form): Form<EditAccountFormData>,
) -> Response {
    let user_id = match session.require() {
        Ok(user) => user.id,
        Err(error) => return error.into_alert_response(),
    };

    let update = match form.validate() {
        Ok(update) => update,
        Err(error) => {
            return edit_account_form_view(account_id, &form, &format!("Error: {error}"))
                .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_account(user_id, account_id, update, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::ACCOUNTS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not update account {account_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn edit_account_form_view(
    account_id: AccountId,
    form: &EditAccountFormData,
    error_message: &str,
) -> Markup {
    html! {
        form
            hx-put=(format_endpoint(endpoints::ACCOUNT, account_id))
            hx-target-error="#alert-container"
            hx-swap="outerHTML"
            class="w-full max-w-md space-y-4 md:space-y-6"
        {
            (account_fields(&form.name, form.kind, "current_balance", "Current balance", &form.current_balance))

            div class="flex items-center gap-2"
            {
                input
                    id="active"
                    type="checkbox"
                    name="active"
                    checked[form.active.is_some()];
                label for="active" class=(FORM_LABEL_STYLE) { "Active" }
            }

            (form_error(error_message))

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Account" }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use axum_extra::extract::Form;
    use rusqlite::Connection;

    use crate::{
        Error,
        account::{
            Account, AccountKind, AccountName, AccountState, NewAccount, create_account,
            get_account,
        },
        auth::Session,
        db::initialize,
        endpoints::{self, format_endpoint},
        test_utils::{
            assert_form_error_message, assert_form_input_with_value, assert_hx_endpoint,
            assert_hx_redirect, assert_valid_html, must_get_form, parse_html_document,
            parse_html_fragment,
        },
        user::{User, find_or_create_user},
    };

    use super::{EditAccountFormData, get_edit_account_page, update_account_endpoint};

    fn get_state() -> (AccountState, User, Account) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (user, _) = find_or_create_user("ana@example.com", &connection).unwrap();
        let account = create_account(
            user.id,
            NewAccount {
                name: AccountName::new_unchecked("Bank"),
                kind: AccountKind::Checking,
                initial_balance: 1234.5,
            },
            &connection,
        )
        .unwrap();

        (
            AccountState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user,
            account,
        )
    }

    #[tokio::test]
    async fn render_page_with_current_values() {
        let (state, user, account) = get_state();

        let response =
            get_edit_account_page(State(state), Session::signed_in(user), Path(account.id))
                .await
                .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::ACCOUNT, account.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Bank");
        assert_form_input_with_value(&form, "current_balance", "text", "1234,50");
    }

    #[tokio::test]
    async fn other_users_account_is_not_found() {
        let (state, _, account) = get_state();
        let stranger = User {
            id: 999,
            external_id: "eve@example.com".to_owned(),
        };

        let result =
            get_edit_account_page(State(state), Session::signed_in(stranger), Path(account.id))
                .await;

        assert_eq!(result.err(), Some(Error::NotFound));
    }

    #[tokio::test]
    async fn can_deactivate_account() {
        let (state, user, account) = get_state();
        let form = EditAccountFormData {
            name: "Old bank".to_owned(),
            kind: AccountKind::Savings,
            current_balance: "10,00".to_owned(),
            active: None,
        };

        let response = update_account_endpoint(
            State(state.clone()),
            Session::signed_in(user.clone()),
            Path(account.id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::ACCOUNTS_VIEW);
        let updated = get_account(user.id, account.id, &state.db_connection.lock().unwrap())
            .unwrap();
        assert_eq!(updated.name.as_ref(), "Old bank");
        assert_eq!(updated.current_balance, 10.0);
        assert_eq!(updated.initial_balance, 1234.5);
        assert!(!updated.active);
    }

    #[tokio::test]
    async fn update_fails_on_empty_name() {
        let (state, user, account) = get_state();
        let form = EditAccountFormData {
            name: String::new(),
            kind: AccountKind::Savings,
            current_balance: "10".to_owned(),
            active: Some("on".to_owned()),
        };

        let response = update_account_endpoint(
            State(state),
            Session::signed_in(user),
            Path(account.id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Account name cannot be empty");
    }

    #[tokio::test]
    async fn update_missing_account_returns_not_found_alert() {
        let (state, user, _) = get_state();
        let form = EditAccountFormData {
            name: "Bank".to_owned(),
            kind: AccountKind::Savings,
            current_balance: "10".to_owned(),
            active: Some("on".to_owned()),
        };

        let response =
            update_account_endpoint(State(state), Session::signed_in(user), Path(42), Form(form))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
