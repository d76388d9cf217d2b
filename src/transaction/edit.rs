//! Transaction editing page and endpoint.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::html;

use crate::{
    Error,
    auth::Session,
    endpoints,
    html::{FORM_CONTAINER_STYLE, base, currency_input_styles},
    navigation::NavBar,
    transaction::{
        TransactionId, TransactionState, get_transaction, update_transaction,
        form::{FieldErrors, FormAction, TransactionFormData, load_form_options, transaction_form},
    },
};

/// Render the edit page for one of the user's transactions.
pub async fn get_edit_transaction_page(
    State(state): State<TransactionState>,
    session: Session,
    Path(transaction_id): Path<TransactionId>,
) -> Result<Response, Error> {
    let user = session.require()?;

    let (transaction, categories, accounts) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        let transaction = get_transaction(user.id, transaction_id, &connection)?;
        let (categories, accounts) =
            load_form_options(user.id, transaction.account_id, &connection)?;

        (transaction, categories, accounts)
    };

    let nav_bar = NavBar::new(endpoints::EDIT_TRANSACTION_VIEW).into_html();
    let form = TransactionFormData::from_transaction(&transaction);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "Edit Transaction" }
            (transaction_form(
                FormAction::Update(transaction.id),
                &form,
                &FieldErrors::default(),
                "",
                &categories,
                &accounts,
            ))
        }
    };

    Ok(base("Edit Transaction", &[currency_input_styles()], &content).into_response())
}

/// Handle the transaction edit form.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    session: Session,
    Path(transaction_id): Path<TransactionId>,
    Form(form): Form<TransactionFormData>,
) -> Response {
    let user_id = match session.require() {
        Ok(user) => user.id,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let render_form = |errors: &FieldErrors, message: &str| {
        match load_form_options(user_id, form.account_id, &connection) {
            Ok((categories, accounts)) => transaction_form(
                FormAction::Update(transaction_id),
                &form,
                errors,
                message,
                &categories,
                &accounts,
            )
            .into_response(),
            Err(error) => error.into_alert_response(),
        }
    };

    let transaction = match form.validate() {
        Ok(transaction) => transaction,
        Err(errors) => return render_form(&errors, "Error: Check the highlighted fields"),
    };

    match update_transaction(user_id, transaction_id, transaction, &connection) {
        Ok(()) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::CategoryKindMismatch | Error::NegativeAmount)) => {
            render_form(&FieldErrors::default(), &format!("Error: {error}"))
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating transaction {transaction_id}: {error}"
            );
            error.into_alert_response()
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
    use time::macros::date;

    use crate::{
        Error,
        account::{AccountKind, AccountName, AccountUpdate, NewAccount, create_account, update_account},
        auth::Session,
        db::initialize,
        endpoints::{self, format_endpoint},
        pagination::PaginationConfig,
        test_utils::{
            assert_field_error, assert_form_input_with_value, assert_form_submit_button_with_text,
            assert_hx_endpoint, assert_hx_redirect, assert_valid_html, must_get_form,
            parse_html_document, parse_html_fragment,
        },
        transaction::{
            Frequency, NewTransaction, Transaction, TransactionKind, TransactionState,
            TransactionStatus, create_transaction, form::TransactionFormData, get_transaction,
        },
        user::{User, find_or_create_user},
    };

    use super::{get_edit_transaction_page, update_transaction_endpoint};

    fn get_state() -> (TransactionState, User, Transaction) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (user, _) = find_or_create_user("ana@example.com", &connection).unwrap();
        let transaction = create_transaction(
            user.id,
            NewTransaction::build(
                TransactionKind::Expense,
                1500.0,
                date!(2026 - 10 - 05),
                "Rent",
            )
            .recurrence(Some(Frequency::Monthly)),
            &connection,
        )
        .unwrap();

        (
            TransactionState {
                db_connection: Arc::new(Mutex::new(connection)),
                local_timezone: "Etc/UTC".to_owned(),
                pagination_config: PaginationConfig::default(),
            },
            user,
            transaction,
        )
    }

    #[tokio::test]
    async fn render_page_with_current_values() {
        let (state, user, transaction) = get_state();

        let response = get_edit_transaction_page(
            State(state),
            Session::signed_in(user),
            Path(transaction.id),
        )
        .await
        .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &format_endpoint(endpoints::TRANSACTION, transaction.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "description", "text", "Rent");
        assert_form_input_with_value(&form, "due_date", "date", "2026-10-05");
        assert_form_submit_button_with_text(&form, "Save Transaction");
    }

    #[tokio::test]
    async fn inactive_account_stays_selectable() {
        let (state, user, _) = get_state();
        let transaction = {
            let connection = state.db_connection.lock().unwrap();
            let account = create_account(
                user.id,
                NewAccount {
                    name: AccountName::new_unchecked("Old Wallet"),
                    kind: AccountKind::Wallet,
                    initial_balance: 0.0,
                },
                &connection,
            )
            .unwrap();
            let transaction = create_transaction(
                user.id,
                NewTransaction::build(TransactionKind::Expense, 5.0, date!(2026 - 01 - 02), "Coffee")
                    .account_id(Some(account.id)),
                &connection,
            )
            .unwrap();
            update_account(
                user.id,
                account.id,
                AccountUpdate {
                    name: AccountName::new_unchecked("Old Wallet"),
                    kind: AccountKind::Wallet,
                    current_balance: 0.0,
                    active: false,
                },
                &connection,
            )
            .unwrap();
            transaction
        };

        let response = get_edit_transaction_page(
            State(state),
            Session::signed_in(user),
            Path(transaction.id),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        let selected = html
            .select(&scraper::Selector::parse("select[name=account_id] option[selected]").unwrap())
            .next()
            .expect("account should be selected");
        assert_eq!(selected.text().collect::<String>().trim(), "Old Wallet");
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let (state, user, _) = get_state();

        let result = get_edit_transaction_page(State(state), Session::signed_in(user), Path(999)).await;

        assert_eq!(result.unwrap_err(), Error::NotFound);
    }

    #[tokio::test]
    async fn other_users_transaction_is_not_found() {
        let (state, _, transaction) = get_state();
        let (other_user, _) =
            find_or_create_user("bruno@example.com", &state.db_connection.lock().unwrap()).unwrap();

        let result = get_edit_transaction_page(
            State(state),
            Session::signed_in(other_user),
            Path(transaction.id),
        )
        .await;

        assert_eq!(result.unwrap_err(), Error::NotFound);
    }

    #[tokio::test]
    async fn can_update_transaction() {
        let (state, user, transaction) = get_state();
        let form = TransactionFormData {
            description: "Rent".to_owned(),
            amount: "1.600,00".to_owned(),
            status: TransactionStatus::Paid,
            paid_date: "2026-10-04".to_owned(),
            ..TransactionFormData::from_transaction(&transaction)
        };

        let response = update_transaction_endpoint(
            State(state.clone()),
            Session::signed_in(user.clone()),
            Path(transaction.id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let updated =
            get_transaction(user.id, transaction.id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(updated.amount, 1600.0);
        assert_eq!(updated.status, TransactionStatus::Paid);
        assert_eq!(updated.paid_date, Some(date!(2026 - 10 - 04)));
        assert_eq!(updated.recurrence, Some(Frequency::Monthly));
    }

    #[tokio::test]
    async fn invalid_date_is_marked() {
        let (state, user, transaction) = get_state();
        let form = TransactionFormData {
            due_date: "tomorrow".to_owned(),
            ..TransactionFormData::from_transaction(&transaction)
        };

        let response = update_transaction_endpoint(
            State(state),
            Session::signed_in(user),
            Path(transaction.id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_field_error(&form, "due_date", "\"tomorrow\" is not a valid date");
    }

    #[tokio::test]
    async fn update_missing_transaction_gets_alert() {
        let (state, user, transaction) = get_state();

        let response = update_transaction_endpoint(
            State(state),
            Session::signed_in(user),
            Path(transaction.id + 100),
            Form(TransactionFormData::from_transaction(&transaction)),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
