//! Transaction creation page and endpoint.

use axum::{
    extract::State,
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
    timezone::local_now,
    transaction::{
        TransactionState, create_transaction,
        form::{FieldErrors, FormAction, TransactionFormData, load_form_options, transaction_form},
    },
};

/// Render the transaction creation page, with the due date set to today.
pub async fn get_new_transaction_page(
    State(state): State<TransactionState>,
    session: Session,
) -> Result<Response, Error> {
    let user = session.require()?;
    let today = local_now(&state.local_timezone)?.date();

    let (categories, accounts) = {
        let connection = state
            .db_connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)?;

        load_form_options(user.id, None, &connection)?
    };

    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let form = TransactionFormData::new(today);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="text-xl font-bold mb-4" { "New Transaction" }
            (transaction_form(
                FormAction::Create,
                &form,
                &FieldErrors::default(),
                "",
                &categories,
                &accounts,
            ))
        }
    };

    Ok(base("New Transaction", &[currency_input_styles()], &content).into_response())
}

/// Handle the transaction creation form.
///
/// Invalid fields re-render the form with a message next to each field.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    session: Session,
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
                FormAction::Create,
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

    match create_transaction(user_id, transaction, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::CategoryKindMismatch | Error::NegativeAmount)) => {
            render_form(&FieldErrors::default(), &format!("Error: {error}"))
        }
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a transaction: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode, response::IntoResponse};
    use axum_extra::extract::Form;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        auth::Session,
        category::{CategoryColor, CategoryKind, CategoryName, NewCategory, create_category},
        db::initialize,
        endpoints,
        pagination::PaginationConfig,
        test_utils::{
            assert_field_error, assert_form_error_message, assert_form_input,
            assert_form_submit_button_with_text, assert_hx_endpoint, assert_hx_redirect,
            assert_valid_html, must_get_form, parse_html_document, parse_html_fragment,
        },
        transaction::{
            TransactionKind, TransactionState, TransactionStatus,
            form::TransactionFormData,
            query::{TransactionFilter, get_transactions},
        },
        user::{User, find_or_create_user},
    };

    use super::{create_transaction_endpoint, get_new_transaction_page};

    fn get_state() -> (TransactionState, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (user, _) = find_or_create_user("ana@example.com", &connection).unwrap();

        (
            TransactionState {
                db_connection: Arc::new(Mutex::new(connection)),
                local_timezone: "Etc/UTC".to_owned(),
                pagination_config: PaginationConfig::default(),
            },
            user,
        )
    }

    fn form() -> TransactionFormData {
        TransactionFormData {
            description: "Groceries".to_owned(),
            amount: "123,45".to_owned(),
            kind: TransactionKind::Expense,
            category_id: None,
            account_id: None,
            due_date: "2026-10-10".to_owned(),
            paid_date: "".to_owned(),
            status: TransactionStatus::Pending,
            note: "".to_owned(),
            recurring: None,
            frequency: None,
        }
    }

    #[tokio::test]
    async fn render_page() {
        let (state, user) = get_state();

        let response = get_new_transaction_page(State(state), Session::signed_in(user))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::TRANSACTIONS_API, "hx-post");
        assert_form_input(&form, "description", "text");
        assert_form_input(&form, "amount", "text");
        assert_form_input(&form, "due_date", "date");
        assert_form_input(&form, "kind", "radio");
        assert_form_submit_button_with_text(&form, "Create Transaction");
    }

    #[tokio::test]
    async fn page_requires_sign_in() {
        let (state, _) = get_state();

        let result = get_new_transaction_page(State(state), Session::signed_out()).await;

        assert_eq!(result.unwrap_err(), Error::Unauthenticated);
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let (state, user) = get_state();

        let response = create_transaction_endpoint(
            State(state.clone()),
            Session::signed_in(user.clone()),
            Form(form()),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::TRANSACTIONS_VIEW);
        let connection = state.db_connection.lock().unwrap();
        let rows = get_transactions(user.id, &TransactionFilter::default(), &connection).unwrap();
        assert_eq!(rows.len(), 1);
        let transaction = &rows[0].transaction;
        assert_eq!(transaction.description, "Groceries");
        assert_eq!(transaction.amount, 123.45);
        assert_eq!(transaction.due_date, date!(2026 - 10 - 10));
        assert_eq!(transaction.status, TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn invalid_fields_are_marked() {
        let (state, user) = get_state();
        let form = TransactionFormData {
            description: "  ".to_owned(),
            amount: "abc".to_owned(),
            ..form()
        };

        let response = create_transaction_endpoint(State(state), Session::signed_in(user), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_field_error(&form, "description", "Description cannot be empty");
        assert_field_error(&form, "amount", "\"abc\" is not a valid amount");
    }

    #[tokio::test]
    async fn category_kind_must_match() {
        let (state, user) = get_state();
        let salary = create_category(
            user.id,
            NewCategory {
                name: CategoryName::new_unchecked("Salary"),
                kind: CategoryKind::Income,
                color: CategoryColor::new_unchecked("#10b981"),
            },
            false,
            &state.db_connection.lock().unwrap(),
        )
        .unwrap();
        let form = TransactionFormData {
            category_id: Some(salary.id),
            ..form()
        };

        let response = create_transaction_endpoint(State(state), Session::signed_in(user), Form(form))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(
            &form,
            "Error: the category kind does not match the transaction kind",
        );
    }

    #[tokio::test]
    async fn signed_out_gets_alert() {
        let (state, _) = get_state();

        let response = create_transaction_endpoint(State(state), Session::signed_out(), Form(form()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
