use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};

use crate::{
    Error,
    alert::Alert,
    auth::Session,
    category::{CategoryId, CategoryState, delete_category},
};

/// Delete one of the user's categories.
///
/// Categories that still have transactions are kept and a 409 alert is returned.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    session: Session,
    Path(category_id): Path<CategoryId>,
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

    match delete_category(user_id, category_id, &connection) {
        Ok(()) => Alert::success("Category deleted", "The category was deleted.")
            .into_response_with_status(StatusCode::OK),
        Err(error) => {
            tracing::error!("Could not delete category {category_id}: {error}");
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
    };
    use rusqlite::Connection;

    use crate::{
        Error,
        account::{AccountKind, AccountName, NewAccount, create_account},
        auth::Session,
        category::{
            CategoryColor, CategoryKind, CategoryName, CategoryState, NewCategory,
            create_category, get_category,
        },
        db::initialize,
        transaction::{NewTransaction, TransactionKind, create_transaction},
        user::find_or_create_user,
    };

    use super::delete_category_endpoint;

    fn new_category() -> NewCategory {
        NewCategory {
            name: CategoryName::new_unchecked("Food"),
            kind: CategoryKind::Expense,
            color: CategoryColor::new_unchecked("#EF4444"),
        }
    }

    #[tokio::test]
    async fn can_delete_unused_category() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (user, _) = find_or_create_user("ana@example.com", &connection).unwrap();
        let category = create_category(user.id, new_category(), false, &connection).unwrap();
        let state = CategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = delete_category_endpoint(
            State(state.clone()),
            Session::signed_in(user.clone()),
            Path(category.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let result = get_category(user.id, category.id, &state.db_connection.lock().unwrap());
        assert_eq!(result, Err(Error::NotFound));
    }

    #[tokio::test]
    async fn category_with_transactions_is_kept() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (user, _) = find_or_create_user("ana@example.com", &connection).unwrap();
        let category = create_category(user.id, new_category(), false, &connection).unwrap();
        let account = create_account(
            user.id,
            NewAccount {
                name: AccountName::new_unchecked("Wallet"),
                kind: AccountKind::Wallet,
                initial_balance: 0.0,
            },
            &connection,
        )
        .unwrap();
        let transaction = NewTransaction::build(
            TransactionKind::Expense,
            25.0,
            time::macros::date!(2025 - 03 - 10),
            "Lunch",
        )
        .category_id(Some(category.id))
        .account_id(Some(account.id));
        create_transaction(user.id, transaction, &connection).unwrap();
        let state = CategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = delete_category_endpoint(
            State(state.clone()),
            Session::signed_in(user.clone()),
            Path(category.id),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(get_category(user.id, category.id, &state.db_connection.lock().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn signed_out_delete_is_rejected() {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let state = CategoryState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = delete_category_endpoint(State(state), Session::signed_out(), Path(1)).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
