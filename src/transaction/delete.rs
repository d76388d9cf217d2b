use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};

use crate::{
    Error,
    alert::Alert,
    auth::Session,
    transaction::{TransactionId, TransactionState, delete_transaction},
};

/// Delete one of the user's transactions.
///
/// The table row is removed by htmx on success, and an alert shows the result.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    session: Session,
    Path(transaction_id): Path<TransactionId>,
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

    match delete_transaction(user_id, transaction_id, &connection) {
        Ok(()) => Alert::success("Transaction deleted", "The transaction was deleted.")
            .into_response_with_status(StatusCode::OK),
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}
