//! Fintrack is a web app for tracking personal and business finances.
//!
//! Users record income and expense transactions against categories and
//! accounts, and get a dashboard, monthly reports and CSV exports.
//!
//! This library provides a REST API that directly serves HTML pages. The
//! aggregation engine behind the reports lives in [report] and is usable on
//! its own.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod account;
mod alert;
mod app_state;
mod auth;
mod category;
mod dashboard;
mod database_id;
mod db;
mod endpoints;
pub mod format;
mod html;
mod internal_server_error;
mod logging;
mod navigation;
mod not_found;
mod pagination;
mod profile;
pub mod report;
mod routing;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{
    AuthConfig, AuthEvent, AuthEvents, AuthState, AuthSubscription, DEFAULT_AUTH_HEADER,
};
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use report::ReportConfig;
pub use routing::build_router;
pub use timezone::get_local_offset;
pub use transaction::{TransactionKind, TransactionStatus};

use crate::{
    account::AccountId, alert::Alert, category::CategoryId, html::error_view,
    internal_server_error::InternalServerError, not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The request did not carry an authenticated user.
    ///
    /// Read-only pages treat a missing user as "no data". Only endpoints
    /// that change data return this error.
    #[error("you must be signed in to do that")]
    Unauthenticated,

    /// An empty string was used for a category name.
    #[error("Category name cannot be empty")]
    EmptyCategoryName,

    /// An empty string was used for an account name.
    #[error("Account name cannot be empty")]
    EmptyAccountName,

    /// A transaction was submitted without a description.
    #[error("Description cannot be empty")]
    EmptyDescription,

    /// A colour that is not a `#RRGGBB` hex code was used for a category.
    #[error("\"{0}\" is not a valid colour, use the format #RRGGBB")]
    InvalidColor(String),

    /// An amount could not be parsed as a number.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// A negative amount was used for a transaction.
    ///
    /// The transaction kind carries the direction of money, so amounts are
    /// always zero or positive.
    #[error("amounts cannot be negative")]
    NegativeAmount,

    /// A date could not be parsed.
    #[error("\"{0}\" is not a valid date")]
    InvalidDate(String),

    /// A recurring transaction was submitted without a frequency.
    #[error("Choose how often the transaction repeats")]
    MissingFrequency,

    /// A personal or business profile was submitted without the user's name.
    #[error("Please enter your full name")]
    MissingFullName,

    /// A business profile was submitted without the company name.
    #[error("Please enter your company name")]
    MissingCompanyName,

    /// The category ID does not refer to one of the user's categories.
    #[error("the category ID does not refer to a valid category")]
    InvalidCategory(Option<CategoryId>),

    /// The account ID does not refer to one of the user's accounts.
    #[error("the account ID does not refer to a valid account")]
    InvalidAccount(Option<AccountId>),

    /// An income transaction used an expense category or vice versa.
    #[error("the category kind does not match the transaction kind")]
    CategoryKindMismatch,

    /// Tried to delete a category that still has transactions.
    #[error("cannot delete a category that still has transactions")]
    CategoryInUse,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The transactions could not be written as CSV.
    #[error("could not write CSV: {0}")]
    CsvError(String),

    /// A value could not be serialized, e.g. as JSON for an event stream.
    #[error("could not serialize value: {0}")]
    SerializationError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a category that does not exist
    #[error("tried to update a category that is not in the database")]
    UpdateMissingCategory,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to update an account that does not exist
    #[error("tried to update an account that is not in the database")]
    UpdateMissingAccount,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            Error::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                Html(
                    error_view(
                        "Not Signed In",
                        "401",
                        "You are not signed in.",
                        "Sign in through your identity provider and try again.",
                    )
                    .into_string(),
                ),
            )
                .into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    fn into_alert_response(self) -> Response {
        match self {
            Error::Unauthenticated => Alert::error(
                "Not signed in",
                "Your session has ended. Sign in again and retry.",
            )
            .into_response_with_status(StatusCode::UNAUTHORIZED),
            Error::InvalidCategory(category_id) => Alert::error(
                "Invalid category",
                &format!("Could not find a category with the ID {category_id:?}"),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::InvalidAccount(account_id) => Alert::error(
                "Invalid account",
                &format!("Could not find an account with the ID {account_id:?}"),
            )
            .into_response_with_status(StatusCode::BAD_REQUEST),
            Error::CategoryInUse => Alert::error(
                "Could not delete category",
                "The category still has transactions. \
                Move or delete those transactions first.",
            )
            .into_response_with_status(StatusCode::CONFLICT),
            Error::UpdateMissingTransaction => Alert::error(
                "Could not update transaction",
                "The transaction could not be found.",
            )
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::DeleteMissingTransaction => Alert::error(
                "Could not delete transaction",
                "The transaction could not be found. \
                Try refreshing the page to see if the transaction has already been deleted.",
            )
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::UpdateMissingCategory => Alert::error(
                "Could not update category",
                "The category could not be found.",
            )
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::DeleteMissingCategory => Alert::error(
                "Could not delete category",
                "The category could not be found. \
                Try refreshing the page to see if the category has already been deleted.",
            )
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::UpdateMissingAccount => Alert::error(
                "Could not update account",
                "The account could not be found.",
            )
            .into_response_with_status(StatusCode::NOT_FOUND),
            Error::InvalidTimezoneError(timezone) => Alert::error(
                "Invalid Timezone Settings",
                &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            )
            .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR),
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                )
                .into_response_with_status(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
