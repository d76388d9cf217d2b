//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    auth::{AuthConfig, AuthEvents},
    db::initialize,
    pagination::PaginationConfig,
    report::ReportConfig,
};

/// How many auth events a slow subscriber may fall behind before it skips ahead.
const AUTH_EVENT_CAPACITY: usize = 64;

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "America/Sao_Paulo".
    ///
    /// An empty string means UTC.
    pub local_timezone: String,

    /// Where to find the signed in user and where to send them to sign out.
    pub auth_config: AuthConfig,

    /// The config that controls how to display pages of data.
    pub pagination_config: PaginationConfig,

    /// The config for the reports page.
    pub report_config: ReportConfig,

    /// The bus that sign in, profile and sign out events are published on.
    pub auth_events: AuthEvents,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        local_timezone: &str,
        auth_config: AuthConfig,
        pagination_config: PaginationConfig,
        report_config: ReportConfig,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            auth_config,
            pagination_config,
            report_config,
            auth_events: AuthEvents::new(AUTH_EVENT_CAPACITY),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}
