//! Users as identified by the upstream identity proxy.

use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::{Error, database_id::DatabaseId};

/// Database identifier for a user.
pub type UserId = DatabaseId;

/// A person using the app.
///
/// Users are never registered through the app. A row is created the first
/// time the identity proxy forwards a request for a new external ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    /// The app's ID for the user.
    pub id: UserId,
    /// The ID forwarded by the identity proxy, e.g. an email address or subject claim.
    pub external_id: String,
}

/// Get the user for `external_id`, creating it if this is the first time it has been seen.
///
/// Returns the user and whether it was just created.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn find_or_create_user(
    external_id: &str,
    connection: &Connection,
) -> Result<(User, bool), Error> {
    if let Some(user) = get_user_by_external_id(external_id, connection)? {
        return Ok((user, false));
    }

    let user = connection
        .prepare("INSERT INTO user (external_id) VALUES (?1) RETURNING id, external_id")?
        .query_row((external_id,), map_row)?;

    tracing::info!("Created user {} for {external_id}", user.id);

    Ok((user, true))
}

/// Get the user for `external_id`, if any.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn get_user_by_external_id(
    external_id: &str,
    connection: &Connection,
) -> Result<Option<User>, Error> {
    connection
        .prepare("SELECT id, external_id FROM user WHERE external_id = :external_id")?
        .query_row(&[(":external_id", &external_id)], map_row)
        .optional()
        .map_err(Error::from)
}

/// Create the user table.
///
/// The profile columns stay NULL until the user completes the profile setup.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            external_id TEXT NOT NULL UNIQUE,
            profile_kind TEXT,
            full_name TEXT,
            company_name TEXT
        )",
        (),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        external_id: row.get(1)?,
    })
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use super::{create_user_table, find_or_create_user, get_user_by_external_id};

    fn get_test_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        create_user_table(&connection).unwrap();
        connection
    }

    #[test]
    fn creates_user_on_first_sight() {
        let connection = get_test_connection();

        let (user, created) = find_or_create_user("ana@example.com", &connection).unwrap();

        assert!(created);
        assert!(user.id > 0);
        assert_eq!(user.external_id, "ana@example.com");
    }

    #[test]
    fn returns_existing_user() {
        let connection = get_test_connection();
        let (first, _) = find_or_create_user("ana@example.com", &connection).unwrap();

        let (second, created) = find_or_create_user("ana@example.com", &connection).unwrap();

        assert!(!created);
        assert_eq!(first, second);
    }

    #[test]
    fn unknown_external_id_has_no_user() {
        let connection = get_test_connection();

        let user = get_user_by_external_id("nobody", &connection);

        assert_eq!(user, Ok(None));
    }
}
