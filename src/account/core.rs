//! Account models and database queries.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{
    Error, database_id::DatabaseId, db::text_enum, format::parse_amount, user::UserId,
};

/// Database identifier for an account.
pub type AccountId = DatabaseId;

text_enum! {
    /// What sort of place the money is kept in.
    pub enum AccountKind {
        /// A bank current account.
        Checking("checking", "Checking"),
        /// A bank savings account.
        Savings("savings", "Savings"),
        /// Cash.
        Wallet("wallet", "Wallet"),
        /// A credit card, usually with a negative balance.
        CreditCard("credit_card", "Credit card"),
        /// A brokerage or other investment account.
        Investment("investment", "Investment"),
    }
}

/// A validated, non-empty account name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct AccountName(String);

impl AccountName {
    /// Create an account name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyAccountName] if `name` is empty or whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyAccountName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create an account name without validation.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for AccountName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for AccountName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A bank account, wallet or card that transactions are paid from or into.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub name: AccountName,
    pub kind: AccountKind,
    /// The balance when the account was added.
    pub initial_balance: f64,
    /// The balance as last entered by the user.
    pub current_balance: f64,
    /// Inactive accounts are hidden from forms and excluded from the total balance.
    pub active: bool,
}

/// The fields for creating an account.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub name: AccountName,
    pub kind: AccountKind,
    pub initial_balance: f64,
}

/// The fields that can be changed after an account is created.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountUpdate {
    pub name: AccountName,
    pub kind: AccountKind,
    pub current_balance: f64,
    pub active: bool,
}

/// Parse a balance typed into a form. Unlike transaction amounts, balances may be negative.
///
/// # Errors
/// Returns an [Error::InvalidAmount] if `text` is not a number.
pub fn parse_balance(text: &str) -> Result<f64, Error> {
    let trimmed = text.trim();

    match trimmed.strip_prefix('-') {
        Some(unsigned) => parse_amount(unsigned)
            .map(|amount| -amount)
            .map_err(|_| Error::InvalidAmount(text.to_owned())),
        None => parse_amount(trimmed),
    }
}

/// Create an account for `user_id`. The current balance starts at the initial balance.
pub fn create_account(
    user_id: UserId,
    account: NewAccount,
    connection: &Connection,
) -> Result<Account, Error> {
    connection.execute(
        "INSERT INTO account (user_id, name, kind, initial_balance, current_balance, active)
         VALUES (?1, ?2, ?3, ?4, ?4, 1)",
        (
            user_id,
            account.name.as_ref(),
            account.kind,
            account.initial_balance,
        ),
    )?;

    Ok(Account {
        id: connection.last_insert_rowid(),
        name: account.name,
        kind: account.kind,
        initial_balance: account.initial_balance,
        current_balance: account.initial_balance,
        active: true,
    })
}

/// Retrieve one of the user's accounts by ID.
///
/// # Errors
/// Returns [Error::NotFound] if the user has no account with `account_id`.
pub fn get_account(
    user_id: UserId,
    account_id: AccountId,
    connection: &Connection,
) -> Result<Account, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, initial_balance, current_balance, active FROM account
             WHERE id = :id AND user_id = :user_id",
        )?
        .query_one(&[(":id", &account_id), (":user_id", &user_id)], map_row)
        .map_err(Error::from)
}

/// Retrieve all of the user's accounts, active ones first, then by name.
pub fn get_accounts(user_id: UserId, connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, initial_balance, current_balance, active FROM account
             WHERE user_id = ?1 ORDER BY active DESC, name ASC",
        )?
        .query_map([user_id], map_row)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}

/// Retrieve the user's active accounts ordered by name.
pub fn get_active_accounts(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, name, kind, initial_balance, current_balance, active FROM account
             WHERE user_id = ?1 AND active = 1 ORDER BY name ASC",
        )?
        .query_map([user_id], map_row)?
        .map(|maybe_account| maybe_account.map_err(Error::from))
        .collect()
}

/// Update one of the user's accounts.
///
/// # Errors
/// Returns [Error::UpdateMissingAccount] if the user has no account with `account_id`.
pub fn update_account(
    user_id: UserId,
    account_id: AccountId,
    update: AccountUpdate,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE account SET name = ?1, kind = ?2, current_balance = ?3, active = ?4
         WHERE id = ?5 AND user_id = ?6",
        (
            update.name.as_ref(),
            update.kind,
            update.current_balance,
            update.active,
            account_id,
            user_id,
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingAccount);
    }

    Ok(())
}

/// Get the sum of the current balances of the user's active accounts.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub fn get_total_active_balance(user_id: UserId, connection: &Connection) -> Result<f64, Error> {
    let total: f64 = connection.query_row(
        "SELECT COALESCE(SUM(current_balance), 0.0) FROM account WHERE user_id = ?1 AND active = 1",
        [user_id],
        |row| row.get(0),
    )?;

    Ok(total)
}

pub fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            initial_balance REAL NOT NULL DEFAULT 0,
            current_balance REAL NOT NULL DEFAULT 0,
            active INTEGER NOT NULL DEFAULT 1,
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_account_user ON account(user_id, active);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Account, rusqlite::Error> {
    let raw_name: String = row.get(1)?;

    Ok(Account {
        id: row.get(0)?,
        name: AccountName::new_unchecked(&raw_name),
        kind: row.get(2)?,
        initial_balance: row.get(3)?,
        current_balance: row.get(4)?,
        active: row.get(5)?,
    })
}
