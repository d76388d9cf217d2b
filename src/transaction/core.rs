//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, OptionalExtension, Row, types::ValueRef};
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    account::AccountId,
    category::{CategoryId, CategoryKind},
    database_id::DatabaseId,
    db::text_enum,
    format::parse_amount,
    user::UserId,
};

/// Database identifier for a transaction.
pub type TransactionId = DatabaseId;

text_enum! {
    /// The direction of money in a transaction.
    pub enum TransactionKind {
        /// Money coming in.
        Income("income", "Income"),
        /// Money going out.
        Expense("expense", "Expense"),
        /// Money moved between the user's own accounts.
        Transfer("transfer", "Transfer"),
    }
}

text_enum! {
    /// Where a transaction is in its lifecycle.
    ///
    /// Only paid transactions count towards totals.
    pub enum TransactionStatus {
        /// Expected but not settled yet.
        Pending("pending", "Pending"),
        /// Settled.
        Paid("paid", "Paid"),
        /// Will not happen.
        Cancelled("cancelled", "Cancelled"),
    }
}

text_enum! {
    /// How often a recurring transaction repeats.
    pub enum Frequency {
        /// Every week.
        Weekly("weekly", "Weekly"),
        /// Every month.
        Monthly("monthly", "Monthly"),
        /// Every year.
        Yearly("yearly", "Yearly"),
    }
}

impl TransactionKind {
    /// The category kind a transaction of this kind may use, `None` for transfers.
    pub fn category_kind(self) -> Option<CategoryKind> {
        match self {
            TransactionKind::Income => Some(CategoryKind::Income),
            TransactionKind::Expense => Some(CategoryKind::Expense),
            TransactionKind::Transfer => None,
        }
    }
}

/// An income, expense or transfer that is due on a date.
///
/// To create a new `Transaction`, use [NewTransaction::build] and [create_transaction].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// The amount of money, always zero or positive. [Transaction::kind] carries the direction.
    pub amount: f64,
    pub kind: TransactionKind,
    pub category_id: Option<CategoryId>,
    pub account_id: Option<AccountId>,
    pub description: String,
    /// When the transaction is or was due.
    pub due_date: Date,
    /// When the transaction was actually paid.
    pub paid_date: Option<Date>,
    pub status: TransactionStatus,
    pub note: Option<String>,
    /// How often the transaction repeats, `None` if it does not.
    pub recurrence: Option<Frequency>,
    /// The transaction this one was repeated from.
    pub parent_transaction_id: Option<TransactionId>,
}

impl Transaction {
    /// Whether the transaction repeats.
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }
}

/// The fields for creating or updating a [Transaction].
///
/// New transactions default to pending, without a category, account, note or recurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: f64,
    pub due_date: Date,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub account_id: Option<AccountId>,
    pub paid_date: Option<Date>,
    pub status: TransactionStatus,
    pub note: Option<String>,
    pub recurrence: Option<Frequency>,
    pub parent_transaction_id: Option<TransactionId>,
}

impl NewTransaction {
    /// Start building a pending transaction.
    pub fn build(kind: TransactionKind, amount: f64, due_date: Date, description: &str) -> Self {
        Self {
            kind,
            amount,
            due_date,
            description: description.to_owned(),
            category_id: None,
            account_id: None,
            paid_date: None,
            status: TransactionStatus::Pending,
            note: None,
            recurrence: None,
            parent_transaction_id: None,
        }
    }

    /// Set the category ID.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Set the account ID.
    pub fn account_id(mut self, account_id: Option<AccountId>) -> Self {
        self.account_id = account_id;
        self
    }

    /// Set the status.
    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the date the transaction was paid.
    pub fn paid_date(mut self, paid_date: Option<Date>) -> Self {
        self.paid_date = paid_date;
        self
    }

    /// Set the note.
    pub fn note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }

    /// Set how often the transaction repeats.
    pub fn recurrence(mut self, recurrence: Option<Frequency>) -> Self {
        self.recurrence = recurrence;
        self
    }

    /// Set the transaction this one was repeated from.
    pub fn parent_transaction_id(mut self, parent_transaction_id: Option<TransactionId>) -> Self {
        self.parent_transaction_id = parent_transaction_id;
        self
    }
}

const SELECT_COLUMNS: &str = "id, amount, kind, category_id, account_id, description, due_date, \
    paid_date, status, note, frequency, parent_transaction_id";

/// Create a new transaction for `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NegativeAmount] or [Error::InvalidAmount] if the amount is negative or not finite,
/// - [Error::InvalidCategory] if the category ID does not refer to one of the user's categories,
/// - [Error::CategoryKindMismatch] if the category kind does not match the transaction kind,
/// - [Error::InvalidAccount] if the account ID does not refer to one of the user's accounts,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    user_id: UserId,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    check_transaction(user_id, &transaction, connection)?;

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (user_id, amount, kind, category_id, account_id, \
                description, due_date, paid_date, status, note, recurring, frequency, \
                parent_transaction_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             RETURNING {SELECT_COLUMNS}"
        ))?
        .query_row(
            rusqlite::params![
                user_id,
                transaction.amount,
                transaction.kind,
                transaction.category_id,
                transaction.account_id,
                transaction.description,
                transaction.due_date,
                transaction.paid_date,
                transaction.status,
                transaction.note,
                transaction.recurrence.is_some(),
                transaction.recurrence,
                transaction.parent_transaction_id,
            ],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve one of the user's transactions by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to one of the user's transactions,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    user_id: UserId,
    id: TransactionId,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM \"transaction\" WHERE id = :id AND user_id = :user_id"
        ))?
        .query_one(&[(":id", &id), (":user_id", &user_id)], map_transaction_row)?;

    Ok(transaction)
}

/// Replace the fields of one of the user's transactions.
///
/// # Errors
/// Returns the same validation errors as [create_transaction], and
/// [Error::UpdateMissingTransaction] if the user has no transaction with `id`.
pub fn update_transaction(
    user_id: UserId,
    id: TransactionId,
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<(), Error> {
    check_transaction(user_id, &transaction, connection)?;

    let rows_affected = connection.execute(
        "UPDATE \"transaction\"
         SET amount = ?1, kind = ?2, category_id = ?3, account_id = ?4, description = ?5,
             due_date = ?6, paid_date = ?7, status = ?8, note = ?9, recurring = ?10,
             frequency = ?11
         WHERE id = ?12 AND user_id = ?13",
        rusqlite::params![
            transaction.amount,
            transaction.kind,
            transaction.category_id,
            transaction.account_id,
            transaction.description,
            transaction.due_date,
            transaction.paid_date,
            transaction.status,
            transaction.note,
            transaction.recurrence.is_some(),
            transaction.recurrence,
            id,
            user_id,
        ],
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingTransaction);
    }

    Ok(())
}

/// Delete one of the user's transactions.
///
/// # Errors
/// Returns [Error::DeleteMissingTransaction] if the user has no transaction with `id`.
pub fn delete_transaction(
    user_id: UserId,
    id: TransactionId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

/// Validate the amount and check that the category and account belong to the user.
fn check_transaction(
    user_id: UserId,
    transaction: &NewTransaction,
    connection: &Connection,
) -> Result<(), Error> {
    if !transaction.amount.is_finite() {
        return Err(Error::InvalidAmount(transaction.amount.to_string()));
    }

    if transaction.amount < 0.0 {
        return Err(Error::NegativeAmount);
    }

    if let Some(category_id) = transaction.category_id {
        let category_kind: CategoryKind = connection
            .query_row(
                "SELECT kind FROM category WHERE id = ?1 AND user_id = ?2",
                (category_id, user_id),
                |row| row.get(0),
            )
            .optional()?
            .ok_or(Error::InvalidCategory(Some(category_id)))?;

        if transaction.kind.category_kind() != Some(category_kind) {
            return Err(Error::CategoryKindMismatch);
        }
    }

    if let Some(account_id) = transaction.account_id {
        let account_exists: bool = connection.query_row(
            "SELECT EXISTS (SELECT 1 FROM account WHERE id = ?1 AND user_id = ?2)",
            (account_id, user_id),
            |row| row.get(0),
        )?;

        if !account_exists {
            return Err(Error::InvalidAccount(Some(account_id)));
        }
    }

    Ok(())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            account_id INTEGER,
            category_id INTEGER,
            description TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount >= 0),
            kind TEXT NOT NULL CHECK (kind IN ('income', 'expense', 'transfer')),
            due_date TEXT NOT NULL,
            paid_date TEXT,
            status TEXT NOT NULL CHECK (status IN ('pending', 'paid', 'cancelled')),
            note TEXT,
            recurring INTEGER NOT NULL DEFAULT 0,
            frequency TEXT,
            parent_transaction_id INTEGER,
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE,
            FOREIGN KEY(account_id) REFERENCES account(id) ON DELETE SET NULL,
            FOREIGN KEY(category_id) REFERENCES category(id) ON DELETE RESTRICT,
            FOREIGN KEY(parent_transaction_id) REFERENCES \"transaction\"(id) ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_due_date
            ON \"transaction\"(user_id, due_date);",
    )?;

    Ok(())
}

/// Map a database row to a [Transaction].
///
/// The row must contain the columns in the order of [SELECT_COLUMNS], optionally
/// followed by more columns.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    Ok(Transaction {
        id: row.get(0)?,
        amount: read_amount(row, 1)?,
        kind: row.get(2)?,
        category_id: row.get(3)?,
        account_id: row.get(4)?,
        description: row.get(5)?,
        due_date: row.get(6)?,
        paid_date: row.get(7)?,
        status: row.get(8)?,
        note: row.get(9)?,
        recurrence: row.get(10)?,
        parent_transaction_id: row.get(11)?,
    })
}

/// Read an amount column, treating values that are not numbers as zero so that
/// one bad row does not break every report.
fn read_amount(row: &Row, index: usize) -> Result<f64, rusqlite::Error> {
    let amount = match row.get_ref(index)? {
        ValueRef::Real(amount) => amount,
        ValueRef::Integer(amount) => amount as f64,
        ValueRef::Text(text) => {
            let text = String::from_utf8_lossy(text);
            match parse_amount(&text) {
                Ok(amount) => {
                    tracing::warn!("Transaction amount {text:?} is stored as text");
                    amount
                }
                Err(error) => {
                    tracing::warn!("Transaction amount {text:?} is invalid, reading it as 0: {error}");
                    0.0
                }
            }
        }
        ValueRef::Null | ValueRef::Blob(_) => {
            tracing::warn!("Transaction amount is not a number, reading it as 0");
            0.0
        }
    };

    Ok(amount)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        account::{AccountKind, AccountName, NewAccount, create_account},
        category::{CategoryColor, CategoryKind, CategoryName, NewCategory, create_category},
        db::initialize,
        transaction::{
            Frequency, NewTransaction, TransactionKind, TransactionStatus, create_transaction,
            delete_transaction, get_transaction, update_transaction,
        },
        user::{UserId, find_or_create_user},
    };

    fn get_test_connection() -> (Connection, UserId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).unwrap();
        let (user, _) = find_or_create_user("test@example.com", &connection).unwrap();
        (connection, user.id)
    }

    fn create_test_category(user_id: UserId, kind: CategoryKind, connection: &Connection) -> i64 {
        create_category(
            user_id,
            NewCategory {
                name: CategoryName::new_unchecked("Test"),
                kind,
                color: CategoryColor::new_unchecked("#10B981"),
            },
            false,
            connection,
        )
        .unwrap()
        .id
    }

    #[test]
    fn create_transaction_succeeds() {
        let (connection, user_id) = get_test_connection();
        let category_id = create_test_category(user_id, CategoryKind::Income, &connection);
        let account = create_account(
            user_id,
            NewAccount {
                name: AccountName::new_unchecked("Main"),
                kind: AccountKind::Checking,
                initial_balance: 0.0,
            },
            &connection,
        )
        .unwrap();

        let transaction = create_transaction(
            user_id,
            NewTransaction::build(TransactionKind::Income, 100.0, date!(2026 - 10 - 05), "Salary")
                .category_id(Some(category_id))
                .account_id(Some(account.id))
                .status(TransactionStatus::Paid)
                .paid_date(Some(date!(2026 - 10 - 05)))
                .recurrence(Some(Frequency::Monthly)),
            &connection,
        )
        .expect("Could not create transaction");

        assert!(transaction.id > 0);
        assert_eq!(transaction.amount, 100.0);
        assert_eq!(transaction.category_id, Some(category_id));
        assert_eq!(transaction.account_id, Some(account.id));
        assert!(transaction.is_recurring());
        assert_eq!(
            Ok(transaction.clone()),
            get_transaction(user_id, transaction.id, &connection)
        );
    }

    #[test]
    fn create_transaction_rejects_negative_amount() {
        let (connection, user_id) = get_test_connection();

        let result = create_transaction(
            user_id,
            NewTransaction::build(TransactionKind::Expense, -1.0, date!(2026 - 10 - 05), "Oops"),
            &connection,
        );

        assert_eq!(result, Err(Error::NegativeAmount));
    }

    #[test]
    fn create_transaction_rejects_category_of_other_kind() {
        let (connection, user_id) = get_test_connection();
        let category_id = create_test_category(user_id, CategoryKind::Income, &connection);

        let result = create_transaction(
            user_id,
            NewTransaction::build(TransactionKind::Expense, 5.0, date!(2026 - 10 - 05), "Lunch")
                .category_id(Some(category_id)),
            &connection,
        );

        assert_eq!(result, Err(Error::CategoryKindMismatch));
    }

    #[test]
    fn create_transaction_rejects_other_users_category() {
        let (connection, user_id) = get_test_connection();
        let (other_user, _) = find_or_create_user("other@example.com", &connection).unwrap();
        let category_id = create_test_category(other_user.id, CategoryKind::Expense, &connection);

        let result = create_transaction(
            user_id,
            NewTransaction::build(TransactionKind::Expense, 5.0, date!(2026 - 10 - 05), "Lunch")
                .category_id(Some(category_id)),
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidCategory(Some(category_id))));
    }

    #[test]
    fn create_transaction_rejects_missing_account() {
        let (connection, user_id) = get_test_connection();

        let result = create_transaction(
            user_id,
            NewTransaction::build(TransactionKind::Expense, 5.0, date!(2026 - 10 - 05), "Lunch")
                .account_id(Some(42)),
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidAccount(Some(42))));
    }

    #[test]
    fn get_transaction_is_scoped_to_user() {
        let (connection, user_id) = get_test_connection();
        let (other_user, _) = find_or_create_user("other@example.com", &connection).unwrap();
        let transaction = create_transaction(
            user_id,
            NewTransaction::build(TransactionKind::Expense, 5.0, date!(2026 - 10 - 05), "Lunch"),
            &connection,
        )
        .unwrap();

        assert_eq!(
            get_transaction(other_user.id, transaction.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn update_transaction_succeeds() {
        let (connection, user_id) = get_test_connection();
        let transaction = create_transaction(
            user_id,
            NewTransaction::build(TransactionKind::Expense, 5.0, date!(2026 - 10 - 05), "Lunch"),
            &connection,
        )
        .unwrap();

        update_transaction(
            user_id,
            transaction.id,
            NewTransaction::build(TransactionKind::Expense, 7.5, date!(2026 - 10 - 06), "Dinner")
                .status(TransactionStatus::Paid),
            &connection,
        )
        .unwrap();

        let updated = get_transaction(user_id, transaction.id, &connection).unwrap();
        assert_eq!(updated.amount, 7.5);
        assert_eq!(updated.description, "Dinner");
        assert_eq!(updated.status, TransactionStatus::Paid);
    }

    #[test]
    fn update_missing_transaction_fails() {
        let (connection, user_id) = get_test_connection();

        let result = update_transaction(
            user_id,
            999,
            NewTransaction::build(TransactionKind::Expense, 7.5, date!(2026 - 10 - 06), "Dinner"),
            &connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingTransaction));
    }

    #[test]
    fn delete_transaction_succeeds() {
        let (connection, user_id) = get_test_connection();
        let transaction = create_transaction(
            user_id,
            NewTransaction::build(TransactionKind::Expense, 5.0, date!(2026 - 10 - 05), "Lunch"),
            &connection,
        )
        .unwrap();

        delete_transaction(user_id, transaction.id, &connection).unwrap();

        assert_eq!(
            get_transaction(user_id, transaction.id, &connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            delete_transaction(user_id, transaction.id, &connection),
            Err(Error::DeleteMissingTransaction)
        );
    }

    #[test]
    fn non_numeric_amount_is_read_as_zero() {
        let (connection, user_id) = get_test_connection();
        let transaction = create_transaction(
            user_id,
            NewTransaction::build(TransactionKind::Expense, 5.0, date!(2026 - 10 - 05), "Lunch"),
            &connection,
        )
        .unwrap();
        connection
            .execute(
                "UPDATE \"transaction\" SET amount = 'abc' WHERE id = ?1",
                [transaction.id],
            )
            .unwrap();

        let got = get_transaction(user_id, transaction.id, &connection).unwrap();

        assert_eq!(got.amount, 0.0);
    }

    #[test]
    fn malformed_text_amounts_are_read_as_zero() {
        let (connection, user_id) = get_test_connection();
        let transaction = create_transaction(
            user_id,
            NewTransaction::build(TransactionKind::Expense, 5.0, date!(2026 - 10 - 05), "Lunch"),
            &connection,
        )
        .unwrap();

        for (stored, want) in [("12.5abc", 0.0), ("-5 x", 0.0), ("12,50", 12.5)] {
            connection
                .execute(
                    "UPDATE \"transaction\" SET amount = ?1 WHERE id = ?2",
                    (stored, transaction.id),
                )
                .unwrap();

            let got = get_transaction(user_id, transaction.id, &connection).unwrap();

            assert_eq!(got.amount, want, "stored amount {stored:?}");
        }
    }
}
