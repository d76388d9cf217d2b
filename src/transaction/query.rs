//! Filtered listing of a user's transactions, joined with their category and account.

use rusqlite::{Connection, Row, params_from_iter, types::Value};
use time::Date;

use crate::{
    Error,
    category::CategoryId,
    format::format_date_for_input,
    report::ReportEntry,
    user::UserId,
};

use super::core::{Transaction, TransactionKind, TransactionStatus, map_transaction_row};

/// The page size used when a filter has an offset but no limit.
pub const DEFAULT_QUERY_PAGE_SIZE: u64 = 10;

/// Which of a user's transactions to fetch.
///
/// Every field is optional. An empty filter matches all of the user's transactions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    pub category_id: Option<CategoryId>,
    pub kind: Option<TransactionKind>,
    pub status: Option<TransactionStatus>,
    /// The earliest due date, inclusive.
    pub date_from: Option<Date>,
    /// The latest due date, inclusive.
    pub date_to: Option<Date>,
    /// Text the description must contain, ignoring ASCII case.
    pub search: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// A transaction with the names needed to display it.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub transaction: Transaction,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
    pub account_name: Option<String>,
}

impl ReportEntry for TransactionRow {
    fn amount(&self) -> f64 {
        self.transaction.amount
    }

    fn kind(&self) -> TransactionKind {
        self.transaction.kind
    }

    fn status(&self) -> TransactionStatus {
        self.transaction.status
    }

    fn due_date(&self) -> Date {
        self.transaction.due_date
    }

    fn category_name(&self) -> Option<&str> {
        self.category_name.as_deref()
    }

    fn description(&self) -> &str {
        &self.transaction.description
    }
}

/// The columns read by [map_transaction_row], followed by the joined names.
const ROW_COLUMNS: &str = "t.id, t.amount, t.kind, t.category_id, t.account_id, t.description, \
    t.due_date, t.paid_date, t.status, t.note, t.frequency, t.parent_transaction_id, \
    c.name, c.color, a.name";

/// Build the WHERE clause for `filter`, ignoring its limit and offset.
fn where_clause(user_id: UserId, filter: &TransactionFilter) -> (String, Vec<Value>) {
    let mut conditions = vec!["t.user_id = ?".to_owned()];
    let mut params = vec![Value::Integer(user_id)];

    if let Some(category_id) = filter.category_id {
        conditions.push("t.category_id = ?".to_owned());
        params.push(Value::Integer(category_id));
    }

    if let Some(kind) = filter.kind {
        conditions.push("t.kind = ?".to_owned());
        params.push(Value::Text(kind.as_str().to_owned()));
    }

    if let Some(status) = filter.status {
        conditions.push("t.status = ?".to_owned());
        params.push(Value::Text(status.as_str().to_owned()));
    }

    if let Some(date_from) = filter.date_from {
        conditions.push("t.due_date >= ?".to_owned());
        params.push(Value::Text(format_date_for_input(date_from)));
    }

    if let Some(date_to) = filter.date_to {
        conditions.push("t.due_date <= ?".to_owned());
        params.push(Value::Text(format_date_for_input(date_to)));
    }

    if let Some(search) = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|search| !search.is_empty())
    {
        conditions.push("instr(lower(t.description), lower(?)) > 0".to_owned());
        params.push(Value::Text(search.to_owned()));
    }

    (format!("WHERE {}", conditions.join(" AND ")), params)
}

fn to_sql_integer(value: u64) -> Value {
    Value::Integer(i64::try_from(value).unwrap_or(i64::MAX))
}

/// Fetch the user's transactions matching `filter`, newest due date first.
///
/// Transactions due on the same day are ordered by descending ID. When the filter
/// has an offset but no limit, [DEFAULT_QUERY_PAGE_SIZE] rows are returned.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_transactions(
    user_id: UserId,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<TransactionRow>, Error> {
    let (where_clause, mut params) = where_clause(user_id, filter);

    let limit = match (filter.limit, filter.offset) {
        (Some(limit), _) => Some(limit),
        (None, Some(_)) => Some(DEFAULT_QUERY_PAGE_SIZE),
        (None, None) => None,
    };

    let mut page_clause = String::new();
    if let Some(limit) = limit {
        page_clause.push_str(" LIMIT ? OFFSET ?");
        params.push(to_sql_integer(limit));
        params.push(to_sql_integer(filter.offset.unwrap_or(0)));
    }

    let query = format!(
        "SELECT {ROW_COLUMNS} FROM \"transaction\" t
         LEFT JOIN category c ON c.id = t.category_id
         LEFT JOIN account a ON a.id = t.account_id
         {where_clause}
         ORDER BY t.due_date DESC, t.id DESC{page_clause}"
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), map_row)?
        .map(|row| row.map_err(Error::from))
        .collect()
}

/// Count the user's transactions matching `filter`, ignoring its limit and offset.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn count_transactions(
    user_id: UserId,
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<u64, Error> {
    let (where_clause, params) = where_clause(user_id, filter);

    let count: i64 = connection.query_row(
        &format!("SELECT COUNT(1) FROM \"transaction\" t {where_clause}"),
        params_from_iter(params),
        |row| row.get(0),
    )?;

    Ok(u64::try_from(count).unwrap_or(0))
}

fn map_row(row: &Row) -> Result<TransactionRow, rusqlite::Error> {
    Ok(TransactionRow {
        transaction: map_transaction_row(row)?,
        category_name: row.get(12)?,
        category_color: row.get(13)?,
        account_name: row.get(14)?,
    })
}
