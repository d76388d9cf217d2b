//! Transactions: income, expenses and transfers with a due date and status.
//!
//! This module contains:
//! - The `Transaction` model and `NewTransaction` builder
//! - Database functions for storing, filtering and counting transactions
//! - The list, create and edit pages and their endpoints

mod core;
mod create;
mod delete;
mod edit;
mod form;
mod query;
mod transactions_page;

pub use core::{
    Frequency, NewTransaction, Transaction, TransactionId, TransactionKind, TransactionStatus,
    create_transaction, create_transaction_table, delete_transaction, get_transaction,
    update_transaction,
};
pub use create::{create_transaction_endpoint, get_new_transaction_page};
pub use delete::delete_transaction_endpoint;
pub use edit::{get_edit_transaction_page, update_transaction_endpoint};
pub use query::{TransactionFilter, TransactionRow, get_transactions};
pub use transactions_page::{TransactionState, get_transactions_page};
