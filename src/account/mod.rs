//! Bank accounts, wallets and cards that transactions are paid from or into.

mod accounts_page;
mod core;
mod create;
mod edit;
mod form;

pub use accounts_page::{AccountState, get_accounts_page};
pub use core::{
    Account, AccountId, AccountKind, AccountName, AccountUpdate, NewAccount, create_account,
    create_account_table, get_account, get_accounts, get_active_accounts,
    get_total_active_balance, parse_balance, update_account,
};
pub use create::{create_account_endpoint, get_new_account_page};
pub use edit::{get_edit_account_page, update_account_endpoint};
