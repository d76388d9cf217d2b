//! Dashboard module
//!
//! Provides an overview page with the current month's summary and the most
//! recent transactions.

mod cards;
mod handlers;
mod tables;

pub use handlers::get_dashboard_page;
