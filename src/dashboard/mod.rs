//! Dashboard module
//!
//! Provides an overview page with spending summaries, charts, the expense
//! table and the form for adding expenses.

mod cards;
mod charts;
mod handlers;
mod tables;

pub use handlers::{DashboardState, get_dashboard_page};
