//! Client core for the expense-tracking service.
//!
//! # Overview
//! Fetches expenses and categories from the remote API, adds new expenses
//! with an optimistic-insert-then-reconcile strategy, and keeps the result in
//! a single [`ExpenseStore`] that a render layer reads from.
//!
//! # Design
//! - `ExpenseClient` is stateless and I/O-free: `build_*` produces an
//!   `HttpRequest`, `parse_*` consumes an `HttpResponse`.
//! - A `Transport` executes requests; `ReqwestTransport` is the default.
//! - `HttpExpenseApi` joins the two behind the async `ExpenseApi` trait,
//!   which is the only thing the store depends on.
//! - `ExpenseStore` owns all client state and is the only thing that
//!   mutates it.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod form;
pub mod http;
pub mod store;
pub mod transport;
pub mod types;

pub use api::{ExpenseApi, HttpExpenseApi};
pub use client::ExpenseClient;
pub use config::ClientConfig;
pub use error::ApiError;
pub use form::ExpenseForm;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use store::{ExpenseStore, FetchStatus, StoreState, SyncOutcome};
pub use transport::{ReqwestTransport, Transport};
pub use types::{Category, Expense, NewExpense};
