//! Client-side source of truth for expenses, categories and fetch status.
//!
//! # Design
//! `ExpenseStore` is an explicitly constructed value; a render layer holds a
//! reference to it, reads `snapshot()` or `subscribe()`s to changes, and
//! calls the async operations below as intents. Nothing else can mutate the
//! state.
//!
//! State lives in a `tokio::sync::watch` channel. Every state transition is
//! a single `send_modify`/`send_if_modified` call, so subscribers never see a
//! half-applied commit and no lock is ever held across an `.await`.
//!
//! Responses are sequenced: each refresh takes a ticket before it suspends,
//! and a response whose ticket is older than the last committed one is
//! dropped instead of overwriting fresher data. `status` only settles on
//! `Succeeded`/`Failed` once the newest outstanding request has answered.
//!
//! Adding an expense is a two-phase commit. The created expense is inserted
//! locally (date-descending, marked pending) and published, then the list and
//! the full, unfiltered list and the categories are refetched. A successful
//! refetch confirms the insert by replacing the list wholesale. If the refetch
//! fails, or is overtaken by a newer request that failed, the insert is rolled
//! back and a warning is left.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::{ExpenseApi, HttpExpenseApi};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::form::ExpenseForm;
use crate::types::{Category, Expense};

pub const MAX_WARNINGS: usize = 32;

/// Lifecycle of the expense-list fetch. Adds and category fetches never
/// touch it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// A point-in-time copy of everything the store owns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreState {
    /// Server order after a fetch, date-descending after a local insert.
    pub expenses: Vec<Expense>,
    pub categories: Vec<Category>,
    pub status: FetchStatus,
    /// Message of the last failed expense fetch.
    pub error: Option<String>,
    /// Advisory only: setting it never triggers a fetch.
    pub category_filter: Option<String>,
    /// Ids of optimistically inserted expenses not yet confirmed by a refetch.
    pub pending: Vec<String>,
    /// Recoverable failures that must not block the list view. Only the
    /// newest [`MAX_WARNINGS`] are kept; drain with
    /// [`ExpenseStore::take_warnings`].
    pub warnings: Vec<String>,
}

impl StoreState {
    /// Sum of all listed amounts.
    pub fn total(&self) -> f64 {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    /// Expenses matching the current category filter, or all of them.
    pub fn filtered_expenses(&self) -> Vec<&Expense> {
        match self.category_filter.as_deref() {
            Some(category) => self
                .expenses
                .iter()
                .filter(|e| e.category == category)
                .collect(),
            None => self.expenses.iter().collect(),
        }
    }

    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.iter().any(|p| p == id)
    }

    fn push_warning(&mut self, warning: String) {
        if self.warnings.len() >= MAX_WARNINGS {
            let excess = self.warnings.len() + 1 - MAX_WARNINGS;
            self.warnings.drain(..excess);
        }
        self.warnings.push(warning);
    }

    /// Append and re-sort by date, newest first. The sort is stable, so
    /// same-day expenses keep their relative order.
    fn insert_sorted(&mut self, expense: Expense) {
        self.expenses.push(expense);
        self.expenses.sort_by(|a, b| b.date.cmp(&a.date));
    }
}

/// Result of a successful create in [`ExpenseStore::add_expense_and_sync`].
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// The reconciliation refetch (or a newer one) replaced the list with the
    /// server's.
    Confirmed(Expense),
    /// The expense exists on the server, but no successful refetch confirmed
    /// it and the local insert was undone.
    RolledBack { expense: Expense, error: ApiError },
}

impl SyncOutcome {
    pub fn expense(&self) -> &Expense {
        match self {
            SyncOutcome::Confirmed(expense) => expense,
            SyncOutcome::RolledBack { expense, .. } => expense,
        }
    }
}

/// Monotonic tickets for one kind of request.
#[derive(Debug, Default)]
struct Sequencer {
    issued: AtomicU64,
    committed: AtomicU64,
}

impl Sequencer {
    fn issue(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Claim the commit slot for `ticket`; false when a newer ticket already
    /// committed.
    fn try_commit(&self, ticket: u64) -> bool {
        self.committed.fetch_max(ticket, Ordering::SeqCst) < ticket
    }

    fn is_latest(&self, ticket: u64) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket
    }
}

pub struct ExpenseStore<A> {
    api: A,
    state: watch::Sender<StoreState>,
    expense_seq: Sequencer,
    category_seq: Sequencer,
}

impl ExpenseStore<HttpExpenseApi> {
    /// Build a store talking to the configured service over HTTP.
    pub fn connect(config: &ClientConfig) -> Result<Self, ApiError> {
        reqwest::Url::parse(&config.base_url)
            .map_err(|e| ApiError::Config(format!("invalid base_url {:?}: {e}", config.base_url)))?;
        Ok(Self::new(HttpExpenseApi::new(&config.base_url)))
    }
}

impl<A: ExpenseApi> ExpenseStore<A> {
    pub fn new(api: A) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            api,
            state,
            expense_seq: Sequencer::default(),
            category_seq: Sequencer::default(),
        }
    }

    pub fn snapshot(&self) -> StoreState {
        self.state.borrow().clone()
    }

    /// Receive a notification after every committed state change.
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state.subscribe()
    }

    /// Initial load: the full expense list and the categories, concurrently.
    pub async fn load(&self) -> Result<(), ApiError> {
        let (expenses, ()) = tokio::join!(self.refresh_expenses(None), self.refresh_categories());
        expenses
    }

    /// Refetch the expense list, optionally filtered by category.
    ///
    /// `status` flips to `Loading` before the request is issued. On failure
    /// the previous list is kept and the message lands in `error`. The
    /// returned result is the outcome of the request itself, even when a
    /// newer response made it stale.
    pub async fn refresh_expenses(&self, category: Option<&str>) -> Result<(), ApiError> {
        self.fetch_expenses(category).await.map(|_| ())
    }

    /// `Ok(false)` means the list arrived but a newer response had already
    /// committed, so it was dropped.
    async fn fetch_expenses(&self, category: Option<&str>) -> Result<bool, ApiError> {
        let ticket = self.expense_seq.issue();
        self.state.send_modify(|state| state.status = FetchStatus::Loading);

        let result = self.api.list_expenses(category).await;
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);

        let committed = self.state.send_if_modified(|state| {
            if !self.expense_seq.try_commit(ticket) {
                return false;
            }
            let latest = self.expense_seq.is_latest(ticket);
            match result {
                Ok(expenses) => {
                    state.expenses = expenses;
                    state.pending.clear();
                    state.error = None;
                    if latest {
                        state.status = FetchStatus::Succeeded;
                    }
                }
                Err(err) => {
                    state.error = Some(err.to_string());
                    if latest {
                        state.status = FetchStatus::Failed;
                    }
                }
            }
            true
        });

        if !committed {
            debug!(ticket, "discarding stale expense list response");
        }
        if let Err(err) = &outcome {
            warn!(error = %err, "failed to fetch expenses");
        }
        outcome.map(|()| committed)
    }

    /// Refetch categories. Failures never block the list view: they are
    /// logged and recorded in `warnings`, and the previous categories stay.
    pub async fn refresh_categories(&self) {
        let ticket = self.category_seq.issue();
        let result = self.api.list_categories().await;

        self.state.send_if_modified(|state| {
            if !self.category_seq.try_commit(ticket) {
                debug!(ticket, "discarding stale category response");
                return false;
            }
            match result {
                Ok(categories) => state.categories = categories,
                Err(err) => {
                    warn!(error = %err, "failed to fetch categories");
                    state.push_warning(format!("could not load categories: {err}"));
                }
            }
            true
        });
    }

    /// Validate, create, insert optimistically, then reconcile with an
    /// unfiltered refetch, so the new expense is in the list whatever
    /// `category_filter` says.
    ///
    /// Validation and create failures are returned without touching state.
    /// Once the create succeeds the call always returns `Ok`; whether the
    /// local insert survived reconciliation is in the [`SyncOutcome`].
    pub async fn add_expense_and_sync(&self, form: &ExpenseForm) -> Result<SyncOutcome, ApiError> {
        let draft = form.validate()?;
        let expense = self
            .api
            .create_expense(&draft)
            .await
            .inspect_err(|err| warn!(error = %err, "failed to create expense"))?;

        self.state.send_modify(|state| {
            state.insert_sorted(expense.clone());
            state.pending.push(expense.id.clone());
        });

        let (refetch, ()) = tokio::join!(self.fetch_expenses(None), self.refresh_categories());

        let error = match refetch {
            Ok(true) => return Ok(SyncOutcome::Confirmed(expense)),
            Ok(false) => {
                // A newer successful refetch clears `pending`; a newer failed
                // one leaves the insert unconfirmed.
                let still_pending = self.state.borrow().is_pending(&expense.id);
                if !still_pending {
                    return Ok(SyncOutcome::Confirmed(expense));
                }
                ApiError::Superseded
            }
            Err(error) => error,
        };
        self.roll_back(&expense.id, &error);
        Ok(SyncOutcome::RolledBack { expense, error })
    }

    /// Pure setter; issues no request.
    pub fn set_category_filter(&self, category: Option<&str>) {
        let category = category.map(str::to_string);
        self.state.send_if_modified(|state| {
            if state.category_filter == category {
                return false;
            }
            state.category_filter = category;
            true
        });
    }

    /// Drain the warning channel.
    pub fn take_warnings(&self) -> Vec<String> {
        let mut taken = Vec::new();
        self.state.send_if_modified(|state| {
            std::mem::swap(&mut taken, &mut state.warnings);
            !taken.is_empty()
        });
        taken
    }

    /// Undo an optimistic insert that is still pending. A newer successful
    /// refetch may already have superseded it, in which case nothing changes.
    fn roll_back(&self, id: &str, error: &ApiError) {
        self.state.send_if_modified(|state| {
            if !state.is_pending(id) {
                return false;
            }
            state.pending.retain(|p| p != id);
            state.expenses.retain(|e| e.id != id);
            warn!(id, error = %error, "rolled back optimistic expense");
            state.push_warning(format!("expense {id} was saved but the list could not be refreshed: {error}"));
            true
        });
    }
}
