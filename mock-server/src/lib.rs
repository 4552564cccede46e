use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub category: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

#[derive(Deserialize)]
pub struct CreateExpense {
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    pub category: String,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExpenseList {
    pub expenses: Vec<Expense>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedExpense {
    pub expense: Expense,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CategoryList {
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Expenses in insertion order; categories in first-seen order.
#[derive(Default)]
pub struct Ledger {
    expenses: Vec<Expense>,
    categories: Vec<Category>,
}

pub type Db = Arc<RwLock<Ledger>>;

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorBody>)>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Ledger::default()));
    Router::new()
        .route("/api/expense", get(list_expenses).post(create_expense))
        .route("/api/expense/categories", get(list_categories))
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Newest first; an exact category match when a non-empty filter is given.
async fn list_expenses(State(db): State<Db>, Query(query): Query<ListQuery>) -> Json<ExpenseList> {
    let ledger = db.read().await;
    let category = query.category.filter(|c| !c.is_empty());
    let mut expenses: Vec<Expense> = ledger
        .expenses
        .iter()
        .filter(|e| category.as_deref().is_none_or(|c| e.category == c))
        .cloned()
        .collect();
    expenses.sort_by(|a, b| b.date.cmp(&a.date));
    Json(ExpenseList { expenses })
}

async fn create_expense(
    State(db): State<Db>,
    Json(input): Json<CreateExpense>,
) -> ApiResult<(StatusCode, Json<CreatedExpense>)> {
    let description = input.description.trim();
    let category = input.category.trim();
    if description.is_empty() || category.is_empty() {
        return Err(bad_request("description and category are required"));
    }
    if !input.amount.is_finite() || input.amount < 0.0 {
        return Err(bad_request("amount must be a non-negative number"));
    }

    let expense = Expense {
        id: Uuid::new_v4(),
        description: description.to_string(),
        amount: input.amount,
        date: input.date,
        category: category.to_string(),
    };

    let mut ledger = db.write().await;
    if !ledger.categories.iter().any(|c| c.name == expense.category) {
        tracing::info!(category = %expense.category, "new category");
        ledger.categories.push(Category {
            id: Uuid::new_v4(),
            name: expense.category.clone(),
        });
    }
    ledger.expenses.push(expense.clone());

    Ok((StatusCode::CREATED, Json(CreatedExpense { expense })))
}

async fn list_categories(State(db): State<Db>) -> Json<CategoryList> {
    let ledger = db.read().await;
    Json(CategoryList {
        categories: ledger.categories.clone(),
    })
}

fn bad_request(message: &str) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
}
