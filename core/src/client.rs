//! Stateless HTTP request builder and response parser for the expense API.
//!
//! # Design
//! `ExpenseClient` holds only a `base_url` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. [`crate::HttpExpenseApi`] pairs the two with a transport.
//!
//! The service wraps every payload in a single-key envelope
//! (`{"expenses": [...]}`, `{"expense": {...}}`, `{"categories": [...]}`);
//! the envelopes stay private to this module.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Category, Expense, NewExpense};

#[derive(Deserialize)]
struct ExpenseList {
    expenses: Vec<Expense>,
}

#[derive(Deserialize)]
struct CreatedExpense {
    expense: Expense,
}

#[derive(Deserialize)]
struct CategoryList {
    categories: Vec<Category>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "message")]
    error: String,
}

/// Synchronous, stateless client for the expense API.
#[derive(Debug, Clone)]
pub struct ExpenseClient {
    base_url: String,
}

impl ExpenseClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// An empty category is treated as no filter at all.
    pub fn build_list_expenses(&self, category: Option<&str>) -> Result<HttpRequest, ApiError> {
        let mut path = format!("{}/api/expense", self.base_url);
        if let Some(category) = category.filter(|c| !c.is_empty()) {
            let query = serde_urlencoded::to_string([("category", category)])
                .map_err(|e| ApiError::Serialization(e.to_string()))?;
            path.push('?');
            path.push_str(&query);
        }
        Ok(HttpRequest {
            method: HttpMethod::Get,
            path,
            headers: Vec::new(),
            body: None,
        })
    }

    pub fn build_create_expense(&self, draft: &NewExpense) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(draft).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: format!("{}/api/expense", self.base_url),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    pub fn build_list_categories(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/api/expense/categories", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn parse_list_expenses(&self, response: HttpResponse) -> Result<Vec<Expense>, ApiError> {
        parse_body::<ExpenseList>(response).map(|list| list.expenses)
    }

    pub fn parse_create_expense(&self, response: HttpResponse) -> Result<Expense, ApiError> {
        parse_body::<CreatedExpense>(response).map(|created| created.expense)
    }

    pub fn parse_list_categories(&self, response: HttpResponse) -> Result<Vec<Category>, ApiError> {
        parse_body::<CategoryList>(response).map(|list| list.categories)
    }
}

fn parse_body<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

/// Map non-2xx responses to `ApiError::Service`.
///
/// The message comes from a JSON `{"error": ...}` body when there is one,
/// then the raw body, then the bare status code.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    let message = match serde_json::from_str::<ErrorBody>(&response.body) {
        Ok(body) => body.error,
        Err(_) if !response.body.trim().is_empty() => response.body.trim().to_string(),
        Err(_) => response.status.to_string(),
    };
    Err(ApiError::Service {
        status: response.status,
        message,
    })
}
