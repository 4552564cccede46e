//! The three remote operations the store depends on.
//!
//! `ExpenseApi` is the seam between the store and the network: the store is
//! generic over it, `HttpExpenseApi` implements it by pairing the pure
//! `ExpenseClient` with a `Transport`, and tests substitute in-process fakes.
//! No retries and no caching happen at this layer; every failure goes straight
//! back to the caller.

use std::future::Future;

use tracing::debug;

use crate::client::ExpenseClient;
use crate::error::ApiError;
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{Category, Expense, NewExpense};

pub trait ExpenseApi: Send + Sync {
    /// `GET /api/expense`, optionally filtered by category.
    fn list_expenses(
        &self,
        category: Option<&str>,
    ) -> impl Future<Output = Result<Vec<Expense>, ApiError>> + Send;

    /// `POST /api/expense`; returns the expense with its server-assigned id.
    fn create_expense(
        &self,
        draft: &NewExpense,
    ) -> impl Future<Output = Result<Expense, ApiError>> + Send;

    /// `GET /api/expense/categories`.
    fn list_categories(&self) -> impl Future<Output = Result<Vec<Category>, ApiError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpExpenseApi<T = ReqwestTransport> {
    client: ExpenseClient,
    transport: T,
}

impl HttpExpenseApi {
    pub fn new(base_url: &str) -> Self {
        Self::with_transport(base_url, ReqwestTransport::new())
    }
}

impl<T: Transport> HttpExpenseApi<T> {
    pub fn with_transport(base_url: &str, transport: T) -> Self {
        Self {
            client: ExpenseClient::new(base_url),
            transport,
        }
    }

    pub fn client(&self) -> &ExpenseClient {
        &self.client
    }
}

impl<T: Transport> ExpenseApi for HttpExpenseApi<T> {
    async fn list_expenses(&self, category: Option<&str>) -> Result<Vec<Expense>, ApiError> {
        let request = self.client.build_list_expenses(category)?;
        debug!(path = %request.path, "fetching expenses");
        let response = self.transport.execute(request).await?;
        self.client.parse_list_expenses(response)
    }

    async fn create_expense(&self, draft: &NewExpense) -> Result<Expense, ApiError> {
        let request = self.client.build_create_expense(draft)?;
        debug!(path = %request.path, category = %draft.category, "creating expense");
        let response = self.transport.execute(request).await?;
        self.client.parse_create_expense(response)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let request = self.client.build_list_categories();
        debug!(path = %request.path, "fetching categories");
        let response = self.transport.execute(request).await?;
        self.client.parse_list_categories(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::http::{HttpMethod, HttpRequest, HttpResponse};

    /// Records every request and answers with a canned response.
    struct CannedTransport {
        response: Result<HttpResponse, ApiError>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl CannedTransport {
        fn new(response: Result<HttpResponse, ApiError>) -> Self {
            Self {
                response,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for CannedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.lock().unwrap().push(request);
            self.response.clone()
        }
    }

    fn ok(body: &str) -> Result<HttpResponse, ApiError> {
        Ok(HttpResponse {
            status: 200,
            body: body.to_string(),
        })
    }

    #[tokio::test]
    async fn list_expenses_sends_filter_and_parses_body() {
        let api = HttpExpenseApi::with_transport(
            "http://api.test",
            CannedTransport::new(ok(
                r#"{"expenses":[{"id":"1","description":"Coffee","amount":4.5,"date":"2024-01-02","category":"Food"}]}"#,
            )),
        );

        let expenses = api.list_expenses(Some("Food")).await.unwrap();
        assert_eq!(expenses.len(), 1);

        let seen = api.transport.seen.lock().unwrap();
        assert_eq!(seen[0].method, HttpMethod::Get);
        assert_eq!(seen[0].path, "http://api.test/api/expense?category=Food");
    }

    #[tokio::test]
    async fn network_failure_propagates_unchanged() {
        let api = HttpExpenseApi::with_transport(
            "http://api.test",
            CannedTransport::new(Err(ApiError::Network("connection refused".to_string()))),
        );
        let err = api.list_categories().await.unwrap_err();
        assert_eq!(err, ApiError::Network("connection refused".to_string()));
    }

    #[tokio::test]
    async fn service_failure_is_not_retried() {
        let api = HttpExpenseApi::with_transport(
            "http://api.test",
            CannedTransport::new(Ok(HttpResponse {
                status: 503,
                body: String::new(),
            })),
        );
        let err = api.list_expenses(None).await.unwrap_err();
        assert!(matches!(err, ApiError::Service { status: 503, .. }));
        assert_eq!(api.transport.seen.lock().unwrap().len(), 1);
    }
}
