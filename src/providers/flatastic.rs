use crate::core::api::{Endpoint, FlatasticApi};
use crate::core::error::FetchError;
use crate::core::model::{
    self, CashflowEntry, CashflowStatistic, HouseholdInfo, NewShoppingItem, ShoppingItem, Task,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

const ACCEPT_VALUE: &str = "application/json, text/plain, */*";
const API_VERSION: &str = "2.0.0";
const CLIENT_VERSION: &str = "2.3.20";

/// reqwest-backed client for the Flatastic REST API.
pub struct FlatasticClient {
    base_url: String,
    client: reqwest::Client,
}

impl FlatasticClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("flatastic/", env!("CARGO_PKG_VERSION")))
            .default_headers(Self::default_headers(api_key)?)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(FlatasticClient {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn default_headers(api_key: &str) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(
            HeaderName::from_static("x-api-version"),
            HeaderValue::from_static(API_VERSION),
        );
        headers.insert(
            HeaderName::from_static("x-client-version"),
            HeaderValue::from_static(CLIENT_VERSION),
        );
        let mut key =
            HeaderValue::from_str(api_key).context("API key is not a valid header value")?;
        key.set_sensitive(true);
        headers.insert(HeaderName::from_static("x-api-key"), key);
        Ok(headers)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends `request` and decodes the body, accepting only the given status codes.
    /// An empty success body decodes to `Value::Null`.
    async fn send(
        &self,
        request: RequestBuilder,
        accepted: &[StatusCode],
    ) -> Result<Value, FetchError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !accepted.contains(&status) {
            return Err(FetchError::Status {
                code: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|e| {
            error!(error = ?e, response = %body, "Failed to parse Flatastic response");
            FetchError::from(e)
        })
    }

    async fn fetch<T: DeserializeOwned>(&self, endpoint: Endpoint) -> Result<T, FetchError> {
        let url = self.url(endpoint.path());
        debug!(%endpoint, "Requesting {}", url);

        let body = self.send(self.client.get(&url), &[StatusCode::OK]).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Fetches a list endpoint, dropping individual records that fail to decode.
    async fn fetch_list<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
    ) -> Result<Vec<T>, FetchError> {
        let values: Vec<Value> = self.fetch(endpoint).await?;
        Ok(model::decode_records(values))
    }
}

#[async_trait]
impl FlatasticApi for FlatasticClient {
    async fn fetch_household(&self) -> Result<HouseholdInfo, FetchError> {
        self.fetch(Endpoint::WgInfo).await
    }

    async fn fetch_tasks(&self) -> Result<Vec<Task>, FetchError> {
        self.fetch_list(Endpoint::TaskList).await
    }

    async fn fetch_cashflow(&self) -> Result<Vec<CashflowEntry>, FetchError> {
        self.fetch_list(Endpoint::Cashflow).await
    }

    async fn fetch_cashflow_statistics(&self) -> Result<Vec<CashflowStatistic>, FetchError> {
        self.fetch_list(Endpoint::CashflowStatistics).await
    }

    async fn fetch_shopping_list(&self) -> Result<Vec<ShoppingItem>, FetchError> {
        self.fetch_list(Endpoint::ShoppingList).await
    }

    async fn add_shopping_item(&self, item: &NewShoppingItem) -> Result<Value, FetchError> {
        let url = self.url(Endpoint::ShoppingList.path());
        debug!(name = %item.name, "Adding shopping item");
        self.send(
            self.client.post(&url).json(item),
            &[StatusCode::OK, StatusCode::CREATED],
        )
        .await
    }

    async fn delete_shopping_item(&self, item_id: &str) -> Result<Value, FetchError> {
        let url = self.url(&format!("/shoppinglist/item/{item_id}"));
        debug!(item_id, "Deleting shopping item");
        self.send(
            self.client.delete(&url),
            &[StatusCode::OK, StatusCode::NO_CONTENT],
        )
        .await
    }

    async fn toggle_shopping_item(&self, item_id: &str) -> Result<Value, FetchError> {
        let url = self.url(&format!("/shoppinglist/toggle_item?item_id={item_id}"));
        debug!(item_id, "Toggling shopping item");
        self.send(self.client.get(&url), &[StatusCode::OK]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TEST_KEY: &str = "test-api-key";

    async fn create_mock_server(
        http_method: &str,
        url_path: &str,
        status: u16,
        body: &str,
    ) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method(http_method))
            .and(path(url_path))
            .and(header("x-api-key", TEST_KEY))
            .and(header("x-api-version", API_VERSION))
            .and(header("x-client-version", CLIENT_VERSION))
            .and(header(
                "user-agent",
                concat!("flatastic/", env!("CARGO_PKG_VERSION")),
            ))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn client_for(server: &MockServer) -> FlatasticClient {
        FlatasticClient::new(&server.uri(), TEST_KEY, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_household() {
        let mock_server = create_mock_server(
            "GET",
            "/wg",
            200,
            r#"{"flatmates": [{"id": "1", "firstName": "Alice", "chorePoints": 12}, {"id": 2, "firstName": "Bob"}]}"#,
        )
        .await;
        let client = client_for(&mock_server);

        let info = client.fetch_household().await.unwrap();

        assert_eq!(info.flatmates.len(), 2);
        assert_eq!(info.flatmates[0].chore_points, 12);
        assert_eq!(info.flatmates[1].id, "2");
        assert_eq!(info.flatmates[1].chore_points, 0);
    }

    #[tokio::test]
    async fn test_fetch_tasks() {
        let mock_server = create_mock_server(
            "GET",
            "/chores",
            200,
            r#"[{"id": 1, "title": "Trash", "currentUser": 1, "rotationTime": -1, "lastDoneDate": 0, "points": 1}]"#,
        )
        .await;
        let client = client_for(&mock_server);

        let tasks = client.fetch_tasks().await.unwrap();

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title.as_deref(), Some("Trash"));
        assert_eq!(tasks[0].rotation_time, -1);
    }

    #[tokio::test]
    async fn test_fetch_unexpected_status() {
        let mock_server = create_mock_server("GET", "/cashflow", 401, "unauthorized").await;
        let client = client_for(&mock_server);

        let err = client.fetch_cashflow().await.unwrap_err();

        assert!(matches!(err, FetchError::Status { code: 401, .. }));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let mock_server = create_mock_server("GET", "/cashflow/statistics", 200, "<html>").await;
        let client = client_for(&mock_server);

        let err = client.fetch_cashflow_statistics().await.unwrap_err();

        assert_eq!(err.kind(), "decode");
    }

    /// Address of a local port that was free a moment ago, so nothing answers on it.
    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_fetch_list_skips_malformed_records() {
        let mock_server = create_mock_server(
            "GET",
            "/cashflow",
            200,
            r#"[{"id": 1, "name": "Bread", "totalSum": "3.50"}, {"id": 2, "name": "Wine", "totalSum": {"amount": 12}}, {"id": 3, "name": null, "totalSum": 2}]"#,
        )
        .await;
        let client = client_for(&mock_server);

        let flows = client.fetch_cashflow().await.unwrap();

        assert_eq!(flows.len(), 2);
        assert_eq!(flows[0].total_sum.to_string(), "3.50");
        assert_eq!(flows[1].id, "3");
        assert_eq!(flows[1].name, "");
    }

    #[tokio::test]
    async fn test_fetch_unreachable_server() {
        let client =
            FlatasticClient::new(&closed_port_url(), TEST_KEY, Duration::from_secs(1)).unwrap();

        let err = client.fetch_shopping_list().await.unwrap_err();

        assert_eq!(err.kind(), "transport");
    }

    #[tokio::test]
    async fn test_add_shopping_item() {
        let mock_server = MockServer::start().await;
        let item = NewShoppingItem::new("Milk", 1_700_000_000);
        Mock::given(method("POST"))
            .and(path("/shoppinglist"))
            .and(body_json(&item))
            .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"id": 77}"#))
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server);

        let created = client.add_shopping_item(&item).await.unwrap();

        assert_eq!(created["id"], 77);
    }

    #[tokio::test]
    async fn test_delete_shopping_item_no_content() {
        let mock_server = create_mock_server("DELETE", "/shoppinglist/item/12", 204, "").await;
        let client = client_for(&mock_server);

        let result = client.delete_shopping_item("12").await.unwrap();

        assert_eq!(result, Value::Null);
    }

    #[tokio::test]
    async fn test_toggle_shopping_item() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/shoppinglist/toggle_item"))
            .and(query_param("item_id", "12"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"id": 12, "bought": 1}"#),
            )
            .mount(&mock_server)
            .await;
        let client = client_for(&mock_server);

        let toggled = client.toggle_shopping_item("12").await.unwrap();
        assert_eq!(toggled["bought"], 1);

        let err = client.toggle_shopping_item("13").await.unwrap_err();
        assert!(matches!(err, FetchError::Status { code: 404, .. }));
    }
}
