//! Polls the API and keeps the most recent snapshot.

use super::api::{Endpoint, FlatasticApi};
use super::error::FetchError;
use super::model::NewShoppingItem;
use super::snapshot::{FetchOutcome, Snapshot};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

pub struct DataFetcher {
    api: Arc<dyn FlatasticApi>,
    currency: Option<String>,
    latest: RwLock<Arc<Snapshot>>,
}

impl DataFetcher {
    pub fn new(api: Arc<dyn FlatasticApi>, currency: Option<String>) -> Self {
        Self {
            api,
            currency,
            latest: RwLock::new(Arc::new(Snapshot::default())),
        }
    }

    /// Snapshot produced by the last `update_all`.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.latest.read().await)
    }

    /// Fetches every endpoint in turn and replaces the current snapshot.
    ///
    /// Never fails: an endpoint that cannot be fetched is logged and recorded as
    /// [`FetchOutcome::Failed`], and the remaining endpoints are still fetched.
    pub async fn update_all(&self) -> Arc<Snapshot> {
        info!("Refreshing Flatastic data");

        let snapshot = Arc::new(Snapshot {
            household: outcome(Endpoint::WgInfo, self.api.fetch_household().await),
            tasks: outcome(Endpoint::TaskList, self.api.fetch_tasks().await),
            cashflow: outcome(Endpoint::Cashflow, self.api.fetch_cashflow().await),
            statistics: outcome(
                Endpoint::CashflowStatistics,
                self.api.fetch_cashflow_statistics().await,
            ),
            shopping: outcome(Endpoint::ShoppingList, self.api.fetch_shopping_list().await),
            fetched_at: Some(Utc::now()),
            configured_currency: self.currency.clone(),
        });

        debug!(
            users = snapshot.users().len(),
            tasks = snapshot.tasks().len(),
            cashflow = snapshot.cashflow().len(),
            statistics = snapshot.statistics().len(),
            shopping = snapshot.shopping_items().len(),
            failed = snapshot.failures().len(),
            "Refresh complete"
        );

        *self.latest.write().await = Arc::clone(&snapshot);
        snapshot
    }

    /// Creates a shopping list entry. Returns the decoded response, or `None` on failure.
    pub async fn add_shopping_item(&self, item: &NewShoppingItem) -> Option<Value> {
        match self.api.add_shopping_item(item).await {
            Ok(body) => Some(body),
            Err(e) => {
                error!(error = %e, kind = e.kind(), name = %item.name, "Failed to add shopping item");
                None
            }
        }
    }

    pub async fn delete_shopping_item(&self, item_id: &str) -> Option<Value> {
        match self.api.delete_shopping_item(item_id).await {
            Ok(body) => Some(body),
            Err(e) => {
                error!(error = %e, kind = e.kind(), item_id, "Failed to delete shopping item");
                None
            }
        }
    }

    pub async fn toggle_shopping_item(&self, item_id: &str) -> Option<Value> {
        match self.api.toggle_shopping_item(item_id).await {
            Ok(body) => Some(body),
            Err(e) => {
                error!(error = %e, kind = e.kind(), item_id, "Failed to toggle shopping item");
                None
            }
        }
    }
}

fn outcome<T>(endpoint: Endpoint, result: Result<T, FetchError>) -> FetchOutcome<T> {
    match result {
        Ok(data) => FetchOutcome::Fetched(data),
        Err(e) => {
            error!(%endpoint, error = %e, kind = e.kind(), "Flatastic API fetch error");
            FetchOutcome::Failed(e.to_string())
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::model::{
        CashflowEntry, CashflowStatistic, HouseholdInfo, ShoppingItem, Task, User,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-memory API double. Endpoints set to `None` fail with a 500.
    #[derive(Default)]
    pub(crate) struct FakeApi {
        pub household: Option<HouseholdInfo>,
        pub tasks: Option<Vec<Task>>,
        pub cashflow: Option<Vec<CashflowEntry>>,
        pub statistics: Option<Vec<CashflowStatistic>>,
        pub shopping: Mutex<Option<Vec<ShoppingItem>>>,
        pub calls: Mutex<Vec<String>>,
    }

    fn served<T: Clone>(data: &Option<T>) -> Result<T, FetchError> {
        data.clone().ok_or_else(|| FetchError::Status {
            code: 500,
            body: "boom".to_string(),
        })
    }

    impl FakeApi {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        pub(crate) fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FlatasticApi for FakeApi {
        async fn fetch_household(&self) -> Result<HouseholdInfo, FetchError> {
            self.record("wg".to_string());
            served(&self.household)
        }

        async fn fetch_tasks(&self) -> Result<Vec<Task>, FetchError> {
            self.record("chores".to_string());
            served(&self.tasks)
        }

        async fn fetch_cashflow(&self) -> Result<Vec<CashflowEntry>, FetchError> {
            self.record("cashflow".to_string());
            served(&self.cashflow)
        }

        async fn fetch_cashflow_statistics(&self) -> Result<Vec<CashflowStatistic>, FetchError> {
            self.record("statistics".to_string());
            served(&self.statistics)
        }

        async fn fetch_shopping_list(&self) -> Result<Vec<ShoppingItem>, FetchError> {
            self.record("shoppinglist".to_string());
            served(&*self.shopping.lock().unwrap())
        }

        async fn add_shopping_item(&self, item: &NewShoppingItem) -> Result<Value, FetchError> {
            self.record(format!("add {}", item.name));
            let mut shopping = self.shopping.lock().unwrap();
            let items = shopping.get_or_insert_with(Vec::new);
            let id = (items.len() + 100).to_string();
            items.push(ShoppingItem {
                id: id.clone(),
                item_name: Some(item.name.clone()),
                bought: 0,
            });
            Ok(serde_json::json!({ "id": id }))
        }

        async fn delete_shopping_item(&self, item_id: &str) -> Result<Value, FetchError> {
            self.record(format!("delete {item_id}"));
            let mut shopping = self.shopping.lock().unwrap();
            let items = shopping.get_or_insert_with(Vec::new);
            let before = items.len();
            items.retain(|i| i.id != item_id);
            if items.len() == before {
                return Err(FetchError::Status {
                    code: 404,
                    body: "not found".to_string(),
                });
            }
            Ok(Value::Null)
        }

        async fn toggle_shopping_item(&self, item_id: &str) -> Result<Value, FetchError> {
            self.record(format!("toggle {item_id}"));
            let mut shopping = self.shopping.lock().unwrap();
            let item = shopping
                .get_or_insert_with(Vec::new)
                .iter_mut()
                .find(|i| i.id == item_id)
                .ok_or_else(|| FetchError::Status {
                    code: 404,
                    body: "not found".to_string(),
                })?;
            item.bought = if item.bought == 0 { 1 } else { 0 };
            Ok(serde_json::json!({ "id": item.id, "bought": item.bought }))
        }
    }

    pub(crate) fn household() -> HouseholdInfo {
        HouseholdInfo {
            flatmates: vec![User {
                id: "1".to_string(),
                first_name: "Alice".to_string(),
                email: None,
                chore_points: 10,
            }],
            currency: Some("CHF".to_string()),
        }
    }

    #[tokio::test]
    async fn test_failed_endpoint_does_not_abort_refresh() {
        let api = Arc::new(FakeApi {
            household: Some(household()),
            tasks: None,
            cashflow: Some(vec![]),
            statistics: Some(vec![]),
            shopping: Mutex::new(Some(vec![])),
            ..Default::default()
        });
        let fetcher = DataFetcher::new(api.clone(), None);

        let snapshot = fetcher.update_all().await;

        assert_eq!(
            api.calls(),
            vec!["wg", "chores", "cashflow", "statistics", "shoppinglist"]
        );
        assert_eq!(snapshot.users().len(), 1);
        assert!(snapshot.tasks.is_failed());
        assert!(snapshot.tasks().is_empty());
        assert_eq!(snapshot.failures().len(), 1);
        assert_eq!(snapshot.failures()[0].0, Endpoint::TaskList);
        assert_eq!(snapshot.currency(), "CHF");
    }

    #[tokio::test]
    async fn test_update_all_replaces_latest_snapshot() {
        let api = Arc::new(FakeApi {
            household: Some(household()),
            ..Default::default()
        });
        let fetcher = DataFetcher::new(api, Some("EUR".to_string()));

        assert!(fetcher.snapshot().await.fetched_at.is_none());
        let fresh = fetcher.update_all().await;
        let latest = fetcher.snapshot().await;

        assert!(Arc::ptr_eq(&fresh, &latest));
        assert_eq!(latest.currency(), "EUR");
    }

    #[tokio::test]
    async fn test_mutation_failure_returns_none() {
        let api = Arc::new(FakeApi::default());
        let fetcher = DataFetcher::new(api, None);

        assert!(fetcher.toggle_shopping_item("404").await.is_none());
        assert!(fetcher.delete_shopping_item("404").await.is_none());

        let created = fetcher
            .add_shopping_item(&NewShoppingItem::new("Milk", 0))
            .await
            .unwrap();
        assert_eq!(created["id"], "100");
        assert!(fetcher.toggle_shopping_item("100").await.is_some());
    }
}
