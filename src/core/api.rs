//! Transport abstraction for the Flatastic API

use super::error::FetchError;
use super::model::{
    CashflowEntry, CashflowStatistic, HouseholdInfo, NewShoppingItem, ShoppingItem, Task,
};
use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait FlatasticApi: Send + Sync {
    async fn fetch_household(&self) -> Result<HouseholdInfo, FetchError>;

    async fn fetch_tasks(&self) -> Result<Vec<Task>, FetchError>;

    async fn fetch_cashflow(&self) -> Result<Vec<CashflowEntry>, FetchError>;

    async fn fetch_cashflow_statistics(&self) -> Result<Vec<CashflowStatistic>, FetchError>;

    async fn fetch_shopping_list(&self) -> Result<Vec<ShoppingItem>, FetchError>;

    /// Returns the decoded response body of the created item.
    async fn add_shopping_item(&self, item: &NewShoppingItem) -> Result<Value, FetchError>;

    async fn delete_shopping_item(&self, item_id: &str) -> Result<Value, FetchError>;

    async fn toggle_shopping_item(&self, item_id: &str) -> Result<Value, FetchError>;
}

/// Read endpoints polled on every refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    WgInfo,
    TaskList,
    Cashflow,
    CashflowStatistics,
    ShoppingList,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::WgInfo => "/wg",
            Endpoint::TaskList => "/chores",
            Endpoint::Cashflow => "/cashflow",
            Endpoint::CashflowStatistics => "/cashflow/statistics",
            Endpoint::ShoppingList => "/shoppinglist",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Endpoint::WgInfo => "wg_info",
                Endpoint::TaskList => "task_list",
                Endpoint::Cashflow => "cashflow",
                Endpoint::CashflowStatistics => "cashflow_statistics",
                Endpoint::ShoppingList => "shopping_list",
            }
        )
    }
}
