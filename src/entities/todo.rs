//! Shopping list exposed as a todo list.

use super::{Attributes, Entity};
use crate::core::model::NewShoppingItem;
use crate::core::{DataFetcher, Snapshot};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, error, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    NeedsAction,
    Completed,
}

impl Display for TodoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TodoStatus::NeedsAction => "needs_action",
                TodoStatus::Completed => "completed",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodoItem {
    pub uid: String,
    pub summary: String,
    pub status: TodoStatus,
}

/// Maps the snapshot's shopping items to todo items, skipping unnamed ones.
pub fn todo_items(snapshot: &Snapshot) -> Vec<TodoItem> {
    snapshot
        .shopping_items()
        .iter()
        .filter_map(|item| {
            let Some(summary) = item.name() else {
                warn!(item_id = %item.id, "Skipping item with empty summary");
                return None;
            };
            let status = if item.is_needed() {
                TodoStatus::NeedsAction
            } else {
                TodoStatus::Completed
            };
            Some(TodoItem {
                uid: item.id.clone(),
                summary: summary.to_string(),
                status,
            })
        })
        .collect()
}

/// Todo-list adapter over the shopping list. Every mutation is followed by a
/// full refresh; nothing is patched locally.
pub struct ShoppingListTodo {
    fetcher: Arc<DataFetcher>,
}

impl ShoppingListTodo {
    pub fn new(fetcher: Arc<DataFetcher>) -> Self {
        Self { fetcher }
    }

    /// Refreshes all data and returns the current items.
    pub async fn update(&self) -> Vec<TodoItem> {
        let snapshot = self.fetcher.update_all().await;
        todo_items(&snapshot)
    }

    /// Items from the last refresh.
    pub async fn items(&self) -> Vec<TodoItem> {
        let snapshot = self.fetcher.snapshot().await;
        todo_items(&snapshot)
    }

    /// Adds an item and returns its id. Falls back to a random id when the API
    /// response does not carry one.
    pub async fn create(&self, summary: &str) -> String {
        let item = NewShoppingItem::new(summary, Utc::now().timestamp());
        let created = self.fetcher.add_shopping_item(&item).await;
        self.update().await;

        created
            .as_ref()
            .and_then(created_id)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }

    /// Flips the bought flag. Returns `false`, without refreshing, if the toggle failed.
    pub async fn toggle(&self, uid: &str) -> bool {
        if self.fetcher.toggle_shopping_item(uid).await.is_none() {
            error!(uid, "Failed to toggle shopping item");
            return false;
        }
        self.update().await;
        true
    }

    pub async fn delete(&self, uid: &str) {
        self.fetcher.delete_shopping_item(uid).await;
        self.update().await;
    }

    pub async fn delete_many(&self, uids: &[String]) {
        for uid in uids {
            if self.fetcher.delete_shopping_item(uid).await.is_some() {
                debug!(uid = %uid, "Deleted shopping item");
            }
        }
        self.update().await;
    }
}

fn created_id(body: &Value) -> Option<String> {
    match body.get("id")? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

impl Entity for ShoppingListTodo {
    fn name(&self) -> String {
        "Flatastic Shopping List".to_string()
    }

    fn unique_id(&self) -> String {
        "flatastic_shopping_list".to_string()
    }

    fn icon(&self) -> Option<&'static str> {
        Some("mdi:cart")
    }

    fn state(&self, snapshot: &Snapshot, _now: i64) -> String {
        format!("{} items", todo_items(snapshot).len())
    }

    fn attributes(&self, snapshot: &Snapshot, _now: i64) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("items".into(), json!(todo_items(snapshot)));
        attributes
    }
}
