//! Result of one poll of the Flatastic API, plus the views derived from it.

use super::api::Endpoint;
use super::model::{CashflowEntry, CashflowStatistic, HouseholdInfo, ShoppingItem, Task, User};
use chrono::{DateTime, Utc};
use std::cmp::Reverse;
use std::fmt::Display;

/// Currency used when neither the config nor the household names one.
pub const DEFAULT_CURRENCY: &str = "€";

/// Outcome of fetching a single endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome<T> {
    Fetched(T),
    Failed(String),
}

impl<T> FetchOutcome<T> {
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            FetchOutcome::Fetched(_) => None,
            FetchOutcome::Failed(reason) => Some(reason),
        }
    }
}

impl<T> FetchOutcome<Vec<T>> {
    /// Fetched records, or nothing if the fetch failed.
    pub fn items(&self) -> &[T] {
        match self {
            FetchOutcome::Fetched(items) => items,
            FetchOutcome::Failed(_) => &[],
        }
    }
}

impl<T> Default for FetchOutcome<T> {
    fn default() -> Self {
        FetchOutcome::Failed("not fetched yet".to_string())
    }
}

/// Either the raw shopping items or just their names.
#[derive(Debug, Clone, PartialEq)]
pub enum ShoppingList<'a> {
    Items(&'a [ShoppingItem]),
    Names(Vec<&'a str>),
}

/// Everything known after one refresh. Replaced wholesale on the next one.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub household: FetchOutcome<HouseholdInfo>,
    pub tasks: FetchOutcome<Vec<Task>>,
    pub cashflow: FetchOutcome<Vec<CashflowEntry>>,
    pub statistics: FetchOutcome<Vec<CashflowStatistic>>,
    pub shopping: FetchOutcome<Vec<ShoppingItem>>,
    pub fetched_at: Option<DateTime<Utc>>,
    /// Currency forced by configuration, taking precedence over the household's.
    pub configured_currency: Option<String>,
}

impl Snapshot {
    pub fn users(&self) -> &[User] {
        match &self.household {
            FetchOutcome::Fetched(info) => &info.flatmates,
            FetchOutcome::Failed(_) => &[],
        }
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.items()
    }

    pub fn cashflow(&self) -> &[CashflowEntry] {
        self.cashflow.items()
    }

    pub fn statistics(&self) -> &[CashflowStatistic] {
        self.statistics.items()
    }

    pub fn shopping_items(&self) -> &[ShoppingItem] {
        self.shopping.items()
    }

    pub fn currency(&self) -> &str {
        if let Some(currency) = &self.configured_currency {
            return currency.as_str();
        }
        match &self.household {
            FetchOutcome::Fetched(HouseholdInfo {
                currency: Some(currency),
                ..
            }) if !currency.is_empty() => currency.as_str(),
            _ => DEFAULT_CURRENCY,
        }
    }

    /// Endpoints whose last fetch failed, with the reason.
    pub fn failures(&self) -> Vec<(Endpoint, &str)> {
        [
            (Endpoint::WgInfo, self.household.failure()),
            (Endpoint::TaskList, self.tasks.failure()),
            (Endpoint::Cashflow, self.cashflow.failure()),
            (Endpoint::CashflowStatistics, self.statistics.failure()),
            (Endpoint::ShoppingList, self.shopping.failure()),
        ]
        .into_iter()
        .filter_map(|(endpoint, reason)| reason.map(|r| (endpoint, r)))
        .collect()
    }

    /// Looks up a flatmate by id. Numeric ids match their string form.
    pub fn user_by_id(&self, id: impl Display) -> Option<&User> {
        let id = id.to_string();
        self.users().iter().find(|u| u.id == id)
    }

    /// `(first name, chore points)`, highest first. Ties keep the API order.
    pub fn high_scores(&self) -> Vec<(&str, i64)> {
        let mut scores: Vec<_> = self
            .users()
            .iter()
            .map(|u| (u.first_name.as_str(), u.chore_points))
            .collect();
        scores.sort_by_key(|&(_, points)| Reverse(points));
        scores
    }

    /// Titles of the `count` most recently completed tasks.
    pub fn recent_tasks(&self, count: usize) -> Vec<&str> {
        newest_first(self.tasks(), count, |t| t.last_done_date)
            .into_iter()
            .filter_map(|t| t.title.as_deref())
            .collect()
    }

    /// Titles of tasks that currently have someone assigned.
    pub fn assigned_task_titles(&self) -> Vec<&str> {
        self.tasks()
            .iter()
            .filter(|t| !t.current_user.is_empty())
            .filter_map(|t| t.title.as_deref())
            .collect()
    }

    /// The `count` newest cashflow entries as `"<payer> paid <item>: <sum> <currency>"`.
    pub fn recent_cashflow(&self, count: usize) -> Vec<String> {
        let currency = self.currency();
        newest_first(self.cashflow(), count, |f| f.date)
            .into_iter()
            .map(|flow| {
                let payer = self
                    .user_by_id(&flow.paid_by)
                    .map_or("Unknown", |u| u.first_name.as_str());
                format!(
                    "{payer} paid {}: {} {currency}",
                    flow.name, flow.total_sum
                )
            })
            .collect()
    }

    /// The `count` newest entries paid by `user_id`, as `"<item>: <sum> <currency>"`.
    pub fn recent_cashflow_paid_by(&self, user_id: &str, count: usize) -> Vec<String> {
        let currency = self.currency();
        let paid = self.cashflow().iter().filter(|f| f.paid_by == user_id);
        newest_first(paid, count, |f| f.date)
            .into_iter()
            .map(|f| format!("{}: {} {currency}", f.name, f.total_sum))
            .collect()
    }

    /// Balance of a flatmate; zero when the statistics have no entry for them.
    pub fn balance_of(&self, user_id: &str) -> f64 {
        self.statistics()
            .iter()
            .find(|s| s.id == user_id)
            .map_or(0.0, |s| s.balance)
    }

    /// `(first name, balance)` for every statistic that belongs to a known flatmate.
    pub fn cashflow_statistics(&self) -> Vec<(&str, f64)> {
        self.statistics()
            .iter()
            .filter_map(|entry| {
                self.user_by_id(&entry.id)
                    .map(|user| (user.first_name.as_str(), entry.balance))
            })
            .collect()
    }

    pub fn shopping_list(&self, include_data: bool) -> ShoppingList<'_> {
        if include_data {
            ShoppingList::Items(self.shopping_items())
        } else {
            ShoppingList::Names(
                self.shopping_items()
                    .iter()
                    .filter_map(ShoppingItem::name)
                    .collect(),
            )
        }
    }

    pub fn task_by_id(&self, id: &str) -> Option<&Task> {
        self.tasks().iter().find(|t| t.id == id)
    }
}

/// Top `count` items by `key`, descending. Stable, so equal keys keep input order.
fn newest_first<'a, T>(
    items: impl IntoIterator<Item = &'a T>,
    count: usize,
    key: impl Fn(&T) -> i64,
) -> Vec<&'a T>
where
    T: 'a,
{
    let mut sorted: Vec<&T> = items.into_iter().collect();
    sorted.sort_by_key(|item| Reverse(key(item)));
    sorted.truncate(count);
    sorted
}
