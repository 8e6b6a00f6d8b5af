//! Records returned by the Flatastic API.
//!
//! The API is loose about JSON types: identifiers show up as strings or numbers
//! depending on the endpoint, and numeric fields are sometimes quoted. Everything
//! is normalised here so the rest of the crate can compare ids as plain strings.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt::Display;
use tracing::warn;

/// Chore rotation marking an on-demand task.
pub const ON_DEMAND_ROTATION: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub first_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub chore_points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "id_string")]
    pub current_user: String,
    /// Seconds between repetitions, or [`ON_DEMAND_ROTATION`].
    #[serde(default, deserialize_with = "lenient_i64")]
    pub rotation_time: i64,
    /// Epoch seconds.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub last_done_date: i64,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashflowEntry {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "id_string")]
    pub paid_by: String,
    #[serde(default)]
    pub total_sum: Amount,
    /// Epoch seconds.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub date: i64,
    #[serde(default, deserialize_with = "id_list")]
    pub involved_users: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowStatistic {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItem {
    #[serde(default, deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub item_name: Option<String>,
    /// `0` while the item is still needed.
    #[serde(default = "default_bought", deserialize_with = "bought_flag")]
    pub bought: i64,
}

impl ShoppingItem {
    pub fn is_needed(&self) -> bool {
        self.bought == 0
    }

    /// The item name, if present and not blank.
    pub fn name(&self) -> Option<&str> {
        self.item_name.as_deref().filter(|name| !name.is_empty())
    }
}

/// Payload of the `/wg` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HouseholdInfo {
    #[serde(default, deserialize_with = "record_list")]
    pub flatmates: Vec<User>,
    #[serde(default)]
    pub currency: Option<String>,
}

/// A money amount that keeps the text it arrived as, so `"23.50"` still prints as `23.50`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Amount {
    pub value: f64,
    text: String,
}

impl Amount {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            text: value.to_string(),
        }
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.text.is_empty() {
            write!(f, "{}", self.value)
        } else {
            f.write_str(&self.text)
        }
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Null => Ok(Amount::default()),
            Value::Number(n) => n
                .as_f64()
                .map(|value| Amount {
                    value,
                    text: n.to_string(),
                })
                .ok_or_else(|| de::Error::custom(format!("number out of range: {n}"))),
            Value::String(s) if s.trim().is_empty() => Ok(Amount::default()),
            Value::String(s) => {
                let text = s.trim().to_string();
                let value = text
                    .parse()
                    .map_err(|_| de::Error::custom(format!("not a number: {s}")))?;
                Ok(Amount { value, text })
            }
            other => Err(de::Error::custom(format!("expected a number, got {other}"))),
        }
    }
}

/// Decodes each record on its own. Records that fail to decode are logged and dropped
/// so one bad row does not take the rest of the endpoint with it.
pub fn decode_records<T: DeserializeOwned>(values: Vec<Value>) -> Vec<T> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Skipping malformed record");
                None
            }
        })
        .collect()
}

/// Request body for creating a shopping list entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewShoppingItem {
    pub name: String,
    pub amount: String,
    pub priority: u8,
    pub bought: u8,
    pub date: i64,
}

impl NewShoppingItem {
    pub fn new(name: impl Into<String>, now: i64) -> Self {
        Self {
            name: name.into(),
            amount: "1".to_string(),
            priority: 3,
            bought: 0,
            date: now,
        }
    }
}

fn default_bought() -> i64 {
    1
}

fn value_to_id(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(value_to_id(Value::deserialize(deserializer)?))
}

fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn record_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(decode_records(values))
}

fn id_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(values.into_iter().map(value_to_id).collect())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(0.0),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| de::Error::custom(format!("number out of range: {n}"))),
        Value::String(s) if s.trim().is_empty() => Ok(0.0),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("not a number: {s}"))),
        other => Err(de::Error::custom(format!("expected a number, got {other}"))),
    }
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_i64(deserializer)?.unwrap_or(0))
}

/// Like [`lenient_i64`], but a null or blank flag counts as bought.
fn bought_flag<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_i64(deserializer)?.unwrap_or_else(default_bought))
}

fn optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("number out of range: {n}"))),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .or_else(|_| s.parse::<f64>().map(|f| f as i64))
                .map(Some)
                .map_err(|_| de::Error::custom(format!("not a number: {s}")))
        }
        other => Err(de::Error::custom(format!("expected a number, got {other}"))),
    }
}
