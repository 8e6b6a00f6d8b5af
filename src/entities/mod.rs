//! Entity views over a [`Snapshot`].
//!
//! Entities hold only their identity. State and attributes are recomputed from
//! whichever snapshot they are rendered against, so nothing carries over between
//! polls.

pub mod sensor;
pub mod todo;

use crate::core::Snapshot;
use serde::Serialize;
use serde_json::{Map, Value};

pub use sensor::{GenericSensor, GenericView, TaskSensor, UserSensor};
pub use todo::{ShoppingListTodo, TodoItem, TodoStatus};

pub type Attributes = Map<String, Value>;

pub trait Entity: Send + Sync {
    fn name(&self) -> String;

    fn unique_id(&self) -> String;

    fn icon(&self) -> Option<&'static str> {
        None
    }

    /// `now` is the current time in epoch seconds.
    fn state(&self, snapshot: &Snapshot, now: i64) -> String;

    fn attributes(&self, _snapshot: &Snapshot, _now: i64) -> Attributes {
        Attributes::new()
    }
}

/// An entity evaluated against one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityState {
    pub name: String,
    pub unique_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<&'static str>,
    pub state: String,
    pub attributes: Attributes,
}

pub fn render(entity: &dyn Entity, snapshot: &Snapshot, now: i64) -> EntityState {
    EntityState {
        name: entity.name(),
        unique_id: entity.unique_id(),
        icon: entity.icon(),
        state: entity.state(snapshot, now),
        attributes: entity.attributes(snapshot, now),
    }
}

/// One sensor per flatmate and per chore, followed by the household-wide list sensors.
pub fn build_sensors(snapshot: &Snapshot, recent_count: usize) -> Vec<Box<dyn Entity>> {
    let mut sensors: Vec<Box<dyn Entity>> = Vec::new();

    for user in snapshot.users() {
        sensors.push(Box::new(UserSensor::new(user)));
    }
    for task in snapshot.tasks() {
        sensors.push(Box::new(TaskSensor::new(task)));
    }
    for view in GenericView::all(recent_count) {
        sensors.push(Box::new(GenericSensor::new(view)));
    }

    sensors
}
