use super::{Attributes, Entity};
use crate::core::Snapshot;
use crate::core::chores::{
    TaskStatus, due_date, is_overdue, overdue_count, overdue_label, periodicity_days,
};
use crate::core::model::{Task, User};
use crate::core::snapshot::ShoppingList;
use serde_json::{Value, json};

/// Number of payments listed on a flatmate's sensor.
const USER_RECENT_CASHFLOW: usize = 3;

/// Per-flatmate sensor: overdue chore count plus balance and assignments.
pub struct UserSensor {
    id: String,
    first_name: String,
}

impl UserSensor {
    pub fn new(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            first_name: user.first_name.clone(),
        }
    }
}

impl Entity for UserSensor {
    fn name(&self) -> String {
        format!("Flatastic User {}", self.first_name)
    }

    fn unique_id(&self) -> String {
        format!("flatastic_user_{}", self.id)
    }

    fn icon(&self) -> Option<&'static str> {
        Some("mdi:account")
    }

    fn state(&self, snapshot: &Snapshot, now: i64) -> String {
        overdue_label(overdue_count(snapshot.tasks(), &self.id, now))
    }

    fn attributes(&self, snapshot: &Snapshot, _now: i64) -> Attributes {
        let currency = snapshot.currency();
        let chore_points = snapshot
            .user_by_id(&self.id)
            .map_or(0, |u| u.chore_points);
        let assigned_tasks: Vec<&str> = snapshot
            .tasks()
            .iter()
            .filter(|t| t.current_user == self.id)
            .filter_map(|t| t.title.as_deref())
            .collect();
        let balance = snapshot.balance_of(&self.id);

        let mut attributes = Attributes::new();
        attributes.insert("chore_points".into(), json!(chore_points));
        attributes.insert("balance".into(), json!(format!("{balance:.2} {currency}")));
        attributes.insert("assigned_tasks".into(), json!(assigned_tasks));
        attributes.insert(
            "recent_cashflow".into(),
            json!(snapshot.recent_cashflow_paid_by(&self.id, USER_RECENT_CASHFLOW)),
        );
        attributes
    }
}

/// Per-chore sensor. Re-reads its task from each snapshot by id.
pub struct TaskSensor {
    id: String,
    title: Option<String>,
}

impl TaskSensor {
    pub fn new(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
        }
    }
}

impl Entity for TaskSensor {
    fn name(&self) -> String {
        format!("Flatastic {}", self.title.as_deref().unwrap_or("Unknown"))
    }

    fn unique_id(&self) -> String {
        format!("flatastic_task_{}", self.id)
    }

    fn icon(&self) -> Option<&'static str> {
        Some("mdi:clipboard-check")
    }

    fn state(&self, snapshot: &Snapshot, now: i64) -> String {
        snapshot
            .task_by_id(&self.id)
            .map_or("Unknown".to_string(), |task| TaskStatus::of(task, now).to_string())
    }

    fn attributes(&self, snapshot: &Snapshot, now: i64) -> Attributes {
        let mut attributes = Attributes::new();
        let Some(task) = snapshot.task_by_id(&self.id) else {
            return attributes;
        };

        let next_person = snapshot
            .user_by_id(&task.current_user)
            .map_or("Unknown", |u| u.first_name.as_str());

        attributes.insert("title".into(), json!(task.title));
        attributes.insert("next_person".into(), json!(next_person));
        if let Some(due) = due_date(task) {
            attributes.insert("due_date".into(), json!(due.to_rfc3339()));
        }
        attributes.insert("overdue".into(), json!(is_overdue(task, now)));
        attributes.insert("periodicity_days".into(), json!(periodicity_days(task)));
        attributes.insert("points".into(), json!(task.points));
        attributes
    }
}

/// Household-wide list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericView {
    HighScores,
    RecentTasks(usize),
    TodoList,
    RecentCashflow(usize),
    ShoppingList,
    CashflowStatistics,
}

impl GenericView {
    pub fn all(recent_count: usize) -> [GenericView; 6] {
        [
            GenericView::HighScores,
            GenericView::RecentTasks(recent_count),
            GenericView::TodoList,
            GenericView::RecentCashflow(recent_count),
            GenericView::ShoppingList,
            GenericView::CashflowStatistics,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            GenericView::HighScores => "High Scores",
            GenericView::RecentTasks(_) => "Recent Tasks",
            GenericView::TodoList => "To-do List",
            GenericView::RecentCashflow(_) => "Recent Cashflow",
            GenericView::ShoppingList => "Shopping List",
            GenericView::CashflowStatistics => "Cashflow Statistics",
        }
    }

    fn data(&self, snapshot: &Snapshot) -> Value {
        match *self {
            GenericView::HighScores => json!(snapshot.high_scores()),
            GenericView::RecentTasks(count) => json!(snapshot.recent_tasks(count)),
            GenericView::TodoList => json!(snapshot.assigned_task_titles()),
            GenericView::RecentCashflow(count) => json!(snapshot.recent_cashflow(count)),
            GenericView::ShoppingList => match snapshot.shopping_list(false) {
                ShoppingList::Names(names) => json!(names),
                ShoppingList::Items(items) => json!(items),
            },
            GenericView::CashflowStatistics => Value::Object(
                snapshot
                    .cashflow_statistics()
                    .into_iter()
                    .map(|(name, balance)| (name.to_string(), json!({ "balance": balance })))
                    .collect(),
            ),
        }
    }
}

pub struct GenericSensor {
    view: GenericView,
}

impl GenericSensor {
    pub fn new(view: GenericView) -> Self {
        Self { view }
    }
}

impl Entity for GenericSensor {
    fn name(&self) -> String {
        format!("Flatastic {}", self.view.label())
    }

    fn unique_id(&self) -> String {
        format!(
            "flatastic_generic_{}",
            self.name().to_lowercase().replace(' ', "_")
        )
    }

    /// Item count for list views, `ok` otherwise.
    fn state(&self, snapshot: &Snapshot, _now: i64) -> String {
        match self.view.data(snapshot) {
            Value::Array(items) => items.len().to_string(),
            _ => "ok".to_string(),
        }
    }

    fn attributes(&self, snapshot: &Snapshot, _now: i64) -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("items".into(), self.view.data(snapshot));
        attributes
    }
}
