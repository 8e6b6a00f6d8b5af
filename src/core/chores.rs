//! Overdue detection and chore status

use super::model::{ON_DEMAND_ROTATION, Task};
use chrono::{DateTime, Utc};
use std::fmt::Display;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Epoch second the task falls due. `None` for on-demand tasks and for
/// timestamps too large to represent.
fn due_timestamp(task: &Task) -> Option<i64> {
    if task.rotation_time == ON_DEMAND_ROTATION {
        return None;
    }
    task.last_done_date.checked_add(task.rotation_time)
}

/// A task is overdue strictly after `last_done_date + rotation_time`.
/// On-demand tasks are never overdue.
pub fn is_overdue(task: &Task, now: i64) -> bool {
    due_timestamp(task).is_some_and(|due| now > due)
}

/// Number of overdue tasks currently assigned to `user_id`.
pub fn overdue_count(tasks: &[Task], user_id: &str, now: i64) -> usize {
    tasks
        .iter()
        .filter(|t| t.current_user == user_id && is_overdue(t, now))
        .count()
}

pub fn overdue_label(count: usize) -> String {
    match count {
        0 => "No overdue tasks".to_string(),
        1 => "1 overdue task".to_string(),
        n => format!("{n} overdue tasks"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    IfNeeded,
    Overdue,
    Upcoming,
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                TaskStatus::IfNeeded => "If needed",
                TaskStatus::Overdue => "Overdue",
                TaskStatus::Upcoming => "Upcoming",
            }
        )
    }
}

impl TaskStatus {
    pub fn of(task: &Task, now: i64) -> Self {
        if task.rotation_time == ON_DEMAND_ROTATION {
            TaskStatus::IfNeeded
        } else if is_overdue(task, now) {
            TaskStatus::Overdue
        } else {
            TaskStatus::Upcoming
        }
    }
}

/// When the task is due next; `None` for on-demand tasks.
pub fn due_date(task: &Task) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(due_timestamp(task)?, 0)
}

/// Rotation period in days, rounded to two decimals. Only defined for positive rotations.
pub fn periodicity_days(task: &Task) -> Option<f64> {
    (task.rotation_time > 0)
        .then(|| (task.rotation_time as f64 / SECONDS_PER_DAY * 100.0).round() / 100.0)
}
