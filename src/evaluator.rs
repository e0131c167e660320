//! The reset pass over a task list.

use chrono::{DateTime, Local, TimeZone};
use tracing::debug;

use crate::recurrence::should_reset;
use crate::task::Task;

/// Whether `task` should have its completed flag cleared at `now`.
///
/// Only completed tasks with a completion stamp and an active schedule qualify.
pub fn needs_reset<Tz: TimeZone>(task: &Task, now: &DateTime<Tz>) -> bool {
    if !task.completed {
        return false;
    }
    let (Some(rule), Some(last)) = (task.rule(), task.last_completed_at.as_ref()) else {
        return false;
    };
    rule.is_active() && should_reset(rule, last, now)
}

/// Clear `completed` on every task whose schedule has started a new period.
///
/// Returns a new list of the same length and order; only `completed` ever changes.
/// Calendar-aligned rules are read in the time zone of `now`.
pub fn evaluate<Tz: TimeZone>(tasks: &[Task], now: &DateTime<Tz>) -> Vec<Task> {
    tasks
        .iter()
        .map(|task| {
            if !needs_reset(task, now) {
                return task.clone();
            }
            debug!(
                id = %task.id,
                kind = %task.rule().map(|r| r.kind_name()).unwrap_or_default(),
                "new period started, clearing completion"
            );
            Task {
                completed: false,
                ..task.clone()
            }
        })
        .collect()
}

/// [`evaluate`] against the local wall clock.
pub fn evaluate_now(tasks: &[Task]) -> Vec<Task> {
    evaluate(tasks, &Local::now())
}
