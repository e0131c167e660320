//! Task record as seen by the reset engine.
//!
//! Only the fields the engine reads are typed; everything else the application
//! stores on a task rides along in `extra` and is written back unchanged.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::recurrence::{Recurrence, Schedule};

/// Task identity, kept as the JSON number or string the app wrote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{n}"),
            TaskId::Text(s) => f.write_str(s),
        }
    }
}

impl PartialEq<str> for TaskId {
    fn eq(&self, other: &str) -> bool {
        match self {
            TaskId::Text(s) => s == other,
            TaskId::Number(n) => n.to_string() == other,
        }
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId::Text(s.to_string())
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        TaskId::Text(s)
    }
}

/// A persisted task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(
        default,
        deserialize_with = "lenient_instant",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, title: impl Into<String>) -> Self {
        Task {
            id: id.into(),
            title: title.into(),
            completed: false,
            last_completed_at: None,
            schedule: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn with_schedule(mut self, schedule: Recurrence) -> Self {
        self.schedule = Some(schedule.into());
        self
    }

    /// Set the completion flag the way a user toggle does.
    ///
    /// Becoming completed stamps `last_completed_at`; un-completing keeps the stamp.
    pub fn set_completed(&mut self, done: bool, now: DateTime<Utc>) {
        if done && !self.completed {
            self.last_completed_at = Some(now);
        }
        self.completed = done;
    }

    pub fn toggle_completed(&mut self, now: DateTime<Utc>) {
        self.set_completed(!self.completed, now);
    }

    /// Decoded rule, if the task has a schedule.
    pub fn rule(&self) -> Option<&Recurrence> {
        self.schedule.as_ref().map(Schedule::rule)
    }

    /// Whether the task's schedule can ever clear it.
    pub fn is_recurring(&self) -> bool {
        self.rule().is_some_and(Recurrence::is_active)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.completed { "x" } else { " " };
        write!(f, "[{mark}] {} {}", self.id, self.title)
    }
}

fn lenient_instant<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<Value>::deserialize(d)?;
    Ok(match raw {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => match DateTime::parse_from_rfc3339(&s) {
            Ok(at) => Some(at.with_timezone(&Utc)),
            Err(e) => {
                warn!("ignoring unparseable lastCompletedAt {s:?}: {e}");
                None
            }
        },
        Some(other) => {
            warn!("ignoring non-string lastCompletedAt {other}");
            None
        }
    })
}
