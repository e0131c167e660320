//! # recur - recurring task reset engine
//!
//! Given a list of tasks and the current instant, [`evaluate`] clears the
//! `completed` flag of every task whose recurrence rule has entered a new period
//! since the task was last completed. It never adds, removes or reorders tasks
//! and never touches `lastCompletedAt`.
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use recur::{evaluate, Recurrence, Task};
//!
//! let mut task = Task::new("1", "Take out the bins").with_schedule(Recurrence::from_kind("weekly_thursday"));
//! task.set_completed(true, Utc.with_ymd_and_hms(2024, 3, 7, 7, 0, 0).unwrap());
//!
//! // Friday: the Thursday occurrence has passed.
//! let now = Utc.with_ymd_and_hms(2024, 3, 8, 12, 0, 0).unwrap();
//! assert!(!evaluate(&[task], &now)[0].completed);
//! ```
//!
//! Recurrence kinds form a fixed catalog ([`KIND_CATALOG`]); rules that don't match
//! it are kept verbatim and never reset.

pub mod calendar;
pub mod db;
pub mod error;
pub mod evaluator;
pub mod fields;
pub mod recurrence;
pub mod task;

pub use error::{Error, Result};
pub use evaluator::{evaluate, evaluate_now, needs_reset};
pub use recurrence::{should_reset, Recurrence, Schedule, WeeklyRule, KIND_CATALOG};
pub use task::{Task, TaskId};
