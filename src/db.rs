//! JSON file store for task lists.
//!
//! Accepts either `{ "tasks": [...] }` or a bare array, the latter being how the
//! mobile app's key-value export writes it. A file is saved in the shape it was
//! loaded in. Records are decoded one at a time; a record that is not a usable
//! task is kept as raw JSON in its original position and written back as-is.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::task::Task;

/// Top-level shape of a task file.
#[derive(Debug, Clone, PartialEq)]
enum Layout {
    /// `{ "tasks": [...] }`, with any sibling keys kept.
    Wrapped(Map<String, Value>),
    /// `[...]`.
    Bare,
}

impl Default for Layout {
    fn default() -> Self {
        Layout::Wrapped(Map::new())
    }
}

/// In-memory copy of a task file.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Database {
    pub tasks: Vec<Task>,
    layout: Layout,
    /// Undecodable records and the index they had in the file.
    passthrough: Vec<(usize, Value)>,
}

impl Database {
    pub fn new(tasks: Vec<Task>) -> Self {
        Database {
            tasks,
            ..Default::default()
        }
    }

    /// Load tasks from `path`. A missing file is an empty list.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no task file at {}, starting empty", path.display());
            return Ok(Database::default());
        }
        let buf = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let root: Value = serde_json::from_str(&buf).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        let format_err = |reason: &str| Error::Format {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };
        let (records, layout) = match root {
            Value::Array(records) => (records, Layout::Bare),
            Value::Object(mut map) => match map.remove("tasks") {
                Some(Value::Array(records)) => (records, Layout::Wrapped(map)),
                None | Some(Value::Null) => (Vec::new(), Layout::Wrapped(map)),
                Some(_) => return Err(format_err("\"tasks\" is not an array")),
            },
            _ => return Err(format_err("expected an array of tasks or an object with \"tasks\"")),
        };

        let mut db = Database {
            tasks: Vec::with_capacity(records.len()),
            layout,
            passthrough: Vec::new(),
        };
        for (index, record) in records.into_iter().enumerate() {
            match serde_json::from_value::<Task>(record.clone()) {
                Ok(task) => db.tasks.push(task),
                Err(e) => {
                    warn!("keeping record {index} of {} unchanged, not a task: {e}", path.display());
                    db.passthrough.push((index, record));
                }
            }
        }
        debug!(
            "loaded {} tasks ({} kept raw) from {}",
            db.tasks.len(),
            db.passthrough.len(),
            path.display()
        );
        Ok(db)
    }

    /// Save to `path` via a temp file and rename.
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_err = |source| Error::Io {
            path: path.to_path_buf(),
            source,
        };
        let json_err = |source| Error::Json {
            path: path.to_path_buf(),
            source,
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(io_err)?;
        }
        let records = Value::Array(self.records().map_err(json_err)?);
        let root = match &self.layout {
            Layout::Bare => records,
            Layout::Wrapped(siblings) => {
                let mut map = siblings.clone();
                map.insert("tasks".to_string(), records);
                Value::Object(map)
            }
        };
        let data = serde_json::to_string_pretty(&root).map_err(json_err)?;
        let tmp = path.with_extension("json.tmp");
        let mut f = File::create(&tmp).map_err(io_err)?;
        f.write_all(data.as_bytes()).map_err(io_err)?;
        f.flush().map_err(io_err)?;
        fs::rename(&tmp, path).map_err(io_err)?;
        debug!("saved {} tasks to {}", self.tasks.len(), path.display());
        Ok(())
    }

    /// Tasks and raw records merged back into file order.
    fn records(&self) -> serde_json::Result<Vec<Value>> {
        let mut out = Vec::with_capacity(self.tasks.len() + self.passthrough.len());
        let mut tasks = self.tasks.iter();
        let mut kept = self.passthrough.iter().peekable();
        loop {
            if let Some((_, raw)) = kept.next_if(|(index, _)| *index <= out.len()) {
                out.push(raw.clone());
                continue;
            }
            match tasks.next() {
                Some(task) => out.push(serde_json::to_value(task)?),
                None => {
                    out.extend(kept.map(|(_, raw)| raw.clone()));
                    return Ok(out);
                }
            }
        }
    }

    /// Replace the task list, returning whether anything changed.
    pub fn replace_tasks(&mut self, tasks: Vec<Task>) -> bool {
        if tasks == self.tasks {
            return false;
        }
        self.tasks = tasks;
        true
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == *id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::evaluate;
    use crate::recurrence::Recurrence;
    use chrono::{DateTime, Utc};
    use serde_json::json;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::load(&dir.path().join("absent.json")).unwrap();
        assert!(db.tasks.is_empty());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("tasks.json");
        let db = Database::new(vec![
            Task::new("1", "Laundry").with_schedule(Recurrence::from_kind("weekends")),
        ]);
        db.save(&path).unwrap();
        assert!(!path.with_extension("json.tmp").exists());
        assert!(read_json(&path)["tasks"].is_array());
        assert_eq!(Database::load(&path).unwrap(), db);
    }

    #[test]
    fn test_load_bare_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, r#"[{"id": 7, "title": "Rent", "schedule": {"kind": "monthly", "dayOfMonth": 1}}]"#).unwrap();
        let db = Database::load(&path).unwrap();
        assert_eq!(db.get("7").map(|t| t.title.as_str()), Some("Rent"));
    }

    #[test]
    fn test_reset_keeps_app_file_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let schedule = json!({ "kind": "daily", "time": "08:00", "label": "Every day" });
        let original = json!([
            {
                "id": 1,
                "title": "Meds",
                "completed": true,
                "lastCompletedAt": "2024-03-07T08:00:00Z",
                "schedule": schedule
            },
            {
                "id": 2,
                "title": "Plants",
                "completed": true,
                "lastCompletedAt": "2024-03-08T08:00:00Z",
                "schedule": { "kind": "weekly_sunday", "color": "green" }
            }
        ]);
        fs::write(&path, original.to_string()).unwrap();

        let mut db = Database::load(&path).unwrap();
        let updated = evaluate(&db.tasks, &at("2024-03-08T12:00:00Z"));
        assert!(db.replace_tasks(updated));
        db.save(&path).unwrap();

        let saved = read_json(&path);
        let records = saved.as_array().expect("top level stays an array");
        assert_eq!(records[0]["completed"], json!(false));
        assert_eq!(records[0]["id"], json!(1));
        assert_eq!(records[0]["schedule"], schedule);
        assert_eq!(records[1]["schedule"], original[1]["schedule"]);
    }

    #[test]
    fn test_wrapped_siblings_survive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, r#"{"version": 3, "tasks": [{"id": "a"}]}"#).unwrap();
        Database::load(&path).unwrap().save(&path).unwrap();
        let saved = read_json(&path);
        assert_eq!(saved["version"], json!(3));
        assert_eq!(saved["tasks"][0]["id"], json!("a"));
    }

    #[test]
    fn test_bad_record_does_not_block_others() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        let bad = json!({ "id": 2, "completed": null });
        let no_id = json!({ "title": "orphan" });
        let original = json!([
            {
                "id": 1,
                "completed": true,
                "lastCompletedAt": "2024-03-07T08:00:00Z",
                "schedule": { "kind": "daily" }
            },
            bad,
            { "id": 3.5, "title": "float id" },
            no_id
        ]);
        fs::write(&path, original.to_string()).unwrap();

        let mut db = Database::load(&path).unwrap();
        assert_eq!(db.tasks.len(), 2);
        assert!(db.get("3.5").is_some());

        let updated = evaluate(&db.tasks, &at("2024-03-08T12:00:00Z"));
        assert!(db.replace_tasks(updated));
        db.save(&path).unwrap();

        let saved = read_json(&path);
        assert_eq!(saved[0]["completed"], json!(false));
        assert_eq!(saved[1], bad);
        assert_eq!(saved[2]["id"], json!(3.5));
        assert_eq!(saved[3], no_id);
    }

    #[test]
    fn test_load_garbage_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(Database::load(&path), Err(Error::Json { .. })));

        fs::write(&path, r#"{"tasks": 5}"#).unwrap();
        assert!(matches!(Database::load(&path), Err(Error::Format { .. })));
        fs::write(&path, "42").unwrap();
        assert!(matches!(Database::load(&path), Err(Error::Format { .. })));
    }

    #[test]
    fn test_replace_tasks_reports_changes() {
        let mut db = Database::new(vec![Task::new("1", "a")]);
        assert!(!db.replace_tasks(db.tasks.clone()));
        let mut changed = db.tasks.clone();
        changed[0].completed = true;
        assert!(db.replace_tasks(changed));
        assert!(db.get("1").is_some_and(|t| t.completed));
    }
}
