//! Data models for tasktree entities.
//!
//! This module defines the core data structures:
//! - `Task` - A node in the task forest, optionally nested under a parent
//! - `TreeIndex` - An adjacency snapshot of the whole forest (see [`graph`])

pub mod graph;

pub use graph::TreeIndex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A task tracked by tasktree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, assigned by the store on insert (0 until then)
    pub id: i64,

    /// Display text, never empty
    pub text: String,

    /// Whether the task is done
    #[serde(default)]
    pub is_checked: bool,

    /// Whether the children are hidden when rendering
    #[serde(default)]
    pub is_collapsed: bool,

    /// Parent task ID, `None` for root tasks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<i64>,

    /// Creation timestamp
    pub creation_date: DateTime<Utc>,
}

impl Task {
    /// Create a new, not yet persisted task under the given parent.
    pub fn new(text: impl Into<String>, parent_id: Option<i64>) -> Self {
        Self {
            id: 0,
            text: text.into(),
            is_checked: false,
            is_collapsed: false,
            parent_id,
            creation_date: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_defaults() {
        let task = Task::new("Buy milk", None);
        assert_eq!(task.id, 0);
        assert_eq!(task.text, "Buy milk");
        assert!(!task.is_checked);
        assert!(!task.is_collapsed);
        assert_eq!(task.parent_id, None);
    }

    #[test]
    fn test_task_json_skips_missing_parent() {
        let task = Task::new("Root", None);
        let json = serde_json::to_string(&task).unwrap();
        assert!(!json.contains("parent_id"));

        let child = Task::new("Child", Some(3));
        let json = serde_json::to_string(&child).unwrap();
        assert!(json.contains("\"parent_id\":3"));
    }
}
