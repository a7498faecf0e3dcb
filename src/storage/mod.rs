//! Storage layer for tasktree data.
//!
//! Tasks live in a single SQLite table. Every write opens a pending
//! transaction lazily; nothing is durable until [`TaskStore::commit`], and
//! an uncommitted transaction is rolled back when the store is dropped.
//! Reads run on the same connection, so they observe pending writes.
//!
//! The store does not enforce tree invariants beyond the schema's foreign key:
//! cycle prevention and parent validation belong to the handlers. Deleting a
//! task removes its whole subtree through `ON DELETE CASCADE`.

use crate::models::{Task, TreeIndex};
use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::fs;
use std::path::Path;

const TASK_COLUMNS: &str = "id, text, is_checked, is_collapsed, parent_id, creation_date";

/// Predicates accepted by [`TaskStore::exists`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskFilter {
    /// A task with this ID
    Id(i64),
    /// Any child of this task
    ChildOf(i64),
    /// Any root task
    Root,
    /// Any task with this checked state
    Checked(bool),
}

impl TaskFilter {
    fn where_clause(&self) -> (&'static str, Option<i64>) {
        match self {
            TaskFilter::Id(id) => ("id = ?1", Some(*id)),
            TaskFilter::ChildOf(id) => ("parent_id = ?1", Some(*id)),
            TaskFilter::Root => ("parent_id IS NULL", None),
            TaskFilter::Checked(checked) => ("is_checked = ?1", Some(i64::from(*checked))),
        }
    }
}

/// Repository over persisted tasks.
#[derive(Debug)]
pub struct TaskStore {
    /// SQLite connection
    conn: Connection,
}

impl TaskStore {
    /// Open (or create) the task database at `db_path`.
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        Self::init_schema(&conn)?;
        tracing::debug!(path = %db_path.display(), "opened task store");

        Ok(Self { conn })
    }

    /// Open a throwaway in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Initialize the SQLite schema.
    fn init_schema(conn: &Connection) -> Result<()> {
        // Must be set outside of any transaction.
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                text TEXT NOT NULL CHECK (text <> ''),
                is_checked INTEGER NOT NULL DEFAULT 0,
                is_collapsed INTEGER NOT NULL DEFAULT 0,
                parent_id INTEGER REFERENCES tasks(id) ON DELETE CASCADE,
                creation_date TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_parent ON tasks(parent_id);
            CREATE INDEX IF NOT EXISTS idx_tasks_creation ON tasks(creation_date);
            "#,
        )?;

        Ok(())
    }

    /// Begin the pending transaction if none is open.
    fn begin(&self) -> Result<()> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN")?;
        }
        Ok(())
    }

    /// Run one write inside the pending transaction. A failed write that
    /// opened the transaction rolls it back, so errors never leave the
    /// database locked.
    fn stage<T>(&mut self, write: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let opened = self.conn.is_autocommit();
        self.begin()?;
        let result = write(&self.conn);
        if result.is_err() && opened {
            self.rollback()?;
        }
        result
    }

    /// Whether there are uncommitted writes.
    pub fn has_pending_changes(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// Make all pending writes durable.
    pub fn commit(&mut self) -> Result<()> {
        if self.has_pending_changes() {
            self.conn.execute_batch("COMMIT")?;
            tracing::debug!("committed pending task changes");
        }
        Ok(())
    }

    /// Discard all pending writes.
    pub fn rollback(&mut self) -> Result<()> {
        if self.has_pending_changes() {
            self.conn.execute_batch("ROLLBACK")?;
            tracing::debug!("rolled back pending task changes");
        }
        Ok(())
    }

    // === Task Operations ===

    /// Insert a task and return its new ID.
    ///
    /// The `id` field of `task` is ignored.
    pub fn add(&mut self, task: &Task) -> Result<i64> {
        if task.text.is_empty() {
            return Err(Error::InvalidInput("Task text cannot be empty".to_string()));
        }

        let id = self.stage(|conn| {
            conn.execute(
                r#"
                INSERT INTO tasks (text, is_checked, is_collapsed, parent_id, creation_date)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
                params![
                    task.text,
                    task.is_checked,
                    task.is_collapsed,
                    task.parent_id,
                    // Fixed-width UTC timestamps sort correctly as text.
                    task.creation_date.to_rfc3339_opts(SecondsFormat::Nanos, true),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })?;

        tracing::debug!(id, parent = ?task.parent_id, "staged new task");
        Ok(id)
    }

    /// Stage new field values for an existing task.
    pub fn update(&mut self, task: &Task) -> Result<()> {
        if task.text.is_empty() {
            return Err(Error::InvalidInput("Task text cannot be empty".to_string()));
        }

        self.stage(|conn| {
            let changed = conn.execute(
                r#"
                UPDATE tasks
                SET text = ?2, is_checked = ?3, is_collapsed = ?4, parent_id = ?5
                WHERE id = ?1
                "#,
                params![
                    task.id,
                    task.text,
                    task.is_checked,
                    task.is_collapsed,
                    task.parent_id,
                ],
            )?;

            if changed == 0 {
                return Err(not_found(task.id));
            }
            Ok(())
        })
    }

    /// Delete a task and, by cascade, its entire subtree.
    pub fn delete(&mut self, id: i64) -> Result<()> {
        self.stage(|conn| {
            let changed = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
            if changed == 0 {
                return Err(not_found(id));
            }
            Ok(())
        })?;
        tracing::debug!(id, "staged task deletion");
        Ok(())
    }

    /// Get a task by ID.
    pub fn get_by_id(&self, id: i64) -> Result<Task> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM tasks WHERE id = ?1", TASK_COLUMNS),
                [id],
                task_from_row,
            )
            .optional()?
            .ok_or_else(|| not_found(id))
    }

    /// Root tasks ordered by creation date, then ID.
    pub fn get_roots(&self) -> Result<Vec<Task>> {
        self.query_tasks("WHERE parent_id IS NULL", params![])
    }

    /// Direct children of a task ordered by creation date, then ID.
    pub fn children_of(&self, id: i64) -> Result<Vec<Task>> {
        self.query_tasks("WHERE parent_id = ?1", params![id])
    }

    /// Every task ordered by creation date, then ID.
    pub fn all(&self) -> Result<Vec<Task>> {
        self.query_tasks("", params![])
    }

    /// Check whether any task matches the filter.
    pub fn exists(&self, filter: TaskFilter) -> Result<bool> {
        let (clause, value) = filter.where_clause();
        let sql = format!("SELECT EXISTS(SELECT 1 FROM tasks WHERE {})", clause);
        let exists = match value {
            Some(value) => self.conn.query_row(&sql, [value], |row| row.get(0))?,
            None => self.conn.query_row(&sql, [], |row| row.get(0))?,
        };
        Ok(exists)
    }

    /// Number of stored tasks.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Snapshot the whole forest as an adjacency index.
    pub fn load_index(&self) -> Result<TreeIndex> {
        Ok(TreeIndex::from_tasks(self.all()?))
    }

    fn query_tasks(&self, filter: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Task>> {
        let sql = format!(
            "SELECT {} FROM tasks {} ORDER BY creation_date ASC, id ASC",
            TASK_COLUMNS, filter
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let tasks = stmt
            .query_map(params, task_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tasks)
    }
}

fn not_found(id: i64) -> Error {
    Error::NotFound(format!("Task not found: {}", id))
}

fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let creation_date: String = row.get(5)?;
    let creation_date = DateTime::parse_from_rfc3339(&creation_date)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?;

    Ok(Task {
        id: row.get(0)?,
        text: row.get(1)?,
        is_checked: row.get(2)?,
        is_collapsed: row.get(3)?,
        parent_id: row.get(4)?,
        creation_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestEnv;

    fn add(store: &mut TaskStore, text: &str, parent: Option<i64>) -> i64 {
        store.add(&Task::new(text, parent)).unwrap()
    }

    #[test]
    fn test_open_creates_database() {
        let env = TestEnv::new();
        let _store = env.open_store();
        assert!(env.db_path().exists());
    }

    #[test]
    fn test_open_creates_missing_directories() {
        let env = TestEnv::new();
        let path = env.data_path().join("nested").join("dir").join("tasks.db");
        TaskStore::open(&path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_add_assigns_sequential_ids() {
        let mut store = TaskStore::open_in_memory().unwrap();
        assert_eq!(add(&mut store, "A", None), 1);
        assert_eq!(add(&mut store, "B", Some(1)), 2);
        store.commit().unwrap();

        let b = store.get_by_id(2).unwrap();
        assert_eq!(b.text, "B");
        assert_eq!(b.parent_id, Some(1));
        assert!(!b.is_checked);
    }

    #[test]
    fn test_ids_are_not_reused_after_delete() {
        let mut store = TaskStore::open_in_memory().unwrap();
        add(&mut store, "A", None);
        add(&mut store, "B", None);
        store.delete(2).unwrap();
        store.commit().unwrap();
        assert_eq!(add(&mut store, "C", None), 3);
    }

    #[test]
    fn test_add_rejects_empty_text() {
        let mut store = TaskStore::open_in_memory().unwrap();
        let result = store.add(&Task::new("", None));
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_get_missing_task() {
        let store = TaskStore::open_in_memory().unwrap();
        assert!(matches!(store.get_by_id(42), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_roots_in_creation_order() {
        let mut store = TaskStore::open_in_memory().unwrap();
        add(&mut store, "first", None);
        add(&mut store, "child", Some(1));
        add(&mut store, "second", None);
        store.commit().unwrap();

        let roots: Vec<i64> = store.get_roots().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(roots, vec![1, 3]);

        let children: Vec<i64> = store.children_of(1).unwrap().iter().map(|t| t.id).collect();
        assert_eq!(children, vec![2]);
    }

    #[test]
    fn test_update_fields() {
        let mut store = TaskStore::open_in_memory().unwrap();
        add(&mut store, "A", None);
        add(&mut store, "B", None);

        let mut task = store.get_by_id(2).unwrap();
        task.text = "B2".to_string();
        task.is_checked = true;
        task.is_collapsed = true;
        task.parent_id = Some(1);
        store.update(&task).unwrap();
        store.commit().unwrap();

        let task = store.get_by_id(2).unwrap();
        assert_eq!(task.text, "B2");
        assert!(task.is_checked);
        assert!(task.is_collapsed);
        assert_eq!(task.parent_id, Some(1));
    }

    #[test]
    fn test_update_missing_task() {
        let mut store = TaskStore::open_in_memory().unwrap();
        let mut task = Task::new("ghost", None);
        task.id = 7;
        assert!(matches!(store.update(&task), Err(Error::NotFound(_))));
        assert!(!store.has_pending_changes());
    }

    #[test]
    fn test_delete_cascades_to_descendants() {
        let mut store = TaskStore::open_in_memory().unwrap();
        add(&mut store, "A", None);
        add(&mut store, "B", Some(1));
        add(&mut store, "C", Some(2));
        add(&mut store, "D", None);
        store.commit().unwrap();

        store.delete(1).unwrap();
        store.commit().unwrap();

        assert!(!store.exists(TaskFilter::Id(1)).unwrap());
        assert!(!store.exists(TaskFilter::Id(2)).unwrap());
        assert!(!store.exists(TaskFilter::Id(3)).unwrap());
        let roots: Vec<i64> = store.get_roots().unwrap().iter().map(|t| t.id).collect();
        assert_eq!(roots, vec![4]);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_delete_missing_task() {
        let mut store = TaskStore::open_in_memory().unwrap();
        assert!(matches!(store.delete(5), Err(Error::NotFound(_))));
        assert!(!store.has_pending_changes());
    }

    #[test]
    fn test_failed_write_releases_the_database() {
        let env = TestEnv::new();
        let mut store = env.open_store();
        add(&mut store, "A", None);
        store.commit().unwrap();

        assert!(store.delete(999).is_err());

        let mut other = env.open_store();
        add(&mut other, "B", None);
        other.commit().unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_failed_write_keeps_earlier_pending_changes() {
        let mut store = TaskStore::open_in_memory().unwrap();
        add(&mut store, "A", None);

        assert!(store.delete(999).is_err());
        assert!(store.has_pending_changes());
        store.commit().unwrap();
        assert!(store.exists(TaskFilter::Id(1)).unwrap());
    }

    #[test]
    fn test_foreign_key_rejects_missing_parent() {
        let mut store = TaskStore::open_in_memory().unwrap();
        let result = store.add(&Task::new("orphan", Some(99)));
        assert!(matches!(result, Err(Error::Database(_))));
        assert!(!store.has_pending_changes());
    }

    #[test]
    fn test_exists_filters() {
        let mut store = TaskStore::open_in_memory().unwrap();
        assert!(!store.exists(TaskFilter::Root).unwrap());

        add(&mut store, "A", None);
        add(&mut store, "B", Some(1));
        store.commit().unwrap();

        assert!(store.exists(TaskFilter::Id(2)).unwrap());
        assert!(store.exists(TaskFilter::ChildOf(1)).unwrap());
        assert!(!store.exists(TaskFilter::ChildOf(2)).unwrap());
        assert!(store.exists(TaskFilter::Root).unwrap());
        assert!(!store.exists(TaskFilter::Checked(true)).unwrap());
    }

    #[test]
    fn test_uncommitted_changes_are_visible_but_not_durable() {
        let env = TestEnv::new();
        {
            let mut store = env.open_store();
            add(&mut store, "kept", None);
            store.commit().unwrap();

            add(&mut store, "dropped", None);
            assert!(store.has_pending_changes());
            assert_eq!(store.count().unwrap(), 2);
        }

        let store = env.open_store();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get_by_id(1).unwrap().text, "kept");
    }

    #[test]
    fn test_rollback_discards_pending_changes() {
        let mut store = TaskStore::open_in_memory().unwrap();
        add(&mut store, "A", None);
        store.commit().unwrap();

        store.delete(1).unwrap();
        store.rollback().unwrap();
        assert!(store.exists(TaskFilter::Id(1)).unwrap());
        assert!(!store.has_pending_changes());
    }

    #[test]
    fn test_creation_date_round_trip() {
        let mut store = TaskStore::open_in_memory().unwrap();
        let task = Task::new("dated", None);
        let id = store.add(&task).unwrap();
        store.commit().unwrap();

        assert_eq!(store.get_by_id(id).unwrap().creation_date, task.creation_date);
    }

    #[test]
    fn test_load_index() {
        let mut store = TaskStore::open_in_memory().unwrap();
        add(&mut store, "A", None);
        add(&mut store, "B", Some(1));
        add(&mut store, "C", Some(2));
        store.commit().unwrap();

        let index = store.load_index().unwrap();
        assert_eq!(index.roots(), &[1]);
        assert!(index.subtree_contains(1, 3));
    }
}
