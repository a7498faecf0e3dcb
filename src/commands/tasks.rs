//! Tree mutations and lookups.
//!
//! Batch handlers sort every id into an outcome class and report one
//! sentence per non-empty class. A missing id never aborts the batch;
//! storage errors do.

use super::Outcome;
use super::messages::Report;
use crate::models::{Task, TreeIndex};
use crate::render::render_tree;
use crate::storage::{TaskFilter, TaskStore};
use crate::{Error, Result};
use chrono::Local;

/// Format of `date` output, in local time.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Create a task under `parent_id`, or as a root when it is `None`.
pub fn add(store: &mut TaskStore, parent_id: Option<i64>, text: &str) -> Result<Outcome> {
    if let Some(parent) = parent_id {
        if !store.exists(TaskFilter::Id(parent))? {
            return Ok(Outcome::message(format!(
                "Task {} does not exist, so the new task cannot be created.",
                parent
            )));
        }
    }

    let id = store.add(&Task::new(text, parent_id))?;
    store.commit()?;
    tracing::info!(id, parent = ?parent_id, "created task");

    Ok(Outcome::changed(format!("Task {} created.", id)))
}

/// Render the whole forest.
pub fn tree(store: &TaskStore, indent_size: usize) -> Result<Outcome> {
    let index = store.load_index()?;
    Ok(Outcome::message(render_tree(&index, indent_size)))
}

/// Delete tasks with their subtrees, committing after each one.
///
/// An id that was already removed as part of an earlier id's subtree is
/// reported as missing.
pub fn delete(store: &mut TaskStore, ids: &[i64]) -> Result<Outcome> {
    let mut missing = Vec::new();
    let mut deleted = Vec::new();

    for &id in ids {
        match store.delete(id) {
            Ok(()) => {
                store.commit()?;
                deleted.push(id);
            }
            Err(Error::NotFound(_)) => missing.push(id),
            Err(e) => return Err(e),
        }
    }
    tracing::debug!(?deleted, ?missing, "delete batch finished");

    let message = Report::new()
        .class(
            &missing,
            |id| format!("Task {} does not exist, so it cannot be deleted.", id),
            |ids| format!("Tasks {} do not exist, so they cannot be deleted.", ids),
        )
        .class(
            &deleted,
            |id| format!("Task {} deleted.", id),
            |ids| format!("Tasks {} deleted.", ids),
        )
        .finish();

    Ok(outcome(message, !deleted.is_empty()))
}

/// Check or uncheck tasks together with every descendant.
///
/// A task whose whole subtree already holds `checked` lands in the
/// "nothing changed" class.
pub fn set_checked(store: &mut TaskStore, ids: &[i64], checked: bool) -> Result<Outcome> {
    let mut index = store.load_index()?;
    let mut missing = Vec::new();
    let mut unchanged = Vec::new();
    let mut changed = Vec::new();

    for &id in ids {
        if !index.contains(id) {
            missing.push(id);
            continue;
        }

        let subtree: Vec<i64> = std::iter::once(id).chain(index.descendants(id)).collect();
        let stale: Vec<i64> = subtree
            .into_iter()
            .filter(|&node| index.get(node).is_some_and(|task| task.is_checked != checked))
            .collect();

        if stale.is_empty() {
            unchanged.push(id);
            continue;
        }

        for node in stale {
            if let Some(task) = index.get_mut(node) {
                task.is_checked = checked;
                store.update(task)?;
            }
        }
        store.commit()?;
        changed.push(id);
    }
    tracing::debug!(checked, ?changed, ?unchanged, ?missing, "check batch finished");

    let verb = if checked { "checked" } else { "unchecked" };
    let message = Report::new()
        .class(
            &missing,
            |id| format!("Task {} does not exist, so its state cannot be changed.", id),
            |ids| format!("Tasks {} do not exist, so their state cannot be changed.", ids),
        )
        .class(
            &unchanged,
            |id| format!("Nothing changed for task {}.", id),
            |ids| format!("Nothing changed for tasks {}.", ids),
        )
        .class(
            &changed,
            |id| format!("Task {} {}.", id, verb),
            |ids| format!("Tasks {} {}.", ids, verb),
        )
        .finish();

    Ok(outcome(message, !changed.is_empty()))
}

/// Collapse or expand tasks. Descendants keep their own flag.
pub fn set_collapsed(store: &mut TaskStore, ids: &[i64], collapsed: bool) -> Result<Outcome> {
    let mut missing = Vec::new();
    let mut changed = Vec::new();

    for &id in ids {
        let mut task = match store.get_by_id(id) {
            Ok(task) => task,
            Err(Error::NotFound(_)) => {
                missing.push(id);
                continue;
            }
            Err(e) => return Err(e),
        };
        task.is_collapsed = collapsed;
        store.update(&task)?;
        store.commit()?;
        changed.push(id);
    }

    let verb = if collapsed { "collapsed" } else { "expanded" };
    let message = Report::new()
        .class(
            &missing,
            |id| format!("Task {} does not exist, so it cannot be {}.", id, verb),
            |ids| format!("Tasks {} do not exist, so they cannot be {}.", ids, verb),
        )
        .class(
            &changed,
            |id| format!("Task {} {}.", id, verb),
            |ids| format!("Tasks {} {}.", ids, verb),
        )
        .finish();

    Ok(outcome(message, !changed.is_empty()))
}

/// Replace the text of a task.
pub fn edit(store: &mut TaskStore, id: i64, text: &str) -> Result<Outcome> {
    let mut task = match store.get_by_id(id) {
        Ok(task) => task,
        Err(Error::NotFound(_)) => {
            return Ok(Outcome::message(format!(
                "Task {} does not exist, so it cannot be edited.",
                id
            )));
        }
        Err(e) => return Err(e),
    };

    task.text = text.to_string();
    store.update(&task)?;
    store.commit()?;
    tracing::info!(id, "edited task");

    Ok(Outcome::changed(format!("Task {} edited.", id)))
}

/// Why a task could not be moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveRejection {
    NotFound,
    OwnParent,
    ParentNotFound,
    Cycle,
}

/// Check one move against the current forest, in order: the task exists,
/// it is not its own parent, the parent exists, and the parent is not inside
/// the task's subtree.
fn check_move(index: &TreeIndex, id: i64, parent_id: Option<i64>) -> Option<MoveRejection> {
    if !index.contains(id) {
        return Some(MoveRejection::NotFound);
    }
    let parent = parent_id?;
    if parent == id {
        Some(MoveRejection::OwnParent)
    } else if !index.contains(parent) {
        Some(MoveRejection::ParentNotFound)
    } else if index.subtree_contains(id, parent) {
        Some(MoveRejection::Cycle)
    } else {
        None
    }
}

/// Give tasks a new parent, or make them roots when `parent_id` is `None`.
///
/// Every task is decided against the forest as left by the earlier tasks of
/// the batch; the accepted moves are committed together at the end.
pub fn move_tasks(store: &mut TaskStore, parent_id: Option<i64>, ids: &[i64]) -> Result<Outcome> {
    let mut index = store.load_index()?;
    let mut not_found = Vec::new();
    let mut own_parent = Vec::new();
    let mut parent_not_found = Vec::new();
    let mut cycle = Vec::new();
    let mut moved = Vec::new();

    for &id in ids {
        match check_move(&index, id, parent_id) {
            Some(MoveRejection::NotFound) => not_found.push(id),
            Some(MoveRejection::OwnParent) => own_parent.push(id),
            Some(MoveRejection::ParentNotFound) => parent_not_found.push(id),
            Some(MoveRejection::Cycle) => cycle.push(id),
            None => {
                index.reparent(id, parent_id);
                if let Some(task) = index.get(id) {
                    store.update(task)?;
                }
                moved.push(id);
            }
        }
    }
    store.commit()?;
    tracing::debug!(parent = ?parent_id, ?moved, "move batch finished");

    let parent = parent_id.map(|p| p.to_string()).unwrap_or_default();
    let message = Report::new()
        .class(
            &not_found,
            |id| format!("Task {} does not exist, so it cannot be moved.", id),
            |ids| format!("Tasks {} do not exist, so they cannot be moved.", ids),
        )
        .class(
            &own_parent,
            |id| format!("Task {} cannot be its own parent.", id),
            |ids| format!("Tasks {} cannot be their own parents.", ids),
        )
        .class(
            &parent_not_found,
            |id| {
                format!(
                    "Task {} cannot be moved because parent task {} does not exist.",
                    id, parent
                )
            },
            |ids| {
                format!(
                    "Tasks {} cannot be moved because parent task {} does not exist.",
                    ids, parent
                )
            },
        )
        .class(
            &cycle,
            |id| {
                format!(
                    "Task {} contains task {} among its subtasks, so moving it there would create a cycle.",
                    id, parent
                )
            },
            |ids| {
                format!(
                    "Tasks {} contain task {} among their subtasks, so moving them there would create a cycle.",
                    ids, parent
                )
            },
        )
        .class(
            &moved,
            |id| format!("Task {} moved.", id),
            |ids| format!("Tasks {} moved.", ids),
        )
        .finish();

    Ok(outcome(message, !moved.is_empty()))
}

/// Show when a task was created, in local time.
pub fn date(store: &TaskStore, id: i64) -> Result<Outcome> {
    match store.get_by_id(id) {
        Ok(task) => Ok(Outcome::message(format!(
            "Task {} was created on {}.",
            id,
            task.creation_date.with_timezone(&Local).format(DATE_FORMAT)
        ))),
        Err(Error::NotFound(_)) => Ok(Outcome::message(format!(
            "Task {} does not exist, so its creation date is unknown.",
            id
        ))),
        Err(e) => Err(e),
    }
}

fn outcome(message: String, render_tree: bool) -> Outcome {
    Outcome {
        message,
        render_tree,
    }
}
