//! Adjacency index over the task forest.
//!
//! Tree walks (cycle detection, checked-state propagation, rendering) run over a
//! [`TreeIndex`] snapshot built once per operation instead of issuing one query
//! per visited node. All traversals use an explicit stack, so deep trees cannot
//! overflow the call stack.

use super::Task;
use std::collections::HashMap;

/// Snapshot of every task plus parent → children adjacency.
///
/// Roots and children lists keep the store order: creation date ascending,
/// ties broken by id.
#[derive(Debug, Clone, Default)]
pub struct TreeIndex {
    /// Every task keyed by id
    tasks: HashMap<i64, Task>,

    /// Children of each task, in display order
    children: HashMap<i64, Vec<i64>>,

    /// Root task ids, in display order
    roots: Vec<i64>,
}

impl TreeIndex {
    /// Build the index from tasks already sorted in display order.
    ///
    /// Tasks whose parent is not part of the snapshot are treated as roots so
    /// that nothing silently disappears from a walk.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut index = Self::default();
        let order: Vec<(i64, Option<i64>)> = tasks.iter().map(|t| (t.id, t.parent_id)).collect();

        for task in tasks {
            index.tasks.insert(task.id, task);
        }

        for (id, parent_id) in order {
            match parent_id {
                Some(parent) if index.tasks.contains_key(&parent) => {
                    index.children.entry(parent).or_default().push(id);
                }
                _ => index.roots.push(id),
            }
        }

        index
    }

    /// Get a task by ID.
    pub fn get(&self, id: i64) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Get a mutable task by ID.
    ///
    /// Changing `parent_id` through this reference does not update the
    /// adjacency; use [`TreeIndex::reparent`] for that.
    pub fn get_mut(&mut self, id: i64) -> Option<&mut Task> {
        self.tasks.get_mut(&id)
    }

    /// Check whether a task is part of the snapshot.
    pub fn contains(&self, id: i64) -> bool {
        self.tasks.contains_key(&id)
    }

    /// Number of tasks in the snapshot.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Root task IDs in display order.
    pub fn roots(&self) -> &[i64] {
        &self.roots
    }

    /// Direct children of a task in display order.
    pub fn children(&self, id: i64) -> &[i64] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All transitive descendants of a task in pre-order, excluding the task.
    pub fn descendants(&self, id: i64) -> Vec<i64> {
        let mut result = Vec::new();
        let mut stack: Vec<i64> = self.children(id).iter().rev().copied().collect();

        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }

        result
    }

    /// Check whether `target` lies inside the subtree rooted at `root`
    /// (the root itself excluded).
    pub fn subtree_contains(&self, root: i64, target: i64) -> bool {
        let mut stack: Vec<i64> = self.children(root).to_vec();

        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            stack.extend_from_slice(self.children(current));
        }

        false
    }

    /// Move a task under a new parent (or to the roots), keeping both the
    /// stored `parent_id` and the adjacency in sync.
    ///
    /// The caller is responsible for rejecting moves that would form a cycle.
    pub fn reparent(&mut self, id: i64, new_parent: Option<i64>) {
        let Some(task) = self.tasks.get_mut(&id) else {
            return;
        };
        let old_parent = task.parent_id;
        task.parent_id = new_parent;

        match old_parent {
            Some(parent) if self.tasks.contains_key(&parent) => {
                if let Some(siblings) = self.children.get_mut(&parent) {
                    siblings.retain(|&child| child != id);
                }
            }
            _ => self.roots.retain(|&root| root != id),
        }

        let Some(key) = self.order_key(id) else {
            return;
        };
        let siblings = match new_parent {
            Some(parent) if self.tasks.contains_key(&parent) => {
                self.children.entry(parent).or_default()
            }
            _ => &mut self.roots,
        };
        let position = siblings
            .iter()
            .position(|&sibling| {
                self.tasks
                    .get(&sibling)
                    .map(|t| (t.creation_date, t.id))
                    .is_some_and(|sibling_key| sibling_key > key)
            })
            .unwrap_or(siblings.len());
        siblings.insert(position, id);
    }

    /// Walk the forest depth-first, yielding `(depth, task)` for every task
    /// that is visible, i.e. not hidden below a collapsed ancestor.
    pub fn visible(&self) -> Vec<(usize, &Task)> {
        let mut result = Vec::new();
        let mut stack: Vec<(usize, i64)> = self.roots.iter().rev().map(|&id| (0, id)).collect();

        while let Some((depth, id)) = stack.pop() {
            let Some(task) = self.tasks.get(&id) else {
                continue;
            };
            result.push((depth, task));
            if !task.is_collapsed {
                stack.extend(self.children(id).iter().rev().map(|&child| (depth + 1, child)));
            }
        }

        result
    }

    fn order_key(&self, id: i64) -> Option<(chrono::DateTime<chrono::Utc>, i64)> {
        self.tasks.get(&id).map(|t| (t.creation_date, t.id))
    }
}
