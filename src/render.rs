//! Text rendering of the task forest.

use crate::models::{Task, TreeIndex};

/// Shown instead of the tree when there are no tasks.
pub const EMPTY_TREE: &str = "<tree is empty>";

/// One line per visible task, depth-first, children indented by
/// `indent_size` spaces per level.
pub fn render_lines(index: &TreeIndex, indent_size: usize) -> Vec<String> {
    index
        .visible()
        .into_iter()
        .map(|(depth, task)| format!("{}{}", " ".repeat(depth * indent_size), task_line(task)))
        .collect()
}

/// The whole forest as one string, or [`EMPTY_TREE`].
pub fn render_tree(index: &TreeIndex, indent_size: usize) -> String {
    if index.is_empty() {
        return EMPTY_TREE.to_string();
    }
    render_lines(index, indent_size).join("\n")
}

fn task_line(task: &Task) -> String {
    format!(
        "[{}][{}][ID: {}] {}",
        if task.is_collapsed { '+' } else { '-' },
        if task.is_checked { 'X' } else { ' ' },
        task.id,
        task.text
    )
}
