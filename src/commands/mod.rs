//! Command implementations for tasktree.
//!
//! This module contains the business logic behind each REPL command.
//! Commands are organized by concern:
//! - `table` - The default command table
//! - `tasks` - Tree mutations and lookups over the task store
//! - `help` - Command descriptions
//! - `settings` - Runtime settings changes
//! - `messages` - Batched, per-class result messages

pub mod help;
pub mod messages;
pub mod settings;
pub mod table;
pub mod tasks;

pub use table::default_table;

use crate::config::Settings;
use crate::grammar::{CommandTable, ContextNeed, Dispatch};
use crate::storage::TaskStore;
use crate::{Error, Result};
use serde::Serialize;
use std::path::Path;

/// The handler a command routes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AutoShow,
    HelpAll,
    HelpSome,
    Add,
    Tree,
    Delete,
    Check,
    Uncheck,
    Collapse,
    Expand,
    Edit,
    Move,
    Date,
}

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// What a handled line produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Message for the user
    pub message: String,
    /// Whether the tree changed and should be shown again
    pub render_tree: bool,
}

impl Outcome {
    /// A message that leaves the tree as it was.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            render_tree: false,
        }
    }

    /// A message following a change to the tree.
    pub fn changed(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            render_tree: true,
        }
    }
}

impl Output for Outcome {
    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn to_human(&self) -> String {
        self.message.clone()
    }
}

/// Everything besides the arguments a handler may touch.
#[derive(Debug)]
pub struct Context<'a> {
    pub store: &'a mut TaskStore,
    pub settings: &'a mut Settings,
    /// Where changed settings are written; `None` keeps them in memory
    pub settings_path: Option<&'a Path>,
}

/// Run the handler of a dispatched command.
pub fn execute(
    dispatch: &Dispatch<'_, Action>,
    table: &CommandTable<Action>,
    ctx: &mut Context<'_>,
) -> Result<Outcome> {
    let args = &dispatch.args;
    let needed_table = dispatch
        .command
        .context_needs()
        .contains(&ContextNeed::CommandTable)
        .then_some(table);

    match dispatch.command.action() {
        Action::AutoShow => {
            settings::auto_show(ctx.settings, ctx.settings_path, args.boolean(0)?)
        }
        Action::HelpAll => Ok(help::help_all(require_table(needed_table)?)),
        Action::HelpSome => Ok(help::help_some(
            require_table(needed_table)?,
            &args.strings(0)?,
        )),
        Action::Add => tasks::add(ctx.store, args.optional_int(0)?, args.string(1)?),
        Action::Tree => tasks::tree(ctx.store, ctx.settings.indent_size),
        Action::Delete => tasks::delete(ctx.store, &args.ints(0)?),
        Action::Check => tasks::set_checked(ctx.store, &args.ints(0)?, true),
        Action::Uncheck => tasks::set_checked(ctx.store, &args.ints(0)?, false),
        Action::Collapse => tasks::set_collapsed(ctx.store, &args.ints(0)?, true),
        Action::Expand => tasks::set_collapsed(ctx.store, &args.ints(0)?, false),
        Action::Edit => tasks::edit(ctx.store, args.int(0)?, args.string(1)?),
        Action::Move => tasks::move_tasks(ctx.store, args.optional_int(0)?, &args.ints(1)?),
        Action::Date => tasks::date(ctx.store, args.int(0)?),
    }
}

fn require_table<A>(table: Option<&CommandTable<A>>) -> Result<&CommandTable<A>> {
    table.ok_or_else(|| Error::Other("Command table was not provided".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Dispatcher;
    use crate::test_utils::TestEnv;

    fn run(env: &TestEnv, store: &mut TaskStore, settings: &mut Settings, line: &str) -> Outcome {
        let table = default_table().unwrap();
        let dispatch = Dispatcher::new(&table).dispatch(line).unwrap();
        let settings_path = env.settings_path();
        let mut ctx = Context {
            store,
            settings,
            settings_path: Some(&settings_path),
        };
        execute(&dispatch, &table, &mut ctx).unwrap()
    }

    #[test]
    fn test_outcome_output() {
        let outcome = Outcome::changed("Task 1 created.");
        assert_eq!(outcome.to_human(), "Task 1 created.");
        assert_eq!(
            outcome.to_json(),
            r#"{"message":"Task 1 created.","render_tree":true}"#
        );
    }

    #[test]
    fn test_execute_routes_to_handlers() {
        let env = TestEnv::new();
        let mut store = env.open_store();
        let mut settings = env.load_settings();

        let outcome = run(&env, &mut store, &mut settings, "add - Groceries");
        assert_eq!(outcome, Outcome::changed("Task 1 created."));

        let outcome = run(&env, &mut store, &mut settings, "+ 1 Buy milk");
        assert_eq!(outcome, Outcome::changed("Task 2 created."));

        let outcome = run(&env, &mut store, &mut settings, "x 1");
        assert!(outcome.render_tree);
        assert!(store.get_by_id(2).unwrap().is_checked);

        let outcome = run(&env, &mut store, &mut settings, "ls");
        assert_eq!(
            outcome.message,
            "[-][X][ID: 1] Groceries\n    [-][X][ID: 2] Buy milk"
        );
    }

    #[test]
    fn test_execute_persists_auto_show() {
        let env = TestEnv::new();
        let mut store = env.open_store();
        let mut settings = env.load_settings();

        let outcome = run(&env, &mut store, &mut settings, "autoshow off");
        assert!(!outcome.render_tree);
        assert!(!settings.auto_show);
        assert!(!env.load_settings().auto_show);
    }

    #[test]
    fn test_execute_help_uses_table() {
        let env = TestEnv::new();
        let mut store = env.open_store();
        let mut settings = env.load_settings();

        let outcome = run(&env, &mut store, &mut settings, "help");
        assert!(outcome.message.starts_with("Command 'autoshow'"));
        assert!(outcome.message.contains("Command 'date'"));
    }
}
