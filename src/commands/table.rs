//! The default command table.

use super::Action;
use crate::Result;
use crate::grammar::{Arg, ArgType, Command, CommandTable, ContextNeed};

fn ids_arg(help: &str) -> Result<Arg> {
    Ok(Arg::new("ids", ArgType::sequence_of(ArgType::unsigned_int()))?.with_help(help))
}

fn id_arg(help: &str) -> Result<Arg> {
    Ok(Arg::new("id", ArgType::unsigned_int())?.with_help(help))
}

fn parent_arg(help: &str) -> Result<Arg> {
    Ok(Arg::new("parent", ArgType::unsigned_optional_int())?.with_help(help))
}

fn text_arg(help: &str) -> Result<Arg> {
    Ok(Arg::new("text", ArgType::string())?.with_help(help))
}

/// Build the command table used by the `tt` REPL.
///
/// `help` and `help <names>` share their aliases, so the zero-argument form
/// is listed first.
pub fn default_table() -> Result<CommandTable<Action>> {
    CommandTable::new(vec![
        Command::new(
            &["autoshow", "autoshowing"],
            "turns showing the tree after every change on or off",
            Action::AutoShow,
        )
        .arg(Arg::new("state", ArgType::boolean())?.with_help("the new state")),
        Command::new(
            &["help", "commands", "?"],
            "describes every command",
            Action::HelpAll,
        )
        .needs(ContextNeed::CommandTable),
        Command::new(
            &["help", "commands", "?"],
            "describes the given commands",
            Action::HelpSome,
        )
        .arg(
            Arg::new("names", ArgType::sequence_of(ArgType::string()))?
                .with_help("names or aliases of the commands"),
        )
        .needs(ContextNeed::CommandTable),
        Command::new(&["add", "+"], "adds a task", Action::Add)
            .arg(parent_arg("ID of the parent task, or - for a root task")?)
            .arg(text_arg("what the task is about")?),
        Command::new(&["tree", "show", "ls"], "shows the task tree", Action::Tree),
        Command::new(
            &["delete", "del", "remove", "rm", "-"],
            "deletes tasks together with their subtasks",
            Action::Delete,
        )
        .arg(ids_arg("IDs of the tasks to delete")?),
        Command::new(
            &["check", "mark", "complete", "done", "x"],
            "checks tasks together with their subtasks",
            Action::Check,
        )
        .arg(ids_arg("IDs of the tasks to check")?),
        Command::new(
            &["uncheck", "unmark"],
            "unchecks tasks together with their subtasks",
            Action::Uncheck,
        )
        .arg(ids_arg("IDs of the tasks to uncheck")?),
        Command::new(
            &["collapse", "fold"],
            "hides the subtasks of tasks",
            Action::Collapse,
        )
        .arg(ids_arg("IDs of the tasks to collapse")?),
        Command::new(
            &["expand", "unfold"],
            "shows the subtasks of tasks again",
            Action::Expand,
        )
        .arg(ids_arg("IDs of the tasks to expand")?),
        Command::new(&["edit", "change"], "replaces the text of a task", Action::Edit)
            .arg(id_arg("ID of the task to edit")?)
            .arg(text_arg("the new text")?),
        Command::new(
            &["move", "adopt"],
            "gives tasks a new parent",
            Action::Move,
        )
        .arg(parent_arg("ID of the new parent, or - to make the tasks roots")?)
        .arg(ids_arg("IDs of the tasks to move")?),
        Command::new(
            &["date", "time"],
            "shows when a task was created",
            Action::Date,
        )
        .arg(id_arg("ID of the task")?),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{ArgValue, Dispatcher};

    fn dispatch(line: &str) -> Option<(Action, Vec<ArgValue>)> {
        let table = default_table().unwrap();
        Dispatcher::new(&table)
            .dispatch(line)
            .ok()
            .map(|d| (*d.command.action(), d.args.as_slice().to_vec()))
    }

    #[test]
    fn test_every_alias_dispatches() {
        let table = default_table().unwrap();
        let dispatcher = Dispatcher::new(&table);
        for command in &table {
            let sample: Vec<&str> = command
                .args()
                .iter()
                .map(|arg| match arg.name() {
                    "state" => "on",
                    "parent" => "-",
                    "names" => "add",
                    "text" => "some text",
                    _ => "1",
                })
                .collect();
            for alias in command.aliases() {
                let line = std::iter::once(alias.as_str())
                    .chain(sample.iter().copied())
                    .collect::<Vec<_>>()
                    .join(" ");
                let dispatch = dispatcher.dispatch(&line).unwrap();
                assert_eq!(
                    dispatch.command.action(),
                    command.action(),
                    "line {:?}",
                    line
                );
            }
        }
    }

    #[test]
    fn test_minus_alias_deletes() {
        assert_eq!(
            dispatch("- 3,4"),
            Some((
                Action::Delete,
                vec![ArgValue::Sequence(vec![ArgValue::Int(3), ArgValue::Int(4)])]
            ))
        );
    }

    #[test]
    fn test_help_forms() {
        assert_eq!(dispatch("help"), Some((Action::HelpAll, vec![])));
        assert_eq!(
            dispatch("? move"),
            Some((
                Action::HelpSome,
                vec![ArgValue::Sequence(vec![ArgValue::String("move".to_string())])]
            ))
        );
    }

    #[test]
    fn test_negative_ids_are_rejected() {
        assert_eq!(dispatch("check -1"), None);
        assert_eq!(dispatch("add -5 text"), None);
    }

    #[test]
    fn test_help_commands_need_table() {
        let table = default_table().unwrap();
        for command in &table {
            let needs_table = command.context_needs().contains(&ContextNeed::CommandTable);
            assert_eq!(
                needs_table,
                matches!(command.action(), Action::HelpAll | Action::HelpSome)
            );
        }
    }
}
