//! Help over the command table.

use super::Outcome;
use crate::grammar::CommandTable;

/// Shown when `help <names>` matched nothing.
pub const NO_SUCH_COMMANDS: &str = "None of the given commands exist.";

/// Describe every command in table order.
pub fn help_all<A>(table: &CommandTable<A>) -> Outcome {
    let descriptions: Vec<String> = table.iter().map(|command| command.describe(false)).collect();
    Outcome::message(descriptions.join("\n\n"))
}

/// Describe the commands answering to any of `names`, in the order the names
/// were given. A name shared by several commands describes all of them.
pub fn help_some<A>(table: &CommandTable<A>, names: &[String]) -> Outcome {
    let descriptions: Vec<String> = names
        .iter()
        .flat_map(|name| table.find_by_alias(name))
        .map(|command| command.describe(true))
        .collect();

    if descriptions.is_empty() {
        Outcome::message(NO_SUCH_COMMANDS)
    } else {
        Outcome::message(descriptions.join("\n\n"))
    }
}
