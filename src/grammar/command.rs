//! Command descriptors and the command registry.

use super::Arg;
use crate::{Error, Result};

/// Shared data a command's handler needs injected besides its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextNeed {
    /// The command registry itself, for introspection such as help
    CommandTable,
}

/// One command: its aliases, description, argument slots and the action that
/// handles it.
///
/// `A` is the handler reference; the dispatcher never looks inside it.
#[derive(Debug, Clone)]
pub struct Command<A> {
    aliases: Vec<String>,
    description: String,
    action: A,
    args: Vec<Arg>,
    needs: Vec<ContextNeed>,
}

impl<A> Command<A> {
    /// Create a command without arguments.
    pub fn new(aliases: &[&str], description: impl Into<String>, action: A) -> Self {
        Self {
            aliases: aliases.iter().map(|alias| alias.to_string()).collect(),
            description: description.into(),
            action,
            args: Vec::new(),
            needs: Vec::new(),
        }
    }

    /// Append an argument slot.
    pub fn arg(mut self, arg: Arg) -> Self {
        self.args.push(arg);
        self
    }

    /// Declare a context requirement.
    pub fn needs(mut self, need: ContextNeed) -> Self {
        if !self.needs.contains(&need) {
            self.needs.push(need);
        }
        self
    }

    /// All aliases; the first one is the primary name.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// The primary name.
    pub fn name(&self) -> &str {
        self.aliases.first().map(String::as_str).unwrap_or_default()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn action(&self) -> &A {
        &self.action
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn context_needs(&self) -> &[ContextNeed] {
        &self.needs
    }

    /// Whether `name` is one of this command's aliases.
    pub fn has_alias(&self, name: &str) -> bool {
        self.aliases.iter().any(|alias| alias == name)
    }

    /// Multi-line help text.
    pub fn describe(&self, include_type_descriptions: bool) -> String {
        let mut lines = vec![format!(
            "Command '{}': {}",
            self.name(),
            self.description
        )];

        if self.aliases.len() > 1 {
            lines.push(format!("Aliases: {}", self.aliases[1..].join(", ")));
        }

        if !self.args.is_empty() {
            lines.push("Arguments:".to_string());
            for arg in &self.args {
                lines.push(arg.describe(include_type_descriptions));
            }
        }

        lines.join("\n")
    }

    fn validate(&self) -> Result<()> {
        if self.aliases.is_empty() {
            return Err(Error::InvalidInput(format!(
                "Command '{}' has no aliases",
                self.description
            )));
        }

        for (i, alias) in self.aliases.iter().enumerate() {
            if alias.is_empty() {
                return Err(Error::InvalidInput(format!(
                    "Command '{}' has an empty alias",
                    self.name()
                )));
            }
            if self.aliases[..i].contains(alias) {
                return Err(Error::InvalidInput(format!(
                    "Command '{}' repeats the alias '{}'",
                    self.name(),
                    alias
                )));
            }
        }

        Ok(())
    }
}

/// The immutable, ordered command registry.
///
/// Built once at startup and passed by reference wherever commands are
/// matched or described. Order matters: the first command whose shape matches
/// a line wins, so commands sharing aliases must be listed from the more
/// specific shape to the more general one.
#[derive(Debug, Clone)]
pub struct CommandTable<A> {
    commands: Vec<Command<A>>,
}

impl<A> CommandTable<A> {
    /// Build a table, checking that every command has at least one alias and
    /// no repeated aliases.
    pub fn new(commands: Vec<Command<A>>) -> Result<Self> {
        for command in &commands {
            command.validate()?;
        }
        Ok(Self { commands })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Command<A>> {
        self.commands.iter()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Every command answering to `name`, in table order.
    pub fn find_by_alias<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Command<A>> + 'a {
        self.commands.iter().filter(move |command| command.has_alias(name))
    }
}

impl<'a, A> IntoIterator for &'a CommandTable<A> {
    type Item = &'a Command<A>;
    type IntoIter = std::slice::Iter<'a, Command<A>>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.iter()
    }
}
