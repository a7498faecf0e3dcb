//! Matching input lines against the command table.
//!
//! Each command is tried in table order. The matcher consumes the alias and
//! then every argument slot in turn (separator, then value), backtracking over
//! the lengths a slot admits. The last slot must end the line. While matching
//! it records how many slots a prefix of the line satisfied, so a line that
//! matches nothing can be reported as "argument #N is wrong" instead of a bare
//! "unknown command".

use super::{ArgValues, Command, CommandTable};
use std::fmt;

/// Default separator between an alias and its arguments, and between
/// arguments.
pub const DEFAULT_SEPARATOR: &str = " ";

/// A line that did not match any command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseFailure {
    /// 0 when no alias matched; otherwise the 1-based index of the first
    /// argument that was malformed or missing.
    pub depth: usize,
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.depth == 0 {
            write!(f, "Could not parse the command name.")
        } else {
            write!(
                f,
                "Could not parse argument #{} (it is malformed or missing).",
                self.depth
            )
        }
    }
}

impl std::error::Error for ParseFailure {}

/// A successfully matched line.
#[derive(Debug)]
pub struct Dispatch<'t, A> {
    /// The selected command
    pub command: &'t Command<A>,
    /// The alias the line used
    pub alias: &'t str,
    /// Converted argument values, in slot order
    pub args: ArgValues,
}

/// Matches lines against a borrowed command table.
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'t, A> {
    table: &'t CommandTable<A>,
    separator: &'t str,
}

impl<'t, A> Dispatcher<'t, A> {
    /// Create a dispatcher using the default separator.
    pub fn new(table: &'t CommandTable<A>) -> Self {
        Self {
            table,
            separator: DEFAULT_SEPARATOR,
        }
    }

    /// Use a different argument separator.
    pub fn with_separator(mut self, separator: &'t str) -> Self {
        self.separator = separator;
        self
    }

    /// Find the first command that fully matches `line` and convert its
    /// arguments.
    pub fn dispatch(&self, line: &str) -> Result<Dispatch<'t, A>, ParseFailure> {
        let mut deepest = 0;

        for command in self.table.iter() {
            match self.match_command(command, line) {
                Ok((alias, spans)) => {
                    let args = command
                        .args()
                        .iter()
                        .zip(spans)
                        .map(|(arg, span)| arg.kind().convert(span))
                        .collect();
                    tracing::debug!(command = command.name(), alias, "dispatched");
                    return Ok(Dispatch {
                        command,
                        alias,
                        args: ArgValues::new(args),
                    });
                }
                Err(depth) => deepest = deepest.max(depth),
            }
        }

        tracing::debug!(depth = deepest, "no command matched");
        Err(ParseFailure { depth: deepest })
    }

    /// Match one command, returning the alias used and the text of every
    /// slot, or the failure depth.
    fn match_command<'l>(
        &self,
        command: &'t Command<A>,
        line: &'l str,
    ) -> Result<(&'t str, Vec<&'l str>), usize> {
        let slot_count = command.args().len();
        // Deepest number of slots satisfied by a prefix of the line, `None`
        // until an alias matched.
        let mut reached: Option<usize> = None;
        let mut spans = Vec::with_capacity(slot_count);

        for alias in command.aliases() {
            let Some(rest) = line.strip_prefix(alias.as_str()) else {
                continue;
            };
            reached = reached.max(Some(0));
            if self.match_slots(command, rest, &mut spans, &mut reached) {
                return Ok((alias.as_str(), spans));
            }
            spans.clear();
        }

        Err(match reached {
            None => 0,
            Some(_) if slot_count == 0 => 0,
            Some(satisfied) => (satisfied + 1).min(slot_count),
        })
    }

    fn match_slots<'l>(
        &self,
        command: &Command<A>,
        rest: &'l str,
        spans: &mut Vec<&'l str>,
        reached: &mut Option<usize>,
    ) -> bool {
        let slot = spans.len();
        let args = command.args();
        if slot == args.len() {
            return rest.is_empty();
        }

        let Some(input) = rest.strip_prefix(self.separator) else {
            return false;
        };

        let next_separator = (slot + 1 < args.len()).then_some(self.separator);
        for length in args[slot].split_points(input, next_separator) {
            let (value, tail) = input.split_at(length);
            *reached = (*reached).max(Some(slot + 1));
            spans.push(value);
            if self.match_slots(command, tail, spans, reached) {
                return true;
            }
            spans.pop();
        }

        false
    }
}
