//! Typed command grammar.
//!
//! A command line is an alias followed by a fixed sequence of typed arguments:
//! - [`ArgType`] - the closed set of argument kinds, each with a regex pattern,
//!   a display name and a total conversion from matched text to [`ArgValue`]
//! - [`Arg`] - one named argument slot of a command
//! - [`Command`] / [`CommandTable`] - the ordered registry of commands
//! - [`Dispatcher`] - matches a line against the table slot by slot

pub mod command;
pub mod dispatcher;

pub use command::{Command, CommandTable, ContextNeed};
pub use dispatcher::{DEFAULT_SEPARATOR, Dispatch, Dispatcher, ParseFailure};

use crate::{Error, Result};
use regex::Regex;
use std::fmt;

/// Default separator between the elements of a sequence argument.
pub const DEFAULT_SEQUENCE_SEPARATOR: &str = ",";

/// Maximum number of digits accepted by integer arguments, so that every
/// matched value fits in an `i64`.
const MAX_INT_DIGITS: usize = 18;

/// Tokens accepted by boolean arguments.
///
/// Matching is case-insensitive. Conversion is permissive: any matched token
/// that is not in `truthy` converts to `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolVocabulary {
    pub truthy: Vec<String>,
    pub falsy: Vec<String>,
}

impl Default for BoolVocabulary {
    fn default() -> Self {
        Self {
            truthy: ["yes", "y", "1", "+", "true", "on", "v"]
                .map(String::from)
                .to_vec(),
            falsy: ["no", "n", "0", "-", "false", "off", "x"]
                .map(String::from)
                .to_vec(),
        }
    }
}

/// The kind of value an argument slot accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgType {
    /// An integer, optionally allowed to be negative
    Int { signed: bool },

    /// An integer or `-` for "none"
    OptionalInt { signed: bool },

    /// Free text, optionally limited to `max_len` characters
    String { max_len: Option<usize> },

    /// A boolean token from the vocabulary
    Bool(BoolVocabulary),

    /// One or more elements of another type joined by `separator`
    Sequence {
        element: Box<ArgType>,
        separator: String,
    },
}

impl ArgType {
    /// A signed integer.
    pub fn int() -> Self {
        ArgType::Int { signed: true }
    }

    /// A non-negative integer.
    pub fn unsigned_int() -> Self {
        ArgType::Int { signed: false }
    }

    /// A signed integer or `-`.
    pub fn optional_int() -> Self {
        ArgType::OptionalInt { signed: true }
    }

    /// A non-negative integer or `-`.
    pub fn unsigned_optional_int() -> Self {
        ArgType::OptionalInt { signed: false }
    }

    /// Unbounded text.
    pub fn string() -> Self {
        ArgType::String { max_len: None }
    }

    /// Text of at most `max_len` characters.
    pub fn bounded_string(max_len: usize) -> Self {
        ArgType::String {
            max_len: Some(max_len),
        }
    }

    /// A boolean with the default vocabulary.
    pub fn boolean() -> Self {
        ArgType::Bool(BoolVocabulary::default())
    }

    /// A comma-separated sequence of `element`.
    pub fn sequence_of(element: ArgType) -> Self {
        Self::sequence_with(element, DEFAULT_SEQUENCE_SEPARATOR)
    }

    /// A sequence of `element` joined by a custom separator.
    pub fn sequence_with(element: ArgType, separator: impl Into<String>) -> Self {
        ArgType::Sequence {
            element: Box::new(element),
            separator: separator.into(),
        }
    }

    /// Human-readable type name shown in help.
    pub fn name(&self) -> String {
        match self {
            ArgType::Int { signed: true } => "integer".to_string(),
            ArgType::Int { signed: false } => "non-negative integer".to_string(),
            ArgType::OptionalInt { signed: true } => "optional integer".to_string(),
            ArgType::OptionalInt { signed: false } => "optional non-negative integer".to_string(),
            ArgType::String { max_len: None } => "string".to_string(),
            ArgType::String { max_len: Some(n) } => format!("string of at most {} characters", n),
            ArgType::Bool(_) => "boolean".to_string(),
            ArgType::Sequence { element, .. } => format!("sequence of <{}>", element.name()),
        }
    }

    /// Longer explanation of the accepted syntax, if the name is not enough.
    pub fn description(&self) -> Option<String> {
        match self {
            ArgType::OptionalInt { .. } => {
                Some("a number, or '-' to leave it empty".to_string())
            }
            ArgType::Bool(vocabulary) => Some(format!(
                "true: {}; false: {}",
                vocabulary.truthy.join(", "),
                vocabulary.falsy.join(", ")
            )),
            ArgType::Sequence { element, separator } => Some(format!(
                "one or more elements of type '{}' separated by '{}'",
                element.name(),
                separator
            )),
            ArgType::Int { .. } | ArgType::String { .. } => None,
        }
    }

    /// Regex fragment matching exactly the accepted texts.
    ///
    /// The fragment is unanchored and contains no capture groups, so it can be
    /// embedded into larger patterns.
    pub fn pattern(&self) -> String {
        match self {
            ArgType::Int { signed: true } => format!("-?[0-9]{{1,{}}}", MAX_INT_DIGITS),
            ArgType::Int { signed: false } => format!("[0-9]{{1,{}}}", MAX_INT_DIGITS),
            ArgType::OptionalInt { signed: true } => {
                format!("(?:-?[0-9]{{1,{}}}|-)", MAX_INT_DIGITS)
            }
            ArgType::OptionalInt { signed: false } => {
                format!("(?:[0-9]{{1,{}}}|-)", MAX_INT_DIGITS)
            }
            ArgType::String { max_len: None } => ".+".to_string(),
            ArgType::String { max_len: Some(n) } => format!(".{{1,{}}}", n),
            ArgType::Bool(vocabulary) => {
                let tokens: Vec<String> = vocabulary
                    .truthy
                    .iter()
                    .chain(&vocabulary.falsy)
                    .map(|token| regex::escape(token))
                    .collect();
                format!("(?i:{})", tokens.join("|"))
            }
            ArgType::Sequence { element, separator } => {
                let element = element.pattern();
                format!(
                    "(?:{}(?:{}{})*)",
                    element,
                    regex::escape(separator),
                    element
                )
            }
        }
    }

    /// Whether shorter matches are preferred over longer ones when a slot
    /// admits several lengths.
    fn prefers_shortest(&self) -> bool {
        match self {
            ArgType::String { .. } => true,
            ArgType::Sequence { element, .. } => element.prefers_shortest(),
            _ => false,
        }
    }

    /// Convert text that matched [`ArgType::pattern`] into a typed value.
    ///
    /// Never fails on matched text; invalid syntax is rejected by the pattern.
    pub fn convert(&self, text: &str) -> ArgValue {
        match self {
            // The pattern allows at most 18 ASCII digits, which always fit.
            ArgType::Int { .. } => ArgValue::Int(text.parse().unwrap_or_default()),
            ArgType::OptionalInt { .. } => {
                if text == "-" {
                    ArgValue::OptionalInt(None)
                } else {
                    ArgValue::OptionalInt(Some(text.parse().unwrap_or_default()))
                }
            }
            ArgType::String { .. } => ArgValue::String(text.to_string()),
            ArgType::Bool(vocabulary) => {
                let lowered = text.to_lowercase();
                ArgValue::Bool(
                    vocabulary
                        .truthy
                        .iter()
                        .any(|token| token.to_lowercase() == lowered),
                )
            }
            ArgType::Sequence { element, separator } => ArgValue::Sequence(
                text.split(separator.as_str())
                    .map(|part| element.convert(part))
                    .collect(),
            ),
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A converted argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    Int(i64),
    OptionalInt(Option<i64>),
    String(String),
    Bool(bool),
    Sequence(Vec<ArgValue>),
}

/// The converted arguments of one dispatched command, in slot order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgValues(Vec<ArgValue>);

impl ArgValues {
    pub fn new(values: Vec<ArgValue>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[ArgValue] {
        &self.0
    }

    /// Integer at `index`.
    pub fn int(&self, index: usize) -> Result<i64> {
        match self.0.get(index) {
            Some(ArgValue::Int(value)) => Ok(*value),
            other => Err(mismatch(index, "an integer", other)),
        }
    }

    /// Optional integer at `index`.
    pub fn optional_int(&self, index: usize) -> Result<Option<i64>> {
        match self.0.get(index) {
            Some(ArgValue::OptionalInt(value)) => Ok(*value),
            other => Err(mismatch(index, "an optional integer", other)),
        }
    }

    /// String at `index`.
    pub fn string(&self, index: usize) -> Result<&str> {
        match self.0.get(index) {
            Some(ArgValue::String(value)) => Ok(value),
            other => Err(mismatch(index, "a string", other)),
        }
    }

    /// Boolean at `index`.
    pub fn boolean(&self, index: usize) -> Result<bool> {
        match self.0.get(index) {
            Some(ArgValue::Bool(value)) => Ok(*value),
            other => Err(mismatch(index, "a boolean", other)),
        }
    }

    /// Sequence of integers at `index`.
    pub fn ints(&self, index: usize) -> Result<Vec<i64>> {
        match self.0.get(index) {
            Some(ArgValue::Sequence(items)) => items
                .iter()
                .map(|item| match item {
                    ArgValue::Int(value) => Ok(*value),
                    other => Err(mismatch(index, "a sequence of integers", Some(other))),
                })
                .collect(),
            other => Err(mismatch(index, "a sequence of integers", other)),
        }
    }

    /// Sequence of strings at `index`.
    pub fn strings(&self, index: usize) -> Result<Vec<String>> {
        match self.0.get(index) {
            Some(ArgValue::Sequence(items)) => items
                .iter()
                .map(|item| match item {
                    ArgValue::String(value) => Ok(value.clone()),
                    other => Err(mismatch(index, "a sequence of strings", Some(other))),
                })
                .collect(),
            other => Err(mismatch(index, "a sequence of strings", other)),
        }
    }
}

fn mismatch(index: usize, expected: &str, found: Option<&ArgValue>) -> Error {
    Error::InvalidInput(format!(
        "argument #{} should be {}, found {:?}",
        index + 1,
        expected,
        found
    ))
}

/// One argument slot of a command.
#[derive(Debug, Clone)]
pub struct Arg {
    name: String,
    kind: ArgType,
    help: Option<String>,
    /// `kind.pattern()` anchored at both ends
    matcher: Regex,
}

impl Arg {
    /// Create a slot, compiling its pattern once.
    pub fn new(name: impl Into<String>, kind: ArgType) -> Result<Self> {
        let name = name.into();
        let matcher = Regex::new(&format!("^(?:{})$", kind.pattern())).map_err(|e| {
            Error::InvalidInput(format!("Invalid pattern for argument '{}': {}", name, e))
        })?;
        Ok(Self {
            name,
            kind,
            help: None,
            matcher,
        })
    }

    /// Attach help text shown after the type in command descriptions.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &ArgType {
        &self.kind
    }

    /// Check whether the whole of `text` is a valid value for this slot.
    pub fn matches(&self, text: &str) -> bool {
        self.matcher.is_match(text)
    }

    /// Byte lengths at which `input` can be cut into a value for this slot,
    /// in the order the dispatcher should try them.
    ///
    /// With `next_separator` set to `None` the slot is the last one and must
    /// take the whole input. Otherwise a value ends either where the separator
    /// follows or at the end of the input, the latter so that a missing next
    /// argument is blamed on that argument.
    pub fn split_points(&self, input: &str, next_separator: Option<&str>) -> Vec<usize> {
        let Some(separator) = next_separator else {
            return if self.matches(input) {
                vec![input.len()]
            } else {
                Vec::new()
            };
        };

        let mut lengths: Vec<usize> = input
            .match_indices(separator)
            .map(|(i, _)| i)
            .chain(std::iter::once(input.len()))
            .filter(|&end| end > 0)
            .collect();
        lengths.dedup();
        lengths.retain(|&end| self.matches(&input[..end]));

        if !self.kind.prefers_shortest() {
            lengths.reverse();
        }
        lengths
    }

    /// One help line for this slot.
    pub fn describe(&self, include_type_description: bool) -> String {
        let mut line = format!("{} ({}", self.name, self.kind.name());
        if include_type_description {
            if let Some(description) = self.kind.description() {
                line.push_str(" - ");
                line.push_str(&description);
            }
        }
        line.push(')');
        if let Some(help) = &self.help {
            line.push_str(" - ");
            line.push_str(help);
        }
        line
    }
}
