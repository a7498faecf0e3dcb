//! The interactive session: one line in, one outcome out.

use crate::commands::{self, Action, Context, Outcome, Output};
use crate::config::Settings;
use crate::grammar::{CommandTable, DEFAULT_SEPARATOR, Dispatcher};
use crate::render::render_tree;
use crate::storage::TaskStore;
use crate::Result;
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// Prompt printed before each line in interactive mode.
pub const PROMPT: &str = ">>> ";

/// How outcomes are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Human,
    Json,
}

/// Owns everything one REPL needs: the command table, the store and the
/// settings.
#[derive(Debug)]
pub struct Session {
    table: CommandTable<Action>,
    separator: String,
    store: TaskStore,
    settings: Settings,
    settings_path: Option<PathBuf>,
    output: OutputMode,
    banner: bool,
}

impl Session {
    /// Create a session over the default command table.
    pub fn new(store: TaskStore, settings: Settings) -> Result<Self> {
        Ok(Self {
            table: commands::default_table()?,
            separator: DEFAULT_SEPARATOR.to_string(),
            store,
            settings,
            settings_path: None,
            output: OutputMode::Human,
            banner: true,
        })
    }

    /// Persist settings changes to `path`.
    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    /// Whether an interactive run starts by showing the tree.
    pub fn with_banner(mut self, banner: bool) -> Self {
        self.banner = banner;
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Dispatch and handle one line.
    ///
    /// A line that matches no command is an outcome, not an error. Errors
    /// come from the store or the settings file; pending writes are rolled
    /// back before they are returned.
    pub fn handle_line(&mut self, line: &str) -> Result<Outcome> {
        let dispatcher = Dispatcher::new(&self.table).with_separator(&self.separator);
        let dispatch = match dispatcher.dispatch(line) {
            Ok(dispatch) => dispatch,
            Err(failure) => return Ok(Outcome::message(failure.to_string())),
        };

        let mut ctx = Context {
            store: &mut self.store,
            settings: &mut self.settings,
            settings_path: self.settings_path.as_deref(),
        };
        let result = commands::execute(&dispatch, &self.table, &mut ctx);

        if let Err(ref e) = result {
            tracing::error!(command = dispatch.command.name(), error = %e, "command failed");
            self.store.rollback()?;
        }
        result
    }

    /// The rendered forest.
    pub fn render(&self) -> Result<String> {
        let index = self.store.load_index()?;
        Ok(render_tree(&index, self.settings.indent_size))
    }

    /// Handle one line and write its output: the tree first when it changed
    /// and auto-show is on, then the message.
    pub fn execute_line<W: Write>(&mut self, line: &str, writer: &mut W) -> Result<()> {
        let outcome = self.handle_line(line)?;

        match self.output {
            OutputMode::Json => {
                writeln!(writer, "{}", outcome.to_json())?;
            }
            OutputMode::Human => {
                if outcome.render_tree && self.settings.auto_show {
                    writeln!(writer, "{}", self.render()?)?;
                }
                writeln!(writer, "{}", outcome.to_human())?;
            }
        }
        Ok(())
    }

    /// Read lines until end of input, handling each one.
    ///
    /// In interactive mode a prompt precedes every line, and the tree is shown
    /// first when auto-show and the banner are on. Blank lines are skipped.
    pub fn run<R: BufRead, W: Write>(
        &mut self,
        reader: R,
        writer: &mut W,
        interactive: bool,
    ) -> Result<()> {
        if interactive {
            if self.banner && self.settings.auto_show && self.output == OutputMode::Human {
                writeln!(writer, "{}", self.render()?)?;
            }
            write!(writer, "{}", PROMPT)?;
            writer.flush()?;
        }

        for line in reader.lines() {
            let line = line?;
            let line = line.trim_end_matches('\r');
            if !line.trim().is_empty() {
                self.execute_line(line, writer)?;
            }
            if interactive {
                write!(writer, "{}", PROMPT)?;
                writer.flush()?;
            }
        }

        if interactive {
            writeln!(writer)?;
        }
        tracing::debug!("end of input");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::EMPTY_TREE;
    use crate::test_utils::TestEnv;
    use std::io::Cursor;

    fn session() -> Session {
        Session::new(TaskStore::open_in_memory().unwrap(), Settings::default()).unwrap()
    }

    fn run_script(session: &mut Session, script: &str, interactive: bool) -> String {
        let mut out = Vec::new();
        session
            .run(Cursor::new(script.to_string()), &mut out, interactive)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_failures_are_messages() {
        let mut session = session();
        assert_eq!(
            session.handle_line("frobnicate").unwrap().message,
            "Could not parse the command name."
        );
        assert_eq!(
            session.handle_line("edit 1").unwrap().message,
            "Could not parse argument #2 (it is malformed or missing)."
        );
    }

    #[test]
    fn test_auto_show_renders_before_message() {
        let mut session = session();
        let output = run_script(&mut session, "add - A\n", false);
        assert_eq!(output, "[-][ ][ID: 1] A\nTask 1 created.\n");
    }

    #[test]
    fn test_no_render_when_auto_show_off() {
        let mut session = session();
        let output = run_script(&mut session, "autoshow no\nadd - A\n\n   \ntree\n", false);
        assert_eq!(
            output,
            "Showing the tree after every change is now off.\nTask 1 created.\n[-][ ][ID: 1] A\n"
        );
    }

    #[test]
    fn test_no_render_when_nothing_changed() {
        let mut session = session();
        let output = run_script(&mut session, "check 4\n", false);
        assert_eq!(
            output,
            "Task 4 does not exist, so its state cannot be changed.\n"
        );
    }

    #[test]
    fn test_interactive_prompt_and_initial_tree() {
        let mut session = session();
        let output = run_script(&mut session, "ls\n", true);
        assert_eq!(
            output,
            format!("{}\n>>> {}\n>>> \n", EMPTY_TREE, EMPTY_TREE)
        );
    }

    #[test]
    fn test_interactive_without_banner() {
        let mut session = session().with_banner(false);
        let output = run_script(&mut session, "", true);
        assert_eq!(output, ">>> \n");
    }

    #[test]
    fn test_json_output() {
        let mut session = session().with_output(OutputMode::Json);
        let output = run_script(&mut session, "+ - A\n", false);
        assert_eq!(
            output,
            "{\"message\":\"Task 1 created.\",\"render_tree\":true}\n"
        );
    }

    #[test]
    fn test_custom_separator() {
        let mut session = session().with_separator(";");
        session.handle_line("add;-;A b").unwrap();
        assert_eq!(session.store().get_by_id(1).unwrap().text, "A b");
    }

    #[test]
    fn test_scenario_across_reopen() {
        let env = TestEnv::new();
        {
            let mut session = Session::new(env.open_store(), env.load_settings())
                .unwrap()
                .with_settings_path(env.settings_path());
            run_script(&mut session, "add - A\nadd 1 B\nmove 2 1\nmove - 2\nautoshow off\n", false);
        }

        let mut session = Session::new(env.open_store(), env.load_settings()).unwrap();
        assert!(!session.settings().auto_show);
        let output = run_script(&mut session, "tree\n", false);
        assert_eq!(output, "[-][ ][ID: 1] A\n[-][ ][ID: 2] B\n");
    }
}
