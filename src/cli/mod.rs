//! CLI argument definitions for tasktree.

use crate::config::PathOverrides;
use clap::Parser;
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("TT_GIT_COMMIT"),
    ", built ",
    env!("TT_BUILD_TIMESTAMP"),
    ")"
);

/// tasktree - keep a tree of tasks from an interactive console.
///
/// Type `help` at the prompt to list the commands.
#[derive(Parser, Debug)]
#[command(name = "tt")]
#[command(author, version, long_version = LONG_VERSION, about = "An interactive console tool for keeping a tree of tasks", long_about = None)]
pub struct Cli {
    /// Directory holding tasks.db and settings.kdl.
    /// Can also be set via TT_DATA_DIR environment variable.
    #[arg(long = "data-dir", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Task database file (defaults to <data-dir>/tasks.db)
    #[arg(long, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Settings file (defaults to <data-dir>/settings.kdl)
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Run a command line and exit instead of starting the REPL (repeatable)
    #[arg(short = 'e', long = "exec", value_name = "LINE")]
    pub exec: Vec<String>,

    /// Print each outcome as a JSON object
    #[arg(long)]
    pub json: bool,

    /// Do not show the tree when the REPL starts
    #[arg(long = "no-banner")]
    pub no_banner: bool,
}

impl Cli {
    /// Path overrides given on the command line.
    pub fn path_overrides(&self) -> PathOverrides {
        PathOverrides {
            data_dir: self.data_dir.clone(),
            db: self.db.clone(),
            settings: self.settings.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_repeated_exec() {
        let cli = Cli::parse_from(["tt", "-e", "add - A", "--exec", "tree", "--json"]);
        assert_eq!(cli.exec, vec!["add - A", "tree"]);
        assert!(cli.json);
        assert!(!cli.no_banner);
    }

    #[test]
    fn test_path_overrides() {
        let cli = Cli::parse_from(["tt", "--data-dir", "/tmp/tt", "--db", "/tmp/other.db"]);
        let overrides = cli.path_overrides();
        assert_eq!(overrides.data_dir, Some(PathBuf::from("/tmp/tt")));
        assert_eq!(overrides.db, Some(PathBuf::from("/tmp/other.db")));
        assert_eq!(overrides.settings, None);
    }
}
