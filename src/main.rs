//! tasktree CLI - An interactive console tool for keeping a tree of tasks.

use clap::Parser;
use std::io::{self, IsTerminal};
use std::process;
use tasktree::Result;
use tasktree::cli::Cli;
use tasktree::config::{Settings, resolve_paths};
use tasktree::session::{OutputMode, Session};
use tasktree::storage::TaskStore;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "TT_LOG";

fn main() {
    let cli = Cli::parse();
    init_logging();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let paths = resolve_paths(&cli.path_overrides())?;
    let store = TaskStore::open(&paths.db.value)?;
    let settings = Settings::load(&paths.settings.value)?;

    let output = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Human
    };
    let mut session = Session::new(store, settings)?
        .with_settings_path(paths.settings.value)
        .with_output(output)
        .with_banner(!cli.no_banner);

    let stdout = io::stdout();
    let mut writer = stdout.lock();

    if !cli.exec.is_empty() {
        for line in &cli.exec {
            session.execute_line(line, &mut writer)?;
        }
        return Ok(());
    }

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    session.run(stdin.lock(), &mut writer, interactive)
}
