//! Precedence resolution for file locations.
//!
//! ## Data directory precedence (highest to lowest)
//!
//! 1. `--data-dir` CLI flag
//! 2. `TT_DATA_DIR` environment variable
//! 3. `<platform data dir>/tasktree`
//!
//! `--db` and `--settings` override the individual files; otherwise they live
//! inside the data directory as `tasks.db` and `settings.kdl`.

use crate::{Error, Result};
use std::path::PathBuf;

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "TT_DATA_DIR";

/// Database file name inside the data directory.
pub const DB_FILE_NAME: &str = "tasks.db";

/// Settings file name inside the data directory.
pub const SETTINGS_FILE_NAME: &str = "settings.kdl";

const APP_DIR_NAME: &str = "tasktree";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from environment variable
    EnvVar(String),
    /// Value from CLI flag
    CliFlag,
    /// Derived from the data directory
    DataDir,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::EnvVar(name) => write!(f, "env:{}", name),
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::DataDir => write!(f, "data-dir"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Path overrides from CLI flags.
#[derive(Debug, Clone, Default)]
pub struct PathOverrides {
    pub data_dir: Option<PathBuf>,
    pub db: Option<PathBuf>,
    pub settings: Option<PathBuf>,
}

/// Where the task database and the settings file live.
#[derive(Debug, Clone)]
pub struct ResolvedPaths {
    pub data_dir: Resolved<PathBuf>,
    pub db: Resolved<PathBuf>,
    pub settings: Resolved<PathBuf>,
}

/// Resolve file locations from CLI overrides, the environment and platform
/// defaults.
pub fn resolve_paths(overrides: &PathOverrides) -> Result<ResolvedPaths> {
    let env_dir = std::env::var_os(DATA_DIR_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from);
    resolve_paths_with_env(overrides, env_dir)
}

/// Like [`resolve_paths`], with the environment value passed in.
pub fn resolve_paths_with_env(
    overrides: &PathOverrides,
    env_dir: Option<PathBuf>,
) -> Result<ResolvedPaths> {
    let data_dir = if let Some(ref dir) = overrides.data_dir {
        Resolved::new(dir.clone(), ValueSource::CliFlag)
    } else if let Some(dir) = env_dir {
        Resolved::new(dir, ValueSource::EnvVar(DATA_DIR_ENV.to_string()))
    } else {
        let base = dirs::data_dir().ok_or_else(|| {
            Error::Other("Could not determine the platform data directory".to_string())
        })?;
        Resolved::new(base.join(APP_DIR_NAME), ValueSource::Default)
    };

    let db = match overrides.db {
        Some(ref path) => Resolved::new(path.clone(), ValueSource::CliFlag),
        None => Resolved::new(data_dir.value.join(DB_FILE_NAME), ValueSource::DataDir),
    };

    let settings = match overrides.settings {
        Some(ref path) => Resolved::new(path.clone(), ValueSource::CliFlag),
        None => Resolved::new(
            data_dir.value.join(SETTINGS_FILE_NAME),
            ValueSource::DataDir,
        ),
    };

    tracing::debug!(
        data_dir = %data_dir.value.display(),
        source = %data_dir.source,
        "resolved data directory"
    );

    Ok(ResolvedPaths {
        data_dir,
        db,
        settings,
    })
}
