//! Configuration for tasktree.
//!
//! ## settings.kdl - User preferences
//!
//! Located at `<data dir>/settings.kdl` unless `--settings` says otherwise.
//!
//! Contains:
//! - `auto-show` - Render the tree after every command that changed it
//! - `indent-size` - Spaces per nesting level in the rendered tree
//!
//! A missing file means defaults. The file is rewritten whenever a setting
//! changes at runtime.
//!
//! Use the [`resolver`] module to find where the files live.

pub mod resolver;
pub mod schema;

pub use resolver::{
    DATA_DIR_ENV, PathOverrides, Resolved, ResolvedPaths, ValueSource, resolve_paths,
};
pub use schema::{DEFAULT_INDENT_SIZE, Settings};

use crate::Result;
use kdl::KdlDocument;
use std::fs;
use std::path::Path;

impl Settings {
    /// Load settings from `path`, using defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let doc: KdlDocument = content.parse()?;
        Ok(Self::from_kdl(&doc))
    }

    /// Write settings to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut doc = self.to_kdl();
        doc.autoformat();
        fs::write(path, doc.to_string())?;
        tracing::debug!(path = %path.display(), "saved settings");
        Ok(())
    }
}
