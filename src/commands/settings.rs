//! Runtime settings changes.

use super::Outcome;
use super::messages::NOTHING_CHANGED;
use crate::Result;
use crate::config::Settings;
use std::path::Path;

/// Turn showing the tree after every change on or off.
///
/// The new value is written to `path` when one is given, and only takes
/// effect once that write succeeded. Never asks for a tree render itself.
pub fn auto_show(settings: &mut Settings, path: Option<&Path>, state: bool) -> Result<Outcome> {
    if settings.auto_show == state {
        return Ok(Outcome::message(NOTHING_CHANGED));
    }

    let updated = Settings {
        auto_show: state,
        ..settings.clone()
    };
    if let Some(path) = path {
        updated.save(path)?;
    }
    *settings = updated;
    tracing::info!(auto_show = state, "changed auto-show");

    Ok(Outcome::message(format!(
        "Showing the tree after every change is now {}.",
        if state { "on" } else { "off" }
    )))
}
