//! KDL schema for settings.kdl.
//!
//! This module provides:
//! - The [`Settings`] struct representing the schema
//! - Conversion to and from KDL documents
//! - Default values

use kdl::{KdlDocument, KdlEntry, KdlNode, KdlValue};

/// Default number of spaces per nesting level when rendering the tree.
pub const DEFAULT_INDENT_SIZE: usize = 4;

/// Largest accepted `indent-size`.
pub const MAX_INDENT_SIZE: usize = 16;

/// User preferences stored in settings.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// // Render the whole tree after every command that changed it
/// auto-show #true
/// // Spaces per nesting level
/// indent-size 4
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Render the tree after each mutating command
    pub auto_show: bool,

    /// Spaces per nesting level in the rendered tree
    pub indent_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_show: true,
            indent_size: DEFAULT_INDENT_SIZE,
        }
    }
}

impl Settings {
    /// Parse settings from a KDL document.
    ///
    /// Missing or malformed values fall back to their defaults.
    pub fn from_kdl(doc: &KdlDocument) -> Self {
        let mut settings = Self::default();

        if let Some(node) = doc.get("auto-show") {
            if let Some(entry) = node.entries().first() {
                if let Some(b) = entry.value().as_bool() {
                    settings.auto_show = b;
                }
            }
        }

        if let Some(node) = doc.get("indent-size") {
            if let Some(entry) = node.entries().first() {
                if let Some(i) = entry.value().as_integer() {
                    if (0..=MAX_INDENT_SIZE as i128).contains(&i) {
                        settings.indent_size = i as usize;
                    }
                }
            }
        }

        settings
    }

    /// Convert settings to a KDL document.
    pub fn to_kdl(&self) -> KdlDocument {
        let mut doc = KdlDocument::new();

        let mut node = KdlNode::new("auto-show");
        node.push(KdlEntry::new(KdlValue::Bool(self.auto_show)));
        doc.nodes_mut().push(node);

        let mut node = KdlNode::new("indent-size");
        node.push(KdlEntry::new(KdlValue::Integer(self.indent_size as i128)));
        doc.nodes_mut().push(node);

        doc
    }
}
