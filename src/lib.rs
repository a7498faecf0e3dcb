//! tasktree - An interactive console tool for keeping a tree of tasks.
//!
//! This library provides the core functionality for the `tt` binary:
//! the typed command grammar and dispatcher, the SQLite-backed task store,
//! and the tree-mutation handlers that keep the task forest consistent.

pub mod cli;
pub mod commands;
pub mod config;
pub mod grammar;
pub mod models;
pub mod render;
pub mod session;
pub mod storage;


/// Library-level error type for tasktree operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Settings error: {0}")]
    Settings(#[from] kdl::KdlError),

    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for tasktree operations.
pub type Result<T> = std::result::Result<T, Error>;
