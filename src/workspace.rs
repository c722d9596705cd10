// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 The taskdown contributors

//! The local task workspace.
//!
//! Every downloaded task gets its own folder named after its ID, holding a
//! single `description.md`. Folders still present in the workspace are the
//! tasks waiting to be marked solved.

use crate::task::TaskItem;
use snafu::prelude::*;
use std::path::{Path, PathBuf};

/// Name of the markdown file written inside each task folder.
pub const DESCRIPTION_FILE: &str = "description.md";

/// Error type for workspace filesystem operations.
#[derive(Debug, Snafu)]
pub enum WorkspaceError {
    /// The task ID cannot be used as a folder name.
    #[snafu(display("task ID {id:?} is not a valid folder name"))]
    InvalidTaskId {
        /// The offending ID.
        id: String,
    },

    /// Failed to create a directory.
    #[snafu(display("failed to create {}: {source}", path.display()))]
    CreateDir {
        /// The directory being created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to write a file.
    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteFile {
        /// The file being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to list a directory.
    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadDir {
        /// The directory being listed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}

/// What [`write_task`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The description was written to this path.
    Written(PathBuf),
    /// The file already existed and was left alone.
    Skipped(PathBuf),
}

/// A task folder found in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTask {
    /// The task ID (the folder name).
    pub id: String,
    /// Path to the folder.
    pub path: PathBuf,
}

/// Path of a task's description file under `root`.
///
/// # Errors
///
/// Returns an error if `id` is empty, `.`/`..`, or contains a path
/// separator.
pub fn description_path(root: &Path, id: &str) -> Result<PathBuf, WorkspaceError> {
    let trimmed = id.trim();
    ensure!(
        !trimmed.is_empty()
            && trimmed != "."
            && trimmed != ".."
            && !id.contains(['/', '\\']),
        InvalidTaskIdSnafu { id }
    );
    Ok(root.join(id).join(DESCRIPTION_FILE))
}

/// Writes a task's markdown to `<root>/<id>/description.md`.
///
/// An existing file is only replaced when `force` is set.
///
/// # Errors
///
/// Returns an error if the ID is unusable as a folder name or the folder
/// or file cannot be written.
pub fn write_task(
    root: &Path,
    task: &TaskItem,
    force: bool,
) -> Result<WriteOutcome, WorkspaceError> {
    let path = description_path(root, &task.id)?;

    if path.exists() && !force {
        return Ok(WriteOutcome::Skipped(path));
    }

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).context(CreateDirSnafu { path: dir })?;
    }
    std::fs::write(&path, &task.description).context(WriteFileSnafu { path: &path })?;

    Ok(WriteOutcome::Written(path))
}

/// Lists task folders under `root`, sorted by ID.
///
/// A missing workspace has no pending tasks. Plain files are ignored.
///
/// # Errors
///
/// Returns an error if `root` exists but cannot be listed.
pub fn pending_tasks(root: &Path) -> Result<Vec<PendingTask>, WorkspaceError> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(root).context(ReadDirSnafu { path: root })?;

    let mut tasks: Vec<PendingTask> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| {
            let id = entry.file_name().to_str()?.to_owned();
            (!id.trim().is_empty()).then(|| PendingTask {
                id,
                path: entry.path(),
            })
        })
        .collect();

    tasks.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(tasks)
}
