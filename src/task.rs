// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 The taskdown contributors

//! Backend-neutral task records and description assembly.
//!
//! Backend adapters ([`crate::lark`], [`crate::kanban`]) normalize their
//! payloads into a [`TaskDraft`]; [`TaskDraft::finish`] renders it into the
//! final [`TaskItem`] whose `description` is the markdown written to disk.

use crate::parser::{CommentNode, DocumentInput};
use crate::renderer::{self, RenderError};
use snafu::prelude::*;
use std::fmt::{self, Write};
use std::str::FromStr;

/// Priority labels indexed by numeric priority code.
const PRIORITY_LABELS: [&str; 5] = ["None", "Low", "Medium", "High", "Urgent"];

/// Which upstream service a payload came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BackendKind {
    /// The suite-style task manager.
    #[default]
    Lark,
    /// The Kanban-style board.
    Kanban,
}

/// Error returned when parsing an unrecognized backend name.
#[derive(Debug, Snafu)]
#[snafu(display("unknown backend type: {name} (expected lark or kanban)"))]
pub struct UnknownBackend {
    /// The name that failed to parse.
    pub name: String,
}

impl FromStr for BackendKind {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lark" => Ok(Self::Lark),
            "kanban" => Ok(Self::Kanban),
            _ => UnknownBackendSnafu { name: s }.fail(),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lark => "lark",
            Self::Kanban => "kanban",
        })
    }
}

impl BackendKind {
    /// What the backend calls a single task, for user-facing messages.
    #[must_use]
    pub const fn item_label(self) -> &'static str {
        match self {
            Self::Lark => "task",
            Self::Kanban => "card",
        }
    }
}

/// A board (Kanban) or tasklist (suite backend).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardInfo {
    /// Backend identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// A column (Kanban) or section (suite backend) within a board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionInfo {
    /// Backend identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// The board this section belongs to.
    pub board_id: String,
}

/// One comment from a flattened thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentRecord {
    /// Display name of the author.
    pub author: String,
    /// Comment text.
    pub content: String,
    /// Creation time as displayed.
    pub created_at: String,
    /// Reply depth, `0` for top-level comments.
    pub depth: usize,
}

/// A normalized task, ready to be written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    /// Backend identifier; also the name of the task's local folder.
    pub id: String,
    /// Task title.
    pub title: String,
    /// Full markdown: title, metadata, description and comments.
    pub description: String,
    /// Priority label, if the task has one.
    pub priority: Option<String>,
    /// Due date as the backend formats it.
    pub due_date: Option<String>,
    /// Labels attached to the task.
    pub labels: Vec<String>,
    /// The comment thread in pre-order.
    pub comments: Vec<CommentRecord>,
}

/// Task fields extracted by a backend adapter, before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Backend identifier.
    pub id: String,
    /// Task title.
    pub title: String,
    /// Priority label.
    pub priority: Option<String>,
    /// Due date.
    pub due_date: Option<String>,
    /// Labels.
    pub labels: Vec<String>,
    /// The raw description.
    pub description: DocumentInput,
    /// The comment thread.
    pub comments: Vec<CommentNode>,
}

impl TaskDraft {
    /// Renders the description and comments into a [`TaskItem`].
    ///
    /// # Errors
    ///
    /// Returns an error if the description or comment thread is nested too
    /// deeply to render.
    pub fn finish(self) -> Result<TaskItem, RenderError> {
        let body = renderer::render_document(&self.description)?;
        let comments = renderer::render_comment_tree(&self.comments)?;
        let description = compose_markdown(&self, &body, &comments);

        Ok(TaskItem {
            comments: flatten_comments(&self.comments),
            id: self.id,
            title: self.title,
            description,
            priority: self.priority,
            due_date: self.due_date,
            labels: self.labels,
        })
    }
}

impl TaskItem {
    /// Whether the task carries any of the given labels, ignoring case.
    ///
    /// An empty filter matches every task.
    #[must_use]
    pub fn has_any_label(&self, filter: &[String]) -> bool {
        filter.is_empty()
            || self
                .labels
                .iter()
                .any(|label| filter.iter().any(|f| f.eq_ignore_ascii_case(label)))
    }
}

/// Maps a numeric priority code to its label; unknown codes are `"None"`.
#[must_use]
pub fn priority_label(code: i64) -> &'static str {
    usize::try_from(code)
        .ok()
        .and_then(|i| PRIORITY_LABELS.get(i))
        .copied()
        .unwrap_or(PRIORITY_LABELS[0])
}

/// Flattens a comment thread in pre-order, recording each comment's depth.
#[must_use]
pub fn flatten_comments(nodes: &[CommentNode]) -> Vec<CommentRecord> {
    fn visit(out: &mut Vec<CommentRecord>, node: &CommentNode, depth: usize) {
        out.push(CommentRecord {
            author: node.author.clone(),
            content: node.body.clone(),
            created_at: node.created_at.clone(),
            depth,
        });
        for reply in &node.replies {
            visit(out, reply, depth + 1);
        }
    }

    let mut out = Vec::new();
    for node in nodes {
        visit(&mut out, node, 0);
    }
    out
}

/// Assembles the on-disk markdown for a task.
///
/// Order is fixed: title, metadata lines, description, comments.
fn compose_markdown(draft: &TaskDraft, body: &str, comments: &str) -> String {
    let mut out = String::new();
    writeln!(out, "# {}\n", draft.title).unwrap();

    let mut has_metadata = false;
    if let Some(priority) = &draft.priority {
        writeln!(out, "**Priority:** {priority}").unwrap();
        has_metadata = true;
    }
    if let Some(due) = &draft.due_date {
        writeln!(out, "**Due:** {due}").unwrap();
        has_metadata = true;
    }
    if !draft.labels.is_empty() {
        writeln!(out, "**Labels:** {}", draft.labels.join(", ")).unwrap();
        has_metadata = true;
    }
    if has_metadata {
        out.push('\n');
    }

    let body = body.trim_end();
    if !body.is_empty() {
        writeln!(out, "{body}\n").unwrap();
    }

    if !comments.is_empty() {
        out.push_str(comments);
    }

    // Exactly one trailing newline.
    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    out.push('\n');
    out
}
