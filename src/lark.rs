// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 The taskdown contributors

//! Normalization of suite-backend ("lark") payloads.
//!
//! Tasks carry a rich-text description and a flat comment list whose
//! timestamps are epoch-millisecond strings. Replies point at their parent
//! through `reply_to_comment_id` and are threaded here before rendering.
//!
//! # Example
//!
//! ```
//! use taskdown::lark;
//!
//! let task = serde_json::json!({
//!     "guid": "t-1",
//!     "summary": "Fix login",
//!     "priority": 3,
//!     "description": { "content": [{ "elements": [{ "textRun": { "text": "Broken" } }] }] }
//! });
//! let comments = serde_json::json!([
//!     { "content": "on it", "created_at": "1704153600000", "creator": { "name": "Alice" } }
//! ]);
//!
//! let item = lark::task_draft(&task, &comments).finish().unwrap();
//! assert!(item.description.starts_with("# Fix login\n\n**Priority:** High\n"));
//! assert!(item.description.contains("- **Alice** [2024-01-02 00:00]: on it"));
//! ```

use crate::parser::{CommentNode, DocumentInput, array, get_str, get_string, unwrap_data};
use crate::task::{BoardInfo, SectionInfo, TaskDraft, priority_label};
use crate::renderer::MAX_DEPTH;
use chrono::DateTime;
use serde_json::Value;
use std::collections::HashMap;

/// Shown in place of a comment date that cannot be parsed.
pub const UNKNOWN_DATE: &str = "unknown date";

/// Lists tasklists from a list-tasklists response.
#[must_use]
pub fn boards(response: &Value) -> Vec<BoardInfo> {
    items(response)
        .iter()
        .filter_map(|item| {
            Some(BoardInfo {
                id: get_string(item, &["guid"])?,
                name: get_string(item, &["name"]).unwrap_or_default(),
            })
        })
        .collect()
}

/// Lists the sections of a tasklist from a list-sections response.
#[must_use]
pub fn sections(response: &Value, board_id: &str) -> Vec<SectionInfo> {
    items(response)
        .iter()
        .filter_map(|item| {
            Some(SectionInfo {
                id: get_string(item, &["guid"])?,
                name: get_string(item, &["name"]).unwrap_or_default(),
                board_id: board_id.to_owned(),
            })
        })
        .collect()
}

/// Task GUIDs listed in a list-tasks-in-section response.
#[must_use]
pub fn task_ids(response: &Value) -> Vec<String> {
    items(response)
        .iter()
        .filter_map(|item| get_string(item, &["guid"]))
        .collect()
}

/// Extracts task fields from a task (or get-task response) and its comments.
#[must_use]
pub fn task_draft(task: &Value, comments: &Value) -> TaskDraft {
    let task = unwrap_data(task);
    let task = task.get("task").unwrap_or(task);

    TaskDraft {
        id: get_string(task, &["guid"]).unwrap_or_default(),
        title: get_string(task, &["summary"]).unwrap_or_else(|| "No title".to_owned()),
        priority: task
            .get("priority")
            .and_then(Value::as_i64)
            .map(|code| priority_label(code).to_owned()),
        due_date: due_date(task),
        labels: array(task, &["custom_fields"])
            .iter()
            .map(|field| get_string(field, &["name"]).unwrap_or_default())
            .collect(),
        description: DocumentInput::from_value(task.get("description")),
        comments: comment_thread(comments),
    }
}

/// Threads a flat comment list into reply trees.
///
/// A comment is attached under the comment named by its
/// `reply_to_comment_id` when that comment appears earlier in the list;
/// otherwise it stays top-level. A reply that would sit deeper than
/// [`MAX_DEPTH`] also starts a new top-level thread. Dates are converted with
/// [`format_epoch_millis`], falling back to [`UNKNOWN_DATE`].
#[must_use]
pub fn comment_thread(comments: &Value) -> Vec<CommentNode> {
    let list = comment_list(comments);

    let mut index_by_id: HashMap<&str, usize> = HashMap::new();
    let mut parents = Vec::with_capacity(list.len());
    let mut depths: Vec<usize> = Vec::with_capacity(list.len());
    let mut nodes = Vec::with_capacity(list.len());

    for (i, comment) in list.iter().enumerate() {
        let parent = get_str(comment, &["reply_to_comment_id"])
            .and_then(|id| index_by_id.get(id).copied())
            .filter(|&p| depths[p] < MAX_DEPTH);
        depths.push(parent.map_or(0, |p| depths[p] + 1));
        parents.push(parent);
        if let Some(id) = get_str(comment, &["comment_id"]).filter(|id| !id.is_empty()) {
            index_by_id.entry(id).or_insert(i);
        }

        let created_at = get_str(comment, &["created_at"])
            .and_then(format_epoch_millis)
            .unwrap_or_else(|| UNKNOWN_DATE.to_owned());

        nodes.push(Some(CommentNode {
            author: get_string(comment, &["creator", "name"])
                .or_else(|| get_string(comment, &["creator", "id"]))
                .unwrap_or_else(|| "Unknown".to_owned()),
            body: get_string(comment, &["content"]).unwrap_or_default(),
            created_at,
            replies: Vec::new(),
        }));
    }

    // Parents always precede their replies, so walking backwards finishes
    // every subtree before it is moved under its parent.
    for i in (0..nodes.len()).rev() {
        if let Some(parent) = parents[i]
            && let Some(node) = nodes[i].take()
            && let Some(parent_node) = nodes[parent].as_mut()
        {
            parent_node.replies.insert(0, node);
        }
    }

    nodes.into_iter().flatten().collect()
}

/// Formats an epoch-millisecond string as `YYYY-MM-DD HH:MM` (UTC).
///
/// Returns `None` if the string is not an integer or is out of range.
#[must_use]
pub fn format_epoch_millis(raw: &str) -> Option<String> {
    let millis: i64 = raw.trim().parse().ok()?;
    DateTime::from_timestamp_millis(millis).map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
}

/// The due date, from `due.date` or else the date of `due.timestamp`.
fn due_date(task: &Value) -> Option<String> {
    let due = task.get("due").filter(|d| d.is_object())?;
    if let Some(date) = get_string(due, &["date"]) {
        return Some(date);
    }
    let millis: i64 = match due.get("timestamp")? {
        Value::String(s) => s.trim().parse().ok()?,
        other => other.as_i64()?,
    };
    DateTime::from_timestamp_millis(millis).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// The `items` array of a paged list response.
fn items(response: &Value) -> &[Value] {
    array(unwrap_data(response), &["items"])
}

/// Accepts a bare comment array or a paged list response.
fn comment_list(comments: &Value) -> &[Value] {
    match unwrap_data(comments) {
        Value::Array(list) => list,
        other => array(other, &["items"]),
    }
}
