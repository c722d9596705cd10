// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 The taskdown contributors

//! Normalization of Kanban-backend payloads.
//!
//! Responses usually arrive wrapped in a `data` envelope. Card descriptions
//! are already markdown; comments live in the card's activity feed as
//! `kanban_cards.comment` entries with nested replies.

use crate::parser::{CommentNode, DocumentInput, array, get_str, get_string, unwrap_data};
use crate::task::{BoardInfo, SectionInfo, TaskDraft, priority_label};
use serde_json::Value;

/// Activity name marking a comment in the card activity feed.
pub const COMMENT_ACTIVITY: &str = "kanban_cards.comment";

/// Lists boards from a boards-list response.
#[must_use]
pub fn boards(response: &Value) -> Vec<BoardInfo> {
    as_slice(unwrap_data(response))
        .iter()
        .filter_map(|board| {
            Some(BoardInfo {
                id: get_string(board, &["id"])?,
                name: get_string(board, &["name"]).unwrap_or_default(),
            })
        })
        .collect()
}

/// Lists the columns of a board from its board-info response.
#[must_use]
pub fn sections(board_info: &Value, board_id: &str) -> Vec<SectionInfo> {
    array(unwrap_data(board_info), &["lists"])
        .iter()
        .filter_map(|list| {
            Some(SectionInfo {
                id: get_string(list, &["id"])?,
                name: get_string(list, &["name"]).unwrap_or_default(),
                board_id: board_id.to_owned(),
            })
        })
        .collect()
}

/// IDs of the cards that belong to a column.
///
/// Cards come from the column's own `cards` when present, otherwise from
/// the board's top-level `cards`. Cards assigned to another column are
/// dropped.
#[must_use]
pub fn cards_in_section(board_info: &Value, section_id: &str) -> Vec<String> {
    let board = unwrap_data(board_info);

    let column_cards = array(board, &["lists"])
        .iter()
        .find(|list| get_str(list, &["id"]) == Some(section_id))
        .map(|list| array(list, &["cards"]))
        .unwrap_or_default();
    let cards = if column_cards.is_empty() {
        array(board, &["cards"])
    } else {
        column_cards
    };

    cards
        .iter()
        .filter(|card| {
            get_str(card, &["listId"]).is_none_or(|list| list.is_empty() || list == section_id)
        })
        .filter_map(|card| get_string(card, &["id"]))
        .collect()
}

/// Extracts card fields from a card-info response and its activity feed.
#[must_use]
pub fn task_draft(card: &Value, activities: &Value) -> TaskDraft {
    let card = unwrap_data(card);

    let description = match get_str(card, &["description"]).map(str::trim) {
        Some(text) if !text.is_empty() => DocumentInput::Plain(text.to_owned()),
        _ => DocumentInput::Absent,
    };

    TaskDraft {
        id: get_string(card, &["id"]).unwrap_or_default(),
        title: get_string(card, &["title"]).unwrap_or_default(),
        priority: priority(card),
        due_date: get_string(card, &["dueDate"]),
        labels: array(card, &["tags"]).iter().filter_map(tag_name).collect(),
        description,
        comments: comment_thread(activities),
    }
}

/// Builds comment trees from a card activity feed.
///
/// Non-comment activities are skipped.
#[must_use]
pub fn comment_thread(activities: &Value) -> Vec<CommentNode> {
    as_slice(unwrap_data(activities))
        .iter()
        .filter(|activity| get_str(activity, &["name"]) == Some(COMMENT_ACTIVITY))
        .map(|activity| CommentNode {
            author: get_string(activity, &["actor", "name"])
                .unwrap_or_else(|| "Unknown".to_owned()),
            body: get_string(activity, &["data", "comment"]).unwrap_or_default(),
            created_at: get_string(activity, &["createdAt"]).unwrap_or_default(),
            replies: array(activity, &["data", "replies"])
                .iter()
                .map(reply)
                .collect(),
        })
        .collect()
}

fn reply(value: &Value) -> CommentNode {
    CommentNode {
        author: get_string(value, &["createdBy", "name"]).unwrap_or_else(|| "Unknown".to_owned()),
        body: get_string(value, &["content"]).unwrap_or_default(),
        created_at: get_string(value, &["createdAt"]).unwrap_or_default(),
        replies: array(value, &["replies"]).iter().map(reply).collect(),
    }
}

/// Priority names joined with `", "`, else the numeric priority's label.
fn priority(card: &Value) -> Option<String> {
    let names: Vec<&str> = array(card, &["priorities"])
        .iter()
        .filter_map(|p| get_str(p, &["name"]))
        .filter(|name| !name.is_empty())
        .collect();

    if names.is_empty() {
        card.get("priority")
            .and_then(Value::as_i64)
            .map(|code| priority_label(code).to_owned())
    } else {
        Some(names.join(", "))
    }
}

/// Tags are plain strings or objects with a `name`.
fn tag_name(tag: &Value) -> Option<String> {
    tag.as_str()
        .map(str::to_owned)
        .or_else(|| get_string(tag, &["name"]))
}

fn as_slice(value: &Value) -> &[Value] {
    value.as_array().map_or(&[], Vec::as_slice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn board_info() -> Value {
        json!({ "data": {
            "lists": [
                { "id": "todo", "name": "To Do", "cards": [
                    { "id": "c1", "listId": "todo" },
                    { "id": "c2" },
                    { "id": "c3", "listId": "done" }
                ] },
                { "id": "done", "name": "Done" }
            ],
            "cards": [
                { "id": "c4", "listId": "done" },
                { "id": "c5", "listId": "todo" }
            ]
        } })
    }

    #[test]
    fn lists_boards() {
        let response = json!({ "data": [
            { "id": "b1", "name": "Sprint" },
            { "name": "missing id" }
        ] });

        assert_eq!(
            boards(&response),
            vec![BoardInfo { id: "b1".into(), name: "Sprint".into() }]
        );
        assert!(boards(&json!({ "data": {} })).is_empty());
    }

    #[test]
    fn lists_columns_as_sections() {
        let secs = sections(&board_info(), "b1");

        assert_eq!(secs.len(), 2);
        assert_eq!(secs[0].id, "todo");
        assert_eq!(secs[1].name, "Done");
        assert!(secs.iter().all(|s| s.board_id == "b1"));
    }

    #[test]
    fn picks_cards_from_matching_column() {
        assert_eq!(cards_in_section(&board_info(), "todo"), vec!["c1", "c2"]);
    }

    #[test]
    fn falls_back_to_top_level_cards() {
        assert_eq!(cards_in_section(&board_info(), "done"), vec!["c4"]);
        assert!(cards_in_section(&board_info(), "nowhere").is_empty());
    }

    #[test]
    fn extracts_card_fields() {
        let card = json!({ "data": {
            "id": "c1",
            "title": "Broken header",
            "description": "  Header overlaps nav.\n\n",
            "priorities": [{ "name": "High" }, { "name": "" }, { "name": "Customer" }],
            "dueDate": "2024-05-01",
            "tags": ["ui", { "name": "css" }, 3]
        } });

        let draft = task_draft(&card, &Value::Null);

        assert_eq!(draft.id, "c1");
        assert_eq!(draft.title, "Broken header");
        assert_eq!(draft.priority.as_deref(), Some("High, Customer"));
        assert_eq!(draft.due_date.as_deref(), Some("2024-05-01"));
        assert_eq!(draft.labels, vec!["ui".to_owned(), "css".to_owned()]);
        assert_eq!(
            draft.description,
            DocumentInput::Plain("Header overlaps nav.".into())
        );
    }

    #[test]
    fn numeric_priority_fallback() {
        let draft = task_draft(&json!({ "priorities": [], "priority": 2 }), &Value::Null);
        assert_eq!(draft.priority.as_deref(), Some("Medium"));

        let draft = task_draft(&json!({}), &Value::Null);
        assert!(draft.priority.is_none());
        assert_eq!(draft.description, DocumentInput::Absent);
    }

    #[test]
    fn builds_comment_tree_from_activities() {
        let activities = json!({ "data": [
            { "name": "kanban_cards.move" },
            {
                "name": "kanban_cards.comment",
                "createdAt": "2024-01-02T09:15:00.000Z",
                "actor": { "name": "Alice" },
                "data": {
                    "comment": "fixed it",
                    "replies": [{
                        "content": "thanks",
                        "createdBy": { "name": "Bob" },
                        "createdAt": "2024-01-03T10:00:00.000Z",
                        "replies": [{ "content": "np" }]
                    }]
                }
            }
        ] });

        let thread = comment_thread(&activities);

        assert_eq!(thread.len(), 1);
        assert_eq!(thread[0].author, "Alice");
        assert_eq!(thread[0].body, "fixed it");
        assert_eq!(thread[0].replies[0].author, "Bob");
        assert_eq!(thread[0].replies[0].replies[0].author, "Unknown");
        assert_eq!(thread[0].replies[0].replies[0].body, "np");
    }

    #[test]
    fn renders_card_markdown() {
        let card = json!({ "id": "c9", "title": "Login", "tags": ["auth"] });
        let activities = json!([{
            "name": "kanban_cards.comment",
            "createdAt": "2024-01-02T09:15:00Z",
            "actor": { "name": "Alice" },
            "data": { "comment": "repro attached" }
        }]);

        let item = task_draft(&card, &activities).finish().unwrap();

        assert_eq!(
            item.description,
            "# Login\n\n**Labels:** auth\n\n---\n\n## Comments\n\n- **Alice** [2024-01-02]: repro attached\n"
        );
    }
}
