// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 The taskdown contributors

//! Typed model of backend payloads.
//!
//! Backends hand us loosely-shaped JSON. This module turns it into a small
//! set of Rust types without ever failing on schema drift: every field is
//! read with a default, and unknown element kinds become
//! [`Element::Other`].
//!
//! # Format Overview
//!
//! A suite-backend rich-text document looks like:
//!
//! ```json
//! { "content": [
//!     { "style": { "headingLevel": 2 },
//!       "elements": [ { "textRun": { "text": "Title", "style": { "bold": true } } } ] }
//! ] }
//! ```
//!
//! Each entry of `content` is one [`Paragraph`]; each entry of `elements`
//! is one [`Element`].
//!
//! # Example
//!
//! ```
//! use taskdown::parser::{DocumentInput, Element};
//!
//! let value = serde_json::json!({
//!     "content": [{ "elements": [{ "textRun": { "text": "hi" } }] }]
//! });
//!
//! let DocumentInput::Structured(doc) = DocumentInput::from_value(Some(&value)) else {
//!     panic!("expected a structured document");
//! };
//! assert!(matches!(doc.paragraphs[0].elements[0], Element::Text(_)));
//! ```

use crate::renderer::MAX_DEPTH;
use serde::Deserialize;
use serde_json::Value;
use snafu::prelude::*;

/// Error type for bundle file parsing failures.
#[derive(Debug, Snafu)]
pub enum ParseError {
    /// Failed to parse JSON content.
    #[snafu(display("failed to parse JSON: {source}"))]
    Json {
        /// The underlying JSON parsing error.
        source: serde_json::Error,
    },
}

/// A structured rich-text document: an ordered list of paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    /// Paragraphs in source order.
    pub paragraphs: Vec<Paragraph>,
}

/// A description as it arrives from a backend.
///
/// Some backends store rich text, others plain markdown, and the field may
/// be missing entirely.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentInput {
    /// No description (missing or `null`).
    Absent,
    /// Already plain text; rendered unchanged.
    Plain(String),
    /// A rich-text document.
    Structured(Document),
}

/// One line-level block of a [`Document`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    /// Paragraph-level style.
    pub style: ParagraphStyle,
    /// Inline elements in source order.
    pub elements: Vec<Element>,
}

/// Paragraph-level styling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParagraphStyle {
    /// Heading level, `0` for body text.
    pub heading_level: u8,
    /// Whether the paragraph is a block quote.
    pub quote: bool,
    /// Whether the whole paragraph is a code block.
    pub code_block: bool,
    /// Language tag for a code-block paragraph.
    pub code_language: String,
    /// List membership, if the paragraph is a list item.
    pub list: Option<ListStyle>,
}

/// List membership of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListStyle {
    /// Ordered or unordered.
    pub kind: ListKind,
    /// Nesting depth, `0` for a top-level item; at most [`MAX_DEPTH`].
    pub indent_level: usize,
}

/// The marker style of a list item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// Numbered list (`1. `).
    Ordered,
    /// Bulleted list (`- `).
    Unordered,
}

/// A span of text with inline style flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct StyledRun {
    /// The raw text.
    pub text: String,
    /// Bold.
    pub bold: bool,
    /// Italic.
    pub italic: bool,
    /// Strikethrough.
    pub strikethrough: bool,
    /// Inline code.
    pub code: bool,
    /// Hyperlink target, if any.
    pub link: Option<String>,
}

/// An inline element within a [`Paragraph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// Styled text.
    Text(StyledRun),

    /// A user mention.
    Mention {
        /// The mentioned user's identifier.
        user_id: String,
    },

    /// An attached file.
    File {
        /// File name, or the file token when no name is present.
        name: String,
    },

    /// An embedded image.
    Image {
        /// The image's file token.
        token: String,
    },

    /// A gallery of images, by file token.
    Gallery(Vec<String>),

    /// A horizontal divider.
    Divider,

    /// A fenced code block embedded in the paragraph.
    CodeBlock {
        /// Language tag (may be empty).
        language: String,
        /// The code itself.
        code: String,
    },

    /// A callout box holding a nested document.
    Callout(Document),

    /// A display equation.
    Equation(String),

    /// A link to an external document.
    DocLink {
        /// Link title (may be empty).
        title: String,
        /// Link target.
        url: String,
    },

    /// An unrecognized element kind; renders as nothing.
    Other,
}

/// A comment and its replies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentNode {
    /// Display name of the author.
    pub author: String,
    /// Comment text.
    pub body: String,
    /// Creation time, as the backend formats it.
    pub created_at: String,
    /// Replies, in source order.
    pub replies: Vec<CommentNode>,
}

/// The contents of one saved backend payload file.
///
/// Field names cover both backends; whichever ones a backend does not use
/// stay `Null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TaskBundle {
    /// Suite-backend task (or the whole get-task response).
    pub task: Value,
    /// Suite-backend comment list.
    pub comments: Value,
    /// Kanban card info (possibly wrapped in `data`).
    pub card: Value,
    /// Kanban activity feed (possibly wrapped in `data`).
    pub activities: Value,
}

impl DocumentInput {
    /// Classifies a raw description value.
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Self::Absent,
            Some(Value::String(text)) => Self::Plain(text.clone()),
            Some(other) => Self::Structured(Document::from_value(other)),
        }
    }
}

impl Document {
    /// Builds a document from its JSON form, ignoring anything malformed.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let paragraphs = array(value, &["content"])
            .iter()
            .map(Paragraph::from_value)
            .collect();
        Self { paragraphs }
    }
}

impl Paragraph {
    fn from_value(value: &Value) -> Self {
        let style = value.get("style").unwrap_or(&Value::Null);

        let list = style.get("list").filter(|l| l.is_object()).map(|l| ListStyle {
            kind: if get_str(l, &["type"]) == Some("number") {
                ListKind::Ordered
            } else {
                ListKind::Unordered
            },
            indent_level: usize::try_from(get_u64(l, &["indentLevel"]))
                .map_or(MAX_DEPTH, |level| level.min(MAX_DEPTH)),
        });

        Self {
            style: ParagraphStyle {
                heading_level: u8::try_from(get_u64(style, &["headingLevel"]))
                    .unwrap_or(u8::MAX),
                quote: get_bool(style, &["quote"]),
                code_block: get_bool(style, &["codeBlock"]),
                code_language: get_string(style, &["codeLanguage"]).unwrap_or_default(),
                list,
            },
            elements: array(value, &["elements"])
                .iter()
                .map(Element::from_value)
                .collect(),
        }
    }
}

impl Element {
    /// Builds an element from its JSON form.
    ///
    /// The element kind is the name of the single key present; the first
    /// recognized key wins.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        if let Some(run) = value.get("textRun") {
            let style = run.get("style").unwrap_or(&Value::Null);
            return Self::Text(StyledRun {
                text: get_string(run, &["text"]).unwrap_or_default(),
                bold: get_bool(style, &["bold"]),
                italic: get_bool(style, &["italic"]),
                strikethrough: get_bool(style, &["strikethrough"]),
                code: get_bool(style, &["codeInline"]),
                link: get_string(style, &["link", "url"]).filter(|url| !url.is_empty()),
            });
        }
        if let Some(mention) = value.get("mentionUser") {
            return Self::Mention {
                user_id: get_string(mention, &["userId"]).unwrap_or_default(),
            };
        }
        if let Some(file) = value.get("file") {
            let token = get_str(file, &["fileToken"]).unwrap_or_default();
            return Self::File {
                name: get_str(file, &["name"]).unwrap_or(token).to_owned(),
            };
        }
        if let Some(image) = value.get("image") {
            return Self::Image {
                token: get_string(image, &["fileToken"]).unwrap_or_default(),
            };
        }
        if let Some(gallery) = value.get("gallery") {
            return Self::Gallery(
                array(gallery, &["imageList"])
                    .iter()
                    .map(|img| get_string(img, &["fileToken"]).unwrap_or_default())
                    .collect(),
            );
        }
        if value.get("divider").is_some() {
            return Self::Divider;
        }
        if let Some(block) = value.get("codeBlock") {
            return Self::CodeBlock {
                language: get_string(block, &["language"]).unwrap_or_default(),
                code: get_string(block, &["text"]).unwrap_or_default(),
            };
        }
        if let Some(callout) = value.get("callout") {
            return Self::Callout(
                callout
                    .get("content")
                    .map(Document::from_value)
                    .unwrap_or_default(),
            );
        }
        if let Some(equation) = value.get("equation") {
            return Self::Equation(get_string(equation, &["content"]).unwrap_or_default());
        }
        if let Some(link) = value.get("docs_link") {
            let url = get_str(link, &["url"]).unwrap_or_default();
            return Self::DocLink {
                title: get_str(link, &["title"]).unwrap_or(url).to_owned(),
                url: url.to_owned(),
            };
        }
        Self::Other
    }
}

/// Parses the contents of a saved payload file.
///
/// # Errors
///
/// Returns an error if the text is not valid JSON or does not have the
/// shape of a bundle.
///
/// # Example
///
/// ```
/// use taskdown::parser::parse_bundle;
///
/// let bundle = parse_bundle(r#"{ "task": { "summary": "Fix login" } }"#).unwrap();
/// assert_eq!(bundle.task["summary"], "Fix login");
/// assert!(bundle.comments.is_null());
/// ```
pub fn parse_bundle(json_str: &str) -> Result<TaskBundle, ParseError> {
    serde_json::from_str(json_str).context(JsonSnafu)
}

/// Returns the payload inside a `{"data": ...}` envelope, or the value itself.
#[must_use]
pub fn unwrap_data(value: &Value) -> &Value {
    value.get("data").unwrap_or(value)
}

/// Navigates a JSON path and returns the string value at the end.
pub(crate) fn get_str<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    walk(value, path)?.as_str()
}

/// Like [`get_str`] but returns an owned `String`.
pub(crate) fn get_string(value: &Value, path: &[&str]) -> Option<String> {
    get_str(value, path).map(str::to_owned)
}

/// Reads a boolean flag; anything other than `true` counts as unset.
pub(crate) fn get_bool(value: &Value, path: &[&str]) -> bool {
    walk(value, path)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

/// Reads a non-negative integer, defaulting to `0`.
pub(crate) fn get_u64(value: &Value, path: &[&str]) -> u64 {
    walk(value, path).and_then(Value::as_u64).unwrap_or(0)
}

/// Reads an array, defaulting to an empty slice.
pub(crate) fn array<'a>(value: &'a Value, path: &[&str]) -> &'a [Value] {
    walk(value, path)
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

fn walk<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = value;
    for key in path {
        current = current.get(*key)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paragraph(elements: &Value) -> Paragraph {
        Paragraph::from_value(&json!({ "elements": elements }))
    }

    #[test]
    fn classifies_document_input() {
        assert_eq!(DocumentInput::from_value(None), DocumentInput::Absent);
        assert_eq!(
            DocumentInput::from_value(Some(&Value::Null)),
            DocumentInput::Absent
        );
        assert_eq!(
            DocumentInput::from_value(Some(&json!("plain"))),
            DocumentInput::Plain("plain".into())
        );
        assert!(matches!(
            DocumentInput::from_value(Some(&json!({ "content": [] }))),
            DocumentInput::Structured(_)
        ));
    }

    #[test]
    fn parses_text_run_styles() {
        let p = paragraph(&json!([{
            "textRun": {
                "text": "hi",
                "style": { "bold": true, "codeInline": true, "link": { "url": "https://x.test" } }
            }
        }]));

        match &p.elements[0] {
            Element::Text(run) => {
                assert_eq!(run.text, "hi");
                assert!(run.bold);
                assert!(!run.italic);
                assert!(run.code);
                assert_eq!(run.link.as_deref(), Some("https://x.test"));
            }
            other => panic!("Expected Text, got {other:?}"),
        }
    }

    #[test]
    fn empty_link_url_is_no_link() {
        let p = paragraph(&json!([{ "textRun": { "text": "a", "style": { "link": { "url": "" } } } }]));

        match &p.elements[0] {
            Element::Text(run) => assert!(run.link.is_none()),
            other => panic!("Expected Text, got {other:?}"),
        }
    }

    #[test]
    fn parses_paragraph_style() {
        let p = Paragraph::from_value(&json!({
            "style": {
                "headingLevel": 3,
                "quote": true,
                "codeBlock": true,
                "codeLanguage": "rust",
                "list": { "type": "number", "indentLevel": 2 }
            },
            "elements": []
        }));

        assert_eq!(p.style.heading_level, 3);
        assert!(p.style.quote);
        assert!(p.style.code_block);
        assert_eq!(p.style.code_language, "rust");
        assert_eq!(
            p.style.list,
            Some(ListStyle {
                kind: ListKind::Ordered,
                indent_level: 2
            })
        );
    }

    #[test]
    fn clamps_huge_indent_level() {
        let p = Paragraph::from_value(&json!({
            "style": { "list": { "type": "bullet", "indentLevel": 4_000_000_000_000_000_000_u64 } }
        }));

        assert_eq!(p.style.list.map(|l| l.indent_level), Some(MAX_DEPTH));
    }

    #[test]
    fn non_number_list_type_is_unordered() {
        let p = Paragraph::from_value(&json!({ "style": { "list": { "type": "bullet" } } }));

        assert_eq!(
            p.style.list,
            Some(ListStyle {
                kind: ListKind::Unordered,
                indent_level: 0
            })
        );
    }

    #[test]
    fn file_name_falls_back_to_token() {
        let p = paragraph(&json!([
            { "file": { "fileToken": "tok1", "name": "report.pdf" } },
            { "file": { "fileToken": "tok2" } }
        ]));

        assert_eq!(
            p.elements,
            vec![
                Element::File { name: "report.pdf".into() },
                Element::File { name: "tok2".into() },
            ]
        );
    }

    #[test]
    fn parses_gallery_tokens_in_order() {
        let p = paragraph(&json!([{
            "gallery": { "imageList": [{ "fileToken": "a" }, { "fileToken": "b" }] }
        }]));

        assert_eq!(p.elements, vec![Element::Gallery(vec!["a".into(), "b".into()])]);
    }

    #[test]
    fn parses_nested_callout() {
        let p = paragraph(&json!([{
            "callout": { "content": { "content": [
                { "elements": [{ "textRun": { "text": "inside" } }] }
            ] } }
        }]));

        match &p.elements[0] {
            Element::Callout(doc) => assert_eq!(doc.paragraphs.len(), 1),
            other => panic!("Expected Callout, got {other:?}"),
        }
    }

    #[test]
    fn doc_link_title_defaults_to_url() {
        let p = paragraph(&json!([{ "docs_link": { "url": "https://doc.test" } }]));

        assert_eq!(
            p.elements,
            vec![Element::DocLink {
                title: "https://doc.test".into(),
                url: "https://doc.test".into(),
            }]
        );
    }

    #[test]
    fn parses_remaining_element_kinds() {
        let p = paragraph(&json!([
            { "mentionUser": { "userId": "ou_1" } },
            { "image": { "fileToken": "img" } },
            { "divider": {} },
            { "codeBlock": { "language": "sh", "text": "ls" } },
            { "equation": { "content": "E=mc^2" } }
        ]));

        assert_eq!(
            p.elements,
            vec![
                Element::Mention { user_id: "ou_1".into() },
                Element::Image { token: "img".into() },
                Element::Divider,
                Element::CodeBlock {
                    language: "sh".into(),
                    code: "ls".into()
                },
                Element::Equation("E=mc^2".into()),
            ]
        );
    }

    #[test]
    fn unknown_and_malformed_elements_become_other() {
        let p = paragraph(&json!([{ "reminder": {} }, "text", 42]));

        assert_eq!(p.elements, vec![Element::Other, Element::Other, Element::Other]);
    }

    #[test]
    fn tolerates_missing_keys_everywhere() {
        let doc = Document::from_value(&json!({ "content": [{}, { "style": null }] }));

        assert_eq!(doc.paragraphs.len(), 2);
        assert!(doc.paragraphs.iter().all(|p| p.elements.is_empty()));
        assert_eq!(doc.paragraphs[0].style, ParagraphStyle::default());
    }

    #[test]
    fn parses_bundle_with_missing_fields() {
        let bundle = parse_bundle(r#"{ "card": { "id": "c1" } }"#).unwrap();

        assert_eq!(bundle.card["id"], "c1");
        assert!(bundle.task.is_null());
        assert!(bundle.activities.is_null());
    }

    #[test]
    fn returns_error_for_invalid_json() {
        assert!(parse_bundle("not valid json").is_err());
    }

    #[test]
    fn unwraps_data_envelope() {
        let wrapped = json!({ "data": { "id": 1 } });
        let bare = json!({ "id": 1 });

        assert_eq!(unwrap_data(&wrapped), &bare);
        assert_eq!(unwrap_data(&bare), &bare);
    }
}
