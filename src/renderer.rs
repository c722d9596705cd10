// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 The taskdown contributors

//! Markdown rendering for rich-text documents and comment threads.
//!
//! Both renderers are pure: the same input always yields the same string,
//! and element order in the output follows input order exactly.
//!
//! # Output Format
//!
//! A [`Document`] renders to one line per paragraph, joined with `\n`.
//! Inline styles wrap in the order bold, italic, strikethrough, inline
//! code, then link. Paragraph styles apply afterwards (code block, else
//! quote, else heading), and list markers wrap outermost.
//!
//! A comment thread renders as a nested markdown list under a
//! `## Comments` heading, two spaces of indentation per reply level.
//!
//! # Example
//!
//! ```
//! use taskdown::parser::{CommentNode, DocumentInput};
//! use taskdown::renderer::{render_comment_tree, render_document};
//!
//! let doc = DocumentInput::Plain("already markdown".into());
//! assert_eq!(render_document(&doc).unwrap(), "already markdown");
//!
//! let thread = vec![CommentNode {
//!     author: "Alice".into(),
//!     body: "fixed it".into(),
//!     created_at: "2024-01-02T10:00:00Z".into(),
//!     replies: vec![],
//! }];
//! let markdown = render_comment_tree(&thread).unwrap();
//! assert!(markdown.contains("- **Alice** [2024-01-02]: fixed it"));
//! ```

use crate::parser::{CommentNode, Document, DocumentInput, Element, ListKind, Paragraph, StyledRun};
use snafu::prelude::*;
use std::fmt::Write;

/// Deepest callout or reply nesting the renderers will descend into.
pub const MAX_DEPTH: usize = 64;

/// Error type for rendering failures.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum RenderError {
    /// Callouts or replies are nested deeper than [`MAX_DEPTH`].
    #[snafu(display("structure too deeply nested (limit is {limit} levels)"))]
    TooDeep {
        /// The nesting limit that was exceeded.
        limit: usize,
    },
}

/// Renders a task description as markdown.
///
/// Absent descriptions render as the empty string and plain-text ones are
/// returned unchanged.
///
/// # Errors
///
/// Returns [`RenderError::TooDeep`] if callouts nest deeper than
/// [`MAX_DEPTH`].
pub fn render_document(input: &DocumentInput) -> Result<String, RenderError> {
    match input {
        DocumentInput::Absent => Ok(String::new()),
        DocumentInput::Plain(text) => Ok(text.clone()),
        DocumentInput::Structured(doc) => render_paragraphs(doc, 0),
    }
}

/// Renders a comment thread under a `## Comments` heading.
///
/// Returns the empty string for an empty thread so callers can skip the
/// section entirely. Top-level comments are separated by a blank line.
///
/// # Errors
///
/// Returns [`RenderError::TooDeep`] if replies nest deeper than
/// [`MAX_DEPTH`].
pub fn render_comment_tree(nodes: &[CommentNode]) -> Result<String, RenderError> {
    if nodes.is_empty() {
        return Ok(String::new());
    }

    let threads = nodes
        .iter()
        .map(|node| render_node(node, 0))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(format!("---\n\n## Comments\n\n{}", threads.join("\n")))
}

/// Renders one comment and its whole reply subtree at the given depth.
///
/// Every line ends with `\n`; replies follow their parent directly.
///
/// # Errors
///
/// Returns [`RenderError::TooDeep`] if `level` (or any reply below it)
/// exceeds [`MAX_DEPTH`].
pub fn render_node(node: &CommentNode, level: usize) -> Result<String, RenderError> {
    let mut out = String::new();
    write_node(&mut out, node, level)?;
    Ok(out)
}

fn write_node(out: &mut String, node: &CommentNode, level: usize) -> Result<(), RenderError> {
    ensure!(level <= MAX_DEPTH, TooDeepSnafu { limit: MAX_DEPTH });

    writeln!(
        out,
        "{}- **{}** [{}]: {}",
        "  ".repeat(level),
        node.author,
        display_date(&node.created_at),
        node.body
    )
    .unwrap();

    for reply in &node.replies {
        write_node(out, reply, level + 1)?;
    }
    Ok(())
}

/// Keeps only the date of an ISO-8601 timestamp; other formats pass through.
fn display_date(created_at: &str) -> &str {
    match created_at.split_once('T') {
        Some((date, _)) => date,
        None => created_at,
    }
}

fn render_paragraphs(doc: &Document, depth: usize) -> Result<String, RenderError> {
    ensure!(depth <= MAX_DEPTH, TooDeepSnafu { limit: MAX_DEPTH });

    let lines = doc
        .paragraphs
        .iter()
        .map(|p| render_paragraph(p, depth))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(lines.join("\n"))
}

fn render_paragraph(paragraph: &Paragraph, depth: usize) -> Result<String, RenderError> {
    let style = &paragraph.style;

    let mut line = String::new();
    for element in &paragraph.elements {
        render_element(&mut line, element, style.code_block, depth)?;
    }

    if style.code_block {
        line = format!("```{}\n{line}\n```", style.code_language);
    } else if style.quote {
        line = format!("> {line}");
    } else if style.heading_level > 0 {
        line = format!("{} {line}", "#".repeat(usize::from(style.heading_level)));
    }

    if let Some(list) = style.list {
        let marker = match list.kind {
            ListKind::Ordered => "1.",
            ListKind::Unordered => "-",
        };
        line = format!("{}{marker} {line}", "  ".repeat(list.indent_level.min(MAX_DEPTH)));
    }

    Ok(line)
}

fn render_element(
    out: &mut String,
    element: &Element,
    in_code_block: bool,
    depth: usize,
) -> Result<(), RenderError> {
    match element {
        Element::Text(run) if in_code_block => out.push_str(&run.text),
        Element::Text(run) => out.push_str(&style_run(run)),
        Element::Mention { user_id } => write!(out, "@{user_id}").unwrap(),
        Element::File { name } => write!(out, "[File: {name}]").unwrap(),
        Element::Image { token } => write!(out, "![Image]({token})").unwrap(),
        Element::Gallery(tokens) => {
            for token in tokens {
                write!(out, "![Image]({token})").unwrap();
            }
        }
        Element::Divider => out.push_str("\n\n---\n\n"),
        Element::CodeBlock { language, code } => {
            write!(out, "```{language}\n{code}\n```").unwrap();
        }
        Element::Callout(doc) => {
            let inner = render_paragraphs(doc, depth + 1)?;
            out.push_str(&quote_lines(&inner));
        }
        Element::Equation(content) => write!(out, "$${content}$$").unwrap(),
        Element::DocLink { title, url } => {
            let label = if title.is_empty() { url } else { title };
            write!(out, "[{label}]({url})").unwrap();
        }
        Element::Other => {}
    }
    Ok(())
}

/// Applies inline styles, each wrapping the result of the previous one.
fn style_run(run: &StyledRun) -> String {
    let mut text = run.text.clone();
    if run.bold {
        text = format!("**{text}**");
    }
    if run.italic {
        text = format!("*{text}*");
    }
    if run.strikethrough {
        text = format!("~~{text}~~");
    }
    if run.code {
        text = format!("`{text}`");
    }
    if let Some(url) = &run.link {
        text = format!("[{text}]({url})");
    }
    text
}

/// Prefixes every line with a block-quote marker.
fn quote_lines(text: &str) -> String {
    if text.is_empty() {
        return "> ".to_owned();
    }
    text.lines()
        .map(|line| format!("> {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}
