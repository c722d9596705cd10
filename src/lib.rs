// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 The taskdown contributors

//! Render task-tracker cards and their comment threads as Markdown.
//!
//! This crate turns task payloads from two kinds of task-tracking backends
//! (a suite-style task manager and a Kanban board) into per-task Markdown
//! files, so tasks can be worked on offline.
//!
//! # Overview
//!
//! 1. A backend adapter ([`lark`] or [`kanban`]) normalizes raw JSON into a
//!    [`task::TaskDraft`]
//! 2. The [`renderer`] turns rich-text descriptions and comment threads into
//!    Markdown, producing a [`task::TaskItem`]
//! 3. The [`workspace`] module writes each task to `<dir>/<id>/description.md`
//!
//! # Example
//!
//! ```
//! use taskdown::kanban;
//!
//! let card = serde_json::json!({
//!     "data": { "id": "c1", "title": "Broken header", "description": "Overlaps nav." }
//! });
//! let activities = serde_json::json!({ "data": [] });
//!
//! let item = kanban::task_draft(&card, &activities).finish().unwrap();
//! assert_eq!(item.description, "# Broken header\n\nOverlaps nav.\n");
//! ```
//!
//! # Modules
//!
//! - [`parser`]: typed model of rich-text documents and comment threads
//! - [`renderer`]: Markdown generation for documents and comment trees
//! - [`task`]: backend-neutral task records and description assembly
//! - [`lark`]: suite-backend payload normalization
//! - [`kanban`]: Kanban-backend payload normalization
//! - [`workspace`]: the on-disk task folder layout

#![deny(missing_docs)]

pub mod kanban;
pub mod lark;
pub mod parser;
pub mod renderer;
pub mod task;
pub mod workspace;
