// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 The taskdown contributors

//! Command-line interface for taskdown.
//!
//! This binary converts saved backend task payloads into the local
//! Markdown workspace, one folder per task.

use lexopt::prelude::*;
use snafu::{ensure, prelude::*};
use std::path::{Path, PathBuf};
use taskdown::task::{BackendKind, TaskItem};
use taskdown::workspace::{self, WriteOutcome};
use taskdown::{kanban, lark, parser, renderer};
use walkdir::WalkDir;

/// Where to write the rendered output.
#[derive(Clone)]
enum OutputTarget {
    /// Write each task into its folder under the workspace directory.
    Directory(PathBuf),
    /// Write to stdout.
    Stdout,
}

#[allow(clippy::struct_excessive_bools)]
struct Cli {
    input: Vec<PathBuf>,
    output: OutputTarget,
    backend: BackendKind,
    labels: Vec<String>,
    pending: bool,
    quiet: bool,
    dry_run: bool,
    force: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("at least one input file or directory is required"))]
    NoInputFiles,

    #[snafu(display("cannot output multiple tasks to stdout"))]
    MultipleFilesToStdout,

    #[snafu(display("--pending needs a workspace directory, not stdout"))]
    PendingWithoutWorkspace,

    #[snafu(display("failed to read {}: {source}", path.display()))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to parse {}: {source}", path.display()))]
    ParseFile {
        path: PathBuf,
        source: parser::ParseError,
    },

    #[snafu(display("failed to render {}: {source}", path.display()))]
    RenderFile {
        path: PathBuf,
        source: renderer::RenderError,
    },

    #[snafu(display("{source}"))]
    Workspace { source: workspace::WorkspaceError },
}

fn print_help() {
    println!(
        "\
{name} {version}
Render task-tracker cards and comments as Markdown

Usage: {name} [OPTIONS] -o <OUTPUT> <INPUT>...
       {name} --pending -o <OUTPUT>

Arguments:
  <INPUT>...  Saved task payload files (JSON) or directories containing them

Options:
  -o, --output <OUTPUT>     Workspace directory (or - for stdout)
  -b, --backend <BACKEND>   Backend the payloads came from: lark or kanban (default: lark)
  -l, --labels <LABELS>     Comma-separated labels; keep tasks carrying any of them
      --pending             List task folders in the workspace waiting to be solved

Other options:
  -q, --quiet               Suppress progress messages
  -n, --dry-run             Show what would be processed without writing
  -f, --force               Overwrite existing description files
  -h, --help                Print help
  -V, --version             Print version",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
    );
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    // Show help if no arguments provided
    if std::env::args().len() == 1 {
        print_help();
        std::process::exit(0);
    }

    let mut input = Vec::new();
    let mut output: Option<OutputTarget> = None;
    let mut backend = BackendKind::default();
    let mut labels = Vec::new();
    let mut pending = false;
    let mut quiet = false;
    let mut dry_run = false;
    let mut force = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Short('o') | Long("output") => {
                let val: PathBuf = parser.value()?.parse()?;
                output = Some(if val == Path::new("-") {
                    OutputTarget::Stdout
                } else {
                    OutputTarget::Directory(val)
                });
            }
            Short('b') | Long("backend") => backend = parser.value()?.parse()?,
            Short('l') | Long("labels") => {
                let val = parser.value()?.string()?;
                labels = val
                    .split(',')
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(str::to_owned)
                    .collect();
            }
            Long("pending") => pending = true,
            Short('q') | Long("quiet") => quiet = true,
            Short('n') | Long("dry-run") => dry_run = true,
            Short('f') | Long("force") => force = true,
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Value(val) => input.push(val.parse()?),
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(Cli {
        input,
        output: output.ok_or("missing required option: --output")?,
        backend,
        labels,
        pending,
        quiet,
        dry_run,
        force,
    })
}

fn main() -> Result<(), Error> {
    let cli = parse_args().context(ParseArgsSnafu)?;

    if cli.pending {
        let OutputTarget::Directory(dir) = &cli.output else {
            return PendingWithoutWorkspaceSnafu.fail();
        };
        return list_pending(dir, &cli);
    }

    ensure!(!cli.input.is_empty(), NoInputFilesSnafu);

    let files = collect_input_files(&cli.input);

    match &cli.output {
        OutputTarget::Stdout => {
            ensure!(files.len() == 1, MultipleFilesToStdoutSnafu);
            process_to_stdout(&files[0], &cli)?;
        }
        OutputTarget::Directory(dir) => {
            let mut written = 0;
            for file in &files {
                if process_file(file, dir, &cli)? {
                    written += 1;
                }
            }
            if !cli.quiet && !cli.dry_run {
                eprintln!(
                    "Done: {written} {}(s) saved to {}",
                    cli.backend.item_label(),
                    dir.display()
                );
            }
        }
    }

    Ok(())
}

/// Collects all JSON files from the given inputs (files and directories).
fn collect_input_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input)
                .sort_by_file_name()
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
            {
                files.push(entry.path().to_path_buf());
            }
        } else {
            files.push(input.clone());
        }
    }
    files
}

/// Reads, normalizes and renders one payload file.
fn load_task(path: &Path, backend: BackendKind) -> Result<TaskItem, Error> {
    let json = std::fs::read_to_string(path).context(ReadFileSnafu { path })?;
    let bundle = parser::parse_bundle(&json).context(ParseFileSnafu { path })?;

    let draft = match backend {
        BackendKind::Lark => lark::task_draft(&bundle.task, &bundle.comments),
        BackendKind::Kanban => kanban::task_draft(&bundle.card, &bundle.activities),
    };
    draft.finish().context(RenderFileSnafu { path })
}

/// Processes a single file and outputs to stdout.
fn process_to_stdout(input: &Path, cli: &Cli) -> Result<(), Error> {
    if cli.dry_run {
        eprintln!("Would output {}", input.display());
        return Ok(());
    }

    let task = load_task(input, cli.backend)?;
    if task.has_any_label(&cli.labels) {
        print!("{}", task.description);
    } else if !cli.quiet {
        eprintln!("Skipping {} (no matching labels)", input.display());
    }
    Ok(())
}

/// Processes a single file into the workspace. Returns whether it was written.
fn process_file(input: &Path, out_dir: &Path, cli: &Cli) -> Result<bool, Error> {
    let task = load_task(input, cli.backend)?;

    if !task.has_any_label(&cli.labels) {
        if !cli.quiet {
            eprintln!("Skipping {} (no matching labels)", task.id);
        }
        return Ok(false);
    }

    if cli.dry_run {
        let path = workspace::description_path(out_dir, &task.id).context(WorkspaceSnafu)?;
        eprintln!("Would write {}", path.display());
        return Ok(false);
    }

    match workspace::write_task(out_dir, &task, cli.force).context(WorkspaceSnafu)? {
        WriteOutcome::Written(path) => {
            if !cli.quiet {
                eprintln!("Wrote {} ({})", path.display(), task.title);
            }
            Ok(true)
        }
        WriteOutcome::Skipped(path) => {
            eprintln!(
                "Skipping {} (already exists, use --force to overwrite)",
                path.display()
            );
            Ok(false)
        }
    }
}

/// Prints the IDs of task folders still present in the workspace.
fn list_pending(dir: &Path, cli: &Cli) -> Result<(), Error> {
    let tasks = workspace::pending_tasks(dir).context(WorkspaceSnafu)?;

    if tasks.is_empty() && !cli.quiet {
        eprintln!("No {}s found in {}", cli.backend.item_label(), dir.display());
    }
    for task in &tasks {
        println!("{}", task.id);
    }
    Ok(())
}
