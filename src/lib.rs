//! replacer: regex search-and-replace across a directory tree or a glob
//!
//! The `replace` binary at src/main.rs is a thin shell over this library.

pub mod cli;
pub mod config;
pub mod diff_formatter;
pub mod error_helpers;
pub mod file_processor;
pub mod glob_expander;
pub mod logger;
pub mod pattern;
pub mod regex_error;
pub mod walker;

pub use cli::{Cli, ColorChoice};
pub use config::{RunConfig, Selection};
pub use diff_formatter::DiffFormatter;
pub use file_processor::{FileOutcome, Replacer, RunSummary};
pub use glob_expander::GlobPattern;
pub use pattern::Pattern;

use anyhow::Result;
use std::io::Write;

/// Execute a run: walk or expand the glob, substituting in each file.
///
/// Returns the summary of what was visited and changed. The first error
/// aborts the run.
pub fn run<W: Write>(config: RunConfig, out: W) -> Result<RunSummary> {
    let use_color = DiffFormatter::should_use_color(config.color);
    let formatter = DiffFormatter::new(config.context_lines, use_color);
    let mut replacer = Replacer::new(config.pattern, config.dry_run, formatter, out);

    match &config.selection {
        Selection::Walk(root) => walker::walk_and_replace(root, &mut replacer)?,
        Selection::Glob(glob) => glob_expander::replace_matches(glob, &mut replacer)?,
    }

    let summary = replacer.summary();
    replacer.into_inner().flush()?;
    Ok(summary)
}
