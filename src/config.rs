//! Run configuration
//!
//! Built once from the parsed command line and never mutated afterwards.
//! Everything that can be rejected without touching the filesystem (the
//! pattern, the glob) is compiled here.

use crate::cli::{Cli, ColorChoice};
use crate::glob_expander::GlobPattern;
use crate::pattern::Pattern;
use anyhow::Result;
use std::path::PathBuf;

/// How files are selected for substitution
#[derive(Debug, Clone)]
pub enum Selection {
    /// Walk this directory recursively, skipping hidden entries
    Walk(PathBuf),
    /// Expand a glob relative to the working directory, without recursion
    Glob(GlobPattern),
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub pattern: Pattern,
    pub dry_run: bool,
    pub selection: Selection,
    pub context_lines: usize,
    pub color: ColorChoice,
}

impl RunConfig {
    /// Compile the pattern and select the traversal mode.
    ///
    /// `cwd` is the root walked when no glob is given.
    pub fn from_cli(cli: &Cli, cwd: PathBuf) -> Result<Self> {
        let pattern = Pattern::compile(&cli.from, cli.to.clone(), cli.ignore_case)?;

        let selection = match cli.glob.as_deref() {
            Some(glob) if !glob.is_empty() => Selection::Glob(GlobPattern::new(glob)?),
            _ => Selection::Walk(cwd),
        };

        Ok(Self {
            pattern,
            dry_run: cli.dryrun,
            selection,
            context_lines: cli.context,
            color: cli.color,
        })
    }
}
