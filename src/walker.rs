//! Recursive directory traversal
//!
//! Visits every non-hidden entry under a root in file-name order. Symbolic
//! links are never descended, so a cyclic link structure cannot loop the walk.
//! A link whose target is a regular file is processed through the link.

use crate::error_helpers::dir_list_error;
use crate::file_processor::Replacer;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// True for entries whose base name starts with '.'
///
/// Checks the raw name, so names that are not valid UTF-8 count too.
pub fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().as_encoded_bytes().first() == Some(&b'.')
}

/// Whether a symlink entry should be processed: only links to regular files
fn links_to_file(entry: &DirEntry) -> bool {
    match fs::metadata(entry.path()) {
        Ok(target) if target.is_file() => true,
        Ok(_) => {
            debug!(path = %entry.path().display(), "skipping link to non-regular file");
            false
        }
        Err(err) => {
            warn!(path = %entry.path().display(), error = %err, "skipping dangling link");
            false
        }
    }
}

/// Regular files under `root`, in visiting order.
///
/// Hidden files are skipped and hidden directories are not descended into.
/// The root itself is exempt from the hidden rule.
pub fn visit_files(root: &Path) -> impl Iterator<Item = Result<PathBuf>> {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry))
        .filter_map(move |entry| match entry {
            Ok(entry) => {
                let file_type = entry.file_type();
                if file_type.is_file() || (file_type.is_symlink() && links_to_file(&entry)) {
                    Some(Ok(entry.into_path()))
                } else {
                    if !file_type.is_dir() && !file_type.is_symlink() {
                        debug!(path = %entry.path().display(), "skipping non-regular file");
                    }
                    None
                }
            }
            Err(err) => {
                let dir = err.path().unwrap_or(root).to_path_buf();
                Some(Err(anyhow::Error::new(err).context(dir_list_error(&dir))))
            }
        })
}

/// Run `replacer` on every regular file under `root`.
///
/// The first error, listing a directory or processing a file, stops the walk.
pub fn walk_and_replace<W: Write>(root: &Path, replacer: &mut Replacer<W>) -> Result<()> {
    debug!(root = %root.display(), "walking directory");

    for path in visit_files(root) {
        let path = path?;
        replacer
            .replace_file(&path)
            .with_context(|| format!("Aborting walk of '{}'", root.display()))?;
    }

    Ok(())
}
