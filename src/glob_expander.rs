//! Glob-based file selection
//!
//! A glob is split into a literal directory prefix and a wildcard tail. The
//! tail is matched against entries exactly as many levels below the prefix as
//! it has components: wildcards never cross a '/', so there is no implicit
//! recursion.

use crate::file_processor::Replacer;
use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobMatcher};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const GLOB_META: &[char] = &['*', '?', '[', '{', '\\'];

#[derive(Debug, Clone)]
pub struct GlobPattern {
    raw: String,
    /// Leading components without wildcards
    base: PathBuf,
    /// Number of wildcard-bearing components after `base`
    depth: usize,
    /// `None` when the whole pattern is a literal path
    matcher: Option<GlobMatcher>,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let mut base = PathBuf::new();
        if pattern.starts_with('/') {
            base.push("/");
        }

        let components: Vec<&str> = pattern.split('/').filter(|c| !c.is_empty()).collect();
        let literal_len = components
            .iter()
            .take_while(|c| !c.contains(GLOB_META))
            .count();
        base.extend(&components[..literal_len]);

        let tail = &components[literal_len..];
        // Walked entries never include '.' or '..', so such a tail could not match
        if tail.iter().any(|c| *c == "." || *c == "..") {
            anyhow::bail!(
                "Invalid glob '{}': '.' and '..' are only allowed before the first wildcard",
                pattern
            );
        }
        let matcher = if tail.is_empty() {
            None
        } else {
            let glob = GlobBuilder::new(&tail.join("/"))
                .literal_separator(true)
                .backslash_escape(true)
                .build()
                .with_context(|| format!("Invalid glob '{}'", pattern))?;
            Some(glob.compile_matcher())
        };

        Ok(Self {
            raw: pattern.to_string(),
            base,
            depth: tail.len(),
            matcher,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Expand against the process working directory.
    ///
    /// Relative patterns yield relative paths, as typed.
    pub fn expand(&self) -> Result<Vec<PathBuf>> {
        self.expand_in(Path::new(""))
    }

    /// Expand against `cwd`, returning matches in file-name order.
    pub fn expand_in(&self, cwd: &Path) -> Result<Vec<PathBuf>> {
        let base = resolve(cwd, &self.base);

        let Some(matcher) = &self.matcher else {
            return Ok(if fs::symlink_metadata(&base).is_ok() {
                vec![base]
            } else {
                Vec::new()
            });
        };

        let walk_root = if base.as_os_str().is_empty() {
            PathBuf::from(".")
        } else {
            base.clone()
        };
        if !walk_root.is_dir() {
            debug!(dir = %walk_root.display(), "glob base is not a directory");
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        let walker = WalkDir::new(&walk_root)
            .follow_links(false)
            .min_depth(self.depth)
            .max_depth(self.depth)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry.with_context(|| format!("Failed to expand glob '{}'", self.raw))?;
            let Ok(relative) = entry.path().strip_prefix(&walk_root) else {
                continue;
            };
            if matcher.is_match(relative) {
                matches.push(base.join(relative));
            }
        }

        Ok(matches)
    }
}

fn resolve(cwd: &Path, path: &Path) -> PathBuf {
    if cwd.as_os_str().is_empty() {
        path.to_path_buf()
    } else if path.as_os_str().is_empty() {
        cwd.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Run `replacer` on every file the glob matches in the working directory.
pub fn replace_matches<W: Write>(glob: &GlobPattern, replacer: &mut Replacer<W>) -> Result<()> {
    replace_matches_in(glob, Path::new(""), replacer)
}

/// Run `replacer` on every file the glob matches under `cwd`.
///
/// Matched directories are skipped with a warning rather than descended.
/// The first failing file stops the run.
pub fn replace_matches_in<W: Write>(
    glob: &GlobPattern,
    cwd: &Path,
    replacer: &mut Replacer<W>,
) -> Result<()> {
    let matches = glob.expand_in(cwd)?;
    if matches.is_empty() {
        warn!(glob = glob.as_str(), "glob matched no files");
    }

    for path in matches {
        if path.is_dir() {
            warn!(path = %path.display(), "skipping directory matched by glob");
            continue;
        }
        replacer.replace_file(&path)?;
    }

    Ok(())
}
