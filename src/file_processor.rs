use crate::diff_formatter::DiffFormatter;
use crate::error_helpers::file_error;
use crate::pattern::Pattern;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// What happened to a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// No match, or the replacement reproduced the original bytes
    Unchanged,
    /// Dry run: a diff block (or a binary-differs note) was written
    Previewed { matches: usize },
    /// Commit: the file was rewritten in place
    Rewritten { matches: usize },
}

/// Counters accumulated over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_visited: usize,
    pub files_changed: usize,
    pub matches: usize,
}

impl RunSummary {
    fn record(&mut self, outcome: FileOutcome) {
        self.files_visited += 1;
        match outcome {
            FileOutcome::Unchanged => {}
            FileOutcome::Previewed { matches } | FileOutcome::Rewritten { matches } => {
                self.files_changed += 1;
                self.matches += matches;
            }
        }
    }
}

/// Applies one pattern to files, one at a time.
///
/// Dry-run diff blocks go to `out`; commits go straight to disk.
pub struct Replacer<W: Write> {
    pattern: Pattern,
    dry_run: bool,
    formatter: DiffFormatter,
    out: W,
    summary: RunSummary,
}

impl<W: Write> Replacer<W> {
    pub fn new(pattern: Pattern, dry_run: bool, formatter: DiffFormatter, out: W) -> Self {
        Self {
            pattern,
            dry_run,
            formatter,
            out,
            summary: RunSummary::default(),
        }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Give back the output sink
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Substitute every match in `path`, then preview or commit the result.
    ///
    /// The file's permission bits survive a commit unchanged. Files whose
    /// content would not change are never written.
    pub fn replace_file(&mut self, path: &Path) -> Result<FileOutcome> {
        let original = fs::read(path).map_err(|e| {
            let msg = file_error(path, "reading", &e);
            anyhow::Error::new(e).context(msg)
        })?;

        let replaced = self.pattern.replace_all(&original);
        let outcome = if *replaced == *original {
            debug!(path = %path.display(), "no changes");
            FileOutcome::Unchanged
        } else {
            let matches = self.pattern.count_matches(&original);
            if self.dry_run {
                self.preview(path, &original, &replaced)?;
                FileOutcome::Previewed { matches }
            } else {
                self.commit(path, &replaced)?;
                info!(path = %path.display(), matches, "rewrote file");
                FileOutcome::Rewritten { matches }
            }
        };

        self.summary.record(outcome);
        Ok(outcome)
    }

    fn preview(&mut self, path: &Path, original: &[u8], replaced: &[u8]) -> Result<()> {
        let original = String::from_utf8_lossy(original);
        let replaced = String::from_utf8_lossy(replaced);

        let block = self
            .formatter
            .format_file_block(path, &original, &replaced)
            .unwrap_or_else(|| self.formatter.format_binary_block(path));
        self.out
            .write_all(block.as_bytes())
            .context("Failed to write diff output")?;
        Ok(())
    }

    fn commit(&self, path: &Path, content: &[u8]) -> Result<()> {
        let permissions = fs::metadata(path)
            .map_err(|e| {
                let msg = file_error(path, "reading metadata of", &e);
                anyhow::Error::new(e).context(msg)
            })?
            .permissions();

        fs::write(path, content).map_err(|e| {
            let msg = file_error(path, "writing", &e);
            anyhow::Error::new(e).context(msg)
        })?;

        fs::set_permissions(path, permissions).map_err(|e| {
            let msg = file_error(path, "restoring permissions of", &e);
            anyhow::Error::new(e).context(msg)
        })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn replacer(from: &str, to: &str, dry_run: bool) -> Replacer<Vec<u8>> {
        let pattern = Pattern::compile(from, to, false).unwrap();
        Replacer::new(pattern, dry_run, DiffFormatter::plain(), Vec::new())
    }

    #[test]
    fn test_commit_rewrites_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "foo bar foo").unwrap();

        let mut replacer = replacer("foo", "baz", false);
        let outcome = replacer.replace_file(&path).unwrap();

        assert_eq!(outcome, FileOutcome::Rewritten { matches: 2 });
        assert_eq!(fs::read_to_string(&path).unwrap(), "baz bar baz");
        assert!(replacer.into_inner().is_empty());
    }

    #[test]
    fn test_dry_run_prints_diff_and_keeps_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "foo bar foo\n").unwrap();

        let mut replacer = replacer("foo", "baz", true);
        let outcome = replacer.replace_file(&path).unwrap();

        assert_eq!(outcome, FileOutcome::Previewed { matches: 2 });
        assert_eq!(fs::read_to_string(&path).unwrap(), "foo bar foo\n");

        let output = String::from_utf8(replacer.into_inner()).unwrap();
        assert!(output.starts_with(&format!("{}\n", path.display())));
        assert!(output.contains("--- Original\n+++ Replacement\n"));
        assert!(output.contains("-foo bar foo\n+baz bar baz\n"));
    }

    #[test]
    fn test_no_match_prints_nothing_and_does_not_write() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "nothing here\n").unwrap();
        let modified = fs::metadata(&path).unwrap().modified().unwrap();

        let mut dry = replacer("foo", "baz", true);
        assert_eq!(dry.replace_file(&path).unwrap(), FileOutcome::Unchanged);
        assert!(dry.into_inner().is_empty());

        let mut commit = replacer("foo", "baz", false);
        assert_eq!(commit.replace_file(&path).unwrap(), FileOutcome::Unchanged);
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), modified);
    }

    #[test]
    fn test_identity_replacement_is_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "foo\n").unwrap();

        let mut replacer = replacer("(foo)", "$1", true);
        assert_eq!(replacer.replace_file(&path).unwrap(), FileOutcome::Unchanged);
        assert!(replacer.into_inner().is_empty());
    }

    #[test]
    fn test_backreference_commit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("emails.txt");
        fs::write(&path, "alice@example.com\n").unwrap();

        let mut replacer = replacer(r"(\w+)@example\.com", "$1@redacted.com", false);
        replacer.replace_file(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "alice@redacted.com\n");
    }

    #[test]
    fn test_binary_content_outside_matches_is_preserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob.bin");
        fs::write(&path, b"\x00\xffkey=old\xfe").unwrap();

        let mut replacer = replacer("old", "new", false);
        replacer.replace_file(&path).unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"\x00\xffkey=new\xfe");
    }

    #[test]
    fn test_dry_run_reports_change_hidden_by_lossy_decode() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blob.bin");
        fs::write(&path, b"a\xff\xfeb\n").unwrap();

        // Two replacement characters look identical to the lossy decode of \xff\xfe
        let mut replacer = replacer(r"(?-u)\xff\xfe", "\u{FFFD}\u{FFFD}", true);
        let outcome = replacer.replace_file(&path).unwrap();

        assert_eq!(outcome, FileOutcome::Previewed { matches: 1 });
        let output = String::from_utf8(replacer.into_inner()).unwrap();
        assert_eq!(output, format!("{}\nBinary content differs\n", path.display()));
        assert_eq!(fs::read(&path).unwrap(), b"a\xff\xfeb\n");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("gone.txt");

        let err = replacer("foo", "bar", false).replace_file(&path).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("Failed reading"));
        assert!(msg.contains("gone.txt"));
    }

    #[test]
    fn test_summary_counts() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.txt");
        let b = dir.path().join("b.txt");
        fs::write(&a, "x x x").unwrap();
        fs::write(&b, "y").unwrap();

        let mut replacer = replacer("x", "z", false);
        replacer.replace_file(&a).unwrap();
        replacer.replace_file(&b).unwrap();

        assert_eq!(
            replacer.summary(),
            RunSummary {
                files_visited: 2,
                files_changed: 1,
                matches: 3
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_commit_preserves_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("script.sh");
        fs::write(&path, "echo foo\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o751)).unwrap();

        replacer("foo", "bar", false).replace_file(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "echo bar\n");
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o751);
    }
}
