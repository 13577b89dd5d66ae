use crate::cli::ColorChoice;
use colored::*;
use similar::TextDiff;
use std::path::Path;

/// Label of the pre-substitution side of every diff
pub const ORIGINAL_LABEL: &str = "Original";
/// Label of the post-substitution side of every diff
pub const REPLACEMENT_LABEL: &str = "Replacement";

/// Renders per-file unified diffs for dry-run output
#[derive(Debug, Clone)]
pub struct DiffFormatter {
    context_lines: usize,
    use_color: bool,
}

impl DiffFormatter {
    pub const DEFAULT_CONTEXT: usize = 3;

    pub fn new(context_lines: usize, use_color: bool) -> Self {
        Self {
            context_lines,
            use_color,
        }
    }

    /// Plain formatter with the default context, for tests and piping
    pub fn plain() -> Self {
        Self::new(Self::DEFAULT_CONTEXT, false)
    }

    /// Resolve a colour choice against the environment
    pub fn should_use_color(choice: ColorChoice) -> bool {
        match choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => {
                // Check NO_COLOR env var (https://no-color.org/)
                if std::env::var_os("NO_COLOR").is_some() {
                    return false;
                }
                atty::is(atty::Stream::Stdout)
            }
        }
    }

    /// Unified diff of two contents, empty when they are equal line-wise
    pub fn unified_diff(&self, original: &str, replaced: &str) -> String {
        TextDiff::from_lines(original, replaced)
            .unified_diff()
            .context_radius(self.context_lines)
            .header(ORIGINAL_LABEL, REPLACEMENT_LABEL)
            .to_string()
    }

    /// Header line naming `path` followed by the diff body.
    ///
    /// Returns `None` when the diff is empty, so files without changes print
    /// nothing at all.
    pub fn format_file_block(&self, path: &Path, original: &str, replaced: &str) -> Option<String> {
        let body = self.unified_diff(original, replaced);
        if body.is_empty() {
            return None;
        }

        let mut output = String::new();
        if self.use_color {
            output.push_str(&format!("{}\n", path.display().to_string().bold().cyan()));
            for (idx, line) in body.lines().enumerate() {
                output.push_str(&Self::colorize_line(idx, line));
                output.push('\n');
            }
        } else {
            output.push_str(&format!("{}\n", path.display()));
            output.push_str(&body);
        }

        Some(output)
    }

    /// Header line naming `path` and a note that the bytes differ.
    ///
    /// Used when a change is invisible once both sides are decoded as text,
    /// e.g. invalid UTF-8 replaced by U+FFFD.
    pub fn format_binary_block(&self, path: &Path) -> String {
        let header = path.display().to_string();
        if self.use_color {
            format!("{}\n{}\n", header.bold().cyan(), "Binary content differs".yellow())
        } else {
            format!("{}\nBinary content differs\n", header)
        }
    }

    fn colorize_line(idx: usize, line: &str) -> String {
        // The first two lines are always the ---/+++ file header
        if idx < 2 {
            return line.bold().to_string();
        }
        if line.starts_with("@@") {
            line.cyan().to_string()
        } else if line.starts_with('+') {
            line.green().to_string()
        } else if line.starts_with('-') {
            line.red().to_string()
        } else if line.starts_with('\\') {
            line.dimmed().to_string()
        } else {
            line.to_string()
        }
    }
}

impl Default for DiffFormatter {
    fn default() -> Self {
        Self::plain()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_change() {
        let diff = DiffFormatter::plain().unified_diff("foo bar foo\n", "baz bar baz\n");
        assert_eq!(
            diff,
            "--- Original\n+++ Replacement\n@@ -1 +1 @@\n-foo bar foo\n+baz bar baz\n"
        );
    }

    #[test]
    fn test_no_changes_is_empty() {
        let diff = DiffFormatter::plain().unified_diff("same\ncontent\n", "same\ncontent\n");
        assert!(diff.is_empty());
    }

    #[test]
    fn test_context_is_limited_to_three_lines() {
        let original: String = (1..=20).map(|i| format!("line {}\n", i)).collect();
        let replaced = original.replace("line 10\n", "LINE TEN\n");
        let diff = DiffFormatter::plain().unified_diff(&original, &replaced);

        assert!(diff.contains("@@ -7,7 +7,7 @@"));
        assert!(diff.contains(" line 7\n"));
        assert!(diff.contains(" line 13\n"));
        assert!(!diff.contains("line 6\n"));
        assert!(!diff.contains("line 14\n"));
    }

    #[test]
    fn test_custom_context() {
        let original = "a\nb\nc\nd\ne\n";
        let replaced = "a\nb\nC\nd\ne\n";
        let diff = DiffFormatter::new(0, false).unified_diff(original, replaced);
        assert!(diff.contains("@@ -3 +3 @@\n-c\n+C\n"));
        assert!(!diff.contains(" b\n"));
    }

    #[test]
    fn test_file_block_has_path_header() {
        let block = DiffFormatter::plain()
            .format_file_block(Path::new("dir/a.txt"), "foo\n", "bar\n")
            .unwrap();
        assert!(block.starts_with("dir/a.txt\n--- Original\n+++ Replacement\n"));
        assert!(block.ends_with("-foo\n+bar\n"));
    }

    #[test]
    fn test_file_block_none_without_changes() {
        let block = DiffFormatter::plain().format_file_block(Path::new("a.txt"), "foo\n", "foo\n");
        assert!(block.is_none());
    }

    #[test]
    fn test_binary_block() {
        let block = DiffFormatter::plain().format_binary_block(Path::new("blob.bin"));
        assert_eq!(block, "blob.bin\nBinary content differs\n");
    }

    #[test]
    fn test_missing_trailing_newline_is_marked() {
        let diff = DiffFormatter::plain().unified_diff("foo", "bar");
        assert!(diff.contains("-foo\n"));
        assert!(diff.contains("+bar\n"));
        assert!(diff.contains("No newline at end of file"));
    }

    #[test]
    fn test_explicit_color_choices() {
        assert!(DiffFormatter::should_use_color(ColorChoice::Always));
        assert!(!DiffFormatter::should_use_color(ColorChoice::Never));
    }
}
