//! Regex Error Handling
//!
//! Turns pattern compilation failures into messages that say what went wrong
//! and how to fix it, instead of only echoing the engine's parse error.

use anyhow::Result;
use regex::bytes::{Regex, RegexBuilder};
use regex::Error as RegexError;

/// Pattern compilation failure with a classification and a hint
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancedRegexError {
    /// The pattern that failed to compile
    pub pattern: String,
    /// What kind of failure this is
    pub error_type: RegexErrorType,
    /// The engine's own message
    pub details: String,
    /// Suggested fix, when one is known
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegexErrorType {
    /// Unclosed group or character class
    UnclosedDelimiter { delimiter: char, position: Option<usize> },
    /// Closing delimiter without an opener
    UnopenedDelimiter { delimiter: char },
    /// Repetition with nothing to repeat, or a malformed counted repetition
    InvalidQuantifier,
    /// Look-ahead or look-behind
    UnsupportedLookaround,
    /// `\1` style backreference inside the pattern
    UnsupportedBackreference,
    /// Unknown escape such as `\q`
    InvalidEscape,
    /// Compiled program exceeds the engine's size limit
    TooBig,
    /// Any other syntax error
    Syntax,
}

impl EnhancedRegexError {
    pub fn from_regex_error(err: &RegexError, pattern: &str) -> Self {
        let details = match err {
            RegexError::Syntax(msg) => msg
                .lines()
                .rev()
                .find_map(|line| line.strip_prefix("error: "))
                .unwrap_or(msg.as_str())
                .to_string(),
            other => other.to_string(),
        };
        let error_type = Self::classify_error(err, &details, pattern);
        let suggestion = Self::generate_suggestion(&error_type, pattern);

        EnhancedRegexError {
            pattern: pattern.to_string(),
            error_type,
            details,
            suggestion,
        }
    }

    fn classify_error(err: &RegexError, details: &str, pattern: &str) -> RegexErrorType {
        if let RegexError::CompiledTooBig(_) = err {
            return RegexErrorType::TooBig;
        }

        let lower = details.to_lowercase();

        if lower.contains("unclosed group") {
            return RegexErrorType::UnclosedDelimiter {
                delimiter: '(',
                position: find_unclosed_delimiter(pattern, '(', ')'),
            };
        }
        if lower.contains("unclosed character class") {
            return RegexErrorType::UnclosedDelimiter {
                delimiter: '[',
                position: find_unclosed_delimiter(pattern, '[', ']'),
            };
        }
        if lower.contains("unopened group") {
            return RegexErrorType::UnopenedDelimiter { delimiter: ')' };
        }
        if lower.contains("look-around") {
            return RegexErrorType::UnsupportedLookaround;
        }
        if lower.contains("backreference") {
            return RegexErrorType::UnsupportedBackreference;
        }
        if lower.contains("repetition") || lower.contains("counted") {
            return RegexErrorType::InvalidQuantifier;
        }
        if lower.contains("escape") {
            return RegexErrorType::InvalidEscape;
        }

        RegexErrorType::Syntax
    }

    fn generate_suggestion(error_type: &RegexErrorType, pattern: &str) -> Option<String> {
        match error_type {
            RegexErrorType::UnclosedDelimiter { delimiter: '(', .. } => Some(
                "Add the missing ')' or escape the parenthesis as '\\(' to match it literally.".to_string(),
            ),
            RegexErrorType::UnclosedDelimiter { .. } => Some(
                "Add the missing ']' or escape the bracket as '\\[' to match it literally.".to_string(),
            ),
            RegexErrorType::UnopenedDelimiter { .. } => Some(
                "Remove the stray ')' or escape it as '\\)' to match it literally.".to_string(),
            ),
            RegexErrorType::InvalidQuantifier => {
                let quantifier = pattern
                    .chars()
                    .find(|c| matches!(c, '*' | '+' | '?' | '{'))
                    .unwrap_or('*');
                Some(format!(
                    "A quantifier needs something before it to repeat. \
                     For a literal '{}', use '\\{}'.",
                    quantifier, quantifier
                ))
            }
            RegexErrorType::UnsupportedLookaround => Some(
                "Look-around is not supported. Capture the surrounding text instead \
                 and put it back with $1, ${name} in --to."
                    .to_string(),
            ),
            RegexErrorType::UnsupportedBackreference => Some(
                "Backreferences are only available in the replacement. \
                 Use $1 or ${name} in --to, not \\1 in --from."
                    .to_string(),
            ),
            RegexErrorType::InvalidEscape => Some(
                "Remove the backslash, or double it ('\\\\') to match a literal backslash.".to_string(),
            ),
            RegexErrorType::TooBig => Some(
                "Simplify the pattern, e.g. replace large counted repetitions like {1000} with + or *."
                    .to_string(),
            ),
            RegexErrorType::Syntax => None,
        }
    }

    /// Format the error as a user-facing message
    pub fn display(&self) -> String {
        let mut output = String::from("Invalid --from pattern\n");
        output.push_str(&format!("  Pattern: \"{}\"\n", self.pattern));

        let kind = match &self.error_type {
            RegexErrorType::UnclosedDelimiter { delimiter, position } => {
                let closing = if *delimiter == '(' { ')' } else { ']' };
                match position {
                    Some(pos) => format!(
                        "Unclosed delimiter (missing '{}' for '{}' at position {})",
                        closing, delimiter, pos
                    ),
                    None => format!("Unclosed delimiter (missing '{}')", closing),
                }
            }
            RegexErrorType::UnopenedDelimiter { delimiter } => {
                format!("Unopened delimiter ('{}' without opener)", delimiter)
            }
            RegexErrorType::InvalidQuantifier => "Invalid quantifier".to_string(),
            RegexErrorType::UnsupportedLookaround => "Unsupported look-around".to_string(),
            RegexErrorType::UnsupportedBackreference => "Unsupported backreference".to_string(),
            RegexErrorType::InvalidEscape => "Invalid escape sequence".to_string(),
            RegexErrorType::TooBig => "Pattern too large".to_string(),
            RegexErrorType::Syntax => "Syntax error".to_string(),
        };
        output.push_str(&format!("  Type: {}\n", kind));
        output.push_str(&format!("  Details: {}\n", self.details));

        if let Some(ref suggestion) = self.suggestion {
            output.push_str(&format!("  Suggestion: {}\n", suggestion));
        }

        output
    }
}

impl std::fmt::Display for EnhancedRegexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display().trim_end())
    }
}

impl std::error::Error for EnhancedRegexError {}

/// Position of the first opener in `pattern` left without a matching closer
fn find_unclosed_delimiter(pattern: &str, open: char, close: char) -> Option<usize> {
    let mut stack = Vec::new();
    let mut escaped = false;

    for (i, c) in pattern.chars().enumerate() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
        } else if c == open {
            stack.push(i);
        } else if c == close {
            stack.pop();
        }
    }

    stack.first().copied()
}

/// Compile a byte regex, mapping failures to [`EnhancedRegexError`]
pub fn compile_regex_with_context(pattern: &str, case_insensitive: bool) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|err| anyhow::Error::new(EnhancedRegexError::from_regex_error(&err, pattern)))
}
