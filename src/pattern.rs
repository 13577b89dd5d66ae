//! Compiled search pattern and its replacement template
//!
//! Files are treated as opaque bytes, so the pattern is a byte regex. The
//! template uses the engine's expansion syntax: `$1`, `$name`, `${name}` and
//! `$$` for a literal dollar sign.

use crate::regex_error::compile_regex_with_context;
use anyhow::Result;
use regex::bytes::Regex;
use std::borrow::Cow;

/// A compiled pattern plus the template substituted for each match.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    template: String,
}

impl Pattern {
    /// Compile `source` and pair it with `template`.
    ///
    /// Compile failures carry a classified, human-readable diagnostic.
    pub fn compile(source: &str, template: impl Into<String>, ignore_case: bool) -> Result<Self> {
        let regex = compile_regex_with_context(source, ignore_case)?;
        Ok(Self {
            regex,
            template: template.into(),
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Replace every non-overlapping match, leftmost-first.
    ///
    /// Returns `Cow::Borrowed` when nothing matched.
    pub fn replace_all<'h>(&self, haystack: &'h [u8]) -> Cow<'h, [u8]> {
        self.regex.replace_all(haystack, self.template.as_bytes())
    }

    /// Number of non-overlapping matches in `haystack`.
    pub fn count_matches(&self, haystack: &[u8]) -> usize {
        self.regex.find_iter(haystack).count()
    }

    /// Template references that name no capture group of the pattern.
    ///
    /// The engine silently expands these to the empty string, which usually
    /// means a typo such as `$1_suffix` (parsed as the group `1_suffix`).
    pub fn unknown_group_refs(&self) -> Vec<String> {
        template_group_refs(&self.template)
            .into_iter()
            .filter(|name| !self.has_group(name))
            .collect()
    }

    fn has_group(&self, name: &str) -> bool {
        match name.parse::<usize>() {
            Ok(index) => index < self.regex.captures_len(),
            Err(_) => self.regex.capture_names().flatten().any(|n| n == name),
        }
    }
}

/// Extract the group names and indices referenced by a template.
fn template_group_refs(template: &str) -> Vec<String> {
    let bytes = template.as_bytes();
    let mut refs = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }
        match bytes.get(i + 1) {
            Some(b'$') => i += 2,
            Some(b'{') => match template[i + 2..].find('}') {
                Some(close) => {
                    refs.push(template[i + 2..i + 2 + close].to_string());
                    i += close + 3;
                }
                None => i += 1,
            },
            _ => {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && (bytes[end] == b'_' || bytes[end].is_ascii_alphanumeric()) {
                    end += 1;
                }
                if end > start {
                    refs.push(template[start..end].to_string());
                }
                i = end.max(i + 1);
            }
        }
    }

    refs
}
