use clap::builder::NonEmptyStringValueParser;
use clap::{ArgAction, Parser, ValueEnum};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "

License: MIT
Rust Edition: 2024"
);

#[derive(Parser, Debug)]
#[command(name = "replace")]
#[command(about = "Regex search-and-replace across a directory tree, in place or as a diff preview")]
#[command(long_about = "replace rewrites every file under the current directory (or every file
matched by --glob) by substituting all matches of a regular expression.

Hidden files and directories (names starting with '.') are skipped when
walking. Use --dryrun to print a unified diff per affected file instead of
modifying anything.

REPLACEMENT SYNTAX:
  $1, $2        Numbered capture groups
  ${name}       Named capture group (?P<name>...)
  $$            A literal '$'
  Use ${1} instead of $1 when the reference is followed by a letter,
  digit or underscore ($1_x names the group '1_x').

EXAMPLES:
  replace --from foo --to bar                     Rewrite all files below .
  replace --from foo --to bar --dryrun            Preview the changes
  replace --from '(\\w+)@example\\.com' --to '$1@redacted.com'
  replace --from 'v1\\.2' --to v1.3 --glob '*.toml'
  replace -i --from colour --to color --glob 'docs/*.md'")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = LONG_VERSION)]
pub struct Cli {
    /// Regular expression describing the text to replace
    #[arg(long, value_name = "PATTERN", value_parser = NonEmptyStringValueParser::new())]
    pub from: String,

    /// Replacement text; may reference capture groups ($1, ${name})
    #[arg(long, value_name = "REPLACEMENT", default_value = "", allow_hyphen_values = true)]
    pub to: String,

    /// Print a diff per affected file instead of modifying files
    #[arg(short = 'd', long, alias = "dry-run")]
    pub dryrun: bool,

    /// Select files with a glob (e.g. '*.txt') instead of walking the tree
    #[arg(long, value_name = "GLOB")]
    pub glob: Option<String>,

    /// Match case-insensitively
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Lines of context around each change in --dryrun output
    #[arg(short = 'C', long, value_name = "NUM", default_value_t = 3)]
    pub context: usize,

    /// When to colour --dryrun output
    #[arg(long, value_name = "WHEN", value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Append logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Colour when stdout is a terminal and NO_COLOR is unset
    Auto,
    Always,
    Never,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
