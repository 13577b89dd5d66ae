use anyhow::{Context, Result};
use replacer::cli::{self, ColorChoice};
use replacer::config::RunConfig;
use replacer::logger;
use std::io::{self, BufWriter};
use tracing::{info, warn};

fn main() -> Result<()> {
    let args = cli::parse_args();

    logger::init_logging(args.verbose, args.log_file.as_deref())?;

    if args.color == ColorChoice::Always {
        colored::control::set_override(true);
    }

    let cwd = std::env::current_dir().context("Failed to resolve the working directory")?;
    let config = RunConfig::from_cli(&args, cwd)?;

    for group in config.pattern.unknown_group_refs() {
        warn!(
            group = %group,
            "--to references a capture group that --from does not define; it will expand to nothing (use ${{1}} to separate a group number from following text)"
        );
    }

    let dry_run = config.dry_run;
    let summary = replacer::run(config, BufWriter::new(io::stdout().lock()))?;

    info!(
        files_visited = summary.files_visited,
        files_changed = summary.files_changed,
        matches = summary.matches,
        dry_run,
        "run complete"
    );

    Ok(())
}
