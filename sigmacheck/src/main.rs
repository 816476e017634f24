//! # sigmacheck
//!
//! A CLI for checking raw metrology exports against Sigma history data.
//!
//! ## Overview
//!
//! sigmacheck is built on top of sigmachecklib and walks through the
//! verification workflow one step per command: find an export, clean it,
//! pull the matching Sigma rows, compare a column from each, and export the
//! comparisons collected so far.
//!
//! ## Usage
//!
//! ```bash
//! # Find exports for a lot and wafer
//! sigmacheck search /data/metrology -k LOT123,W01
//!
//! # Clean an export and keep only thickness columns
//! sigmacheck clean /data/metrology/LOT123_W01.csv --columns THK
//!
//! # Show the Sigma rows for a wafer from a result-set snapshot
//! sigmacheck sigma --snapshot sigma.csv --lot-id LOT123 --wafer-scribe SCR01 \
//!     --tool-id TOOL9 --mfg-process-step STEP5 --wafer-spec-id SPEC2 --rows THK
//!
//! # Compare one column from each side and add it to the session
//! sigmacheck compare /data/metrology/LOT123_W01.csv --raw-column THK_P01 \
//!     --sigma-column TEST_VALUE --snapshot sigma.csv --lot-id LOT123 ...
//!
//! # Export everything compared so far, then start over
//! sigmacheck session export -f comparison_results.xlsx
//! sigmacheck session reset
//! ```

mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use sigmachecklib::options::DEFAULT_EXPORT_FILE;
use sigmachecklib::{
    export_csv, export_xlsx, fetch_sigma, filter_columns, filter_rows, normalize_file,
    parse_keywords, search_files, CleanStage, ComparisonSession, LocatorConfig, Normalized,
    SigmaQuery, SnapshotSigmaSource, Table, WorkArea,
};
use tracing::{debug, warn};
use tracing_subscriber::{fmt, EnvFilter};

use render::{render_paths, render_table, OutputMode};

/// Build the five Sigma identifier arguments
fn sigma_args() -> Vec<Arg> {
    [
        ("lot-id", "Lot identifier (LotId)"),
        ("wafer-scribe", "Wafer scribe (WaferScribe)"),
        ("tool-id", "Metrology tool identifier (ToolId)"),
        ("mfg-process-step", "Manufacturing process step (MFG_PROCESS_STEP)"),
        ("wafer-spec-id", "Wafer spec identifier (WaferSpecId)"),
    ]
    .into_iter()
    .map(|(name, help)| Arg::new(name).long(name).required(true).help(help))
    .chain(std::iter::once(
        Arg::new("snapshot")
            .long("snapshot")
            .required(true)
            .help("CSV snapshot of the Sigma measurement result set"),
    ))
    .collect()
}

fn columns_arg() -> Arg {
    Arg::new("columns")
        .short('c')
        .long("columns")
        .action(ArgAction::Append)
        .help("Keep only columns whose name contains these keywords (comma-separated)")
}

fn rows_arg() -> Arg {
    Arg::new("rows")
        .short('r')
        .long("rows")
        .action(ArgAction::Append)
        .help("Keep only rows with a cell containing these keywords (comma-separated)")
}

/// Build the clap Command structure
fn build_command() -> Command {
    Command::new("sigmacheck")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Check raw metrology exports against Sigma history data")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("workdir")
                .short('w')
                .long("workdir")
                .global(true)
                .default_value(".")
                .help("Directory for intermediate files and the comparison session"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .global(true)
                .default_value("table")
                .value_parser(["table", "json", "csv"])
                .help("Output format"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("Log progress to stderr (-vv for debug detail)"),
        )
        .subcommand(
            Command::new("search")
                .about("Find export files whose names contain every keyword")
                .arg(Arg::new("dir").required(true).help("Directory to search"))
                .arg(
                    Arg::new("keywords")
                        .short('k')
                        .long("keywords")
                        .action(ArgAction::Append)
                        .help("Filename keywords (comma-separated, case-insensitive)"),
                ),
        )
        .subcommand(
            Command::new("clean")
                .about("Normalize an export file into a clean table")
                .arg(Arg::new("file").required(true).help("Export file to clean"))
                .arg(columns_arg())
                .arg(rows_arg()),
        )
        .subcommand(
            Command::new("sigma")
                .about("Fetch Sigma measurement data for one wafer")
                .args(sigma_args())
                .arg(rows_arg()),
        )
        .subcommand(
            Command::new("compare")
                .about("Compare a raw column with a Sigma column and add it to the session")
                .arg(Arg::new("file").required(true).help("Raw export file"))
                .arg(
                    Arg::new("raw-column")
                        .long("raw-column")
                        .required(true)
                        .help("Column of the cleaned raw data to compare"),
                )
                .arg(
                    Arg::new("sigma-column")
                        .long("sigma-column")
                        .required(true)
                        .help("Column of the Sigma data to compare"),
                )
                .args(sigma_args())
                .arg(columns_arg().help("Narrow raw data columns before comparing"))
                .arg(rows_arg().help("Narrow Sigma data rows before comparing")),
        )
        .subcommand(
            Command::new("session")
                .about("Inspect, export, or reset accumulated comparisons")
                .subcommand_required(true)
                .subcommand(Command::new("show").about("Print the accumulated comparison table"))
                .subcommand(Command::new("reset").about("Discard all accumulated comparisons"))
                .subcommand(
                    Command::new("export")
                        .about("Write the accumulated comparisons to a spreadsheet")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("xlsx")
                                .value_parser(["xlsx", "csv"])
                                .help("Export format"),
                        )
                        .arg(
                            Arg::new("path")
                                .short('f')
                                .long("file")
                                .help("Destination file (defaults to comparison_results.<format> in the workdir)"),
                        ),
                ),
        )
}

/// Shared settings every handler reads
struct Settings {
    work: WorkArea,
    output: OutputMode,
}

fn settings(matches: &ArgMatches) -> Result<Settings, anyhow::Error> {
    let workdir = matches
        .get_one::<String>("workdir")
        .map(|s| s.as_str())
        .unwrap_or(".");
    let output = matches
        .get_one::<String>("output")
        .map(|s| OutputMode::from_str(s))
        .transpose()
        .map_err(anyhow::Error::msg)?
        .unwrap_or_default();
    Ok(Settings {
        work: WorkArea::new(workdir),
        output,
    })
}

/// Collect keyword lists, accepting repeated flags and comma-separated values
fn extract_keywords(matches: &ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| values.flat_map(|v| parse_keywords(v)).collect())
        .unwrap_or_default()
}

fn required<'a>(matches: &'a ArgMatches, id: &str) -> &'a str {
    matches
        .get_one::<String>(id)
        .map(|s| s.as_str())
        .unwrap_or_default()
}

fn sigma_query(matches: &ArgMatches) -> SigmaQuery {
    SigmaQuery::new(
        required(matches, "lot-id"),
        required(matches, "wafer-scribe"),
        required(matches, "tool-id"),
        required(matches, "mfg-process-step"),
        required(matches, "wafer-spec-id"),
    )
}

fn load_sigma(matches: &ArgMatches) -> Result<Table, anyhow::Error> {
    let source = SnapshotSigmaSource::new(required(matches, "snapshot"));
    let sigma = fetch_sigma(&source, &sigma_query(matches))?;
    let keywords = extract_keywords(matches, "rows");
    Ok(filter_rows(&sigma, &keywords))
}

fn normalize_raw(file: &Path, work: &WorkArea) -> Result<Normalized, anyhow::Error> {
    let normalized = normalize_file(file, work)?;
    for warning in &normalized.warnings {
        warn!("{}", warning);
    }
    if normalized.stage != CleanStage::FullyCleaned {
        debug!(stage = ?normalized.stage, "export only partially cleaned");
    }
    Ok(normalized)
}

/// Handler for search command
fn search_handler(matches: &ArgMatches) -> Result<String, anyhow::Error> {
    let ctx = settings(matches)?;
    let dir = required(matches, "dir");
    let config = LocatorConfig::new().keywords(extract_keywords(matches, "keywords"));

    let files = search_files(dir, &config);
    render_paths(&files, ctx.output)
}

/// Handler for clean command
fn clean_handler(matches: &ArgMatches) -> Result<String, anyhow::Error> {
    let ctx = settings(matches)?;
    let file = PathBuf::from(required(matches, "file"));

    let normalized = normalize_raw(&file, &ctx.work)?;
    let table = filter_columns(&normalized.table, &extract_keywords(matches, "columns"));
    let table = filter_rows(&table, &extract_keywords(matches, "rows"));

    let title = format!(
        "{} [{} / {:?}]",
        file.display(),
        normalized.dialect,
        normalized.stage
    );
    render_table(&table, Some(&title), ctx.output)
}

/// Handler for sigma command
fn sigma_handler(matches: &ArgMatches) -> Result<String, anyhow::Error> {
    let ctx = settings(matches)?;
    let sigma = load_sigma(matches)?;
    render_table(&sigma, Some("Sigma data"), ctx.output)
}

/// Handler for compare command
fn compare_handler(matches: &ArgMatches) -> Result<String, anyhow::Error> {
    let ctx = settings(matches)?;
    let file = PathBuf::from(required(matches, "file"));
    let raw_column = required(matches, "raw-column");
    let sigma_column = required(matches, "sigma-column");

    let session_path = ctx.work.session_path();
    let mut session = ComparisonSession::load(&session_path)?;

    let normalized = normalize_raw(&file, &ctx.work)?;
    let raw = filter_columns(&normalized.table, &extract_keywords(matches, "columns"));
    let sigma = load_sigma(matches)?;

    let comparison = session
        .compare_and_append(&raw, raw_column, &sigma, sigma_column)?
        .clone();
    session
        .save(&session_path)
        .with_context(|| format!("comparison done but session not saved to {}", session_path.display()))?;

    let title = format!(
        "{} vs {}: {}/{} sites matched (session holds {} comparisons)",
        raw_column,
        sigma_column,
        comparison.matched_count(),
        comparison.rows.len(),
        session.len()
    );
    render_table(&comparison.to_table(), Some(&title), ctx.output)
}

/// Handler for session subcommands
fn session_handler(matches: &ArgMatches) -> Result<String, anyhow::Error> {
    let (action, sub) = matches
        .subcommand()
        .ok_or_else(|| anyhow::anyhow!("missing session action"))?;
    let ctx = settings(sub)?;
    let session_path = ctx.work.session_path();
    let mut session = ComparisonSession::load(&session_path)?;

    match action {
        "show" => {
            let pairs: Vec<String> = session
                .comparisons()
                .iter()
                .map(|c| format!("{} vs {}", c.raw_column, c.sigma_column))
                .collect();
            let title = format!(
                "Comparison results ({} comparisons: {})",
                session.len(),
                pairs.join(", ")
            );
            render_table(&session.to_table(), Some(&title), ctx.output)
        }
        "reset" => {
            session.reset();
            ctx.work.ensure_dir()?;
            session.save(&session_path)?;
            Ok("Session cleared. You can start a new comparison.\n".to_string())
        }
        "export" => {
            if session.is_empty() {
                return Err(anyhow::anyhow!("no comparisons to export; run `compare` first"));
            }
            let format = required(sub, "format");
            let path = match sub.get_one::<String>("path") {
                Some(p) => PathBuf::from(p),
                None => ctx
                    .work
                    .dir
                    .join(Path::new(DEFAULT_EXPORT_FILE).with_extension(format)),
            };
            let table = session.to_table();
            match format {
                "csv" => export_csv(&table, &path)?,
                _ => export_xlsx(&table, &path)?,
            }
            Ok(format!(
                "Exported {} comparisons to {}\n",
                session.len(),
                path.display()
            ))
        }
        other => Err(anyhow::anyhow!("unknown session action: {}", other)),
    }
}

/// Set up stderr logging; RUST_LOG wins over -v
fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let matches = build_command().get_matches();

    let verbosity = matches
        .subcommand()
        .map(|(_, sub)| sub.get_count("verbose"))
        .unwrap_or_else(|| matches.get_count("verbose"));
    init_logging(verbosity);

    let result = match matches.subcommand() {
        Some(("search", sub)) => search_handler(sub),
        Some(("clean", sub)) => clean_handler(sub),
        Some(("sigma", sub)) => sigma_handler(sub),
        Some(("compare", sub)) => compare_handler(sub),
        Some(("session", sub)) => session_handler(sub),
        _ => Err(anyhow::anyhow!("no command given; see --help")),
    };

    match result {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
