// crates/folio-cli/src/main.rs
// ============================================================================
// Module: Folio CLI Entry Point
// Description: Command dispatcher for content store administration.
// Purpose: Inspect and maintain a sharded content store from the shell.
// Dependencies: clap, folio-config, folio-core, folio-store-sqlite, serde_json,
// thiserror, time, tracing-subscriber.
// ============================================================================

//! ## Overview
//! The `folio` binary opens the content store named by `folio.toml` (or the
//! resolved data directory) and runs one command against it. Every command
//! prints a JSON document on stdout; failures are written to stderr and yield
//! a non-zero exit code. Logs go to stderr through `tracing-subscriber`.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap::Subcommand;
use folio_config::FolioConfig;
use folio_core::ContentId;
use folio_core::ContentRepository;
use folio_core::Metadata;
use folio_core::ScanOutcome;
use folio_store_sqlite::CopyOutcome;
use folio_store_sqlite::ShardedContentRepository;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable holding the log filter.
const LOG_ENV: &str = "FOLIO_LOG";
/// Log filter used when nothing else is configured.
const DEFAULT_LOG_FILTER: &str = "warn";
/// Accepted manual date format.
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "folio", version, disable_help_subcommand = true)]
struct Cli {
    /// Path to `folio.toml` (overrides `FOLIO_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Log filter directives (overrides `FOLIO_LOG` and config).
    #[arg(long, value_name = "FILTER", global = true)]
    log: Option<String>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// List every stored entity, newest first.
    List {
        /// Fail when any shard could not be read.
        #[arg(long)]
        strict: bool,
    },
    /// Print the full aggregate for one entity.
    Show {
        /// Content identifier.
        id: String,
    },
    /// Full-text search across content and markdown pages.
    Search {
        /// Search text; every term must match.
        query: String,
    },
    /// Move an entity to a new identifier.
    Rename {
        /// Current identifier.
        old: String,
        /// New identifier.
        new: String,
    },
    /// Delete an entity and its shard files.
    Delete {
        /// Content identifier.
        id: String,
    },
    /// Tag catalog utilities.
    Tags {
        /// Selected tag subcommand.
        #[command(subcommand)]
        command: TagsCommand,
    },
    /// Manual display date utilities.
    Dates {
        /// Selected date subcommand.
        #[command(subcommand)]
        command: DatesCommand,
    },
}

/// Tag catalog subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum TagsCommand {
    /// List catalog entries.
    List,
    /// Record a tag, optionally replacing its metadata.
    Upsert {
        /// Tag name.
        name: String,
        /// Metadata as a JSON object.
        #[arg(long, value_name = "JSON")]
        metadata: Option<String>,
    },
    /// Remove a tag from the catalog.
    Remove {
        /// Tag name.
        name: String,
    },
}

/// Manual date subcommands.
#[derive(Subcommand, Debug, PartialEq, Eq)]
enum DatesCommand {
    /// List every manual date.
    List,
    /// Show the manual date for one entity.
    Get {
        /// Content identifier.
        id: String,
    },
    /// Set the manual date for one entity.
    Set {
        /// Content identifier.
        id: String,
        /// Date as `YYYY-MM-DD`.
        date: String,
    },
    /// Clear the manual date for one entity.
    Remove {
        /// Content identifier.
        id: String,
    },
}

// ============================================================================
// SECTION: Output Types
// ============================================================================

/// JSON rendering of a store-wide scan.
#[derive(Debug, Serialize)]
struct ScanOutput<T> {
    /// Items read from healthy shards.
    items: Vec<T>,
    /// Shards left out of the scan.
    skipped: Vec<SkippedOutput>,
}

/// JSON rendering of a skipped shard.
#[derive(Debug, Serialize)]
struct SkippedOutput {
    /// Shard file path.
    path: String,
    /// Why it was skipped.
    reason: String,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a human-readable message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Loads configuration, opens the store and dispatches the command.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = FolioConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(err.to_string()))?;
    let env_filter = std::env::var(LOG_ENV).ok();
    let filter = resolve_log_filter(
        cli.log.as_deref(),
        env_filter.as_deref(),
        config.logging.filter.as_deref(),
    );
    init_tracing(filter)?;

    let store_config = config.shard_store_config();
    debug!(root = %store_config.root.display(), "opening content store");
    let repository = ShardedContentRepository::open(store_config)
        .map_err(|err| CliError::new(format!("failed to open content store: {err}")))?;
    let output = execute(&repository, cli.command)?;
    write_json(&output)?;
    Ok(ExitCode::SUCCESS)
}

/// Picks the log filter: flag, then environment, then config, then default.
fn resolve_log_filter<'a>(
    flag: Option<&'a str>,
    env: Option<&'a str>,
    config: Option<&'a str>,
) -> &'a str {
    [flag, env, config]
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .unwrap_or(DEFAULT_LOG_FILTER)
}

/// Installs the stderr log subscriber.
fn init_tracing(filter: &str) -> CliResult<()> {
    let filter = EnvFilter::try_new(filter)
        .map_err(|err| CliError::new(format!("invalid log filter: {err}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| CliError::new(format!("failed to initialise logging: {err}")))
}

// ============================================================================
// SECTION: Dispatch
// ============================================================================

/// Runs one command and returns its JSON output.
fn execute(repository: &ShardedContentRepository, command: Commands) -> CliResult<Value> {
    match command {
        Commands::List {
            strict,
        } => render_scan(repository.list_all(), strict),
        Commands::Show {
            id,
        } => command_show(repository, &parse_content_id(&id)?),
        Commands::Search {
            query,
        } => render_scan(repository.search(&query), false),
        Commands::Rename {
            old,
            new,
        } => command_rename(repository, &parse_content_id(&old)?, &parse_content_id(&new)?),
        Commands::Delete {
            id,
        } => {
            let id = parse_content_id(&id)?;
            let deleted = repository
                .delete(&id)
                .map_err(|err| CliError::new(format!("delete failed: {err}")))?;
            Ok(json!({ "id": id, "deleted": deleted }))
        }
        Commands::Tags {
            command,
        } => command_tags(repository, command),
        Commands::Dates {
            command,
        } => command_dates(repository, command),
    }
}

/// Executes `show`.
fn command_show(repository: &ShardedContentRepository, id: &ContentId) -> CliResult<Value> {
    let aggregate = repository
        .get_by_id(id)
        .map_err(|err| CliError::new(format!("show failed: {err}")))?
        .ok_or_else(|| CliError::new(format!("content not found: {id}")))?;
    to_value(&aggregate)
}

/// Executes `rename`.
fn command_rename(
    repository: &ShardedContentRepository,
    old: &ContentId,
    new: &ContentId,
) -> CliResult<Value> {
    let outcome = repository.rename(old, new);
    match outcome {
        CopyOutcome::Copied => Ok(json!({ "from": old, "to": new, "outcome": "copied" })),
        CopyOutcome::SourceNotRemoved {
            reason,
        } => Ok(json!({
            "from": old,
            "to": new,
            "outcome": "source_not_removed",
            "reason": reason,
        })),
        CopyOutcome::SourceMissing => Err(CliError::new(format!("content not found: {old}"))),
        CopyOutcome::SourceEmpty => Err(CliError::new(format!("shard holds no content: {old}"))),
        CopyOutcome::DestinationExists => {
            Err(CliError::new(format!("destination already exists: {new}")))
        }
        CopyOutcome::Failed {
            reason,
        } => Err(CliError::new(format!("rename failed: {reason}"))),
    }
}

/// Executes `tags` subcommands.
fn command_tags(repository: &ShardedContentRepository, command: TagsCommand) -> CliResult<Value> {
    let catalog = repository.tag_catalog();
    match command {
        TagsCommand::List => {
            let entries =
                catalog.list().map_err(|err| CliError::new(format!("tags list failed: {err}")))?;
            to_value(&entries)
        }
        TagsCommand::Upsert {
            name,
            metadata,
        } => {
            let metadata = metadata.as_deref().map(parse_metadata).transpose()?;
            let entry = catalog
                .upsert(&name, metadata)
                .map_err(|err| CliError::new(format!("tags upsert failed: {err}")))?;
            to_value(&entry)
        }
        TagsCommand::Remove {
            name,
        } => {
            let removed = catalog
                .remove(&name)
                .map_err(|err| CliError::new(format!("tags remove failed: {err}")))?;
            Ok(json!({ "name": name.trim(), "removed": removed }))
        }
    }
}

/// Executes `dates` subcommands.
fn command_dates(repository: &ShardedContentRepository, command: DatesCommand) -> CliResult<Value> {
    let dates = repository.manual_dates();
    match command {
        DatesCommand::List => render_scan(dates.list_all(), false),
        DatesCommand::Get {
            id,
        } => {
            let id = parse_content_id(&id)?;
            let entry = dates
                .get(&id)
                .map_err(|err| CliError::new(format!("dates get failed: {err}")))?
                .ok_or_else(|| CliError::new(format!("no manual date for {id}")))?;
            to_value(&entry)
        }
        DatesCommand::Set {
            id,
            date,
        } => {
            let id = parse_content_id(&id)?;
            let date = parse_date(&date)?;
            let entry = dates
                .set(&id, date)
                .map_err(|err| CliError::new(format!("dates set failed: {err}")))?;
            to_value(&entry)
        }
        DatesCommand::Remove {
            id,
        } => {
            let id = parse_content_id(&id)?;
            let removed = dates
                .remove(&id)
                .map_err(|err| CliError::new(format!("dates remove failed: {err}")))?;
            Ok(json!({ "id": id, "removed": removed }))
        }
    }
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses a non-blank content identifier.
fn parse_content_id(raw: &str) -> CliResult<ContentId> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CliError::new("content id must be non-empty".to_string()));
    }
    Ok(ContentId::new(trimmed))
}

/// Parses a `YYYY-MM-DD` date.
fn parse_date(raw: &str) -> CliResult<Date> {
    Date::parse(raw.trim(), DATE_FORMAT)
        .map_err(|err| CliError::new(format!("invalid date {raw}: {err}")))
}

/// Parses tag metadata; only JSON objects are accepted.
fn parse_metadata(raw: &str) -> CliResult<Metadata> {
    serde_json::from_str(raw).map_err(|err| CliError::new(format!("invalid metadata: {err}")))
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders a scan; `strict` turns skipped shards into an error.
fn render_scan<T: Serialize>(outcome: ScanOutcome<T>, strict: bool) -> CliResult<Value> {
    let (items, skipped) = match outcome {
        ScanOutcome::Complete(items) => (items, Vec::new()),
        ScanOutcome::Partial {
            items,
            skipped,
        } => (items, skipped),
        ScanOutcome::Failed {
            reason,
        } => return Err(CliError::new(format!("scan failed: {reason}"))),
    };
    if strict && !skipped.is_empty() {
        let paths =
            skipped.iter().map(|shard| shard.path.display().to_string()).collect::<Vec<_>>();
        return Err(CliError::new(format!("unreadable shards: {}", paths.join(", "))));
    }
    let skipped = skipped
        .into_iter()
        .map(|shard| SkippedOutput {
            path: shard.path.display().to_string(),
            reason: shard.reason,
        })
        .collect();
    to_value(&ScanOutput {
        items,
        skipped,
    })
}

/// Serializes output into a JSON value.
fn to_value<T: Serialize>(value: &T) -> CliResult<Value> {
    serde_json::to_value(value).map_err(|err| CliError::new(format!("json encoding failed: {err}")))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a pretty JSON document and newline to stdout.
fn write_json(value: &Value) -> CliResult<()> {
    let mut bytes = serde_json::to_vec_pretty(value)
        .map_err(|err| CliError::new(format!("json encoding failed: {err}")))?;
    bytes.push(b'\n');
    let mut stdout = std::io::stdout();
    stdout.write_all(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write to {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
