// crates/behavior-profile-cli/src/main.rs
// ============================================================================
// Module: Behavior Profile CLI Entry Point
// Description: Command dispatcher for profile validation, hashing, and simulation.
// Purpose: Provide an offline tool for authoring and dry-running profiles.
// Dependencies: behavior-profile-config, behavior-profile-core, clap, tracing-subscriber
// ============================================================================

//! ## Overview
//! The `behavior-profile` binary checks profile documents, prints their
//! canonical hash, and runs them against a scripted host so authors can see
//! the state changes a profile makes without a live game client. Inputs are
//! size-limited before parsing.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::max;
use std::fs;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use behavior_profile_config::RuntimeConfig;
use behavior_profile_core::HostEvent;
use behavior_profile_core::HostScript;
use behavior_profile_core::Interpreter;
use behavior_profile_core::Profile;
use behavior_profile_core::RunOutcome;
use behavior_profile_core::ScriptedHost;
use behavior_profile_core::SessionState;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a host script JSON input.
const MAX_SCRIPT_BYTES: usize = 4 * 1024 * 1024;
/// Maximum size of a session JSON input.
const MAX_SESSION_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "behavior-profile", version, about = "Validate, hash, and simulate behavior profiles")]
struct Cli {
    /// Path to the runtime config file.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a profile document for authoring errors.
    Validate(ProfileArgs),
    /// Print the canonical hash of a profile document.
    Hash(ProfileArgs),
    /// Run a profile against a scripted host.
    Simulate(SimulateArgs),
}

/// Arguments for commands that read a single profile.
#[derive(Args, Debug)]
struct ProfileArgs {
    /// Profile JSON document.
    #[arg(value_name = "PROFILE")]
    profile: PathBuf,
}

/// Arguments for `simulate`.
#[derive(Args, Debug)]
struct SimulateArgs {
    /// Profile JSON document.
    #[arg(value_name = "PROFILE")]
    profile: PathBuf,
    /// Host script JSON document.
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,
    /// Session JSON to resume from.
    #[arg(long, value_name = "PATH")]
    session: Option<PathBuf>,
    /// Where to write the resulting session JSON.
    #[arg(long, value_name = "PATH")]
    session_out: Option<PathBuf>,
}

/// Report printed by `simulate`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulationReport {
    /// Run outcome.
    outcome: RunOutcome,
    /// Ticks granted by the scripted host.
    ticks_elapsed: u64,
    /// Events recorded by the scripted host.
    events: Vec<HostEvent>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error carrying a message for stderr.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Errors raised while reading size-limited inputs.
#[derive(Debug, Error)]
enum ReadLimitError {
    /// Underlying I/O failure.
    #[error("{0}")]
    Io(std::io::Error),
    /// Input exceeded the size limit.
    #[error("file is {size} bytes, limit is {limit}")]
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

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

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = RuntimeConfig::load(cli.config.as_deref())
        .map_err(|err| CliError::new(err.to_string()))?;
    init_tracing(&config.logging.filter)?;
    if let Some(path) = &config.source_path {
        tracing::debug!(path = %path.display(), "loaded runtime config");
    }
    match cli.command {
        Commands::Validate(args) => command_validate(&config, &args),
        Commands::Hash(args) => command_hash(&config, &args),
        Commands::Simulate(args) => command_simulate(&config, &args),
    }
}

/// Installs the stderr log subscriber; `RUST_LOG` overrides the config filter.
fn init_tracing(default_filter: &str) -> CliResult<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .map_err(|err| CliError::new(format!("failed to install log subscriber: {err}")))
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Validates a profile and reports the first authoring error.
fn command_validate(config: &RuntimeConfig, args: &ProfileArgs) -> CliResult<ExitCode> {
    let profile = read_profile(&args.profile, config.profile.max_profile_bytes)?;
    match profile.validate() {
        Ok(()) => {
            write_stdout_line(&format!(
                "profile {} is valid: {} states, {} transitions, {} data connections",
                profile.id,
                profile.states.len(),
                profile.transitions.len(),
                profile.data_connections.len()
            ))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            write_stderr_line(&format!("profile {} is invalid: {err}", profile.id))?;
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Prints the canonical hash of a profile as JSON.
fn command_hash(config: &RuntimeConfig, args: &ProfileArgs) -> CliResult<ExitCode> {
    let profile = read_profile(&args.profile, config.profile.max_profile_bytes)?;
    let digest = profile
        .canonical_hash()
        .map_err(|err| CliError::new(format!("failed to hash profile: {err}")))?;
    write_json(&digest)?;
    Ok(ExitCode::SUCCESS)
}

/// Runs a simulation and prints the report.
fn command_simulate(config: &RuntimeConfig, args: &SimulateArgs) -> CliResult<ExitCode> {
    let report = simulate(config, args)?;
    if let Some(path) = &args.session_out {
        write_json_file(path, &report.outcome.session)?;
    }
    write_json(&report)?;
    Ok(ExitCode::SUCCESS)
}

/// Loads the simulate inputs and drives the profile to its exit.
fn simulate(config: &RuntimeConfig, args: &SimulateArgs) -> CliResult<SimulationReport> {
    let profile = read_profile(&args.profile, config.profile.max_profile_bytes)?;
    if config.profile.strict_validation {
        profile
            .validate()
            .map_err(|err| CliError::new(format!("profile {} is invalid: {err}", profile.id)))?;
    }
    let script: HostScript = read_json(&args.script, "script", MAX_SCRIPT_BYTES)?;
    let session: Option<SessionState> = args
        .session
        .as_deref()
        .map(|path| read_json(path, "session", MAX_SESSION_BYTES))
        .transpose()?;

    let start_ms = session
        .as_ref()
        .and_then(|session| session.entered_at.as_logical())
        .map_or(script.start_ms, |entered| max(entered, script.start_ms));
    let mut host = ScriptedHost::new(script).with_start_ms(start_ms);
    let interpreter = Interpreter::new(&profile, config.to_interpreter_config());
    let outcome = interpreter.run(&mut host, session);
    Ok(SimulationReport {
        outcome,
        ticks_elapsed: host.ticks_elapsed(),
        events: host.events(),
    })
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Reads and parses a profile document under the configured size limit.
fn read_profile(path: &Path, max_bytes: usize) -> CliResult<Profile> {
    read_json(path, "profile", max_bytes)
}

/// Reads a JSON document with a size limit.
fn read_json<T: DeserializeOwned>(path: &Path, kind: &str, max_bytes: usize) -> CliResult<T> {
    let bytes = read_bytes_with_limit(path, max_bytes).map_err(|err| {
        CliError::new(format!("failed to read {kind} {}: {err}", path.display()))
    })?;
    serde_json::from_slice(&bytes).map_err(|err| {
        CliError::new(format!("failed to parse {kind} {}: {err}", path.display()))
    })
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes pretty JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("failed to serialize output: {err}")))?;
    write_stdout_line(&text)
}

/// Writes pretty JSON to a file.
fn write_json_file<T: Serialize>(path: &Path, value: &T) -> CliResult<()> {
    let mut bytes = serde_json::to_vec_pretty(value)
        .map_err(|err| CliError::new(format!("failed to serialize session: {err}")))?;
    bytes.push(b'\n');
    fs::write(path, bytes)
        .map_err(|err| CliError::new(format!("failed to write {}: {err}", path.display())))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
        .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> CliResult<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
        .map_err(|err| CliError::new(format!("failed to write stderr: {err}")))
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
