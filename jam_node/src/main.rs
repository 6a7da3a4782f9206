//! `jam_node`: a thin CLI front-end for `state_processing`'s σ × Block → σ′
//! transition (spec.md §6, §10). No networking or persistence layer here —
//! this binary exists to drive and inspect the state-transition core, the
//! way `lighthouse`'s top-level binary drives `consensus/state_processing`.

use clap::{Parser, Subcommand, ValueEnum};
use jam_types::{Block, Parameters, State};
use state_processing::common::work_group::SyncExecutor;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Profile {
    Tiny,
    Full,
}

impl Profile {
    fn parameters(self) -> Parameters {
        match self {
            Profile::Tiny => Parameters::tiny(),
            Profile::Full => Parameters::full(),
        }
    }
}

#[derive(Parser)]
#[command(name = "jam_node")]
#[command(about = "Drive the JAM state-transition core against recorded (state, block) pairs")]
struct Cli {
    /// Which deployment profile's `Parameters` to transition under.
    #[arg(long, value_enum, default_value_t = Profile::Tiny)]
    profile: Profile,

    /// Emit structured logs as JSON instead of plain text.
    #[arg(long)]
    log_json: bool,

    /// Enable debug-level logging.
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply one block to a state snapshot and print the resulting state.
    Transition {
        /// Path to a JSON file of the form `{"state": ..., "block": ...}`.
        #[arg(long)]
        input: PathBuf,

        /// Where to write the resulting state's JSON encoding. Defaults to
        /// stdout when omitted.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(serde::Deserialize)]
struct TransitionInput {
    state: State,
    block: Block,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path} as a (state, block) pair: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("block transition failed: {0}")]
    Transition(#[from] state_processing::Error),
    #[error("failed to write output: {0}")]
    Write(#[from] std::io::Error),
    #[error("failed to encode result state: {0}")]
    Encode(#[from] serde_json::Error),
}

fn run(cli: Cli) -> Result<(), CliError> {
    let params = cli.profile.parameters();
    match cli.command {
        Command::Transition { input, output } => {
            let raw = std::fs::read_to_string(&input).map_err(|source| CliError::Read {
                path: input.clone(),
                source,
            })?;
            let parsed: TransitionInput =
                serde_json::from_str(&raw).map_err(|source| CliError::Parse { path: input, source })?;

            let pvm = pvm_contract::MockPvmHost::default();
            let executor = SyncExecutor;
            let next_state = state_processing::process_block(
                &parsed.state,
                &params,
                &parsed.block,
                &pvm,
                &executor,
            )?;

            let encoded = serde_json::to_string_pretty(&next_state)?;
            match output {
                Some(path) => std::fs::write(&path, encoded)?,
                None => println!("{encoded}"),
            }
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_console_logging(cli.log_json, cli.debug);

    if let Err(err) = run(cli) {
        tracing::error!(error = %err, "jam_node failed");
        eprintln!("error: {err}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
