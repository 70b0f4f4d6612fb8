//! Quartermaster: plans one purchase phase from a JSON scenario.
//!
//! Usage:
//!   quartermaster [OPTIONS] < scenario.json
//!
//! Options:
//!   --scenario FILE  Scenario file (default: stdin)
//!   --player NAME    Buy for this player instead of the scenario's
//!   --budget N       Spend N instead of the scenario's budget
//!   --seed N         Seed for the combat estimator
//!   --trials N       Battles simulated per estimate
//!   --output FILE    Output file path (default: stdout)
//!   --quiet          Only log warnings and errors
//!
//! Logging goes to stderr and honours `RUST_LOG`.

use std::env;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::process::ExitCode;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use quartermaster::engine::{Engine, EngineError};

#[derive(Debug, Error)]
enum CliError {
    #[error("missing value for {0}")]
    MissingValue(String),

    #[error("invalid {flag} value '{value}'")]
    InvalidValue { flag: String, value: String },

    #[error("unknown argument: {0}")]
    UnknownArgument(String),

    #[error("cannot read {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

#[derive(Debug, Default)]
struct Args {
    scenario: Option<String>,
    output: Option<String>,
    quiet: bool,
    help: bool,
    options: Vec<(String, String)>,
    player: Option<String>,
    budget: Option<u32>,
}

fn parse_args(args: &[String]) -> Result<Args, CliError> {
    let mut parsed = Args::default();
    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i).cloned().ok_or_else(|| CliError::MissingValue(flag.to_string()))
        };
        match flag {
            "--scenario" => parsed.scenario = Some(value()?),
            "--output" => parsed.output = Some(value()?),
            "--player" => parsed.player = Some(value()?),
            "--budget" => {
                let v = value()?;
                let budget = v
                    .parse()
                    .map_err(|_| CliError::InvalidValue { flag: flag.to_string(), value: v.clone() })?;
                parsed.budget = Some(budget);
            }
            "--seed" | "--trials" => {
                let v = value()?;
                if v.parse::<u64>().is_err() {
                    return Err(CliError::InvalidValue { flag: flag.to_string(), value: v });
                }
                let name = if flag == "--seed" { "Seed" } else { "Trials" };
                parsed.options.push((name.to_string(), v));
            }
            "--quiet" => parsed.quiet = true,
            "--help" | "-h" => parsed.help = true,
            other => return Err(CliError::UnknownArgument(other.to_string())),
        }
        i += 1;
    }
    Ok(parsed)
}

fn print_usage() {
    eprintln!("Usage: quartermaster [OPTIONS] < scenario.json");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario FILE  Scenario file (default: stdin)");
    eprintln!("  --player NAME    Buy for this player instead of the scenario's");
    eprintln!("  --budget N       Spend N instead of the scenario's budget");
    eprintln!("  --seed N         Seed for the combat estimator");
    eprintln!("  --trials N       Battles simulated per estimate");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Only log warnings and errors");
    eprintln!("  --help           Show this help");
}

fn init_logging(quiet: bool) {
    let default = if quiet { "quartermaster=warn" } else { "quartermaster=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: Args) -> Result<(), CliError> {
    let json = match &args.scenario {
        Some(path) => fs::read_to_string(path).map_err(|source| CliError::Read { path: path.clone(), source })?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let mut engine = Engine::new();
    engine.load_scenario(&json)?;
    if let Some(player) = &args.player {
        engine.set_player(player);
    }
    if let Some(budget) = args.budget {
        engine.set_budget(budget);
    }
    for (name, value) in args.options {
        engine.set_option(name, Some(value));
    }

    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            engine.handle_plan(&mut out)?;
        }
        None => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            engine.handle_plan(&mut out)?;
            out.flush()?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            print_usage();
            return ExitCode::FAILURE;
        }
    };
    if args.help {
        print_usage();
        return ExitCode::SUCCESS;
    }

    init_logging(args.quiet);
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
