use std::fmt;

use quiz_core::model::UnitId;
use services::config::IN_MEMORY_DB;
use services::{Clock, QuizConfig, QuizServices, UnitKind};
use tracing_subscriber::EnvFilter;

mod play;
mod render;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingUnit { command: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidUnit { raw: String },
    InvalidDbUrl { raw: String },
    InvalidSeed { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingUnit { command } => write!(f, "{command} requires a unit"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidUnit { raw } => {
                write!(f, "invalid unit {raw:?}, expected set-<n> or test-<n>")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [dashboard]        [options]");
    eprintln!("  cargo run -p app -- play <set-N|test-N> [options]");
    eprintln!("  cargo run -p app -- reset <set-N|test-N> [options]");
    eprintln!("  cargo run -p app -- reset-all          [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --bank <path|url>   question bank document (default questions.json)");
    eprintln!("  --db <path|url>     progress database, or `memory` (default sqlite:quiz.sqlite3)");
    eprintln!("  --seed <u64>        deterministic test draws");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_BANK, QUIZ_DB_URL, QUIZ_SET_SIZE, QUIZ_TEST_SIZE, QUIZ_TEST_COUNT, QUIZ_SEED");
    eprintln!("  RUST_LOG (default info)");
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Dashboard,
    Play(String),
    Reset(UnitId),
    ResetAll,
}

#[derive(Debug)]
struct Args {
    command: Command,
    config: QuizConfig,
}

impl Args {
    fn parse(
        args: &mut impl Iterator<Item = String>,
        mut config: QuizConfig,
    ) -> Result<Self, ArgsError> {
        let mut name: Option<String> = None;
        let mut unit: Option<String> = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--bank" => config.bank = require_value(args, "--bank")?,
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    config.db_url = (value != IN_MEMORY_DB).then_some(value);
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    let seed = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?;
                    config.seed = Some(seed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                flag if flag.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ if name.is_none() => name = Some(arg),
                _ if unit.is_none() => unit = Some(arg),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let command = match (name.as_deref(), unit) {
            (None | Some("dashboard"), None) => Command::Dashboard,
            (Some("reset-all"), None) => Command::ResetAll,
            (Some("play"), Some(raw)) => Command::Play(raw),
            (Some("play"), None) => return Err(ArgsError::MissingUnit { command: "play" }),
            (Some("reset"), Some(raw)) => {
                let unit = raw.parse().map_err(|_| ArgsError::InvalidUnit { raw })?;
                Command::Reset(unit)
            }
            (Some("reset"), None) => return Err(ArgsError::MissingUnit { command: "reset" }),
            (None | Some("dashboard" | "reset-all"), Some(extra)) => {
                return Err(ArgsError::UnknownArg(extra));
            }
            (Some(other), _) => return Err(ArgsError::UnknownCommand(other.to_owned())),
        };

        Ok(Self { command, config })
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = QuizConfig::from_env()?;
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv, config).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let services = QuizServices::bootstrap(&parsed.config, Clock::system()).await?;

    match parsed.command {
        Command::Dashboard => {
            let view = services.summary().dashboard().await?;
            render::dashboard(&view);
        }
        Command::Play(raw) => {
            let kind = if raw.trim().to_ascii_lowercase().starts_with("test") {
                UnitKind::Test
            } else {
                UnitKind::Set
            };
            let unit = services.catalog().resolve_unit_or_default(&raw, kind);
            let engine = services.open(unit).await?;
            play::run(engine).await?;
        }
        Command::Reset(unit) => {
            let catalog = services.catalog();
            catalog.settings().check_unit(unit, catalog.bank())?;
            services.reset().reset_unit(unit).await?;
            println!("{} reset.", unit.title());
        }
        Command::ResetAll => {
            let swept = services.reset().reset_all().await?;
            println!("All progress reset ({swept} stray entries removed).");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        let mut iter = args.iter().map(|s| (*s).to_owned());
        Args::parse(&mut iter, QuizConfig::default())
    }

    #[test]
    fn no_arguments_opens_dashboard() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.command, Command::Dashboard);
        assert_eq!(args.config.db_url.as_deref(), Some("sqlite:quiz.sqlite3"));
    }

    #[test]
    fn db_flag_keeps_paths_and_rejects_blank() {
        let args = parse(&["--db", "data/progress.db"]).unwrap();
        assert_eq!(args.config.db_url.as_deref(), Some("data/progress.db"));
        assert!(matches!(
            parse(&["--db", "  "]),
            Err(ArgsError::InvalidDbUrl { .. })
        ));
    }

    #[test]
    fn play_and_flags() {
        let args = parse(&["play", "test-2", "--db", "memory", "--seed", "9"]).unwrap();
        assert_eq!(args.command, Command::Play("test-2".into()));
        assert_eq!(args.config.db_url, None);
        assert_eq!(args.config.seed, Some(9));
    }

    #[test]
    fn reset_requires_valid_unit() {
        assert_eq!(
            parse(&["reset", "set-3"]).unwrap().command,
            Command::Reset(UnitId::set(3))
        );
        assert!(matches!(
            parse(&["reset", "chapter-1"]),
            Err(ArgsError::InvalidUnit { .. })
        ));
        assert!(matches!(
            parse(&["reset"]),
            Err(ArgsError::MissingUnit { command: "reset" })
        ));
    }

    #[test]
    fn rejects_unknown_input() {
        assert!(matches!(parse(&["grade"]), Err(ArgsError::UnknownCommand(_))));
        assert!(matches!(parse(&["--verbose"]), Err(ArgsError::UnknownArg(_))));
        assert!(matches!(
            parse(&["--bank"]),
            Err(ArgsError::MissingValue { flag: "--bank" })
        ));
    }
}
