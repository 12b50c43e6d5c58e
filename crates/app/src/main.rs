mod commands;
mod config;

use std::path::PathBuf;

use dotenvy::dotenv;
use quiz_core::model::UserId;
use storage::repository::Storage;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ArgsError, Config, parse_user};

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- stats --sessions <file.json> [--user <id>]");
    eprintln!("  cargo run -p app -- take  --quiz <file.json>     [--user <id>]");
    eprintln!();
    eprintln!("Environment (also read from .env):");
    eprintln!("  QUIZ_USER_ID, QUIZ_RECENT_WINDOW, QUIZ_SUBJECT_RANKING,");
    eprintln!("  QUIZ_UNKNOWN_SUBJECT, QUIZ_INCLUDE_UNKNOWN, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Stats,
    Take,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "stats" => Some(Self::Stats),
            "take" => Some(Self::Take),
            _ => None,
        }
    }

    fn input_flag(self) -> &'static str {
        match self {
            Self::Stats => "--sessions",
            Self::Take => "--quiz",
        }
    }
}

#[derive(Debug)]
struct Args {
    user_id: UserId,
    input: PathBuf,
}

impl Args {
    fn parse(
        cmd: Command,
        args: &mut impl Iterator<Item = String>,
        config: &Config,
    ) -> Result<Self, ArgsError> {
        let mut user_id = config.user_id.clone();
        let mut input = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--user" => user_id = parse_user(require_value(args, "--user")?)?,
                flag if flag == cmd.input_flag() => {
                    input = Some(PathBuf::from(require_value(args, cmd.input_flag())?));
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let input = input.ok_or(ArgsError::MissingFlag {
            flag: cmd.input_flag(),
        })?;
        Ok(Self { user_id, input })
    }
}

fn init_tracing(filter: &str) {
    let env_filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries command output; logs go to stderr.
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let config = Config::from_env()?;
    init_tracing(&config.rust_log);

    let mut argv = std::env::args().skip(1);
    let cmd = match argv.next() {
        None => {
            print_usage();
            return Ok(());
        }
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            print_usage();
            ArgsError::UnknownArg(first)
        })?,
    };

    let parsed = Args::parse(cmd, &mut argv, &config).map_err(|e| {
        print_usage();
        e
    })?;
    tracing::debug!(?cmd, user_id = %parsed.user_id, input = %parsed.input.display(), "parsed arguments");

    let storage = Storage::in_memory();
    match cmd {
        Command::Stats => {
            commands::stats(&storage, config.dashboard, &parsed.user_id, &parsed.input).await
        }
        Command::Take => commands::take(&storage, parsed.user_id, &parsed.input).await,
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
