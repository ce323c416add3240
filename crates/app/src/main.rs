use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use levelup_core::model::UserId;
use services::{AppServices, Clock, ProgressStore, ProgressionService};
use tracing_subscriber::EnvFilter;
use ui::{App, UiApp, build_app_context};

const DEFAULT_LOG_DIRECTIVES: &str = "app=info,services=info,storage=warn,ui=warn";
const DEFAULT_DB_FILE: &str = "levelup.sqlite3";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidUserId { raw: String },
    InvalidAmount { raw: String },
    MissingAmount,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user value: {raw:?}"),
            ArgsError::InvalidAmount { raw } => write!(f, "invalid award amount: {raw}"),
            ArgsError::MissingAmount => write!(f, "award requires an amount"),
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

struct DesktopApp {
    progression: Arc<ProgressionService>,
}

impl UiApp for DesktopApp {
    fn progression(&self) -> Arc<ProgressionService> {
        Arc::clone(&self.progression)
    }
}

struct Args {
    db_url: String,
    user_id: Option<UserId>,
    amount: Option<i64>,
}

fn usage() -> String {
    format!(
        "Usage:
  cargo run -p app -- ui     [--db <sqlite_url>] [--user <id>]
  cargo run -p app -- status [--db <sqlite_url>] [--user <id>]
  cargo run -p app -- sign   [--db <sqlite_url>] [--user <id>]
  cargo run -p app -- award  <amount> [--db <sqlite_url>] [--user <id>]

Defaults:
  --db sqlite://{DEFAULT_DB_FILE} (relative to the current directory)
  --user guest (only applied while the stored user is the guest)

Environment:
  LEVELUP_DB_URL, LEVELUP_USER_ID, RUST_LOG"
    )
}

fn print_usage() {
    eprintln!("{}", usage());
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Ui,
    Status,
    Sign,
    Award,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "ui" => Some(Self::Ui),
            "status" => Some(Self::Status),
            "sign" => Some(Self::Sign),
            "award" => Some(Self::Award),
            _ => None,
        }
    }
}

impl Args {
    fn parse(cmd: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("LEVELUP_DB_URL")
            .ok()
            .map_or_else(|| normalize_sqlite_url(DEFAULT_DB_FILE.into()), normalize_sqlite_url);
        let mut user_id = std::env::var("LEVELUP_USER_ID")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(UserId::new);
        let mut amount = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--user" => {
                    let value = require_value(args, "--user")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidUserId { raw: value });
                    }
                    user_id = Some(UserId::new(value));
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ if cmd == Command::Award && amount.is_none() => {
                    let parsed: i64 = arg
                        .trim()
                        .parse()
                        .map_err(|_| ArgsError::InvalidAmount { raw: arg.clone() })?;
                    amount = Some(parsed);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if cmd == Command::Award && amount.is_none() {
            return Err(ArgsError::MissingAmount);
        }

        Ok(Self {
            db_url,
            user_id,
            amount,
        })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    // Default behavior: launching UI when no subcommand is provided.
    let cmd = match argv.first().map(String::as_str) {
        None => Command::Ui,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Ui,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let mut iter = argv.into_iter();
    let parsed = Args::parse(cmd, &mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let services =
        AppServices::new_sqlite(&parsed.db_url, Clock::default_clock(), parsed.user_id).await?;
    tracing::info!(db_url = %parsed.db_url, command = ?cmd, "storage ready");

    match cmd {
        Command::Ui => {
            let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
                progression: services.progression(),
            });
            let context = build_app_context(&app);

            // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
            let desktop_cfg = DesktopConfig::new().with_window(
                WindowBuilder::new()
                    .with_title("LevelUp")
                    .with_always_on_top(false),
            );

            LaunchBuilder::desktop()
                .with_cfg(desktop_cfg)
                .with_context(context)
                .launch(App);
            Ok(())
        }
        Command::Status => {
            let mut store = ProgressStore::open(services.progression()).await?;
            store.init_sign().await?;
            println!("{}", serde_json::to_string_pretty(&store.snapshot())?);
            Ok(())
        }
        Command::Sign => {
            let mut store = ProgressStore::open(services.progression()).await?;
            store.init_sign().await?;
            let outcome = store.do_sign().await?;
            match outcome.reward() {
                Some(reward) => println!("signed in: +{reward} XP"),
                None => println!("already signed in today"),
            }
            println!("{}", serde_json::to_string_pretty(&store.snapshot())?);
            Ok(())
        }
        Command::Award => {
            let amount = parsed.amount.ok_or(ArgsError::MissingAmount)?;
            let mut store = ProgressStore::open(services.progression()).await?;
            let award = store.try_award(amount).await?;
            if award.leveled_up() {
                println!("+{} XP, now level {}", award.amount, award.level);
            } else {
                println!("+{} XP", award.amount);
            }
            println!("{}", serde_json::to_string_pretty(&store.snapshot())?);
            Ok(())
        }
    }
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
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
