//! Command-line front end.
//!
//! # Responsibility
//! - Show today's lines, plan the pixel display and manage stored settings
//!   through `slowshakespeare_core`.
//! - Keep output deterministic when `--date` / `--at` are given.

use anyhow::Context as _;
use chrono::{DateTime, FixedOffset, Local, NaiveDate};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use slowshakespeare_core::db::open_db;
use slowshakespeare_core::{
    build_today_view, default_log_level, format_date, init_logging, parse_start_date,
    plan_display, DisplayConfig, DisplayMode, DisplayPlan, ProgressService, Settings,
    SettingsPatch, SonnetCorpus, SqliteSettingsRepository, TodayView,
};
use std::path::PathBuf;
use url::Url;

const DB_FILE_NAME: &str = "slowshakespeare.sqlite3";

#[derive(Parser, Debug)]
#[command(name = "slowshakespeare", version, about = "One more sonnet line per day")]
struct Cli {
    /// Settings store path.
    #[arg(long, global = true, env = "SLOWSHAKESPEARE_DB_PATH")]
    db: Option<PathBuf>,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error.
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print today's revealed lines.
    Today(TodayArgs),
    /// Print the pixel-display plan for one render pass.
    Display(DisplayArgs),
    /// Show or change stored settings.
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Print a share link for the stored settings.
    Share {
        /// Page the link points at.
        #[arg(long)]
        base: Url,
    },
    /// Apply a share link to the stored settings.
    OpenLink { link: Url },
    /// List the sonnets in reading order.
    Sonnets,
}

#[derive(Args, Debug)]
struct TodayArgs {
    /// Day to evaluate (defaults to the local date).
    #[arg(long, value_parser = parse_date_arg)]
    date: Option<NaiveDate>,

    /// Evaluate this sonnet instead of the stored one (store is not touched).
    #[arg(long)]
    sonnet: Option<String>,

    /// Evaluate from this start date instead of the stored one.
    #[arg(long, value_parser = parse_date_arg)]
    start: Option<NaiveDate>,

    /// Print lines even in self-test mode.
    #[arg(long)]
    reveal: bool,

    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct DisplayArgs {
    #[arg(long)]
    sonnet: Option<String>,

    #[arg(long)]
    color: Option<String>,

    /// Start timestamp (RFC 3339) or date (YYYY-MM-DD).
    #[arg(long)]
    start: Option<String>,

    /// Render instant in RFC 3339 (defaults to now, local zone).
    #[arg(long, value_parser = parse_instant_arg)]
    at: Option<DateTime<FixedOffset>>,

    #[arg(long)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    /// Print stored settings.
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Update stored settings.
    Set {
        #[arg(long)]
        sonnet: Option<String>,

        #[arg(long, value_parser = parse_date_arg)]
        start: Option<NaiveDate>,

        #[arg(long)]
        color: Option<String>,

        #[arg(long, value_enum)]
        lines: Option<Toggle>,

        /// Hide revealed lines until `today --reveal`.
        #[arg(long, value_enum)]
        self_test: Option<Toggle>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Toggle {
    On,
    Off,
}

impl Toggle {
    fn is_on(self) -> bool {
        matches!(self, Self::On)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(&cli)?;

    let today = Local::now().date_naive();
    match cli.cmd {
        Command::Today(args) => cmd_today(cli.db, args, today),
        Command::Display(args) => cmd_display(args),
        Command::Settings(SettingsCommand::Show { json }) => cmd_settings_show(cli.db, json, today),
        Command::Settings(SettingsCommand::Set {
            sonnet,
            start,
            color,
            lines,
            self_test,
        }) => {
            let patch = SettingsPatch {
                sonnet,
                start_date: start,
                color,
                show_lines: lines.map(Toggle::is_on),
                self_test: self_test.map(Toggle::is_on),
            };
            cmd_settings_set(cli.db, &patch, today)
        }
        Command::Share { base } => cmd_share(cli.db, &base, today),
        Command::OpenLink { link } => cmd_open_link(cli.db, &link, today),
        Command::Sonnets => {
            cmd_sonnets();
            Ok(())
        }
    }
}

fn setup_logging(cli: &Cli) -> anyhow::Result<()> {
    let Some(log_dir) = &cli.log_dir else {
        return Ok(());
    };
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    let log_dir = log_dir
        .to_str()
        .context("log directory must be valid UTF-8")?;
    init_logging(&level, log_dir).map_err(anyhow::Error::msg)
}

fn with_service<T>(
    db: Option<PathBuf>,
    f: impl FnOnce(&ProgressService<'static, SqliteSettingsRepository<'_>>) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let path = db.unwrap_or_else(|| std::env::temp_dir().join(DB_FILE_NAME));
    let conn = open_db(&path)
        .with_context(|| format!("open settings store '{}'", path.display()))?;
    let service = ProgressService::new(SqliteSettingsRepository::new(&conn));
    f(&service)
}

fn cmd_today(db: Option<PathBuf>, args: TodayArgs, today: NaiveDate) -> anyhow::Result<()> {
    let day = args.date.unwrap_or(today);
    let view = if args.sonnet.is_some() || args.start.is_some() {
        let mut settings = Settings::defaults(day);
        if let Some(sonnet) = args.sonnet {
            settings.sonnet = sonnet;
        }
        if let Some(start) = args.start {
            settings.start_date = start;
        }
        build_today_view(SonnetCorpus::builtin(), settings, day)
    } else {
        with_service(db, |service| Ok(service.today_view(day)?))?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print_today(&view, args.reveal);
    }
    Ok(())
}

fn print_today(view: &TodayView, reveal: bool) {
    let progress = &view.progress;
    println!(
        "Sonnet {} - day {} of 14 - {} line(s)",
        progress.current_sonnet_id,
        progress.day_within_cycle + 1,
        progress.lines_revealed
    );
    if view.recovery.future_start {
        println!("(start date {} is in the future)", format_date(view.settings.start_date));
    }
    if view.recovery.unknown_sonnet {
        println!("(unknown sonnet {}, starting from the first)", view.settings.sonnet);
    }
    if !view.settings.show_lines {
        return;
    }
    println!();
    let hidden = view.settings.self_test && !reveal;
    for (i, line) in view.lines.iter().enumerate() {
        if hidden {
            println!("{:>2}  ...", i + 1);
        } else {
            println!("{:>2}  {line}", i + 1);
        }
    }
    if hidden {
        println!();
        println!("(self-test: recite, then run again with --reveal)");
    }
}

fn cmd_display(args: DisplayArgs) -> anyhow::Result<()> {
    let now = args.at.unwrap_or_else(|| Local::now().fixed_offset());
    let config = DisplayConfig {
        sonnet: args.sonnet,
        color: args.color,
        start_date: args.start,
    };
    let plan = plan_display(SonnetCorpus::builtin(), &config, &now);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan);
    }
    Ok(())
}

fn print_plan(plan: &DisplayPlan) {
    match &plan.mode {
        DisplayMode::Static { lines } => {
            println!("static, sonnet {}", plan.progress.current_sonnet_id);
            for line in lines {
                println!("{} {}", if line.marked { "*" } else { " " }, line.text);
            }
        }
        DisplayMode::Review { frames, delay_ms } => {
            println!(
                "review, sonnet {}, {} frame(s) at {delay_ms} ms",
                plan.progress.current_sonnet_id,
                frames.len()
            );
            for frame in frames {
                println!("{} {}", if frame.marked { "*" } else { " " }, frame.text);
            }
        }
    }
}

fn cmd_settings_show(db: Option<PathBuf>, json: bool, today: NaiveDate) -> anyhow::Result<()> {
    let settings = with_service(db, |service| Ok(service.load_settings(today)?))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&settings)?);
    } else {
        print_settings(&settings);
    }
    Ok(())
}

fn cmd_settings_set(
    db: Option<PathBuf>,
    patch: &SettingsPatch,
    today: NaiveDate,
) -> anyhow::Result<()> {
    if patch.is_empty() {
        anyhow::bail!("nothing to change; pass --sonnet, --start, --color, --lines or --self-test");
    }
    let settings = with_service(db, |service| Ok(service.update_settings(today, patch)?))?;
    info!("event=cli_settings_set module=cli status=ok");
    print_settings(&settings);
    Ok(())
}

fn print_settings(settings: &Settings) {
    println!("sonnet:     {}", settings.sonnet);
    println!("start date: {}", format_date(settings.start_date));
    println!("color:      {}", settings.color);
    println!("lines:      {}", on_off(settings.show_lines));
    println!("self-test:  {}", on_off(settings.self_test));
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}

fn cmd_share(db: Option<PathBuf>, base: &Url, today: NaiveDate) -> anyhow::Result<()> {
    let settings = with_service(db, |service| Ok(service.load_settings(today)?))?;
    println!("{}", settings.share_url(base));
    Ok(())
}

fn cmd_open_link(db: Option<PathBuf>, link: &Url, today: NaiveDate) -> anyhow::Result<()> {
    let (settings, applied) =
        with_service(db, |service| Ok(service.import_link(today, link)?))?;
    if applied == 0 {
        anyhow::bail!("link carried no usable settings: {link}");
    }
    print_settings(&settings);
    Ok(())
}

fn cmd_sonnets() {
    for sonnet in SonnetCorpus::builtin().iter() {
        println!("{:>4}  {}", sonnet.id, sonnet.first_line());
    }
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    parse_start_date(raw).map_err(|err| err.to_string())
}

fn parse_instant_arg(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(raw).map_err(|err| format!("invalid RFC 3339 instant: {err}"))
}
