//! `cadence` CLI — evaluate recurrence rules from the command line.
//!
//! Rules are JSON records (the same shape the engine serializes), read from
//! `--rule <file>` or stdin. Dates are RFC 3339.
//!
//! ## Usage
//!
//! ```sh
//! # Next occurrence after a date
//! cadence next -r habit.json --after 2026-10-06T09:00:00Z
//!
//! # The next 10 occurrences, as a JSON array
//! cat habit.json | cadence list --from 2026-10-06T09:00:00Z --limit 10 --json
//!
//! # Is this date an occurrence of the series anchored at --anchor?
//! cadence matches -r habit.json --date 2026-10-09T09:00:00Z --anchor 2026-10-05T09:00:00Z
//!
//! # Scheduled days missed between two completions
//! cadence missed -r habit.json --from 2026-10-07T09:00:00Z --to 2026-10-12T09:00:00Z \
//!     --completion 2026-10-05T09:00:00Z --completion 2026-10-07T09:00:00Z
//!
//! # Check a rule's invariants
//! cadence validate -r habit.json --strict
//! ```

mod settings;

use std::io::{self, Read};

use anyhow::{Context, Result};
use cadence_engine::calendar::parse_datetime;
use cadence_engine::{EngineOptions, RecurrenceRule};
use chrono::{DateTime, SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

#[derive(Parser)]
#[command(
    name = "cadence",
    version,
    about = "Recurrence calculator for tasks and habits"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./cadence.toml when present)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log filter, e.g. "debug" (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the next occurrence after a date, or "none"
    Next {
        /// Rule JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        rule: Option<String>,
        /// Reference date
        #[arg(long)]
        after: String,
    },
    /// Print consecutive occurrences after a date, one per line
    List {
        /// Rule JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        rule: Option<String>,
        /// Start date (exclusive)
        #[arg(long)]
        from: String,
        /// Maximum number of occurrences (defaults to engine.default_limit)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Print a JSON array instead of lines
        #[arg(long)]
        json: bool,
    },
    /// Print whether a date is an occurrence of the series anchored at --anchor
    Matches {
        /// Rule JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        rule: Option<String>,
        /// Date to test
        #[arg(long)]
        date: String,
        /// Series anchor date
        #[arg(long)]
        anchor: String,
    },
    /// Count scheduled days missed strictly between two completions
    Missed {
        /// Rule JSON file (reads from stdin if omitted)
        #[arg(short, long, conflicts_with = "every_day")]
        rule: Option<String>,
        /// No rule: every day is due
        #[arg(long)]
        every_day: bool,
        /// Previous completion
        #[arg(long)]
        from: String,
        /// New completion
        #[arg(long)]
        to: String,
        /// A recorded completion (repeatable)
        #[arg(long = "completion")]
        completions: Vec<String>,
    },
    /// Check a rule's invariants
    Validate {
        /// Rule JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        rule: Option<String>,
        /// Also reject unknown timezone identifiers
        #[arg(long)]
        strict: bool,
    },
    /// Print a short human-readable summary of a rule
    Describe {
        /// Rule JSON file (reads from stdin if omitted)
        #[arg(short, long)]
        rule: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_logging(cli.log_level.as_deref().unwrap_or(&settings.logging.level));
    tracing::debug!(settings = ?settings, "Configuration loaded");

    let options = settings.engine;

    match cli.command {
        Commands::Next { rule, after } => {
            let rule = read_rule(rule.as_deref())?;
            let after = parse_date(&after)?;
            match cadence_engine::next_occurrence(&rule, after, &options) {
                Some(next) => println!("{}", format_date(next)),
                None => println!("none"),
            }
        }
        Commands::List {
            rule,
            from,
            limit,
            json,
        } => {
            let rule = read_rule(rule.as_deref())?;
            let from = parse_date(&from)?;
            let limit = limit.unwrap_or(options.default_limit);
            let dates: Vec<String> = cadence_engine::occurrences(&rule, from, limit, &options)
                .into_iter()
                .map(format_date)
                .collect();
            if json {
                println!("{}", serde_json::to_string_pretty(&dates)?);
            } else {
                for date in dates {
                    println!("{date}");
                }
            }
        }
        Commands::Matches { rule, date, anchor } => {
            let rule = read_rule(rule.as_deref())?;
            let date = parse_date(&date)?;
            let anchor = parse_date(&anchor)?;
            println!("{}", cadence_engine::matches(&rule, date, anchor, &options));
        }
        Commands::Missed {
            rule,
            every_day,
            from,
            to,
            completions,
        } => {
            let rule = if every_day {
                None
            } else {
                Some(read_rule(rule.as_deref())?)
            };
            let from = parse_date(&from)?;
            let to = parse_date(&to)?;
            let completions = completions
                .iter()
                .map(|c| parse_date(c))
                .collect::<Result<Vec<_>>>()?;
            let missed = cadence_engine::count_missed_scheduled_days(
                from,
                to,
                rule.as_ref(),
                &completions,
                &options,
            );
            println!("{missed}");
        }
        Commands::Validate { rule, strict } => {
            let rule = read_rule(rule.as_deref())?;
            let options = EngineOptions {
                strict_timezones: strict || options.strict_timezones,
                ..options
            };
            rule.validate_with(&options)
                .context("Rule is invalid")?;
            println!("valid");
        }
        Commands::Describe { rule } => {
            let rule = read_rule(rule.as_deref())?;
            println!("{}", rule.describe());
        }
    }

    Ok(())
}

/// Install a stderr subscriber; `RUST_LOG` wins over the configured level.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_rule(path: Option<&str>) -> Result<RecurrenceRule> {
    let json = read_input(path)?;
    RecurrenceRule::from_json(&json).context("Failed to parse rule JSON")
}

fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    parse_datetime(s).with_context(|| format!("Failed to parse date: {}", s))
}

fn format_date(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
