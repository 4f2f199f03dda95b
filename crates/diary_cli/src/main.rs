//! `diary` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open the configured backend.
//! - Map subcommands onto journal use-cases and print their results.

mod config;
mod export;
mod prompt;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use diary_core::{
    init_logging, parse_iso_date, CsvFileBackend, EntryBackend, JournalService,
    LiteralDurationReader, SqliteBackend, SystemClock, YearStats,
};
use log::info;

use crate::config::{BackendKind, DiaryConfig, DEFAULT_CONFIG_FILE};
use crate::export::{entry_line, export_entries, export_year_stats, search_stem, ExportFormat};
use crate::prompt::ConsolePrompter;

type Journal = JournalService<Box<dyn EntryBackend>>;

#[derive(Debug, Parser)]
#[command(name = "diary", version, about = "Daily diary with catch-up, statistics and search")]
struct Cli {
    /// Configuration file.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Overrides `[storage] backend`.
    #[arg(long, global = true, value_enum)]
    backend: Option<BackendKind>,
    /// Overrides `[storage] path` and `DIARY_DATA_PATH`.
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Overrides `[logging] level` and `DIARY_LOG_LEVEL`.
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Catch up on missed days, then record today.
    Update,
    /// Print the full entry for one date.
    Show { date: String },
    /// Ranked monthly, weekday and people statistics for a year.
    Stats {
        year: i32,
        #[arg(long, default_value_t = 10)]
        top: usize,
        #[arg(long, value_enum)]
        export: Option<ExportFormat>,
    },
    Search {
        #[command(subcommand)]
        query: SearchQuery,
        #[arg(long, global = true, value_enum)]
        export: Option<ExportFormat>,
    },
    /// Replace text inside one day's summary.
    EditSummary {
        date: String,
        find: String,
        replace: String,
    },
    /// Rename a person everywhere, or only on `--date`.
    RenamePerson {
        old: String,
        new: String,
        #[arg(long)]
        date: Option<String>,
    },
    /// List the years that have entries.
    Years,
    /// Write the effective configuration to the `--config` file.
    InitConfig {
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Subcommand)]
enum SearchQuery {
    /// Case-insensitive substring of the summary.
    Keyword { term: String },
    /// Prefix of the ISO date, e.g. `2021-02`.
    Date { partial: String },
    /// Person name, case-insensitive.
    Person { name: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    let log_dir = absolute(&config.logging.dir)?;
    init_logging(&config.logging.level, &log_dir)
        .with_context(|| format!("cannot start logging in `{}`", log_dir.display()))?;

    run(cli.command, &config, &cli.config)
}

fn init_config(config: &DiaryConfig, path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("`{}` already exists; pass --force to replace it", path.display());
    }
    config.save_to(path)?;
    info!("event=config_write module=cli status=ok");
    println!("Wrote {}", path.display());
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<DiaryConfig> {
    let mut config = DiaryConfig::load_from(&cli.config)?;
    if let Some(backend) = cli.backend {
        config.storage.backend = backend;
    }
    if let Some(path) = &cli.data {
        config.storage.path = Some(path.clone());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    Ok(config)
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()
        .context("cannot resolve working directory")?
        .join(path))
}

fn open_journal(config: &DiaryConfig) -> Result<Journal> {
    let path = config.storage.data_path();
    let backend: Box<dyn EntryBackend> = match config.storage.backend {
        BackendKind::Csv => Box::new(CsvFileBackend::new(&path)),
        BackendKind::Sqlite => Box::new(
            SqliteBackend::open(&path)
                .with_context(|| format!("cannot open `{}`", path.display()))?,
        ),
    };
    JournalService::open(backend).with_context(|| format!("cannot load `{}`", path.display()))
}

fn parse_date_arg(text: &str) -> Result<chrono::NaiveDate> {
    Ok(parse_iso_date(text)?)
}

fn run(command: Commands, config: &DiaryConfig, config_path: &Path) -> Result<()> {
    match command {
        Commands::Update => {
            let mut journal = open_journal(config)?;
            let stdin = io::stdin();
            let mut prompter =
                ConsolePrompter::new(stdin.lock(), io::stdout(), LiteralDurationReader);
            let report = journal.update(&SystemClock, &mut prompter)?;
            println!("Recorded {} day(s).", report.recorded.len());
            if !report.is_complete() {
                println!(
                    "{} day(s) still missing; run `diary update` again to continue.",
                    report.remaining.len()
                );
            }
        }
        Commands::Show { date } => {
            let journal = open_journal(config)?;
            let date = parse_date_arg(&date)?;
            let Some(entry) = journal.store().get(date) else {
                bail!("no entry for {date}");
            };
            println!("{}, {}", entry.weekday(), date);
            if let Some(summary) = &entry.summary {
                println!("{summary}");
            }
            if let Some(happiness) = entry.happiness {
                println!("Happiness: {happiness}");
            }
            if let Some(attachment) = entry.attachment {
                println!("Attachment: {attachment}");
            }
            if !entry.people.is_empty() {
                println!("People: {}", entry.people.join(", "));
            }
        }
        Commands::Stats { year, top, export } => {
            let journal = open_journal(config)?;
            let stats = journal.year_stats(year);
            print_stats(&stats, top);
            if let Some(format) = export {
                let path = export_year_stats(&stats, format, &config.export.dir)?;
                println!("Exported to {}", path.display());
            }
        }
        Commands::Search { query, export } => {
            let journal = open_journal(config)?;
            let (stem, matches) = match &query {
                SearchQuery::Keyword { term } => (
                    search_stem("keyword", term),
                    journal.search_keyword(term).collect::<Vec<_>>(),
                ),
                SearchQuery::Date { partial } => {
                    (search_stem("date", partial), journal.search_date(partial).collect())
                }
                SearchQuery::Person { name } => {
                    (search_stem("person", name), journal.search_person(name).collect())
                }
            };
            for entry in &matches {
                println!("{}", entry_line(entry));
            }
            println!("{} match(es).", matches.len());
            if let Some(format) = export {
                let path = export_entries(&matches, &stem, format, &config.export.dir)?;
                println!("Exported to {}", path.display());
            }
        }
        Commands::EditSummary {
            date,
            find,
            replace,
        } => {
            let mut journal = open_journal(config)?;
            let date = parse_date_arg(&date)?;
            let count = journal.edit_summary(date, &find, &replace)?;
            println!("Replaced {count} occurrence(s).");
        }
        Commands::RenamePerson { old, new, date } => {
            let mut journal = open_journal(config)?;
            let date = date.as_deref().map(parse_date_arg).transpose()?;
            let count = journal.rename_person(date, &old, &new)?;
            println!("Renamed in {count} entr{}.", if count == 1 { "y" } else { "ies" });
        }
        Commands::Years => {
            let journal = open_journal(config)?;
            for year in journal.store().years() {
                println!("{year}");
            }
        }
        Commands::InitConfig { force } => init_config(config, config_path, force)?,
    }
    info!("event=command module=cli status=ok");
    Ok(())
}

fn print_stats(stats: &YearStats, top: usize) {
    let mean = |value: Option<f64>| {
        value.map_or_else(|| "no data".to_string(), |v| format!("{v:.2}"))
    };

    println!(
        "{}: {} entries, {} rated, overall {}",
        stats.year,
        stats.entry_count,
        stats.rated_count,
        mean(stats.overall_happiness.value())
    );
    println!("\nHappiest months");
    for (rank, stat) in stats.monthly_happiness.iter().enumerate() {
        println!("{:>3}. {:<10} {}", rank + 1, stat.label, mean(stat.mean.value()));
    }
    println!("\nHappiest weekdays");
    for (rank, stat) in stats.weekday_happiness.iter().enumerate() {
        println!("{:>3}. {:<10} {}", rank + 1, stat.label, mean(stat.mean.value()));
    }
    println!("\nMost mentioned people");
    for (rank, person) in stats.top_people(top).iter().enumerate() {
        println!("{:>3}. {:<20} {}", rank + 1, person.name, person.count);
    }
}
