use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgGroup, Args, Parser, Subcommand};
use inner_orbit_analytics::{
    analyze, build_report, config::DEFAULT_GRAVITY_THRESHOLD,
    config::DEFAULT_UTC_OFFSET_HOURS, extract_keywords, AnalyticsConfig, JournalRecord, LogKind,
    TimestampNormalizer,
};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

mod db;
mod import;

#[derive(Parser)]
#[command(name = "inner-orbit")]
#[command(about = "Analytics for Inner Orbit mood journals", long_about = None)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Source {
    /// Read entries from a JSON backup or CSV file instead of the database
    #[arg(long)]
    file: Option<PathBuf>,
    /// Only include entries from the last N days (database only)
    #[arg(long, default_value_t = 90)]
    since_days: i64,
    /// Only include entries of this kind (daily, sensory, insight)
    #[arg(long)]
    kind: Option<LogKind>,
}

#[derive(Args)]
struct Tuning {
    /// Minimum gravity for keyword extraction
    #[arg(long, default_value_t = DEFAULT_GRAVITY_THRESHOLD)]
    threshold: i32,
    /// UTC offset in hours used to read wall-clock timestamps
    #[arg(long, env = "INNER_ORBIT_UTC_OFFSET", default_value_t = DEFAULT_UTC_OFFSET_HOURS, allow_hyphen_values = true)]
    utc_offset: i32,
}

impl Tuning {
    fn config(&self) -> anyhow::Result<AnalyticsConfig> {
        AnalyticsConfig::new(self.threshold, self.utc_offset)
            .with_context(|| format!("UTC offset {}h is out of range", self.utc_offset))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load realistic seed entries
    Seed,
    /// Merge entries from a JSON backup or CSV file into the database
    #[command(group(
        ArgGroup::new("input")
            .args(["json", "csv"])
            .required(true)
            .multiple(false)
    ))]
    Import {
        #[arg(long)]
        json: Option<PathBuf>,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[command(flatten)]
        tuning: Tuning,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        source: Source,
        #[command(flatten)]
        tuning: Tuning,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
    /// Print the full analytics report as JSON
    Analyze {
        #[command(flatten)]
        source: Source,
        #[command(flatten)]
        tuning: Tuning,
    },
    /// List the most frequent words in high-gravity entries
    Keywords {
        #[command(flatten)]
        source: Source,
        #[command(flatten)]
        tuning: Tuning,
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn connect() -> anyhow::Result<PgPool> {
    let database_url = std::env::var("DATABASE_URL")
        .context("DATABASE_URL must be set to a Postgres instance")?;

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .context("failed to connect to Postgres")
}

async fn load(source: &Source) -> anyhow::Result<Vec<JournalRecord>> {
    let mut records = match &source.file {
        Some(path) => import::read_records(path)?,
        None => {
            let pool = connect().await?;
            let since_date = db::cutoff_date(source.since_days);
            db::fetch_entries(&pool, since_date, source.kind).await?
        }
    };

    if let Some(kind) = source.kind {
        records.retain(|record| record.kind == kind);
    }
    tracing::debug!(count = records.len(), "entries loaded");
    Ok(records)
}

fn scope_label(source: &Source) -> String {
    let origin = match &source.file {
        Some(path) => path.display().to_string(),
        None => format!("the last {} days", source.since_days.max(1)),
    };
    match source.kind {
        Some(kind) => format!("{} entries from {}", kind, origin),
        None => origin,
    }
}

fn read_import(json: Option<&Path>, csv: Option<&Path>) -> anyhow::Result<(Vec<JournalRecord>, PathBuf)> {
    match (json, csv) {
        (Some(path), _) => Ok((import::read_json(path)?, path.to_path_buf())),
        (None, Some(path)) => Ok((import::read_csv(path)?, path.to_path_buf())),
        (None, None) => anyhow::bail!("either --json or --csv is required"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::InitDb => {
            let pool = connect().await?;
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            let pool = connect().await?;
            let inserted = db::seed(&pool).await?;
            println!("Inserted {inserted} seed entries.");
        }
        Commands::Import { json, csv, tuning } => {
            let config = tuning.config()?;
            let (records, path) = read_import(json.as_deref(), csv.as_deref())?;
            let pool = connect().await?;
            let normalizer = TimestampNormalizer::new(config.utc_offset);
            let inserted = db::import_records(&pool, &records, &normalizer).await?;
            println!(
                "Inserted {inserted} of {} entries from {}.",
                records.len(),
                path.display()
            );
        }
        Commands::Report {
            source,
            tuning,
            out,
        } => {
            let config = tuning.config()?;
            let records = load(&source).await?;
            let analytics = analyze(&records, &config);
            let report = build_report(Some(scope_label(&source).as_str()), &analytics);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Analyze { source, tuning } => {
            let config = tuning.config()?;
            let records = load(&source).await?;
            let analytics = analyze(&records, &config);
            println!("{}", serde_json::to_string_pretty(&analytics)?);
        }
        Commands::Keywords {
            source,
            tuning,
            limit,
        } => {
            let config = tuning.config()?;
            let records = load(&source).await?;
            let keywords = extract_keywords(&records, config.gravity_threshold);

            if keywords.is_empty() {
                println!(
                    "No entries at gravity >= {} in this window.",
                    config.gravity_threshold
                );
                return Ok(());
            }

            println!("Top words at gravity >= {}:", config.gravity_threshold);
            for keyword in keywords.iter().take(limit) {
                println!("- {} ({})", keyword.word, keyword.count);
            }
        }
    }

    Ok(())
}
