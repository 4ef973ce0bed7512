use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use alert_engine::{
    parse_date, AlertConfig, AlertService, ChannelKind, DispatchReport, HealthEvent, Location,
    RecordSource,
};
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use health_store::{outbreak, vaccination, CsvDataset, HealthStore, StoreError};
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "health-alerts")]
#[command(about = "Compose and send outbreak and vaccination alerts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Compose a digest for a location and send it to recipients
    Digest {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        source: SourceArgs,

        /// Delivery channel (email or whatsapp)
        #[arg(long, default_value = "whatsapp")]
        channel: ChannelKind,

        /// Recipient address; repeat for several recipients
        #[arg(long = "to", required = true)]
        recipients: Vec<String>,

        /// Log the message instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Compose a digest and print it without sending
    Preview {
        #[command(flatten)]
        target: TargetArgs,

        #[command(flatten)]
        source: SourceArgs,
    },

    /// Store a new record from a JSON file and notify matching subscribers
    Notify {
        /// Event JSON (`{"type": "outbreak", ...}` or `{"type": "vaccination", ...}`)
        event: PathBuf,

        /// SQLite URL (falls back to SQLITE_PATH)
        #[arg(long)]
        database: Option<String>,

        /// Log notices instead of sending them
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Args)]
struct TargetArgs {
    /// State to build the digest for
    #[arg(long)]
    state: String,

    /// District within the state (omit for the whole state)
    #[arg(long, default_value = "")]
    district: String,

    /// Reference date (defaults to today)
    #[arg(long)]
    date: Option<String>,
}

impl TargetArgs {
    fn location(&self) -> Location {
        Location::new(&self.state, &self.district)
    }

    fn reference_date(&self) -> Result<NaiveDate, Box<dyn std::error::Error>> {
        match &self.date {
            Some(raw) => Ok(parse_date(raw).ok_or_else(|| format!("Unrecognized date: {}", raw))?),
            None => Ok(Local::now().date_naive()),
        }
    }
}

#[derive(Debug, Args)]
struct SourceArgs {
    /// Outbreak CSV export (reads CSV instead of the database)
    #[arg(long)]
    outbreaks_csv: Option<PathBuf>,

    /// Vaccination CSV export (reads CSV instead of the database)
    #[arg(long)]
    vaccinations_csv: Option<PathBuf>,

    /// SQLite URL (falls back to SQLITE_PATH)
    #[arg(long)]
    database: Option<String>,
}

impl SourceArgs {
    async fn open(&self) -> Result<Arc<dyn RecordSource>, Box<dyn std::error::Error>> {
        if self.outbreaks_csv.is_some() || self.vaccinations_csv.is_some() {
            let dataset = CsvDataset::load(
                self.outbreaks_csv.as_deref(),
                self.vaccinations_csv.as_deref(),
            )?;
            return Ok(Arc::new(dataset));
        }
        Ok(Arc::new(open_store(self.database.as_deref()).await?))
    }
}

async fn open_store(url: Option<&str>) -> Result<HealthStore, StoreError> {
    let store = match url {
        Some(url) => HealthStore::connect(url).await?,
        None => HealthStore::connect_from_env().await?,
    };
    store.migrate().await?;
    Ok(store)
}

fn print_report(report: &DispatchReport) {
    for outcome in &report.outcomes {
        println!(
            "{}\t{}\t{}\t{}",
            outcome.channel,
            outcome.recipient,
            outcome.status,
            outcome.detail.as_deref().unwrap_or("")
        );
    }
    println!(
        "sent: {}, failed: {}, dry_run: {}, skipped: {}",
        report.sent(),
        report.failed(),
        report.dry_run(),
        report.skipped()
    );
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = AlertConfig::from_env();

    match cli.command {
        Command::Digest {
            target,
            source,
            channel,
            recipients,
            dry_run,
        } => {
            let config = if dry_run { config.with_dry_run(true) } else { config };
            let service = AlertService::from_config(config, source.open().await?);
            let run = service
                .run_digest(&target.location(), target.reference_date()?, channel, &recipients)
                .await?;
            info!(subject = %run.message.subject, "Digest composed");
            print_report(&run.report);
        }
        Command::Preview { target, source } => {
            let service = AlertService::from_config(config, source.open().await?);
            let message = service
                .compose_digest(&target.location(), target.reference_date()?)
                .await?;
            println!("Subject: {}\n", message.subject);
            println!("{}", message.body);
        }
        Command::Notify {
            event,
            database,
            dry_run,
        } => {
            let event: HealthEvent = serde_json::from_str(&fs::read_to_string(&event)?)?;
            let store = open_store(database.as_deref()).await?;

            let written = match &event {
                HealthEvent::Outbreak(o) => outbreak::create_outbreak(store.pool(), o).await,
                HealthEvent::Vaccination(v) => vaccination::create_vaccination(store.pool(), v).await,
            };
            match written {
                Ok(()) => info!(kind = event.kind(), id = event.id(), "Record stored"),
                Err(StoreError::AlreadyExists { .. }) => {
                    warn!(kind = event.kind(), id = event.id(), "Record already stored, notifying anyway")
                }
                Err(e) => return Err(e.into()),
            }

            let config = if dry_run { config.with_dry_run(true) } else { config };
            let service = Arc::new(AlertService::from_config(config, Arc::new(store)));
            let handle = match event {
                HealthEvent::Outbreak(o) => service.on_outbreak_written(o),
                HealthEvent::Vaccination(v) => service.on_vaccination_written(v),
            };
            print_report(&handle.await?);
        }
    }

    Ok(())
}
