use catalog_sync::config::cli::{CliArgs, Command};
use catalog_sync::domain::ports::{ClassificationStore, LibraryInventory};
use catalog_sync::utils::error::{ErrorSeverity, SyncError};
use catalog_sync::utils::logger::{self, LogFormat};
use catalog_sync::utils::validation::Validate;
use catalog_sync::{
    CsvInventory, HttpCatalogClient, SqliteClassificationStore, StaticInventory, SyncConfig,
    SyncEngine, TracingSink,
};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    let format = if args.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(format, args.verbose);

    tracing::info!("🚀 Starting catalog-sync");
    tracing::debug!("CLI args: {:?}", args);

    let config = match load_config(&args.config) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&args, config).await {
        tracing::error!("❌ {} (Severity: {:?})", e, e.severity());
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        let exit_code = match e.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        };
        std::process::exit(exit_code);
    }

    Ok(())
}

fn load_config(path: &str) -> Result<SyncConfig, SyncError> {
    let config = if std::path::Path::new(path).exists() {
        SyncConfig::from_file(path)?
    } else {
        tracing::warn!("Config file '{}' not found, using defaults", path);
        SyncConfig::default()
    };
    config.validate()?;
    Ok(config)
}

async fn run(args: &CliArgs, config: SyncConfig) -> Result<(), SyncError> {
    let store = Arc::new(SqliteClassificationStore::open(&config.store.path)?);
    tracing::info!(
        "📁 Classification store '{}' holds {} entries",
        config.store.path,
        store.count()?
    );

    match args.command() {
        Command::MarkProblematic { url } => {
            store.mark_problematic(&url)?;
            println!("Flagged {}", url);
        }
        Command::CheckUrl { url } => {
            let flagged = store.is_problematic(&url)?;
            println!("{} is {}", url, if flagged { "flagged" } else { "not flagged" });
        }
        Command::Show { id } => match store.get(id)? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => println!("Entry {} has not been announced yet", id),
        },
        Command::Sync { dry_run } => {
            let inventory: Box<dyn LibraryInventory> = match &config.library.inventory {
                Some(path) => Box::new(CsvInventory::new(path)),
                None => {
                    tracing::warn!("No library inventory configured, using include lists only");
                    Box::new(StaticInventory::default())
                }
            };

            let client = Arc::new(HttpCatalogClient::new(&config.remote)?);
            let engine = SyncEngine::new(&config, client, store, Arc::new(TracingSink));

            if dry_run {
                tracing::info!("🔍 DRY RUN MODE - No remote queries will be made");
                let candidates = engine.candidates(inventory.as_ref())?;
                for artist in &candidates.artists {
                    println!("artist  {}", artist);
                }
                for creator in &candidates.creators {
                    println!("creator {}", creator);
                }
                return Ok(());
            }

            let summary = engine.run(inventory.as_ref()).await?;
            tracing::debug!("Pass summary: {:?}", summary);
        }
    }

    Ok(())
}
