use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "catalog-sync")]
#[command(about = "Announces new and updated catalog entries for the artists in your library")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "catalog-sync.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON log lines
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run one synchronization pass (default)
    Sync {
        /// Only list the candidates that would be queried
        #[arg(long)]
        dry_run: bool,
    },
    /// Flag a download URL as problematic
    MarkProblematic { url: String },
    /// Report whether a download URL is flagged
    CheckUrl { url: String },
    /// Show the stored record of an entry
    Show { id: i64 },
}

impl CliArgs {
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Sync { dry_run: false })
    }
}
