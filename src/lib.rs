pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{
    CsvInventory, HttpCatalogClient, SqliteClassificationStore, StaticInventory, TracingSink,
};
pub use config::SyncConfig;
pub use core::{candidates::CandidateSet, engine::SyncEngine, notifier::Notifier};
pub use domain::model::{CatalogEntry, LibraryItem, PassSummary};
pub use utils::error::{Result, SyncError};
