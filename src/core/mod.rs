pub mod candidates;
pub mod engine;
pub mod notifier;
pub mod progress;
pub mod reconcile;

pub use crate::domain::model::{CatalogEntry, Classification, ClassificationRecord, QueryType};
pub use crate::domain::ports::{CatalogClient, ClassificationStore, LibraryInventory, LogSink};
pub use crate::utils::error::Result;
