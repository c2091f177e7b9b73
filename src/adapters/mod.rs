// Adapters layer: concrete implementations of the domain ports (http, storage, inventory, sinks).

pub mod catalog_api;
pub mod inventory;
pub mod sink;
pub mod sqlite_store;

pub use catalog_api::HttpCatalogClient;
pub use inventory::{CsvInventory, StaticInventory};
pub use sink::TracingSink;
pub use sqlite_store::SqliteClassificationStore;
