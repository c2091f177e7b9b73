use crate::domain::model::LibraryItem;
use crate::domain::ports::LibraryInventory;
use crate::utils::error::Result;
use std::path::PathBuf;

/// Library inventory exported as CSV with `artist,path` columns.
#[derive(Debug, Clone)]
pub struct CsvInventory {
    path: PathBuf,
}

impl CsvInventory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LibraryInventory for CsvInventory {
    fn items(&self) -> Result<Vec<LibraryItem>> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .flexible(true)
            .from_path(&self.path)?;

        let items = reader
            .deserialize()
            .collect::<std::result::Result<Vec<LibraryItem>, csv::Error>>()?;

        tracing::debug!(
            "Loaded {} library items from {}",
            items.len(),
            self.path.display()
        );
        Ok(items)
    }
}

/// Inventory handed over directly, e.g. by an embedding application.
#[derive(Debug, Clone, Default)]
pub struct StaticInventory {
    items: Vec<LibraryItem>,
}

impl StaticInventory {
    pub fn new(items: Vec<LibraryItem>) -> Self {
        Self { items }
    }
}

impl LibraryInventory for StaticInventory {
    fn items(&self) -> Result<Vec<LibraryItem>> {
        Ok(self.items.clone())
    }
}
