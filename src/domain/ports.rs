use crate::domain::model::{
    CatalogEntry, Classification, ClassificationRecord, EntryId, LibraryItem, PassSummary,
    QueryType,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Remote catalog search and listing, on top of an already authenticated session.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// First remote id matching `name`, or `None` when the search has no results.
    async fn resolve_id(&self, name: &str, query_type: QueryType) -> Result<Option<EntryId>>;

    /// Every entry listed for `remote_id`, most recently updated first.
    async fn fetch_entries(
        &self,
        remote_id: EntryId,
        query_type: QueryType,
    ) -> Result<Vec<CatalogEntry>>;
}

/// Durable record of announced entries and problematic URLs.
///
/// Implementations serialize their writes; every method may be called from
/// several jobs at once.
pub trait ClassificationStore: Send + Sync {
    fn classify(&self, id: EntryId, remote_modified_at: DateTime<Utc>) -> Result<Classification>;

    /// Creates the record unless one already exists for `record.id`. Returns
    /// whether a row was written.
    fn insert(&self, record: &ClassificationRecord) -> Result<bool>;

    fn update_modified_at(&self, id: EntryId, modified_at: DateTime<Utc>) -> Result<()>;

    fn get(&self, id: EntryId) -> Result<Option<ClassificationRecord>>;

    fn count(&self) -> Result<usize>;

    fn mark_problematic(&self, url: &str) -> Result<()>;

    fn is_problematic(&self, url: &str) -> Result<bool>;
}

pub trait LibraryInventory: Send + Sync {
    fn items(&self) -> Result<Vec<LibraryItem>>;
}

/// Receives everything a pass wants a human to see.
pub trait LogSink: Send + Sync {
    fn notify(&self, message: &str);
    fn error(&self, message: &str);
    fn complete(&self, summary: &PassSummary);
}
