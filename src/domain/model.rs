use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric identifier the remote catalog assigns to an entry.
pub type EntryId = i64;

/// One item of the remote catalog, as fetched for a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: EntryId,
    pub artist: Option<String>,
    /// Creator who uploaded the entry.
    pub author: Option<String>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub lead: Option<String>,
    pub rhythm: Option<String>,
    pub bass: Option<String>,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub downloads: Option<u64>,
    pub has_lyrics: Option<bool>,
    pub download_url: Option<String>,
}

impl CatalogEntry {
    pub fn is_lead(&self) -> bool {
        is_present(&self.lead)
    }

    pub fn is_rhythm(&self) -> bool {
        is_present(&self.rhythm)
    }

    pub fn is_bass(&self) -> bool {
        is_present(&self.bass)
    }

    pub fn is_pc(&self) -> bool {
        is_present(&self.download_url)
    }

    /// The download link, if it is usable for an announcement.
    pub fn usable_url(&self) -> Option<&str> {
        self.download_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

fn is_present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

/// What the store remembers about an announced entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub id: EntryId,
    pub artist: String,
    pub title: String,
    pub album: String,
    pub modified_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub url: String,
}

impl From<&CatalogEntry> for ClassificationRecord {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            id: entry.id,
            artist: entry.artist.clone().unwrap_or_default(),
            title: entry.title.clone().unwrap_or_default(),
            album: entry.album.clone().unwrap_or_default(),
            modified_at: entry.modified_at,
            created_at: entry.created_at,
            url: entry.download_url.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Never announced.
    NotHandled,
    /// Announced and nothing changed since.
    Handled,
    /// Announced, but the remote copy was modified after the stored timestamp.
    Outdated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    Artist,
    Creator,
}

impl QueryType {
    /// Scope segment of the remote name search.
    pub fn search_scope(self) -> &'static str {
        match self {
            QueryType::Artist => "artists",
            QueryType::Creator => "members",
        }
    }

    /// Listing parameter that restricts results to one resolved id.
    pub fn listing_filter(self) -> &'static str {
        match self {
            QueryType::Artist => "filter_artist[]",
            QueryType::Creator => "filter_member[]",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryType::Artist => write!(f, "artist"),
            QueryType::Creator => write!(f, "creator"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Candidate {
    pub name: String,
    pub query_type: QueryType,
}

impl Candidate {
    pub fn artist(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query_type: QueryType::Artist,
        }
    }

    pub fn creator(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query_type: QueryType::Creator,
        }
    }
}

/// A locally-known item of the media library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryItem {
    pub artist: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    pub candidates: usize,
    pub unmatched: usize,
    pub failed: usize,
    pub entries_fetched: usize,
    pub announced: usize,
    pub refreshed: usize,
}

impl PassSummary {
    pub(crate) fn absorb(&mut self, other: &PassSummary) {
        self.unmatched += other.unmatched;
        self.failed += other.failed;
        self.entries_fetched += other.entries_fetched;
        self.announced += other.announced;
        self.refreshed += other.refreshed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: Option<&str>) -> CatalogEntry {
        CatalogEntry {
            id: 7,
            artist: Some("Artist".to_string()),
            author: None,
            title: None,
            album: None,
            lead: Some("1".to_string()),
            rhythm: Some("  ".to_string()),
            bass: None,
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
            modified_at: DateTime::from_timestamp(10, 0).unwrap(),
            downloads: None,
            has_lyrics: None,
            download_url: url.map(str::to_string),
        }
    }

    #[test]
    fn test_part_flags() {
        let e = entry(Some("https://example.com/file"));
        assert!(e.is_lead());
        assert!(!e.is_rhythm());
        assert!(!e.is_bass());
        assert!(e.is_pc());
    }

    #[test]
    fn test_usable_url_rejects_blank() {
        assert_eq!(entry(Some("   ")).usable_url(), None);
        assert_eq!(entry(None).usable_url(), None);
        assert_eq!(entry(Some(" x ")).usable_url(), Some("x"));
    }

    #[test]
    fn test_record_from_entry_defaults_missing_text() {
        let record = ClassificationRecord::from(&entry(None));
        assert_eq!(record.artist, "Artist");
        assert_eq!(record.title, "");
        assert_eq!(record.url, "");
    }
}
