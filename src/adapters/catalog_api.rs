//! HTTP client for the remote catalog: name search and paginated listing.

use crate::config::toml_config::RemoteConfig;
use crate::domain::model::{CatalogEntry, EntryId, QueryType};
use crate::domain::ports::CatalogClient;
use crate::utils::error::{Result, SyncError};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, COOKIE};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

/// Listing columns, in the order the remote table declares them.
const LISTING_COLUMNS: &[&str] = &[
    "addBtn",
    "artistName",
    "titleName",
    "albumName",
    "year",
    "duration",
    "tunings",
    "version",
    "author.name",
    "created_at",
    "updated_at",
    "downloads",
    "parts",
    "platforms",
    "file_pc_link",
    "file_mac_link",
    "artist.name",
    "title",
    "album",
];

const ORDER_COLUMN: &str = "updated_at";

/// Used when the remote omits or garbles a date.
const FALLBACK_DATE: (i32, u32, u32) = (2023, 1, 1);

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: EntryId,
}

#[derive(Debug, Deserialize)]
struct ListingPage {
    /// Absent on some deployments; paging then falls back to short pages.
    #[serde(rename = "recordsFiltered", default)]
    records_filtered: Option<serde_json::Value>,
    #[serde(default)]
    data: Vec<RemoteEntry>,
}

#[derive(Debug, Deserialize)]
struct NamedRef {
    #[serde(default)]
    name: serde_json::Value,
}

/// Row fields are decoded leniently so one odd row cannot sink a whole page.
#[derive(Debug, Deserialize)]
struct RemoteEntry {
    #[serde(default)]
    id: serde_json::Value,
    artist: Option<NamedRef>,
    author: Option<NamedRef>,
    #[serde(default)]
    title: serde_json::Value,
    #[serde(default)]
    album: serde_json::Value,
    #[serde(default)]
    lead: serde_json::Value,
    #[serde(default)]
    rhythm: serde_json::Value,
    #[serde(default)]
    bass: serde_json::Value,
    created_at: Option<String>,
    updated_at: Option<String>,
    #[serde(default)]
    downloads: serde_json::Value,
    #[serde(default)]
    has_lyrics: serde_json::Value,
    file_pc_link: Option<String>,
}

impl RemoteEntry {
    /// `None` when the row carries no usable id.
    fn into_entry(self) -> Option<CatalogEntry> {
        let Some(id) = value_to_i64(&self.id) else {
            tracing::warn!("Skipping listing row without a usable id: {}", self.id);
            return None;
        };

        Some(CatalogEntry {
            id,
            artist: self.artist.and_then(|a| value_to_string(&a.name)),
            author: self.author.and_then(|a| value_to_string(&a.name)),
            title: value_to_string(&self.title),
            album: value_to_string(&self.album),
            lead: value_to_string(&self.lead),
            rhythm: value_to_string(&self.rhythm),
            bass: value_to_string(&self.bass),
            created_at: parse_remote_date(self.created_at.as_deref()),
            modified_at: parse_remote_date(self.updated_at.as_deref()),
            downloads: value_to_i64(&self.downloads).and_then(|d| u64::try_from(d).ok()),
            has_lyrics: value_to_bool(&self.has_lyrics),
            download_url: self.file_pc_link,
        })
    }
}

fn value_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn value_to_i64(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_to_bool(value: &serde_json::Value) -> Option<bool> {
    match value {
        serde_json::Value::Bool(b) => Some(*b),
        serde_json::Value::Number(n) => n.as_i64().map(|n| n != 0),
        serde_json::Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Parses the remote's `MM/dd/yyyy` dates; ISO dates and RFC 3339 are accepted too.
pub fn parse_remote_date(raw: Option<&str>) -> DateTime<Utc> {
    let fallback = || {
        let (y, m, d) = FALLBACK_DATE;
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .unwrap_or_default()
    };

    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return fallback();
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Utc);
    }

    ["%m/%d/%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|| {
            tracing::warn!("Unparsable remote date '{}', using fallback", raw);
            fallback()
        })
}

fn looks_like_html(body: &str) -> bool {
    let head: String = body.trim_start().chars().take(15).collect();
    let head = head.to_ascii_lowercase();
    head.starts_with("<!doctype html") || head.starts_with("<html")
}

pub struct HttpCatalogClient {
    client: Client,
    base_url: String,
    page_size: usize,
    max_pages: usize,
}

impl HttpCatalogClient {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/javascript, */*; q=0.01"),
        );
        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));

        if let Some(cookie) = config.cookie.as_deref().filter(|c| !c.trim().is_empty()) {
            let value = HeaderValue::from_str(cookie.trim()).map_err(|e| {
                SyncError::InvalidConfigValueError {
                    field: "remote.cookie".to_string(),
                    value: "<redacted>".to_string(),
                    reason: e.to_string(),
                }
            })?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size.max(1),
            max_pages: config.max_pages.max(1),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<T> {
        tracing::debug!("Making API request to: {}", url);
        let response = self.client.get(url).query(query).send().await?;
        let status = response.status();
        tracing::debug!("API response status: {}", status);

        let body = response.text().await?;

        if !status.is_success() {
            return Err(SyncError::RemoteStatusError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        if looks_like_html(&body) {
            return Err(SyncError::MalformedResponseError {
                message: format!("expected JSON from {} but received an HTML page", url),
            });
        }

        serde_json::from_str(&body).map_err(|e| SyncError::MalformedResponseError {
            message: format!("could not decode response from {}: {}", url, e),
        })
    }

    fn listing_query(
        &self,
        remote_id: EntryId,
        query_type: QueryType,
        start: usize,
        draw: usize,
    ) -> Vec<(String, String)> {
        let mut query: Vec<(String, String)> = LISTING_COLUMNS
            .iter()
            .enumerate()
            .map(|(i, column)| (format!("columns[{}][data]", i), column.to_string()))
            .collect();

        let order_column = LISTING_COLUMNS
            .iter()
            .position(|c| *c == ORDER_COLUMN)
            .unwrap_or(0);

        query.extend([
            ("draw".to_string(), draw.to_string()),
            ("order[0][column]".to_string(), order_column.to_string()),
            ("order[0][dir]".to_string(), "desc".to_string()),
            ("start".to_string(), start.to_string()),
            ("length".to_string(), self.page_size.to_string()),
            ("search[value]".to_string(), String::new()),
            (query_type.listing_filter().to_string(), remote_id.to_string()),
        ]);
        query
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn resolve_id(&self, name: &str, query_type: QueryType) -> Result<Option<EntryId>> {
        let url = format!("{}/cdlc/search/{}", self.base_url, query_type.search_scope());
        let query = [
            ("term".to_string(), name.to_string()),
            ("_type".to_string(), "query".to_string()),
            ("q".to_string(), name.to_string()),
        ];

        let results: SearchResults = self.get_json(&url, &query).await?;
        Ok(results.results.first().map(|r| r.id))
    }

    async fn fetch_entries(
        &self,
        remote_id: EntryId,
        query_type: QueryType,
    ) -> Result<Vec<CatalogEntry>> {
        let url = format!("{}/", self.base_url);
        let mut entries = Vec::new();
        let mut start = 0;

        for page in 0..self.max_pages {
            let query = self.listing_query(remote_id, query_type, start, page + 1);
            let listing: ListingPage = self.get_json(&url, &query).await?;

            let rows = listing.data.len();
            entries.extend(listing.data.into_iter().filter_map(RemoteEntry::into_entry));
            start += rows;

            let exhausted = match listing.records_filtered.as_ref().and_then(value_to_i64) {
                Some(total) => start as i64 >= total,
                None => rows < self.page_size,
            };
            if rows == 0 || exhausted {
                return Ok(entries);
            }
        }

        tracing::warn!(
            "Listing for {} {} truncated after {} pages ({} entries)",
            query_type,
            remote_id,
            self.max_pages,
            entries.len()
        );
        Ok(entries)
    }
}
