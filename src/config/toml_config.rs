use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{
    validate_base_url, validate_bounded, validate_file_path, validate_header_value, Validate,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "https://ignition4.customsforge.com";
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:83.0) Gecko/20100101 Firefox/83.0";
pub const DEFAULT_NOTIFICATION_FORMAT: &str =
    "'%Artist' - '%Title' uploaded %ModifiedDate with %Downloads downloads - %URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub filters: FiltersConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub sync: PassConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Session cookie of an already logged-in browser session.
    pub cookie: Option<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            cookie: None,
            user_agent: default_user_agent(),
            request_timeout_seconds: default_request_timeout(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_store_path")]
    pub path: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// CSV file with `artist,path` rows.
    pub inventory: Option<String>,
}

/// Ignore/include lists. Each list accepts a TOML array or a `|`-separated string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FiltersConfig {
    /// Entries modified on or before this `yyyy-mm-dd` date are ignored.
    pub date_to_start_by: Option<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub artists_to_ignore: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub artists_to_include: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub creators_to_include: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub creators_to_ignore: Vec<String>,
    #[serde(default, deserialize_with = "string_or_list")]
    pub folders_to_ignore: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotificationConfig {
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassConfig {
    #[serde(default = "default_concurrent_requests")]
    pub concurrent_requests: usize,
    #[serde(default = "default_job_delay_ms")]
    pub job_delay_ms: u64,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            concurrent_requests: default_concurrent_requests(),
            job_delay_ms: default_job_delay_ms(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_page_size() -> usize {
    100
}

fn default_max_pages() -> usize {
    50
}

fn default_store_path() -> String {
    "catalog_sync.sqlite".to_string()
}

fn default_concurrent_requests() -> usize {
    5
}

fn default_job_delay_ms() -> u64 {
    200
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrList {
    Piped(String),
    List(Vec<String>),
}

fn string_or_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::Piped(s) => s.split('|').map(str::to_string).collect(),
        StringOrList::List(list) => list,
    })
}

impl SyncConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SyncError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SyncError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${CATALOG_COOKIE})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SyncError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_base_url("remote.base_url", &self.remote.base_url)?;
        if let Some(cookie) = &self.remote.cookie {
            validate_header_value("remote.cookie", cookie)?;
        }
        validate_header_value("remote.user_agent", &self.remote.user_agent)?;
        validate_file_path("store.path", &self.store.path)?;

        if let Some(inventory) = &self.library.inventory {
            validate_file_path("library.inventory", inventory)?;
        }

        validate_bounded("remote.page_size", self.remote.page_size as u64, 1, Some(500))?;
        validate_bounded("remote.max_pages", self.remote.max_pages as u64, 1, None)?;
        validate_bounded(
            "remote.request_timeout_seconds",
            self.remote.request_timeout_seconds,
            1,
            Some(600),
        )?;
        validate_bounded(
            "sync.concurrent_requests",
            self.sync.concurrent_requests as u64,
            1,
            None,
        )?;

        Ok(())
    }

    /// The configured template, or the default when none is set.
    pub fn notification_format(&self) -> &str {
        match self.notification.format.as_deref() {
            Some(format) if !format.trim().is_empty() => format,
            _ => DEFAULT_NOTIFICATION_FORMAT,
        }
    }
}

impl Validate for SyncConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[remote]
base_url = "https://catalog.example.com"
cookie = "session=abc"
page_size = 25

[store]
path = "./seen.sqlite"

[library]
inventory = "./library.csv"

[filters]
date_to_start_by = "2019-01-01"
artists_to_ignore = ["Foo", "Bar"]
creators_to_include = "alice | bob"
folders_to_ignore = "official|rs1"

[notification]
format = "%Artist - %Title"

[sync]
concurrent_requests = 2
job_delay_ms = 0
"#;

        let config = SyncConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.remote.base_url, "https://catalog.example.com");
        assert_eq!(config.remote.cookie.as_deref(), Some("session=abc"));
        assert_eq!(config.remote.page_size, 25);
        assert_eq!(config.remote.request_timeout_seconds, 30);
        assert_eq!(config.filters.artists_to_ignore, vec!["Foo", "Bar"]);
        assert_eq!(config.filters.creators_to_include, vec!["alice ", " bob"]);
        assert_eq!(config.filters.folders_to_ignore, vec!["official", "rs1"]);
        assert!(config.filters.artists_to_include.is_empty());
        assert_eq!(config.notification_format(), "%Artist - %Title");
        assert_eq!(config.sync.concurrent_requests, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = SyncConfig::from_toml_str("").unwrap();

        assert_eq!(config.remote.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.store.path, "catalog_sync.sqlite");
        assert_eq!(config.sync.job_delay_ms, 200);
        assert_eq!(config.notification_format(), DEFAULT_NOTIFICATION_FORMAT);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_blank_format_falls_back_to_default() {
        let config = SyncConfig::from_toml_str("[notification]\nformat = \"  \"\n").unwrap();
        assert_eq!(config.notification_format(), DEFAULT_NOTIFICATION_FORMAT);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CATALOG_SYNC_TEST_COOKIE", "session=from-env");

        let toml_content = r#"
[remote]
cookie = "${CATALOG_SYNC_TEST_COOKIE}"
"#;

        let config = SyncConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.remote.cookie.as_deref(), Some("session=from-env"));

        std::env::remove_var("CATALOG_SYNC_TEST_COOKIE");
    }

    #[test]
    fn test_config_validation() {
        let config = SyncConfig::from_toml_str("[remote]\nbase_url = \"invalid-url\"\n").unwrap();
        assert!(config.validate().is_err());

        let config = SyncConfig::from_toml_str("[sync]\nconcurrent_requests = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config = SyncConfig::from_toml_str("[remote]\ncookie = \"a\\u0007b\"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[store]\npath = \"./from-file.sqlite\"\n")
            .unwrap();

        let config = SyncConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.store.path, "./from-file.sqlite");
    }
}
