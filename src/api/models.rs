use std::time::Duration;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::domain::DownloadRecord;

/// Body of every POST to the endpoint; resolving and confirming share this shape.
#[derive(Debug, Clone, Serialize)]
pub struct FileRequest<'a> {
    pub url: &'a str,
    pub format: &'a str,
    pub user_id: i64,
}

/// Success body of a POST. `error` is read separately from the raw JSON so a
/// malformed `file_info` cannot hide it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileResponse {
    #[serde(default)]
    pub file_info: Option<FileInfo>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileInfo {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub available_formats: Vec<String>,
}

/// Response from `GET ?user_id=`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryResponse {
    #[serde(default, deserialize_with = "lenient_entries")]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: Option<RecordId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub format: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub downloaded_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

/// Record ids arrive as database integers but are only ever displayed.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl From<HistoryEntry> for DownloadRecord {
    fn from(entry: HistoryEntry) -> Self {
        let id = match entry.id {
            Some(RecordId::Number(n)) => n.to_string(),
            Some(RecordId::Text(s)) => s,
            None => String::new(),
        };

        DownloadRecord {
            id,
            title: entry
                .title
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| "Untitled".to_string()),
            url: entry.url,
            format: entry.format.to_uppercase(),
            downloaded_at: entry.downloaded_at,
            thumbnail: entry.thumbnail,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decodes history entries one by one. `null` is an empty list and entries
/// that fail to decode are skipped.
fn lenient_entries<'de, D>(deserializer: D) -> Result<Vec<HistoryEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<HistoryEntry>(value) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!("skipping malformed history record: {e}");
                None
            }
        })
        .collect())
}

/// Accepts RFC 3339 or naive ISO 8601; anything else becomes `None` rather
/// than failing the whole history list.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.naive_utc())
            .or_else(|_| s.parse::<NaiveDateTime>())
            .ok()
    }))
}

/// Configuration for the API client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub endpoint: Url,
    pub user_id: i64,
    /// Sent on the probing call, where the backend only needs some format.
    pub default_format: String,
    pub timeout: Duration,
}

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8080/api/files";

impl Default for ApiConfig {
    fn default() -> Self {
        let raw = option_env!("ASSET_GRABBER_ENDPOINT").unwrap_or(DEFAULT_ENDPOINT);
        let endpoint = Url::parse(raw).unwrap_or_else(|e| {
            tracing::warn!("invalid build-time endpoint {raw:?} ({e}), using default");
            Url::parse(DEFAULT_ENDPOINT).expect("default endpoint is a valid URL")
        });

        Self {
            endpoint,
            user_id: 0,
            default_format: "PNG".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_user_id(mut self, user_id: i64) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn with_default_format(mut self, format: impl Into<String>) -> Self {
        self.default_format = format.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
