use reqwest::{Client, Response, StatusCode};
use serde_json::Value;
use thiserror::Error;

use super::models::{ApiConfig, FileRequest, FileResponse, HistoryResponse};
use crate::domain::{DownloadAck, DownloadRecord, Format, ResolvedFile, SourceLink};

/// Failures talking to the resolution endpoint. Holds strings so it can ride
/// inside UI messages, which must be `Clone`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Connection failure: {0}")]
    Connection(String),

    #[error("Backend returned {status}: {}", .message.as_deref().unwrap_or("no details"))]
    Backend { status: u16, message: Option<String> },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Response did not describe any downloadable file")]
    MissingFileInfo,

    #[error("Failed to set up HTTP client: {0}")]
    Setup(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::InvalidResponse(e.to_string())
        } else {
            ApiError::Connection(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct ApiClient {
    config: ApiConfig,
    http: Client,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ApiError::Setup(e.to_string()))?;

        Ok(Self { config, http })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Asks the backend which formats `link` can be delivered in.
    /// Sends `format_hint` because the request shape requires one.
    pub async fn resolve(&self, link: &SourceLink, format_hint: &str) -> Result<ResolvedFile> {
        tracing::debug!(link = %link, "resolving");
        let body = self.post(link, format_hint).await?;
        let body = body.ok_or_else(|| {
            ApiError::InvalidResponse("empty or non-JSON resolution body".to_string())
        })?;

        let info = body.file_info.ok_or(ApiError::MissingFileInfo)?;
        let title = info
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| "Untitled".to_string());

        ResolvedFile::new(title, info.thumbnail, info.available_formats)
            .ok_or(ApiError::MissingFileInfo)
    }

    /// Commits a download of `link` in `format`. Any success status counts.
    pub async fn download(&self, link: &SourceLink, format: &Format) -> Result<DownloadAck> {
        tracing::debug!(link = %link, %format, "requesting download");
        let body = self.post(link, format.as_str()).await?;

        Ok(DownloadAck {
            message: body.and_then(|b| b.message),
        })
    }

    /// Fetches the user's history in the order the backend returns it.
    pub async fn list_history(&self) -> Result<Vec<DownloadRecord>> {
        let response = self
            .http
            .get(self.config.endpoint.clone())
            .query(&[("user_id", self.config.user_id)])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        let value: Option<Value> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message: value.as_ref().and_then(error_field),
            });
        }

        let value = value.ok_or_else(|| {
            ApiError::InvalidResponse("history body is not JSON".to_string())
        })?;
        let body: HistoryResponse = serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;

        Ok(body.history.into_iter().map(DownloadRecord::from).collect())
    }

    /// Sends the shared POST shape and checks status and `error`. Returns the
    /// parsed body when there is one.
    async fn post(&self, link: &SourceLink, format: &str) -> Result<Option<FileResponse>> {
        let request = FileRequest {
            url: link.as_str(),
            format,
            user_id: self.config.user_id,
        };

        let response = self
            .http
            .post(self.config.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let (status, error, body) = read_body(response).await?;

        if !status.is_success() || error.is_some() {
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message: error,
            });
        }

        Ok(body)
    }
}

/// Backend `error` string, if the body carries one.
fn error_field(value: &Value) -> Option<String> {
    value.get("error").and_then(Value::as_str).map(str::to_string)
}

/// Reads a POST response. `error` is taken from the raw JSON before the rest
/// is decoded, so a malformed `file_info` never hides it.
async fn read_body(
    response: Response,
) -> Result<(StatusCode, Option<String>, Option<FileResponse>)> {
    let status = response.status();
    let text = response.text().await?;
    let value: Option<Value> = if text.trim().is_empty() {
        None
    } else {
        serde_json::from_str(&text).ok()
    };

    let error = value.as_ref().and_then(error_field);
    let body = value.and_then(|v| match serde_json::from_value::<FileResponse>(v) {
        Ok(body) => Some(body),
        Err(e) => {
            tracing::debug!("undecodable response body: {e}");
            None
        }
    });

    Ok((status, error, body))
}
