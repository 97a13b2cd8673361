use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::GridPoint;
use crate::utils::constants::{
    POWER_BASE_URL, POWER_COMMUNITY, POWER_FORMAT, POWER_PARAMETER, USER_AGENT,
};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request for {point} timed out after {timeout:?}")]
    Timeout { point: GridPoint, timeout: Duration },

    #[error("Network request failed for {point}")]
    Transport {
        point: GridPoint,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("HTTP request for {point} failed with status {status}")]
    HttpStatus { point: GridPoint, status: StatusCode },

    #[error("Malformed response payload for {point}")]
    MalformedPayload {
        point: GridPoint,
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Short cause name recorded in the failure log as `error:<kind>`
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout { .. } => "Timeout",
            FetchError::Transport { .. } => "Transport",
            FetchError::HttpStatus { .. } => "HttpStatus",
            FetchError::MalformedPayload { .. } => "MalformedPayload",
        }
    }

    pub fn point(&self) -> GridPoint {
        match self {
            FetchError::Timeout { point, .. }
            | FetchError::Transport { point, .. }
            | FetchError::HttpStatus { point, .. }
            | FetchError::MalformedPayload { point, .. } => *point,
        }
    }
}

/// Remote source of monthly temperature payloads.
#[async_trait]
pub trait TemperatureSource {
    /// Human-readable identity stored in the dataset metadata
    fn source_name(&self) -> &str;

    /// Parameter the payload series is keyed by
    fn parameter(&self) -> &str {
        POWER_PARAMETER
    }

    /// Fetch the raw response for one point. Never retries.
    async fn fetch(
        &self,
        point: GridPoint,
        start_year: i32,
        end_year: i32,
    ) -> std::result::Result<Value, FetchError>;
}

/// Client for the NASA POWER monthly point endpoint.
pub struct PowerClient {
    http: Client,
    base_url: String,
    parameter: String,
    community: String,
    timeout: Duration,
}

impl PowerClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: POWER_BASE_URL.to_string(),
            parameter: POWER_PARAMETER.to_string(),
            community: POWER_COMMUNITY.to_string(),
            timeout,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn query(&self, point: GridPoint, start_year: i32, end_year: i32) -> Vec<(&'static str, String)> {
        vec![
            ("parameters", self.parameter.clone()),
            ("community", self.community.clone()),
            ("format", POWER_FORMAT.to_string()),
            ("longitude", format!("{:.1}", point.lon)),
            ("latitude", format!("{:.1}", point.lat)),
            ("start", start_year.to_string()),
            ("end", end_year.to_string()),
        ]
    }

    fn map_transport_error(&self, point: GridPoint, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout {
                point,
                timeout: self.timeout,
            }
        } else {
            FetchError::Transport {
                point,
                source: Box::new(error),
            }
        }
    }
}

#[async_trait]
impl TemperatureSource for PowerClient {
    fn source_name(&self) -> &str {
        &self.base_url
    }

    fn parameter(&self) -> &str {
        &self.parameter
    }

    async fn fetch(
        &self,
        point: GridPoint,
        start_year: i32,
        end_year: i32,
    ) -> std::result::Result<Value, FetchError> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&self.query(point, start_year, end_year))
            .send()
            .await
            .map_err(|e| self.map_transport_error(point, e))?;

        let status = response.status();
        info!("FETCH {} status={} url={}", point, status, response.url());

        if !status.is_success() {
            warn!("HTTP error for {}: {}", point, status);
            return Err(FetchError::HttpStatus { point, status });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.map_transport_error(point, e))?;

        serde_json::from_str(&body).map_err(|source| FetchError::MalformedPayload { point, source })
    }
}
