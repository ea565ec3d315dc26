//! HTTP client for the daemon's API.

pub mod types;

use anyhow::Result;

use crate::detection::Detection;
use types::{AlertStatus, DetectionRequest, DetectionResponse, StopResponse};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5500";

pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v0{}", self.base_url, path)
    }

    pub async fn health(&self) -> Result<String> {
        Ok(self
            .http
            .get(self.url("/health"))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?)
    }

    pub async fn get_alert(&self) -> Result<AlertStatus> {
        Ok(self
            .http
            .get(self.url("/alert"))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    pub async fn post_detections(&self, detections: Vec<Detection>) -> Result<DetectionResponse> {
        Ok(self
            .http
            .post(self.url("/detections"))
            .json(&DetectionRequest { detections })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    /// Silence the continuous alert.
    pub async fn stop_beep(&self) -> Result<StopResponse> {
        self.post_stop("/alert/stop").await
    }

    /// Silence everything and reset the session.
    pub async fn stop_session(&self) -> Result<StopResponse> {
        self.post_stop("/session/stop").await
    }

    async fn post_stop(&self, path: &str) -> Result<StopResponse> {
        Ok(self
            .http
            .post(self.url(path))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }
}
