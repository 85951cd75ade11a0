use crate::domain::ports::PageSource;
use crate::utils::error::{EtlError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Plain GET; fine for pages that render listings server-side.
pub struct HttpPageSource {
    client: Client,
}

impl HttpPageSource {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    async fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        tracing::debug!("Page response status: {}", status);
        if !status.is_success() {
            return Err(EtlError::PageFetchError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Headless Chrome behind a Browserless `/content` endpoint, for pages that
/// only render listings after client-side scripts run.
pub struct BrowserlessPageSource {
    client: Client,
    base_url: String,
    token: Option<String>,
    settle: Duration,
}

impl BrowserlessPageSource {
    pub fn new(
        base_url: &str,
        token: Option<&str>,
        settle: Duration,
        timeout: Duration,
    ) -> Result<Self> {
        // 等待時間也要算進請求逾時
        let client = Client::builder().timeout(timeout + settle).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
            settle,
        })
    }
}

#[async_trait]
impl PageSource for BrowserlessPageSource {
    async fn fetch(&self, url: &str) -> Result<String> {
        let endpoint = format!("{}/content", self.base_url);

        let mut body = serde_json::json!({ "url": url });
        if !self.settle.is_zero() {
            body["waitForTimeout"] = serde_json::json!(self.settle.as_millis() as u64);
        }

        let mut request = self.client.post(&endpoint).json(&body);
        if let Some(token) = &self.token {
            request = request.query(&[("token", token)]);
        }

        tracing::debug!("Rendering {} via {}", url, endpoint);
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!("Browserless returned {}: {}", status, message);
            return Err(EtlError::PageFetchError {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}
