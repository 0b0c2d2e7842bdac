use crate::domain::error::DomainError;
use crate::domain::ports::ads_platform::AdsPlatform;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;

/// Graph-style insights client used for the link-click fallback. One request
/// per (ad set, month); the caller bounds concurrency.
pub struct HttpAdsPlatform {
    base_url: String,
    access_token: String,
    client: reqwest::Client,
}

impl HttpAdsPlatform {
    pub fn new(access_token: String, base_url: Option<String>) -> Self {
        Self {
            base_url: base_url.unwrap_or_else(|| "https://graph.facebook.com/v19.0".to_string()),
            access_token,
            client: reqwest::Client::builder()
                .user_agent("adlens/0.1")
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
        }
    }
}

#[derive(Debug, serde::Deserialize)]
struct InsightsResponse {
    #[serde(default)]
    data: Vec<InsightsRow>,
}

#[derive(Debug, serde::Deserialize)]
struct InsightsRow {
    // the API reports counts as strings
    #[serde(default)]
    inline_link_clicks: Option<String>,
}

#[async_trait]
impl AdsPlatform for HttpAdsPlatform {
    async fn get_link_clicks(
        &self,
        ad_set_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<u64, DomainError> {
        let url = format!("{}/{}/insights", self.base_url, ad_set_id);
        let time_range = format!(
            "{{\"since\":\"{}\",\"until\":\"{}\"}}",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        );

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("fields", "inline_link_clicks"),
                ("time_range", time_range.as_str()),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DomainError::Platform(format!("insights request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(DomainError::Platform(format!(
                "insights API returned {}",
                resp.status()
            )));
        }

        let body: InsightsResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::Parse(e.to_string()))?;

        let total = body
            .data
            .iter()
            .filter_map(|row| row.inline_link_clicks.as_deref())
            .filter_map(|v| v.parse::<u64>().ok())
            .sum();
        Ok(total)
    }

    fn name(&self) -> &str {
        "graph-insights"
    }
}
