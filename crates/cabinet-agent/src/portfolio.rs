use async_trait::async_trait;

use cabinet_core::brief::PropertySummary;

use crate::error::AgentError;
use crate::gateway::PortfolioSource;

/// Reads property records from the property service's REST API.
#[derive(Debug, Clone)]
pub struct PropertyApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl PropertyApiClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    async fn try_fetch(&self) -> Result<Vec<PropertySummary>, AgentError> {
        let response = self
            .http
            .get(format!("{}/properties", self.base_url))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::Status {
                service: "property API",
                status: status.as_u16(),
                body: String::new(),
            });
        }
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|source| AgentError::Parse {
            what: "property list",
            source,
        })
    }
}

#[async_trait]
impl PortfolioSource for PropertyApiClient {
    async fn fetch_properties(&self) -> Vec<PropertySummary> {
        match self.try_fetch().await {
            Ok(properties) => properties,
            Err(e) => {
                tracing::warn!(error = %e, "unable to fetch properties for brief");
                Vec::new()
            }
        }
    }
}
