use async_trait::async_trait;
use serde::Deserialize;

use cabinet_core::rules::POLICY_PACKAGE;

use crate::error::AgentError;
use crate::gateway::{PolicyDecision, PolicyGate};

/// Client for an OPA-style policy server.
///
/// Posts `{ "input": ... }` to `{base}/v1/data/property/lifecycle/{rule}` and
/// reads back `{ "result": ... }`.
#[derive(Debug, Clone)]
pub struct OpaClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct OpaResponse {
    #[serde(default)]
    result: serde_json::Value,
}

impl OpaClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn rule_url(&self, rule: &str) -> String {
        format!("{}/v1/data/{POLICY_PACKAGE}/{rule}", self.base_url)
    }

    async fn try_evaluate(&self, rule: &str, input: &serde_json::Value) -> Result<bool, AgentError> {
        let response = self
            .http
            .post(self.rule_url(rule))
            .json(&serde_json::json!({ "input": input }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::Status {
                service: "policy server",
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let payload: OpaResponse = serde_json::from_str(&text).map_err(|source| AgentError::Parse {
            what: "policy response",
            source,
        })?;
        let allowed = truthy(&payload.result);
        tracing::debug!(rule, allowed, raw = %payload.result, "policy evaluated");
        Ok(allowed)
    }
}

#[async_trait]
impl PolicyGate for OpaClient {
    async fn evaluate(&self, rule: &str, input: &serde_json::Value) -> PolicyDecision {
        match self.try_evaluate(rule, input).await {
            Ok(true) => PolicyDecision::allow(),
            Ok(false) => PolicyDecision {
                allowed: false,
                reason: None,
            },
            Err(e) => {
                tracing::error!(rule, error = %e, "policy evaluation failed");
                PolicyDecision::deny(e.to_string())
            }
        }
    }
}

/// Loose truthiness of a policy result: missing, `false`, `0` and `""` deny.
fn truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => true,
    }
}
