use async_trait::async_trait;
use serde::Deserialize;

use cabinet_core::config::MinistryEndpoints;
use cabinet_core::tasks::CanonicalTask;
use cabinet_core::types::{ActionResult, CheckResult, Ministry};

use crate::gateway::{MinistryGateway, MinistryRequest};

/// Header telling a ministry whether a call is a dry check or a command.
pub const PHASE_HEADER: &str = "X-MCP-Phase";

#[derive(Debug, Clone, Copy)]
enum Phase {
    Check,
    Execute,
}

impl Phase {
    fn as_str(self) -> &'static str {
        match self {
            Phase::Check => "check",
            Phase::Execute => "execute",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct MinistryReply {
    #[serde(default)]
    cleared: Option<bool>,
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    details: Option<String>,
}

/// Outcome of one HTTP round trip, before it is shaped into a result.
struct Reply {
    ok: bool,
    body: MinistryReply,
    status: u16,
}

impl Reply {
    fn details(&mut self) -> String {
        self.body
            .details
            .take()
            .unwrap_or_else(|| format!("HTTP {}", self.status))
    }
}

/// HTTP client for the ministry services.
///
/// A ministry without a configured endpoint is answered locally: checks
/// clear, commands fail. Both cases are logged.
#[derive(Debug, Clone)]
pub struct McpClient {
    http: reqwest::Client,
    endpoints: MinistryEndpoints,
}

impl McpClient {
    pub fn new(http: reqwest::Client, endpoints: MinistryEndpoints) -> Self {
        Self { http, endpoints }
    }

    async fn call(
        &self,
        endpoint: &str,
        phase: Phase,
        task: CanonicalTask,
        request: &MinistryRequest,
    ) -> Result<Reply, reqwest::Error> {
        let response = self
            .http
            .post(format!("{endpoint}/{task}"))
            .header(PHASE_HEADER, phase.as_str())
            .json(request)
            .send()
            .await?;
        let status = response.status();
        // A failed body read is a transport failure; only a body that arrived
        // but is empty or not JSON falls back to the status line.
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice::<MinistryReply>(&bytes).unwrap_or_default();
        Ok(Reply {
            ok: status.is_success(),
            body,
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl MinistryGateway for McpClient {
    async fn ask(
        &self,
        ministry: Ministry,
        task: CanonicalTask,
        request: &MinistryRequest,
    ) -> CheckResult {
        let Some(endpoint) = self.endpoints.endpoint(ministry) else {
            let details = format!("No endpoint configured for {ministry}; defaulting to clear.");
            tracing::warn!(%ministry, %task, "{details}");
            return CheckResult {
                ministry,
                cleared: true,
                details,
            };
        };

        match self.call(endpoint, Phase::Check, task, request).await {
            Ok(mut reply) => {
                let cleared = reply.ok && reply.body.cleared.unwrap_or(true);
                CheckResult {
                    ministry,
                    cleared,
                    details: reply.details(),
                }
            }
            Err(e) => {
                tracing::error!(%ministry, %task, error = %e, "ministry check failed");
                CheckResult {
                    ministry,
                    cleared: false,
                    details: e.to_string(),
                }
            }
        }
    }

    async fn execute(
        &self,
        ministry: Ministry,
        task: CanonicalTask,
        request: &MinistryRequest,
    ) -> ActionResult {
        let Some(endpoint) = self.endpoints.endpoint(ministry) else {
            let details = format!("No endpoint configured for {ministry}; skipping action {task}");
            tracing::warn!(%ministry, %task, "{details}");
            return ActionResult {
                success: false,
                details,
            };
        };

        match self.call(endpoint, Phase::Execute, task, request).await {
            Ok(mut reply) => {
                let success = reply.ok && reply.body.success.unwrap_or(true);
                ActionResult {
                    success,
                    details: reply.details(),
                }
            }
            Err(e) => {
                tracing::error!(%ministry, %task, error = %e, "ministry action failed");
                ActionResult {
                    success: false,
                    details: e.to_string(),
                }
            }
        }
    }
}
