use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use cabinet_core::config::ModelConfig;
use cabinet_core::plan::{default_plan, parse_plan};
use cabinet_core::tasks::vocabulary_prompt;
use cabinet_core::types::{LifecycleEvent, Plan};

use crate::error::AgentError;
use crate::gateway::Planner;

const SYSTEM_PROMPT: &str = "You are the Cabinet Secretary AI. Your job is to design lawful \
automation plans by reading events, understanding the constitution (policy rules), and deciding \
which ministries to query and command.";

// ---------------------------------------------------------------------------
// Wire types (OpenAI-compatible chat completions)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatReply>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// ModelPlanner
// ---------------------------------------------------------------------------

/// Plan generator backed by a chat-completion model.
///
/// Any failure (no key, non-2xx, missing or malformed content) yields the
/// deterministic default plan instead, with the failure as its narrative.
#[derive(Debug, Clone)]
pub struct ModelPlanner {
    http: reqwest::Client,
    config: ModelConfig,
}

impl ModelPlanner {
    pub fn new(http: reqwest::Client, config: ModelConfig) -> Self {
        Self { http, config }
    }

    fn messages(event: &LifecycleEvent) -> Result<Vec<ChatMessage>, AgentError> {
        let event_json = serde_json::to_string_pretty(event).map_err(|source| AgentError::Parse {
            what: "lifecycle event",
            source,
        })?;
        let user = format!(
            "Event details:\n{event_json}\n\n\
             Return only JSON with this shape: {{ \"narrative\": \"...\", \"actions\": [ {{ \
             \"target\": \"property|finance|legal\", \"task\": \"string\", \
             \"kind\": \"check|execute\", \"reason\": \"why\" }} ] }}. \
             Use \"check\" for pre-flight questions and \"execute\" for final commands. \
             Known tasks: {}.",
            vocabulary_prompt()
        );
        Ok(vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT.to_string(),
            },
            ChatMessage {
                role: "user",
                content: user,
            },
        ])
    }

    async fn request_plan(&self, api_key: &str, event: &LifecycleEvent) -> Result<Plan, AgentError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: Self::messages(event)?,
            temperature: self.config.temperature,
        };

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(AgentError::Status {
                service: "model",
                status: status.as_u16(),
                body: text,
            });
        }

        let payload: ChatResponse = serde_json::from_str(&text).map_err(|source| AgentError::Parse {
            what: "model response",
            source,
        })?;
        let content = payload
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(AgentError::MissingContent)?;

        parse_plan(&content)
            .map_err(|source| AgentError::Parse {
                what: "plan",
                source,
            })?
            .ok_or(AgentError::EmptyPlan)
    }
}

#[async_trait]
impl Planner for ModelPlanner {
    async fn create_plan(&self, event: &LifecycleEvent) -> Plan {
        let Some(api_key) = self.config.api_key.as_deref() else {
            tracing::warn!(event_id = %event.event_id, "model API key not configured; using default plan");
            return default_plan(event, Some("no API key configured"));
        };

        match self.request_plan(api_key, event).await {
            Ok(plan) => {
                tracing::info!(
                    event_id = %event.event_id,
                    actions = plan.actions.len(),
                    "model produced plan"
                );
                plan
            }
            Err(e) => {
                tracing::error!(event_id = %event.event_id, error = %e, "plan generation failed; using default");
                default_plan(event, Some(&e.to_string()))
            }
        }
    }
}
