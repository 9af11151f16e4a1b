use crate::error::{CabinetError, Result};
use crate::types::Ministry;
use serde::{Deserialize, Serialize};
use std::path::Path;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// PolicyConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_policy_url")]
    pub url: String,
}

fn default_policy_url() -> String {
    "http://localhost:8181".to_string()
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            url: default_policy_url(),
        }
    }
}

// ---------------------------------------------------------------------------
// ModelConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_url")]
    pub api_url: String,
    /// Absent key means every plan is the default plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_model_name")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_model_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_model_name() -> String {
    "gpt-4.1-mini".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_url: default_model_url(),
            api_key: None,
            model: default_model_name(),
            temperature: default_temperature(),
        }
    }
}

// ---------------------------------------------------------------------------
// MinistryEndpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinistryEndpoints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal: Option<String>,
}

impl MinistryEndpoints {
    /// Base URL for `ministry`, without a trailing slash.
    pub fn endpoint(&self, ministry: Ministry) -> Option<&str> {
        let raw = match ministry {
            Ministry::Property => self.property.as_deref(),
            Ministry::Finance => self.finance.as_deref(),
            Ministry::Legal => self.legal.as_deref(),
        };
        raw.map(|u| u.trim_end_matches('/')).filter(|u| !u.is_empty())
    }

    pub fn set(&mut self, ministry: Ministry, url: impl Into<String>) {
        let slot = match ministry {
            Ministry::Property => &mut self.property,
            Ministry::Finance => &mut self.finance,
            Ministry::Legal => &mut self.legal,
        };
        *slot = Some(url.into());
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub ministries: MinistryEndpoints,
    #[serde(default = "default_property_api")]
    pub property_api: String,
    /// Subscription carrying lifecycle events. `None` disables the listener.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_property_api() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            policy: PolicyConfig::default(),
            model: ModelConfig::default(),
            ministries: MinistryEndpoints::default(),
            property_api: default_property_api(),
            subscription: None,
            http_timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CabinetError::ConfigNotFound(path.display().to_string()));
        }
        let data = std::fs::read_to_string(path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// File (if given) overlaid with the process environment.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut cfg = match path {
            Some(p) => Self::load(p)?,
            None => Self::default(),
        };
        cfg.overlay_env(|key| std::env::var(key).ok());
        if cfg.http_timeout_secs == 0 {
            return Err(CabinetError::InvalidConfig(
                "http_timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(cfg)
    }

    /// Apply environment overrides. `lookup` is injected so tests do not
    /// have to mutate the real process environment.
    pub fn overlay_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("OPA_URL") {
            self.policy.url = v;
        }
        if let Some(v) = get("MASTER_AI_API_KEY").or_else(|| get("AI_MODEL_API_KEY")) {
            self.model.api_key = Some(v);
        }
        if let Some(v) = get("MASTER_AI_API_URL").or_else(|| get("AI_MODEL_API_URL")) {
            self.model.api_url = v;
        }
        if let Some(v) = get("MASTER_AI_MODEL_NAME") {
            self.model.model = v;
        }
        for (ministry, key) in [
            (Ministry::Property, "MCP_ENDPOINT_PROPERTY"),
            (Ministry::Finance, "MCP_ENDPOINT_FINANCE"),
            (Ministry::Legal, "MCP_ENDPOINT_LEGAL"),
        ] {
            if let Some(v) = get(key) {
                self.ministries.set(ministry, v);
            }
        }
        if let Some(v) = get("PROPERTY_API_BASE_URL") {
            self.property_api = v;
        }
        if let Some(v) = get("PROPERTY_EVENTS_SUBSCRIPTION") {
            self.subscription = Some(v);
        }
        if let Some(v) = get("CABINET_HTTP_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.http_timeout_secs = v;
        }
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.model.api_key.is_none() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "no model API key configured; every event will use the default plan"
                    .to_string(),
            });
        }

        for ministry in Ministry::all() {
            if self.ministries.endpoint(*ministry).is_none() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!(
                        "no endpoint for ministry '{ministry}'; checks auto-clear and actions fail"
                    ),
                });
            }
        }

        if self.subscription.is_none() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "no event subscription configured; listener disabled".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&self.model.temperature) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "model.temperature={} is outside 0.0..=2.0",
                    self.model.temperature
                ),
            });
        }

        warnings
    }
}
