use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("model response did not include a message")]
    MissingContent,

    #[error("model returned a plan with no actions")]
    EmptyPlan,

    #[error("no subscriber for '{0}'")]
    NoSubscriber(String),
}
