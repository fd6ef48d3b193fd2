use thiserror::Error;

/// Failure of a single model call.
///
/// Every variant is recovered the same way by the orchestrator; the split
/// only matters for diagnostics.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The response parsed but lacked the candidate/content/part path.
    #[error("unexpected response structure: {0}")]
    MalformedResponse(String),

    #[error("request to model service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model service returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("could not decode model response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The background task driving the call panicked or was aborted.
    #[error("model task failed: {0}")]
    TaskFailed(String),
}

impl ModelError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, ModelError::MalformedResponse(_))
    }
}
