use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("provider unreachable: {0}")]
    Unreachable(String),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Transport-level failure: the provider was never reached or timed out.
    pub fn is_network(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_decode() && !e.is_status(),
            Self::Unreachable(_) => true,
            _ => false,
        }
    }

    /// The response arrived but did not have the expected shape.
    pub fn is_malformed(&self) -> bool {
        match self {
            Self::Json(_) | Self::Malformed(_) => true,
            Self::Http(e) => e.is_decode(),
            _ => false,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::Server { status: 429, .. })
    }
}
