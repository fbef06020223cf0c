use std::fmt;

use aivis_core::ProviderKind;
use aivis_gateway::GatewayError;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchErrorKind {
    /// Provider unreachable or timed out.
    Network,
    /// Provider answered with a non-success status, rate limits included.
    Provider,
    /// Provider answered with a payload of the wrong shape.
    MalformedResponse,
    /// Provider answered fewer prompts than asked. Degraded success, not failure.
    PartialBatch,
    /// The unit already has a call in flight.
    InFlight,
    /// The prompt id is not in the session.
    UnknownPrompt,
    /// The dispatch task ended without producing a result.
    Aborted,
}

impl fmt::Display for DispatchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Network => "network error",
            Self::Provider => "provider error",
            Self::MalformedResponse => "malformed response",
            Self::PartialBatch => "partial batch",
            Self::InFlight => "unit in flight",
            Self::UnknownPrompt => "unknown prompt",
            Self::Aborted => "dispatch aborted",
        })
    }
}

#[derive(Debug, Clone, Error)]
#[error("{provider}: {kind}: {message}")]
pub struct DispatchError {
    pub provider: ProviderKind,
    pub kind: DispatchErrorKind,
    pub message: String,
}

impl DispatchError {
    pub fn new(provider: ProviderKind, kind: DispatchErrorKind, message: impl Into<String>) -> Self {
        Self {
            provider,
            kind,
            message: message.into(),
        }
    }

    pub fn from_gateway(provider: ProviderKind, err: &GatewayError) -> Self {
        let kind = if err.is_network() {
            DispatchErrorKind::Network
        } else if err.is_malformed() {
            DispatchErrorKind::MalformedResponse
        } else {
            DispatchErrorKind::Provider
        };
        Self::new(provider, kind, err.to_string())
    }
}
