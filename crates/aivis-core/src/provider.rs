//! The three logical evaluation providers an audit fans out to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the three fixed providers used for a comparative audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// The standard generation model, without web grounding.
    Standard,
    /// The alternate/open-weights model.
    Alternate,
    /// The standard model with live web-search grounding.
    Grounded,
}

impl ProviderKind {
    /// All providers in dispatch order.
    pub const ALL: [ProviderKind; 3] = [Self::Standard, Self::Alternate, Self::Grounded];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Alternate => "alternate",
            Self::Grounded => "grounded",
        }
    }

    /// Dense index into per-provider arrays.
    pub fn index(&self) -> usize {
        match self {
            Self::Standard => 0,
            Self::Alternate => 1,
            Self::Grounded => 2,
        }
    }

    /// Whether requests for this provider ask the backend for search grounding.
    pub fn grounding_enabled(&self) -> bool {
        matches!(self, Self::Grounded)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown provider kind: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderKind {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "alternate" | "oss" | "open" => Ok(Self::Alternate),
            "grounded" | "google" | "search" => Ok(Self::Grounded),
            other => Err(UnknownProvider(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_dense_and_ordered() {
        let idx: Vec<usize> = ProviderKind::ALL.iter().map(|k| k.index()).collect();
        assert_eq!(idx, vec![0, 1, 2]);
    }

    #[test]
    fn parses_aliases() {
        assert_eq!("oss".parse::<ProviderKind>().unwrap(), ProviderKind::Alternate);
        assert_eq!("Google".parse::<ProviderKind>().unwrap(), ProviderKind::Grounded);
        assert_eq!(" standard ".parse::<ProviderKind>().unwrap(), ProviderKind::Standard);
        assert!("claude".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn only_grounded_requests_grounding() {
        assert!(ProviderKind::Grounded.grounding_enabled());
        assert!(!ProviderKind::Standard.grounding_enabled());
        assert!(!ProviderKind::Alternate.grounding_enabled());
    }
}
