//! Company profile produced by the upstream site analysis.
//!
//! The orchestrator never interprets the profile beyond logging its name; it is
//! passed unchanged to every gateway call. Fields the analysis adds that are not
//! modelled here survive a round trip through `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(default = "default_name")]
    pub company_name: String,
    #[serde(default)]
    pub company_summary: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default)]
    pub offerings: Vec<String>,
    #[serde(default)]
    pub target_users: Vec<String>,
    #[serde(default)]
    pub core_problems_solved: Vec<String>,
    #[serde(default)]
    pub manual_points: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_name() -> String {
    "Pending Analysis...".to_string()
}

fn default_region() -> String {
    "Global".to_string()
}

impl CompanyProfile {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: company_name.into(),
            company_summary: String::new(),
            industry: String::new(),
            offerings: Vec::new(),
            target_users: Vec::new(),
            core_problems_solved: Vec::new(),
            manual_points: None,
            url: String::new(),
            region: default_region(),
            extra: Map::new(),
        }
    }
}
