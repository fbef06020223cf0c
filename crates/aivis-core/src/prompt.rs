//! Prompts and the identity assigner that stamps them at ingestion.
//!
//! Every prompt entering a session (generated, typed in manually, bulk
//! imported, or regenerated by a refresh) gets an id of the form
//! `{source}-{millis}-{seq}-{index}-{suffix}`:
//!
//! - `millis`: wall-clock milliseconds at assignment
//! - `seq`: per-assigner monotonic counter, shared by all callers
//! - `index`: caller-supplied position within the ingested batch
//! - `suffix`: 9 random base-36 characters
//!
//! `seq` alone makes ids unique within one assigner, even when several
//! batches are stamped concurrently. The clock and suffix keep ids from
//! different sessions apart.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::Rng;
use serde::{Deserialize, Serialize};

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Opaque, stable prompt identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptId(String);

impl PromptId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PromptId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Where a prompt came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTag {
    Generated,
    Manual,
    Bulk,
    Refreshed,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::Manual => "manual",
            Self::Bulk => "bulk",
            Self::Refreshed => "refreshed",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A prompt as supplied by the prompt generator or the user, before it has an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPrompt {
    #[serde(rename = "prompt_text")]
    pub text: String,
    pub intent_category: String,
}

impl RawPrompt {
    pub fn new(text: impl Into<String>, intent_category: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            intent_category: intent_category.into(),
        }
    }
}

/// An ingested prompt. Immutable once assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: PromptId,
    #[serde(rename = "prompt_text")]
    pub text: String,
    pub intent_category: String,
    pub source_tag: SourceTag,
}

/// Stamps prompts with session-unique ids.
#[derive(Debug, Default)]
pub struct IdentityAssigner {
    seq: AtomicU64,
}

impl IdentityAssigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign an id to `raw`. `index` is the prompt's position in the batch being ingested.
    pub fn assign(&self, raw: RawPrompt, source_tag: SourceTag, index: usize) -> Prompt {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let millis = chrono::Utc::now().timestamp_millis();
        let id = format!("{source_tag}-{millis}-{seq}-{index}-{}", random_suffix());
        Prompt {
            id: PromptId(id),
            text: raw.text,
            intent_category: raw.intent_category,
            source_tag,
        }
    }

    /// Assign ids to a whole batch, using each prompt's position as its index.
    pub fn assign_all(
        &self,
        raw: impl IntoIterator<Item = RawPrompt>,
        source_tag: SourceTag,
    ) -> Vec<Prompt> {
        raw.into_iter()
            .enumerate()
            .map(|(i, p)| self.assign(p, source_tag, i))
            .collect()
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.seq.load(Ordering::Relaxed)
    }
}

fn random_suffix() -> String {
    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}
