//! Per-provider result store.
//!
//! Three independent `prompt id -> result` maps, one per provider. A result is
//! filed under the provider it names, so no key is ever written by two
//! providers. Later results replace earlier ones for the same key.

use std::collections::HashMap;
use std::sync::RwLock;

use aivis_core::{EvaluationResult, PromptId, ProviderKind};
use tracing::warn;

use crate::lock;

#[derive(Debug, Default)]
pub struct ResultStore {
    slots: [RwLock<HashMap<PromptId, EvaluationResult>>; 3],
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one result, returning the one it replaced.
    pub fn put(&self, result: EvaluationResult) -> Option<EvaluationResult> {
        let slot = &self.slots[result.provider.index()];
        lock::write(slot).insert(result.prompt_id.clone(), result)
    }

    /// Store a whole batch for `provider` under one lock, so readers see all of it or none.
    ///
    /// Results naming another provider are skipped.
    pub fn put_batch(&self, provider: ProviderKind, results: impl IntoIterator<Item = EvaluationResult>) -> usize {
        let mut slot = lock::write(&self.slots[provider.index()]);
        let mut written = 0;
        for result in results {
            if result.provider != provider {
                warn!(
                    expected = %provider,
                    got = %result.provider,
                    prompt_id = %result.prompt_id,
                    "skipping result filed under the wrong provider"
                );
                continue;
            }
            slot.insert(result.prompt_id.clone(), result);
            written += 1;
        }
        written
    }

    pub fn result_for(&self, prompt_id: &PromptId, provider: ProviderKind) -> Option<EvaluationResult> {
        lock::read(&self.slots[provider.index()]).get(prompt_id).cloned()
    }

    /// Copy of one provider's mapping.
    pub fn snapshot(&self, provider: ProviderKind) -> HashMap<PromptId, EvaluationResult> {
        lock::read(&self.slots[provider.index()]).clone()
    }

    pub fn len(&self, provider: ProviderKind) -> usize {
        lock::read(&self.slots[provider.index()]).len()
    }

    pub fn is_empty(&self) -> bool {
        ProviderKind::ALL.iter().all(|k| self.len(*k) == 0)
    }

    pub fn clear(&self) {
        for slot in &self.slots {
            lock::write(slot).clear();
        }
    }
}
