//! Unit-of-work tracker: one phase per (prompt, provider) pair.
//!
//! Writes overwrite; no transition is rejected. Dispatchers are expected to
//! drive `idle -> in_flight -> {succeeded | failed}`. A unit with no entry is
//! idle.

use std::collections::HashMap;
use std::sync::RwLock;

use aivis_core::{PromptId, ProviderKind};
use serde::Serialize;

use crate::lock;

pub type UnitKey = (PromptId, ProviderKind);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitPhase {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitState {
    pub prompt_id: PromptId,
    pub provider: ProviderKind,
    pub phase: UnitPhase,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
pub struct Tracker {
    units: RwLock<HashMap<UnitKey, UnitState>>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite one unit's phase.
    pub fn set_phase(
        &self,
        prompt_id: &PromptId,
        provider: ProviderKind,
        phase: UnitPhase,
        error: Option<String>,
    ) {
        let mut units = lock::write(&self.units);
        units.insert(
            (prompt_id.clone(), provider),
            UnitState {
                prompt_id: prompt_id.clone(),
                provider,
                phase,
                last_error: error,
            },
        );
    }

    /// Overwrite the phase of many units for one provider under a single lock.
    pub fn set_phase_all<'a>(
        &self,
        prompt_ids: impl IntoIterator<Item = &'a PromptId>,
        provider: ProviderKind,
        phase: UnitPhase,
        error: Option<&str>,
    ) {
        let mut units = lock::write(&self.units);
        for id in prompt_ids {
            units.insert(
                (id.clone(), provider),
                UnitState {
                    prompt_id: id.clone(),
                    provider,
                    phase,
                    last_error: error.map(str::to_string),
                },
            );
        }
    }

    /// Mark a unit in flight unless it already is. Returns whether it was claimed.
    pub fn try_begin(&self, prompt_id: &PromptId, provider: ProviderKind) -> bool {
        let mut units = lock::write(&self.units);
        let key = (prompt_id.clone(), provider);
        if units
            .get(&key)
            .is_some_and(|u| u.phase == UnitPhase::InFlight)
        {
            return false;
        }
        units.insert(
            key,
            UnitState {
                prompt_id: prompt_id.clone(),
                provider,
                phase: UnitPhase::InFlight,
                last_error: None,
            },
        );
        true
    }

    /// Claim a whole batch for `provider`: all units go in flight, or none do
    /// if any of them already is.
    pub fn try_begin_all<'a>(
        &self,
        prompt_ids: impl IntoIterator<Item = &'a PromptId>,
        provider: ProviderKind,
    ) -> bool {
        let ids: Vec<&PromptId> = prompt_ids.into_iter().collect();
        let mut units = lock::write(&self.units);
        let busy = ids.iter().any(|id| {
            units
                .get(&((*id).clone(), provider))
                .is_some_and(|u| u.phase == UnitPhase::InFlight)
        });
        if busy {
            return false;
        }
        for id in ids {
            units.insert(
                (id.clone(), provider),
                UnitState {
                    prompt_id: id.clone(),
                    provider,
                    phase: UnitPhase::InFlight,
                    last_error: None,
                },
            );
        }
        true
    }

    pub fn phase(&self, prompt_id: &PromptId, provider: ProviderKind) -> UnitPhase {
        lock::read(&self.units)
            .get(&(prompt_id.clone(), provider))
            .map(|u| u.phase)
            .unwrap_or_default()
    }

    pub fn state(&self, prompt_id: &PromptId, provider: ProviderKind) -> Option<UnitState> {
        lock::read(&self.units)
            .get(&(prompt_id.clone(), provider))
            .cloned()
    }

    pub fn is_in_flight(&self, prompt_id: &PromptId, provider: ProviderKind) -> bool {
        self.phase(prompt_id, provider) == UnitPhase::InFlight
    }

    /// Number of units currently in flight across all providers.
    pub fn in_flight_count(&self) -> usize {
        lock::read(&self.units)
            .values()
            .filter(|u| u.phase == UnitPhase::InFlight)
            .count()
    }

    /// Point-in-time copy of every tracked unit.
    pub fn snapshot(&self) -> HashMap<UnitKey, UnitState> {
        lock::read(&self.units).clone()
    }

    pub fn clear(&self) {
        lock::write(&self.units).clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> PromptId {
        PromptId::from(s)
    }

    #[test]
    fn untracked_unit_is_idle() {
        let t = Tracker::new();
        assert_eq!(t.phase(&id("p1"), ProviderKind::Standard), UnitPhase::Idle);
        assert!(t.state(&id("p1"), ProviderKind::Standard).is_none());
    }

    #[test]
    fn last_write_wins_per_key() {
        let t = Tracker::new();
        t.set_phase(&id("p1"), ProviderKind::Standard, UnitPhase::InFlight, None);
        t.set_phase(
            &id("p1"),
            ProviderKind::Standard,
            UnitPhase::Failed,
            Some("timeout".into()),
        );
        let s = t.state(&id("p1"), ProviderKind::Standard).unwrap();
        assert_eq!(s.phase, UnitPhase::Failed);
        assert_eq!(s.last_error.as_deref(), Some("timeout"));

        // Any transition is accepted.
        t.set_phase(&id("p1"), ProviderKind::Standard, UnitPhase::Idle, None);
        assert_eq!(t.phase(&id("p1"), ProviderKind::Standard), UnitPhase::Idle);
    }

    #[test]
    fn providers_are_tracked_independently() {
        let t = Tracker::new();
        t.set_phase(&id("p1"), ProviderKind::Grounded, UnitPhase::InFlight, None);
        assert!(t.is_in_flight(&id("p1"), ProviderKind::Grounded));
        assert!(!t.is_in_flight(&id("p1"), ProviderKind::Standard));
        assert_eq!(t.snapshot().len(), 1);
    }

    #[test]
    fn set_phase_all_covers_every_id() {
        let t = Tracker::new();
        let ids = vec![id("a"), id("b"), id("c")];
        t.set_phase_all(&ids, ProviderKind::Alternate, UnitPhase::InFlight, None);
        assert_eq!(t.in_flight_count(), 3);
        t.set_phase_all(&ids, ProviderKind::Alternate, UnitPhase::Failed, Some("502"));
        let snap = t.snapshot();
        assert!(snap.values().all(|u| u.phase == UnitPhase::Failed));
        assert!(snap.values().all(|u| u.last_error.as_deref() == Some("502")));
    }

    #[test]
    fn try_begin_refuses_in_flight_unit() {
        let t = Tracker::new();
        assert!(t.try_begin(&id("p1"), ProviderKind::Standard));
        assert!(!t.try_begin(&id("p1"), ProviderKind::Standard));
        assert!(t.try_begin(&id("p1"), ProviderKind::Alternate));

        t.set_phase(&id("p1"), ProviderKind::Standard, UnitPhase::Succeeded, None);
        assert!(t.try_begin(&id("p1"), ProviderKind::Standard));
    }

    #[test]
    fn try_begin_all_claims_nothing_when_one_unit_is_busy() {
        let t = Tracker::new();
        let ids = vec![id("a"), id("b")];
        t.set_phase(&id("b"), ProviderKind::Standard, UnitPhase::InFlight, None);

        assert!(!t.try_begin_all(&ids, ProviderKind::Standard));
        assert_eq!(t.phase(&id("a"), ProviderKind::Standard), UnitPhase::Idle);

        assert!(t.try_begin_all(&ids, ProviderKind::Grounded));
        assert!(t.is_in_flight(&id("a"), ProviderKind::Grounded));
        assert!(t.is_in_flight(&id("b"), ProviderKind::Grounded));
    }

    #[test]
    fn clear_returns_everything_to_idle() {
        let t = Tracker::new();
        t.set_phase(&id("p1"), ProviderKind::Standard, UnitPhase::Succeeded, None);
        t.clear();
        assert!(t.snapshot().is_empty());
    }
}
