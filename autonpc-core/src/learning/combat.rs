//! Combat encounters and the running statistics derived from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{ActorId, SpellId, ZoneId};

/// How an encounter ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombatOutcome {
    /// The agent killed its opponent.
    Victory,
    /// The agent died.
    Defeat,
    /// The agent evaded or fled.
    Fled,
}

/// One finished encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatExperience {
    /// Main opponent, if one was ever identified.
    pub opponent: Option<ActorId>,
    /// Opponent level at engagement.
    pub opponent_level: u8,
    /// Damage the agent dealt.
    pub damage_dealt: u32,
    /// Damage the agent took.
    pub damage_taken: u32,
    /// Healing the agent did.
    pub healing_done: u32,
    /// Healing the agent received.
    pub healing_received: u32,
    /// Encounter length in ms.
    pub duration_ms: u64,
    /// Result.
    pub outcome: CombatOutcome,
    /// Spells used and how effective each was (`0..=1`).
    pub spells: Vec<(SpellId, f32)>,
    /// Zone the fight happened in.
    pub zone: ZoneId,
}

impl CombatExperience {
    /// An empty encounter record with the given outcome.
    #[must_use]
    pub fn new(outcome: CombatOutcome) -> Self {
        Self {
            opponent: None,
            opponent_level: 0,
            damage_dealt: 0,
            damage_taken: 0,
            healing_done: 0,
            healing_received: 0,
            duration_ms: 0,
            outcome,
            spells: Vec::new(),
            zone: ZoneId(0),
        }
    }
}

/// Running per-spell statistics.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpellStats {
    /// Incremental mean effectiveness.
    pub mean: f32,
    /// Number of recorded uses.
    pub casts: u32,
}

/// Aggregates updated on every recorded combat so all reads are O(1).
///
/// These survive history eviction: they describe the agent's whole life.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CombatStats {
    /// Encounters recorded.
    pub total: u32,
    /// Victories.
    pub wins: u32,
    /// Defeats.
    pub losses: u32,
    /// Mean encounter length in ms.
    pub average_duration_ms: f64,
    /// Per-spell effectiveness.
    pub spells: BTreeMap<SpellId, SpellStats>,
}

impl CombatStats {
    /// Fold one encounter into the running totals.
    pub fn record(&mut self, experience: &CombatExperience) {
        self.total = self.total.saturating_add(1);
        match experience.outcome {
            CombatOutcome::Victory => self.wins = self.wins.saturating_add(1),
            CombatOutcome::Defeat => self.losses = self.losses.saturating_add(1),
            CombatOutcome::Fled => {}
        }

        #[allow(clippy::cast_precision_loss)]
        let duration = experience.duration_ms as f64;
        self.average_duration_ms += (duration - self.average_duration_ms) / f64::from(self.total);

        for &(spell, effectiveness) in &experience.spells {
            if !effectiveness.is_finite() {
                continue;
            }
            let stats = self.spells.entry(spell).or_default();
            stats.casts = stats.casts.saturating_add(1);
            #[allow(clippy::cast_precision_loss)]
            let n = stats.casts as f32;
            stats.mean += (effectiveness.clamp(0.0, 1.0) - stats.mean) / n;
        }
    }

    /// Wins over total encounters; `0.0` before the first fight.
    #[must_use]
    pub fn win_rate(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let rate = self.wins as f32 / self.total as f32;
        rate
    }

    /// Mean encounter length, `None` before the first fight.
    #[must_use]
    pub fn average_duration(&self) -> Option<f64> {
        (self.total > 0).then_some(self.average_duration_ms)
    }

    /// Mean effectiveness of `spell`, `None` if it was never recorded.
    #[must_use]
    pub fn spell_effectiveness(&self, spell: SpellId) -> Option<f32> {
        self.spells.get(&spell).map(|s| s.mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fight(outcome: CombatOutcome, duration_ms: u64) -> CombatExperience {
        CombatExperience {
            duration_ms,
            ..CombatExperience::new(outcome)
        }
    }

    #[test]
    fn empty_stats_never_divide_by_zero() {
        let stats = CombatStats::default();
        assert!(stats.win_rate().abs() < f32::EPSILON);
        assert_eq!(stats.average_duration(), None);
        assert_eq!(stats.spell_effectiveness(SpellId(1)), None);
    }

    #[test]
    fn win_rate_and_duration_track_records() {
        let mut stats = CombatStats::default();
        stats.record(&fight(CombatOutcome::Victory, 1000));
        stats.record(&fight(CombatOutcome::Defeat, 3000));
        stats.record(&fight(CombatOutcome::Fled, 2000));
        stats.record(&fight(CombatOutcome::Victory, 2000));
        assert_eq!((stats.total, stats.wins, stats.losses), (4, 2, 1));
        assert!((stats.win_rate() - 0.5).abs() < f32::EPSILON);
        assert!((stats.average_duration().expect("some") - 2000.0).abs() < 1e-9);
    }

    #[test]
    fn spell_effectiveness_is_incremental_mean() {
        let mut stats = CombatStats::default();
        let mut a = fight(CombatOutcome::Victory, 0);
        a.spells = vec![(SpellId(133), 1.0)];
        let mut b = fight(CombatOutcome::Defeat, 0);
        b.spells = vec![(SpellId(133), 0.0), (SpellId(116), f32::NAN)];
        stats.record(&a);
        stats.record(&b);
        assert!((stats.spell_effectiveness(SpellId(133)).expect("some") - 0.5).abs() < 1e-6);
        assert_eq!(stats.spell_effectiveness(SpellId(116)), None);
    }
}
