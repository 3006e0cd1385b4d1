//! Personality model: seven bounded trait strengths.
//!
//! Traits are stored as a fixed array indexed by [`TraitKind`], so iteration
//! order is always declaration order and `dominant()` is deterministic.
//! Every mutation clamps to `[0, 1]`.

use serde::{Deserialize, Serialize};

use crate::config::PersonalityConfig;
use crate::rng::RandomSource;

/// A personality dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TraitKind {
    /// Willingness to start and stay in fights.
    Aggression,
    /// Tendency to avoid risk and evade when hurt.
    Caution,
    /// Drive to seek out players.
    Sociability,
    /// Drive to explore new zones.
    Curiosity,
    /// Drive to learn and study.
    Intelligence,
    /// Interest in trading.
    Trader,
    /// Interest in professions and crafting.
    Crafter,
}

impl TraitKind {
    /// All traits in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Aggression,
        Self::Caution,
        Self::Sociability,
        Self::Curiosity,
        Self::Intelligence,
        Self::Trader,
        Self::Crafter,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Trait strengths, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    values: [f32; 7],
}

impl Default for Personality {
    /// A perfectly neutral personality (every trait at 0.5).
    fn default() -> Self {
        Self { values: [0.5; 7] }
    }
}

impl Personality {
    /// Build from explicit values, clamping each into `[0, 1]`.
    ///
    /// Non-finite inputs become `0.0`.
    #[must_use]
    pub fn from_values(values: [f32; 7]) -> Self {
        Self {
            values: values.map(|v| if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.0 }),
        }
    }

    /// Roll a fresh personality.
    ///
    /// Each trait is drawn uniformly from the seed band. If the draw is too
    /// extreme overall every trait is capped, then the strongest trait gets a
    /// boost, and finally the whole set is scaled down if the sum still
    /// exceeds `max_trait_sum`.
    pub fn generate(rng: &mut dyn RandomSource, config: &PersonalityConfig, aggressive_mode: bool) -> Self {
        let mut values = [0.0_f32; 7];
        for v in &mut values {
            *v = rng.range(config.seed_min, config.seed_max);
        }
        if aggressive_mode {
            values[TraitKind::Aggression.index()] += config.aggressive_mode_bonus;
        }

        if values.iter().sum::<f32>() > config.max_trait_sum {
            for v in &mut values {
                *v = v.min(config.trait_cap);
            }
        }

        let mut personality = Self::from_values(values);
        let strongest = personality.dominant();
        personality.mutate(strongest, config.dominant_boost);

        let sum = personality.sum();
        if sum > config.max_trait_sum && sum > 0.0 {
            let scale = config.max_trait_sum / sum;
            for v in &mut personality.values {
                *v *= scale;
            }
        }
        personality
    }

    /// Current strength of `kind`.
    #[must_use]
    pub fn get(&self, kind: TraitKind) -> f32 {
        self.values[kind.index()]
    }

    /// Add `delta` to `kind` and clamp to `[0, 1]`.
    ///
    /// A non-finite delta leaves the trait untouched.
    pub fn mutate(&mut self, kind: TraitKind, delta: f32) {
        if !delta.is_finite() {
            return;
        }
        let slot = &mut self.values[kind.index()];
        *slot = (*slot + delta).clamp(0.0, 1.0);
    }

    /// The strongest trait. Ties go to the earlier-declared trait.
    #[must_use]
    pub fn dominant(&self) -> TraitKind {
        let mut best = TraitKind::Aggression;
        for kind in TraitKind::ALL {
            if self.get(kind) > self.get(best) {
                best = kind;
            }
        }
        best
    }

    /// Sum of all trait strengths.
    #[must_use]
    pub fn sum(&self) -> f32 {
        self.values.iter().sum()
    }

    /// Pull every trait a small step toward the middle of the range.
    ///
    /// Keeps long-running agents from saturating at 0 or 1.
    pub fn normalize(&mut self, step: f32) {
        if !step.is_finite() || step <= 0.0 {
            return;
        }
        for v in &mut self.values {
            let gap = 0.5 - *v;
            *v = (*v + gap.clamp(-step, step)).clamp(0.0, 1.0);
        }
    }

    /// Iterate `(trait, strength)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (TraitKind, f32)> + '_ {
        TraitKind::ALL.iter().map(move |&k| (k, self.get(k)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRandom, SeededRandom};

    #[test]
    fn mutate_clamps_both_ends() {
        let mut p = Personality::default();
        p.mutate(TraitKind::Caution, 5.0);
        assert!((p.get(TraitKind::Caution) - 1.0).abs() < f32::EPSILON);
        p.mutate(TraitKind::Caution, -9.0);
        assert!(p.get(TraitKind::Caution).abs() < f32::EPSILON);
    }

    #[test]
    fn non_finite_delta_is_ignored() {
        let mut p = Personality::default();
        p.mutate(TraitKind::Curiosity, f32::NAN);
        p.mutate(TraitKind::Curiosity, f32::INFINITY);
        assert!((p.get(TraitKind::Curiosity) - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn dominant_ties_prefer_declaration_order() {
        let p = Personality::from_values([0.3, 0.7, 0.7, 0.2, 0.1, 0.0, 0.7]);
        assert_eq!(p.dominant(), TraitKind::Caution);
    }

    #[test]
    fn generated_sum_respects_ceiling() {
        let config = PersonalityConfig::default();
        let mut rng = SeededRandom::new(99);
        for _ in 0..200 {
            let p = Personality::generate(&mut rng, &config, false);
            assert!(p.sum() <= config.max_trait_sum + 1e-4);
            assert!(p.iter().all(|(_, v)| (0.0..=1.0).contains(&v)));
        }
    }

    #[test]
    fn extreme_draw_is_capped_then_boosted() {
        // Every trait rolls ~0.8: sum 5.6 > 4.0, so all are capped to 0.6,
        // aggression (first max) gets +0.1, sum 4.3 is then scaled to 4.0.
        let config = PersonalityConfig::default();
        let mut rng = ScriptedRandom::constant(0.999_999);
        let p = Personality::generate(&mut rng, &config, false);
        assert_eq!(p.dominant(), TraitKind::Aggression);
        assert!((p.sum() - 4.0).abs() < 1e-4);
        assert!(p.get(TraitKind::Aggression) > p.get(TraitKind::Caution));
    }

    #[test]
    fn aggressive_mode_raises_aggression() {
        let config = PersonalityConfig::default();
        let calm = Personality::generate(&mut ScriptedRandom::constant(0.1), &config, false);
        let angry = Personality::generate(&mut ScriptedRandom::constant(0.1), &config, true);
        assert!(angry.get(TraitKind::Aggression) > calm.get(TraitKind::Aggression));
    }

    #[test]
    fn normalize_moves_toward_middle() {
        let mut p = Personality::from_values([1.0, 0.0, 0.5, 0.51, 0.49, 0.9, 0.1]);
        p.normalize(0.02);
        assert!((p.get(TraitKind::Aggression) - 0.98).abs() < 1e-6);
        assert!((p.get(TraitKind::Caution) - 0.02).abs() < 1e-6);
        assert!((p.get(TraitKind::Curiosity) - 0.5).abs() < 1e-6);
    }
}
