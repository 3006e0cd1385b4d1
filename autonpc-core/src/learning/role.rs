//! Combat roles and the accumulated affinity toward each.

use serde::{Deserialize, Serialize};

/// A role the agent may gravitate toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    /// Close-range damage.
    MeleeDps,
    /// Physical ranged damage.
    RangedDps,
    /// Spell damage.
    CasterDps,
    /// Damage soak.
    Tank,
    /// Healing.
    Healer,
    /// Group support and social glue.
    Support,
    /// Wanderer.
    Explorer,
    /// Merchant.
    Trader,
}

impl Role {
    /// All roles in declaration order.
    pub const ALL: [Self; 8] = [
        Self::MeleeDps,
        Self::RangedDps,
        Self::CasterDps,
        Self::Tank,
        Self::Healer,
        Self::Support,
        Self::Explorer,
        Self::Trader,
    ];

    /// The three damage sub-roles.
    pub const DPS: [Self; 3] = [Self::MeleeDps, Self::RangedDps, Self::CasterDps];

    const fn index(self) -> usize {
        self as usize
    }

    /// Fights at range.
    #[must_use]
    pub const fn is_ranged(self) -> bool {
        matches!(self, Self::RangedDps | Self::CasterDps)
    }
}

/// Non-negative score per role.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RoleAffinity {
    scores: [f32; 8],
}

impl RoleAffinity {
    /// Score of `role`.
    #[must_use]
    pub fn get(&self, role: Role) -> f32 {
        self.scores[role.index()]
    }

    /// Add a non-negative amount to `role`. Negative or non-finite amounts are ignored.
    pub fn add(&mut self, role: Role, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.scores[role.index()] += amount;
        }
    }

    /// Raise `role` to at least `floor`.
    pub fn raise_to(&mut self, role: Role, floor: f32) {
        if floor.is_finite() {
            let slot = &mut self.scores[role.index()];
            *slot = slot.max(floor);
        }
    }

    /// Overwrite `role` with `value` (restoring persisted data).
    pub fn set(&mut self, role: Role, value: f32) {
        if value.is_finite() {
            self.scores[role.index()] = value.max(0.0);
        }
    }

    /// Highest-scoring role; the first declared role wins ties.
    /// `None` while every score is zero.
    #[must_use]
    pub fn primary(&self) -> Option<Role> {
        let mut best: Option<Role> = None;
        for role in Role::ALL {
            let score = self.get(role);
            if score > 0.0 && best.is_none_or(|b| score > self.get(b)) {
                best = Some(role);
            }
        }
        best
    }

    /// Sum of all scores.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.scores.iter().sum()
    }

    /// Share of `role` in the total, `0.0` while empty.
    #[must_use]
    pub fn share(&self, role: Role) -> f32 {
        let total = self.total();
        if total > 0.0 { self.get(role) / total } else { 0.0 }
    }

    /// Scale every score down so the largest does not exceed `cap`.
    ///
    /// Relative order is preserved. Returns `true` if anything was scaled.
    pub fn rescale(&mut self, cap: f32) -> bool {
        let max = self.scores.iter().copied().fold(0.0_f32, f32::max);
        if cap.is_nan() || cap <= 0.0 || max <= cap {
            return false;
        }
        let factor = cap / max;
        for s in &mut self.scores {
            *s *= factor;
        }
        true
    }

    /// Iterate `(role, score)` in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, f32)> + '_ {
        Role::ALL.iter().map(move |&r| (r, self.get(r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_is_none_until_something_scores() {
        let mut aff = RoleAffinity::default();
        assert_eq!(aff.primary(), None);
        aff.add(Role::Healer, 0.3);
        assert_eq!(aff.primary(), Some(Role::Healer));
    }

    #[test]
    fn primary_ties_prefer_declaration_order() {
        let mut aff = RoleAffinity::default();
        aff.add(Role::Tank, 1.0);
        aff.add(Role::MeleeDps, 1.0);
        assert_eq!(aff.primary(), Some(Role::MeleeDps));
    }

    #[test]
    fn negative_amounts_are_ignored() {
        let mut aff = RoleAffinity::default();
        aff.add(Role::Explorer, 0.5);
        aff.add(Role::Explorer, -1.0);
        aff.add(Role::Explorer, f32::NAN);
        assert!((aff.get(Role::Explorer) - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn rescale_caps_max_and_keeps_order() {
        let mut aff = RoleAffinity::default();
        aff.add(Role::CasterDps, 400.0);
        aff.add(Role::Healer, 100.0);
        assert!(aff.rescale(100.0));
        assert!((aff.get(Role::CasterDps) - 100.0).abs() < 1e-3);
        assert!((aff.get(Role::Healer) - 25.0).abs() < 1e-3);
        assert!(!aff.rescale(100.0));
    }
}
