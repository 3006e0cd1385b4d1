//! Random source seam.
//!
//! Every roll an agent makes (personality draw, idle transitions, chat
//! chance, exploration targets) goes through [`RandomSource`], so tests can
//! swap in a [`ScriptedRandom`] and replay an exact sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform random numbers for agent decisions.
pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f32;

    /// Uniform sample in `[lo, hi)`. Returns `lo` when the range is empty.
    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        lo + (hi - lo) * self.next_unit()
    }

    /// A roll against `[0, 100)`.
    fn roll_percent(&mut self) -> f32 {
        self.next_unit() * 100.0
    }

    /// `true` with probability `percent / 100`.
    fn chance(&mut self, percent: f32) -> bool {
        self.roll_percent() < percent
    }

    /// Uniform index into a collection of `len` items.
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let idx = (self.next_unit() * len as f32) as usize;
        Some(idx.min(len - 1))
    }

    /// Uniform integer in `[lo, hi]`.
    fn range_u64(&mut self, lo: u64, hi: u64) -> u64 {
        if hi <= lo {
            return lo;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let width = (hi - lo) as f64 + 1.0;
        let span = (width * f64::from(self.next_unit())) as u64;
        lo.saturating_add(span).min(hi)
    }
}

/// Production source backed by `rand`'s [`StdRng`].
#[derive(Debug, Clone)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    /// Deterministic stream for a given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Seeded from OS entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f32 {
        self.0.gen_range(0.0..1.0)
    }

    fn range_u64(&mut self, lo: u64, hi: u64) -> u64 {
        if hi <= lo {
            return lo;
        }
        self.0.gen_range(lo..=hi)
    }
}

/// Replays a fixed list of unit samples, cycling when exhausted.
///
/// Values are clamped into `[0, 1)`. An empty script always yields `0.0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    values: Vec<f32>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Script the given sequence.
    #[must_use]
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        Self {
            values: values.into(),
            cursor: 0,
        }
    }

    /// A source that always returns `value`.
    #[must_use]
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.0;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor = self.cursor.wrapping_add(1);
        v.clamp(0.0, 0.999_999)
    }
}
