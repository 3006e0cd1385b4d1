//! Runtime counters for the autonomous NPC subsystem.
//!
//! One [`AgentCounters`] is owned by the [`AgentManager`](crate::manager::AgentManager)
//! and shared (via `Arc`) with every agent it spawns. Counters are lock-free
//! `AtomicU64`s incremented in the hot path and read on export.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters for high-frequency agent events.
#[derive(Debug)]
pub struct AgentCounters {
    /// Agents admitted.
    pub spawned: AtomicU64,
    /// Agents released.
    pub despawned: AtomicU64,
    /// Spawn requests refused.
    pub spawn_denied: AtomicU64,
    /// Encounters recorded.
    pub combats_recorded: AtomicU64,
    /// Zones discovered for the first time.
    pub discoveries: AtomicU64,
    /// Phrases learned from chat.
    pub phrases_learned: AtomicU64,
    /// Learning-data flushes that succeeded.
    pub flushes: AtomicU64,
    /// Learning-data flushes that failed.
    pub flush_failures: AtomicU64,
    /// Evades triggered by low health.
    pub evades: AtomicU64,
}

impl AgentCounters {
    /// Zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            spawned: AtomicU64::new(0),
            despawned: AtomicU64::new(0),
            spawn_denied: AtomicU64::new(0),
            combats_recorded: AtomicU64::new(0),
            discoveries: AtomicU64::new(0),
            phrases_learned: AtomicU64::new(0),
            flushes: AtomicU64::new(0),
            flush_failures: AtomicU64::new(0),
            evades: AtomicU64::new(0),
        }
    }

    /// Increment `counter` by one.
    pub fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot all counters for export.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            spawned: self.spawned.load(Ordering::Relaxed),
            despawned: self.despawned.load(Ordering::Relaxed),
            spawn_denied: self.spawn_denied.load(Ordering::Relaxed),
            combats_recorded: self.combats_recorded.load(Ordering::Relaxed),
            discoveries: self.discoveries.load(Ordering::Relaxed),
            phrases_learned: self.phrases_learned.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
            flush_failures: self.flush_failures.load(Ordering::Relaxed),
            evades: self.evades.load(Ordering::Relaxed),
        }
    }
}

impl Default for AgentCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter values at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CounterSnapshot {
    /// Agents admitted.
    pub spawned: u64,
    /// Agents released.
    pub despawned: u64,
    /// Spawn requests refused.
    pub spawn_denied: u64,
    /// Encounters recorded.
    pub combats_recorded: u64,
    /// Zones discovered.
    pub discoveries: u64,
    /// Phrases learned.
    pub phrases_learned: u64,
    /// Successful flushes.
    pub flushes: u64,
    /// Failed flushes.
    pub flush_failures: u64,
    /// Low-health evades.
    pub evades: u64,
}

impl CounterSnapshot {
    /// Format as Prometheus-compatible text.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        let rows = [
            ("autonpc_spawned_total", "Agents admitted", self.spawned),
            ("autonpc_despawned_total", "Agents released", self.despawned),
            ("autonpc_spawn_denied_total", "Spawn requests refused", self.spawn_denied),
            ("autonpc_combats_recorded_total", "Encounters recorded", self.combats_recorded),
            ("autonpc_discoveries_total", "Zones discovered", self.discoveries),
            ("autonpc_phrases_learned_total", "Phrases learned from chat", self.phrases_learned),
            ("autonpc_flushes_total", "Learning-data flushes", self.flushes),
            ("autonpc_flush_failures_total", "Failed learning-data flushes", self.flush_failures),
            ("autonpc_evades_total", "Low-health evades", self.evades),
        ];
        let mut out = String::new();
        for (name, help, value) in rows {
            out.push_str(&format!("# HELP {name} {help}\n# TYPE {name} counter\n{name} {value}\n"));
        }
        out
    }

    /// Agents currently alive according to the counters.
    #[must_use]
    pub fn live(&self) -> u64 {
        self.spawned.saturating_sub(self.despawned)
    }
}
