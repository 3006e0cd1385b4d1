//! Population control for autonomous creatures.
//!
//! The manager only counts. It never holds agents itself; the host keeps
//! each [`Agent`] next to its creature and reports spawns and despawns here.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::agent::Agent;
use crate::config::AgentConfig;
use crate::error::SpawnDenied;
use crate::metrics::AgentCounters;
use crate::rng::RandomSource;
use crate::types::CreatureGuid;

/// Upper bound on player slots held back from autonomous creatures.
const MAX_RESERVED_SLOTS: u32 = 10;

/// Online player numbers supplied by the host at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlayerPopulation {
    /// Players currently online.
    pub players: u32,
    /// Server player limit.
    pub max_players: u32,
}

impl PlayerPopulation {
    /// Slots kept free for real players: a quarter of the limit, at most ten.
    #[must_use]
    pub fn reserved_slots(&self) -> u32 {
        (self.max_players / 4).min(MAX_RESERVED_SLOTS)
    }
}

/// Tracks how many autonomous creatures are alive and gates new ones.
#[derive(Debug)]
pub struct AgentManager {
    config: Arc<AgentConfig>,
    active: u32,
    counters: Arc<AgentCounters>,
}

impl AgentManager {
    /// Manager with no active agents.
    #[must_use]
    pub fn new(config: Arc<AgentConfig>) -> Self {
        Self {
            config,
            active: 0,
            counters: Arc::new(AgentCounters::new()),
        }
    }

    /// Current configuration.
    #[must_use]
    pub fn config(&self) -> &Arc<AgentConfig> {
        &self.config
    }

    /// Shared counters, handed to every agent this manager spawns.
    #[must_use]
    pub fn counters(&self) -> &Arc<AgentCounters> {
        &self.counters
    }

    /// Autonomous creatures currently alive.
    #[must_use]
    pub fn active_count(&self) -> u32 {
        self.active
    }

    /// Whether one more autonomous creature may appear.
    ///
    /// # Errors
    ///
    /// Returns the [`SpawnDenied`] reason when the system is disabled, at its
    /// own cap, or when spawning would eat into the player reserve.
    pub fn can_spawn(&self, population: PlayerPopulation) -> Result<(), SpawnDenied> {
        if !self.config.is_enabled() {
            return Err(SpawnDenied::Disabled);
        }
        let max = self.config.population.max_active_npcs;
        if self.active >= max {
            return Err(SpawnDenied::AtCapacity {
                active: self.active,
                max,
            });
        }
        if self.config.population.respect_player_cap && population.max_players > 0 {
            let reserved = population.reserved_slots();
            let limit = population.max_players.saturating_sub(reserved);
            let wanted = population
                .players
                .saturating_add(self.active)
                .saturating_add(1);
            if wanted > limit {
                return Err(SpawnDenied::PlayerCapReached {
                    players: population.players,
                    max_players: population.max_players,
                    reserved,
                });
            }
        }
        Ok(())
    }

    /// Create and count a new agent, if allowed.
    ///
    /// # Errors
    ///
    /// See [`can_spawn`](Self::can_spawn).
    pub fn try_spawn(
        &mut self,
        guid: CreatureGuid,
        population: PlayerPopulation,
        rng: Box<dyn RandomSource>,
    ) -> Result<Agent, SpawnDenied> {
        if let Err(denied) = self.can_spawn(population) {
            AgentCounters::bump(&self.counters.spawn_denied);
            debug!(creature = %guid, reason = %denied, "Spawn denied");
            return Err(denied);
        }
        self.active += 1;
        AgentCounters::bump(&self.counters.spawned);
        let agent = Agent::new(guid, Arc::clone(&self.config), rng, Arc::clone(&self.counters));
        info!(
            creature = %guid,
            identity = %agent.identity().introduction(),
            active = self.active,
            "Autonomous creature spawned"
        );
        Ok(agent)
    }

    /// Flush and uncount a departing agent.
    pub fn despawn(&mut self, mut agent: Agent) {
        agent.on_despawn();
        self.notify_despawned(agent.guid());
    }

    /// Uncount a creature that left without going through [`despawn`](Self::despawn).
    pub fn notify_despawned(&mut self, guid: CreatureGuid) {
        if self.active == 0 {
            warn!(creature = %guid, "Despawn reported with no active agents");
            return;
        }
        self.active -= 1;
        AgentCounters::bump(&self.counters.despawned);
        debug!(creature = %guid, active = self.active, "Autonomous creature despawned");
    }

    /// How many agents should log out to make room for players.
    ///
    /// Zero unless `auto_logout_on_player_limit` is set.
    #[must_use]
    pub fn agents_to_retire(&self, population: PlayerPopulation) -> u32 {
        if !self.config.population.auto_logout_on_player_limit || population.max_players == 0 {
            return 0;
        }
        let limit = population
            .max_players
            .saturating_sub(population.reserved_slots());
        population
            .players
            .saturating_add(self.active)
            .saturating_sub(limit)
            .min(self.active)
    }

    /// Swap in a new configuration for future spawns.
    ///
    /// Live agents keep the configuration they were created with.
    pub fn reload(&mut self, config: Arc<AgentConfig>) {
        info!(
            max_active = config.population.max_active_npcs,
            enabled = config.is_enabled(),
            "Autonomous creature configuration reloaded"
        );
        self.config = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;

    fn manager(max: u32) -> AgentManager {
        let mut config = AgentConfig::default();
        config.population.max_active_npcs = max;
        AgentManager::new(Arc::new(config))
    }

    fn rng() -> Box<dyn RandomSource> {
        Box::new(ScriptedRandom::constant(0.5))
    }

    const EMPTY: PlayerPopulation = PlayerPopulation {
        players: 0,
        max_players: 0,
    };

    #[test]
    fn cap_is_enforced_and_released() {
        let mut m = manager(2);
        let a = m.try_spawn(CreatureGuid(1), EMPTY, rng()).expect("first");
        let _b = m.try_spawn(CreatureGuid(2), EMPTY, rng()).expect("second");
        let denied = m.try_spawn(CreatureGuid(3), EMPTY, rng()).expect_err("full");
        assert_eq!(denied, SpawnDenied::AtCapacity { active: 2, max: 2 });

        m.despawn(a);
        assert_eq!(m.active_count(), 1);
        assert!(m.try_spawn(CreatureGuid(3), EMPTY, rng()).is_ok());
        assert_eq!(m.counters().snapshot().spawn_denied, 1);
    }

    #[test]
    fn disabled_when_cap_is_zero() {
        let m = manager(0);
        assert_eq!(m.can_spawn(EMPTY), Err(SpawnDenied::Disabled));
    }

    #[test]
    fn player_reserve_is_capped_at_ten() {
        let m = manager(25);
        // 100 slots: reserve min(25, 10) = 10, so 90 usable.
        let busy = PlayerPopulation {
            players: 89,
            max_players: 100,
        };
        assert!(m.can_spawn(busy).is_ok());
        let full = PlayerPopulation {
            players: 90,
            max_players: 100,
        };
        assert_eq!(
            m.can_spawn(full),
            Err(SpawnDenied::PlayerCapReached {
                players: 90,
                max_players: 100,
                reserved: 10
            })
        );
    }

    #[test]
    fn small_servers_reserve_a_quarter() {
        let pop = PlayerPopulation {
            players: 0,
            max_players: 20,
        };
        assert_eq!(pop.reserved_slots(), 5);
    }

    #[test]
    fn extra_despawns_do_not_underflow() {
        let mut m = manager(5);
        m.notify_despawned(CreatureGuid(9));
        assert_eq!(m.active_count(), 0);
        assert_eq!(m.counters().snapshot().despawned, 0);
    }

    #[test]
    fn retire_only_when_enabled() {
        let mut config = AgentConfig::default();
        config.population.max_active_npcs = 10;
        config.population.auto_logout_on_player_limit = false;
        let mut m = AgentManager::new(Arc::new(config.clone()));
        for g in 1..=4 {
            m.try_spawn(CreatureGuid(g), EMPTY, rng()).expect("spawn");
        }
        let pop = PlayerPopulation {
            players: 17,
            max_players: 20,
        };
        assert_eq!(m.agents_to_retire(pop), 0);

        config.population.auto_logout_on_player_limit = true;
        m.reload(Arc::new(config));
        // limit 15, 17 + 4 = 21 wanted, all four must go.
        assert_eq!(m.agents_to_retire(pop), 4);
    }
}
