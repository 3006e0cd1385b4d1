//! Named creature-script factories.
//!
//! The engine asks for a script by the name stored on the creature template.
//! Every factory goes through the [`AgentManager`], so population limits
//! apply no matter which script spawns an agent.

use std::collections::BTreeMap;

use autonpc_core::goal::Capabilities;
use autonpc_core::persistence::LearningSink;
use autonpc_core::rng::{RandomSource, SeededRandom};
use autonpc_core::types::CreatureGuid;
use autonpc_core::{AgentManager, PlayerPopulation};
use tracing::{debug, info};

use crate::brain::{AutonomousCreatureAi, CreatureBrain};
use crate::error::HostError;

/// Script name the engine uses for autonomous creatures.
pub const AUTONOMOUS_SCRIPT_NAME: &str = "npc_autonomous_player";

/// Everything a factory needs to build one creature's script.
pub struct SpawnRequest {
    /// Creature being scripted.
    pub guid: CreatureGuid,
    /// Online player numbers.
    pub population: PlayerPopulation,
    /// Fixed seed for reproducible agents; entropy when `None`.
    pub seed: Option<u64>,
    /// Where learning data is loaded from and flushed to.
    pub sink: Option<Box<dyn LearningSink>>,
    /// What the creature may do.
    pub capabilities: Capabilities,
}

impl SpawnRequest {
    /// Request with default capabilities, no sink and an entropy seed.
    #[must_use]
    pub fn new(guid: CreatureGuid, population: PlayerPopulation) -> Self {
        Self {
            guid,
            population,
            seed: None,
            sink: None,
            capabilities: Capabilities::default(),
        }
    }

    /// Use a fixed seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Attach a learning sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn LearningSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Restrict capabilities.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    fn rng(&self) -> Box<dyn RandomSource> {
        match self.seed {
            Some(seed) => Box::new(SeededRandom::new(seed)),
            None => Box::new(SeededRandom::from_entropy()),
        }
    }
}

/// Builds a script for one creature.
pub type ScriptFactory = fn(&mut AgentManager, SpawnRequest) -> Result<Box<dyn CreatureBrain>, HostError>;

/// Name → factory table plus the manager that gates it.
pub struct ScriptRegistry {
    manager: AgentManager,
    factories: BTreeMap<String, ScriptFactory>,
}

impl std::fmt::Debug for ScriptRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptRegistry")
            .field("manager", &self.manager)
            .field("scripts", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn autonomous_factory(
    manager: &mut AgentManager,
    mut request: SpawnRequest,
) -> Result<Box<dyn CreatureBrain>, HostError> {
    let rng = request.rng();
    let mut agent = manager
        .try_spawn(request.guid, request.population, rng)?
        .with_capabilities(request.capabilities);
    if let Some(sink) = request.sink.take() {
        agent = agent.with_sink(sink);
    }
    Ok(Box::new(AutonomousCreatureAi::new(agent)))
}

impl ScriptRegistry {
    /// Registry with the autonomous-creature script registered.
    #[must_use]
    pub fn new(manager: AgentManager) -> Self {
        let mut registry = Self {
            manager,
            factories: BTreeMap::new(),
        };
        registry.register(AUTONOMOUS_SCRIPT_NAME, autonomous_factory);
        registry
    }

    /// Add or replace a factory.
    pub fn register(&mut self, name: &str, factory: ScriptFactory) {
        if self.factories.insert(name.to_string(), factory).is_some() {
            debug!(script = name, "Creature script replaced");
        } else {
            info!(script = name, "Creature script registered");
        }
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Build the script called `name`.
    ///
    /// # Errors
    ///
    /// [`HostError::UnknownScript`] for an unregistered name, or
    /// [`HostError::Denied`] when the manager refuses the spawn.
    pub fn create(&mut self, name: &str, request: SpawnRequest) -> Result<Box<dyn CreatureBrain>, HostError> {
        let factory = *self
            .factories
            .get(name)
            .ok_or_else(|| HostError::UnknownScript(name.to_string()))?;
        factory(&mut self.manager, request)
    }

    /// Despawn a script and release its population slot.
    pub fn release(&mut self, mut brain: Box<dyn CreatureBrain>) {
        brain.despawn();
        self.manager.notify_despawned(brain.guid());
    }

    /// The gating manager.
    #[must_use]
    pub fn manager(&self) -> &AgentManager {
        &self.manager
    }

    /// The gating manager, mutably (config reloads).
    pub fn manager_mut(&mut self) -> &mut AgentManager {
        &mut self.manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use autonpc_core::persistence::MemorySink;
    use autonpc_core::testing::RecordingHost;
    use autonpc_core::{AgentConfig, SpawnDenied};
    use std::sync::Arc;

    fn registry(max: u32) -> ScriptRegistry {
        let mut config = AgentConfig::default();
        config.population.max_active_npcs = max;
        ScriptRegistry::new(AgentManager::new(Arc::new(config)))
    }

    fn request(guid: u64) -> SpawnRequest {
        SpawnRequest::new(CreatureGuid(guid), PlayerPopulation::default()).with_seed(guid)
    }

    #[test]
    fn autonomous_script_is_registered() {
        let registry = registry(5);
        assert!(registry.contains(AUTONOMOUS_SCRIPT_NAME));
    }

    #[test]
    fn unknown_script_is_an_error() {
        let mut registry = registry(5);
        let err = registry.create("npc_nobody", request(1)).err().expect("unknown");
        assert!(matches!(err, HostError::UnknownScript(name) if name == "npc_nobody"));
    }

    #[test]
    fn creation_denied_at_capacity() {
        let mut registry = registry(1);
        let first = registry.create(AUTONOMOUS_SCRIPT_NAME, request(1)).expect("first");
        let err = registry
            .create(AUTONOMOUS_SCRIPT_NAME, request(2))
            .err()
            .expect("second denied");
        assert!(matches!(err, HostError::Denied(SpawnDenied::AtCapacity { active: 1, max: 1 })));

        registry.release(first);
        assert_eq!(registry.manager().active_count(), 0);
        assert!(registry.create(AUTONOMOUS_SCRIPT_NAME, request(2)).is_ok());
    }

    #[test]
    fn release_flushes_learning() {
        let mut registry = registry(3);
        let sink = MemorySink::new();
        let mut brain = registry
            .create(AUTONOMOUS_SCRIPT_NAME, request(9).with_sink(Box::new(sink.clone())))
            .expect("spawn");
        let mut host = RecordingHost::new();
        brain.reset(&mut host);
        registry.release(brain);
        assert_eq!(sink.writes(), 1);
        assert!(sink.get(CreatureGuid(9)).is_some());
    }
}
