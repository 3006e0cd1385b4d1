//! Server-side flow: conf file → registry → events → SQLite → respawn.

use std::rc::Rc;
use std::sync::Arc;

use autonpc_core::persistence::LearningDb;
use autonpc_core::testing::RecordingHost;
use autonpc_core::types::{ActorRef, CreatureGuid, Emote, Position};
use autonpc_core::{AgentConfig, AgentManager, PlayerPopulation};
use autonpc_host::config::{MapConfigSource, load_agent_config};
use autonpc_host::{AUTONOMOUS_SCRIPT_NAME, CreatureEvent, HostError, ScriptRegistry, SpawnRequest, dispatch};

const CONF: &str = "
AutonomousNPC.MaxCount = 2
AutonomousNPC.PersistLearningData = 1
AutonomousNPC.ChatResponseChance = 100
";

#[test]
fn learning_persists_across_respawn() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (config, notes) = load_agent_config(&MapConfigSource::from_conf_str(CONF), AgentConfig::default());
    assert!(notes.is_empty());
    let db = Rc::new(LearningDb::open(dir.path().join("npc.db"), &config.persistence).expect("db"));
    let mut registry = ScriptRegistry::new(AgentManager::new(Arc::new(config)));

    let population = PlayerPopulation {
        players: 3,
        max_players: 100,
    };
    let request = |seed| {
        SpawnRequest::new(CreatureGuid(500), population)
            .with_seed(seed)
            .with_sink(Box::new(Rc::clone(&db)))
    };

    let mut brain = registry.create(AUTONOMOUS_SCRIPT_NAME, request(1)).expect("spawn");
    let mut host = RecordingHost::new();
    let bandit = ActorRef::creature(77, 14, Position::new(3.0, 0.0, 0.0));
    let visitor = ActorRef::player(8, 40, Position::new(2.0, 0.0, 0.0));
    let events = vec![
        CreatureEvent::Reset,
        CreatureEvent::EnterCombat { enemy: bandit },
        CreatureEvent::DamageDealt {
            victim: bandit,
            amount: 900,
        },
        CreatureEvent::KilledUnit { victim: bandit },
        CreatureEvent::ReceiveEmote {
            player: visitor,
            emote: Emote::Bow,
        },
        CreatureEvent::Update { diff: 10_000 },
    ];
    for event in &events {
        dispatch(brain.as_mut(), &mut host, event);
    }
    // ChatResponseChance = 100 answers the bow for certain.
    assert!(host.commands.contains(&autonpc_core::HostCommand::Emote(Emote::Wave)));

    registry.release(brain);
    let saved = db.load(CreatureGuid(500)).expect("load").expect("row");
    assert_eq!(saved.total_combats, 1);
    assert_eq!(saved.wins, 1);
    assert_eq!(saved.relationship_values.values().copied().collect::<Vec<_>>(), vec![5]);

    let brain = registry.create(AUTONOMOUS_SCRIPT_NAME, request(2)).expect("respawn");
    registry.release(brain);
    let again = db.load(CreatureGuid(500)).expect("load").expect("row");
    assert_eq!(again, saved);
}

#[test]
fn player_reserve_blocks_spawns() {
    let (config, _) = load_agent_config(&MapConfigSource::from_conf_str(CONF), AgentConfig::default());
    let mut registry = ScriptRegistry::new(AgentManager::new(Arc::new(config)));
    let crowded = PlayerPopulation {
        players: 15,
        max_players: 20,
    };
    let result = registry.create(
        AUTONOMOUS_SCRIPT_NAME,
        SpawnRequest::new(CreatureGuid(1), crowded).with_seed(1),
    );
    assert!(matches!(result, Err(HostError::Denied(_))));
    assert_eq!(registry.manager().counters().snapshot().spawn_denied, 1);
}
