//! autonpc Benchmark Suite
//!
//! Hot paths on the map update thread:
//!   agent_update_behavior_tick ...... one behavior cycle for one agent
//!   full_frame_25_agents ............ every agent at the default cap, 100ms diff
//!   goal_selection .................. scoring all seven goals
//!   role_affinity_derivation_50 ..... folding a full combat history

use std::sync::Arc;

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use autonpc_core::goal::{Capabilities, GoalInputs, GoalSelector};
use autonpc_core::learning::{CombatExperience, CombatOutcome, LearningStore};
use autonpc_core::metrics::AgentCounters;
use autonpc_core::personality::Personality;
use autonpc_core::rng::SeededRandom;
use autonpc_core::testing::RecordingHost;
use autonpc_core::types::{ActorRef, CreatureGuid, GameTime, Position};
use autonpc_core::{Agent, AgentConfig};

fn make_agent(config: &Arc<AgentConfig>, guid: u64) -> Agent {
    Agent::new(
        CreatureGuid(guid),
        Arc::clone(config),
        Box::new(SeededRandom::new(guid)),
        Arc::new(AgentCounters::new()),
    )
}

fn busy_host() -> RecordingHost {
    let mut host = RecordingHost::new();
    for i in 0..5 {
        let offset = i as f32 * 3.0;
        host.players
            .push(ActorRef::player(100 + i, 30, Position::new(offset, 1.0, 0.0)));
        host.hostiles
            .push(ActorRef::creature(200 + i, 10, Position::new(-offset, 2.0, 0.0)));
    }
    host
}

fn victory(i: u32) -> CombatExperience {
    let mut exp = CombatExperience::new(CombatOutcome::Victory);
    exp.damage_dealt = 400 + i * 10;
    exp.damage_taken = 200;
    exp.healing_received = 50;
    exp.duration_ms = 12_000;
    exp
}

/// Benchmark: one behavior cycle.
fn bench_behavior_tick(c: &mut Criterion) {
    let config = Arc::new(AgentConfig::default());
    let mut agent = make_agent(&config, 1);
    let mut host = busy_host();
    c.bench_function("agent_update_behavior_tick", |b| {
        b.iter(|| {
            agent.update(&mut host, black_box(2_000));
            host.commands.clear();
        });
    });
}

/// Benchmark: a 100ms frame for 25 agents.
fn bench_full_frame(c: &mut Criterion) {
    let config = Arc::new(AgentConfig::default());
    let mut agents: Vec<Agent> = (1..=25).map(|g| make_agent(&config, g)).collect();
    let mut host = busy_host();
    c.bench_function("full_frame_25_agents", |b| {
        b.iter(|| {
            for agent in &mut agents {
                agent.update(&mut host, black_box(100));
            }
            host.commands.clear();
        });
    });
}

/// Benchmark: goal scoring and selection.
fn bench_goal_selection(c: &mut Criterion) {
    let config = AgentConfig::default();
    let personality = Personality::from_values([0.4, 0.5, 0.7, 0.6, 0.3, 0.2, 0.5]);
    let mut learning = LearningStore::new(&config);
    for i in 0..50 {
        learning.record_combat(victory(i));
    }
    learning.derive_role_affinity();
    let selector = GoalSelector::new(GameTime::default(), Capabilities::default(), &config.goals);
    let inputs = GoalInputs {
        personality: &personality,
        learning: &learning,
        capabilities: Capabilities::default(),
        level: 30,
    };
    c.bench_function("goal_selection", |b| {
        b.iter(|| black_box(selector.select_goal(black_box(&inputs), &config.goals)));
    });
}

/// Benchmark: folding a full combat history into role affinity.
fn bench_affinity_derivation(c: &mut Criterion) {
    let config = AgentConfig::default();
    c.bench_function("role_affinity_derivation_50", |b| {
        b.iter_batched(
            || {
                let mut learning = LearningStore::new(&config);
                for i in 0..50 {
                    learning.record_combat(victory(i));
                }
                learning
            },
            |mut learning| black_box(learning.derive_role_affinity()),
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_behavior_tick,
    bench_full_frame,
    bench_goal_selection,
    bench_affinity_derivation,
);
criterion_main!(benches);
