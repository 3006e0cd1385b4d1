//! The creature-AI lifecycle as the engine sees it.
//!
//! Engines drive creature scripts through a fixed set of hooks. The
//! [`CreatureBrain`] trait is that set; [`AutonomousCreatureAi`] forwards
//! every hook onto an [`Agent`].

use autonpc_core::behavior::BehaviorState;
use autonpc_core::goal::Goal;
use autonpc_core::host::CreatureHost;
use autonpc_core::types::{ActorRef, CreatureGuid, Emote, SpellId};
use autonpc_core::Agent;

/// Lifecycle hooks the engine calls on a creature script.
///
/// All hooks have no-op defaults so simple scripts override only what they
/// need.
pub trait CreatureBrain {
    /// Creature this script drives.
    fn guid(&self) -> CreatureGuid;

    /// Spawned or respawned, or reset after leaving combat.
    fn reset(&mut self, _host: &mut dyn CreatureHost) {}
    /// Per-tick update; `diff` is the elapsed time in milliseconds.
    fn update(&mut self, _host: &mut dyn CreatureHost, _diff: u64) {}
    /// Combat started.
    fn enter_combat(&mut self, _host: &mut dyn CreatureHost, _enemy: &ActorRef) {}
    /// Forced out of combat.
    fn evade(&mut self, _host: &mut dyn CreatureHost) {}
    /// The creature died.
    fn just_died(&mut self, _host: &mut dyn CreatureHost, _killer: Option<&ActorRef>) {}
    /// The creature killed a unit.
    fn killed_unit(&mut self, _host: &mut dyn CreatureHost, _victim: &ActorRef) {}
    /// Took damage.
    fn damage_taken(&mut self, _host: &mut dyn CreatureHost, _attacker: &ActorRef, _amount: u32) {}
    /// Dealt damage.
    fn damage_dealt(&mut self, _host: &mut dyn CreatureHost, _victim: &ActorRef, _amount: u32) {}
    /// Was healed.
    fn heal_received(&mut self, _host: &mut dyn CreatureHost, _healer: &ActorRef, _amount: u32) {}
    /// Healed someone.
    fn healing_done(&mut self, _host: &mut dyn CreatureHost, _target: &ActorRef, _amount: u32) {}
    /// Hit by a spell.
    fn spell_hit(&mut self, _host: &mut dyn CreatureHost, _caster: &ActorRef, _spell: SpellId) {}
    /// Own spell landed.
    fn spell_hit_target(
        &mut self,
        _host: &mut dyn CreatureHost,
        _target: &ActorRef,
        _spell: SpellId,
        _effectiveness: f32,
    ) {
    }
    /// A player emoted at the creature.
    fn receive_emote(&mut self, _host: &mut dyn CreatureHost, _player: &ActorRef, _emote: Emote) {}
    /// A player spoke nearby.
    fn chat_heard(&mut self, _host: &mut dyn CreatureHost, _speaker: &ActorRef, _text: &str) {}
    /// Reached a movement target.
    fn movement_inform(&mut self, _host: &mut dyn CreatureHost) {}
    /// About to be removed from the world.
    fn despawn(&mut self) {}
}

/// Script that lets an [`Agent`] run the creature.
#[derive(Debug)]
pub struct AutonomousCreatureAi {
    agent: Agent,
}

impl AutonomousCreatureAi {
    /// Wrap an agent.
    #[must_use]
    pub fn new(agent: Agent) -> Self {
        Self { agent }
    }

    /// The wrapped agent.
    #[must_use]
    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Current behavior state.
    #[must_use]
    pub fn state(&self) -> BehaviorState {
        self.agent.state()
    }

    /// Current goal, if any is eligible.
    #[must_use]
    pub fn goal(&self) -> Option<Goal> {
        self.agent.goal()
    }

    /// Unwrap the agent.
    #[must_use]
    pub fn into_agent(self) -> Agent {
        self.agent
    }
}

impl CreatureBrain for AutonomousCreatureAi {
    fn guid(&self) -> CreatureGuid {
        self.agent.guid()
    }

    fn reset(&mut self, host: &mut dyn CreatureHost) {
        self.agent.on_reset(host);
    }

    fn update(&mut self, host: &mut dyn CreatureHost, diff: u64) {
        self.agent.update(host, diff);
    }

    fn enter_combat(&mut self, host: &mut dyn CreatureHost, enemy: &ActorRef) {
        self.agent.on_enter_combat(host, enemy);
    }

    fn evade(&mut self, _host: &mut dyn CreatureHost) {
        self.agent.on_evade();
    }

    fn just_died(&mut self, host: &mut dyn CreatureHost, killer: Option<&ActorRef>) {
        self.agent.on_just_died(host, killer);
    }

    fn killed_unit(&mut self, host: &mut dyn CreatureHost, victim: &ActorRef) {
        self.agent.on_killed_unit(host, victim);
    }

    fn damage_taken(&mut self, host: &mut dyn CreatureHost, attacker: &ActorRef, amount: u32) {
        self.agent.on_damage_taken(host, attacker, amount);
    }

    fn damage_dealt(&mut self, _host: &mut dyn CreatureHost, victim: &ActorRef, amount: u32) {
        self.agent.on_damage_dealt(victim, amount);
    }

    fn heal_received(&mut self, _host: &mut dyn CreatureHost, healer: &ActorRef, amount: u32) {
        self.agent.on_heal_received(healer, amount);
    }

    fn healing_done(&mut self, _host: &mut dyn CreatureHost, target: &ActorRef, amount: u32) {
        self.agent.on_healing_done(target, amount);
    }

    fn spell_hit(&mut self, _host: &mut dyn CreatureHost, caster: &ActorRef, spell: SpellId) {
        self.agent.on_spell_hit(caster, spell);
    }

    fn spell_hit_target(
        &mut self,
        _host: &mut dyn CreatureHost,
        target: &ActorRef,
        spell: SpellId,
        effectiveness: f32,
    ) {
        self.agent.on_spell_hit_target(target, spell, effectiveness);
    }

    fn receive_emote(&mut self, _host: &mut dyn CreatureHost, player: &ActorRef, emote: Emote) {
        self.agent.on_receive_emote(player, emote);
    }

    fn chat_heard(&mut self, _host: &mut dyn CreatureHost, speaker: &ActorRef, text: &str) {
        self.agent.on_chat_heard(speaker, text);
    }

    fn movement_inform(&mut self, _host: &mut dyn CreatureHost) {
        self.agent.on_movement_inform();
    }

    fn despawn(&mut self) {
        self.agent.on_despawn();
    }
}
