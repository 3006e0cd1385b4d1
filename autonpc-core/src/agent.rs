//! The per-creature decision loop.
//!
//! An [`Agent`] owns everything one autonomous creature knows and drives it
//! from the host's per-tick update. Six countdown timers share the tick:
//!
//! | Cycle       | Default   | Work                                              |
//! |-------------|-----------|---------------------------------------------------|
//! | behavior    | 2 s       | goal upkeep, then one executor call               |
//! | learning    | 5 s       | role-affinity derivation, flush every Nth combat  |
//! | social      | 10 s      | pending replies, spontaneous speech, decay        |
//! | exploration | 15–45 s   | independent move while idle, next delay rolled    |
//! | adaptation  | 30 s      | personality drift from recent success ratios      |
//! | save        | 5 min     | periodic flush of unsaved learning data           |
//!
//! Host events arrive through the `on_*` callbacks and run to completion
//! before returning. Invalid actor references are ignored.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use crate::behavior::{BehaviorExecutor, BehaviorState, StateMachine, Step};
use crate::config::AgentConfig;
use crate::goal::{Capabilities, Goal, GoalInputs, GoalSelector};
use crate::host::{CreatureHost, HostCommand};
use crate::identity::{CLASS_ROLE_SEED, CreatureIdentity};
use crate::learning::social::classify_chat;
use crate::learning::{CombatExperience, CombatOutcome, InteractionKind, LearningStore, SocialInteraction};
use crate::metrics::AgentCounters;
use crate::persistence::{LearningData, LearningSink};
use crate::personality::{Personality, TraitKind};
use crate::rng::RandomSource;
use crate::timer::CycleTimer;
use crate::types::{ActorRef, CreatureGuid, Emote, GameTime, PlayerGuid, SpellId, ZoneId};

/// Level-up progress per kill.
const VICTORY_PROGRESS: f32 = 0.1;
/// Help-players progress per friendly exchange.
const HELP_PROGRESS: f32 = 0.05;

/// Fallback lines when nothing has been learned yet.
const GREETINGS: [&str; 4] = [
    "Hello there!",
    "Well met, friend.",
    "Fine day for an adventure.",
    "Safe travels!",
];

/// An encounter in progress.
#[derive(Debug, Clone)]
struct Encounter {
    opponent: Option<ActorRef>,
    started_at: GameTime,
    zone: ZoneId,
    damage_dealt: u32,
    damage_taken: u32,
    healing_done: u32,
    healing_received: u32,
    spells: Vec<(SpellId, f32)>,
}

impl Encounter {
    fn new(opponent: Option<ActorRef>, started_at: GameTime, zone: ZoneId) -> Self {
        Self {
            opponent,
            started_at,
            zone,
            damage_dealt: 0,
            damage_taken: 0,
            healing_done: 0,
            healing_received: 0,
            spells: Vec::new(),
        }
    }
}

/// An interaction waiting for the social cycle to answer it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingReply {
    player: PlayerGuid,
    kind: InteractionKind,
}

#[derive(Debug, Clone, Copy)]
struct CycleTimers {
    behavior: CycleTimer,
    learning: CycleTimer,
    social: CycleTimer,
    exploration: CycleTimer,
    adaptation: CycleTimer,
    save: CycleTimer,
}

impl CycleTimers {
    fn new(config: &AgentConfig, first_exploration_ms: u64) -> Self {
        let i = &config.intervals;
        Self {
            behavior: CycleTimer::new(i.ai_update_ms),
            learning: CycleTimer::new(i.learning_update_ms),
            social: CycleTimer::new(i.social_update_ms),
            exploration: CycleTimer::with_first(config.exploration.cooldown_min_ms, first_exploration_ms),
            adaptation: CycleTimer::new(i.adaptation_ms),
            save: CycleTimer::new(config.persistence.save_interval_ms),
        }
    }
}

/// One autonomous creature's decision loop.
pub struct Agent {
    guid: CreatureGuid,
    config: Arc<AgentConfig>,
    identity: CreatureIdentity,
    personality: Personality,
    learning: LearningStore,
    goals: GoalSelector,
    machine: StateMachine,
    capabilities: Capabilities,
    timers: CycleTimers,
    rng: Box<dyn RandomSource>,
    encounter: Option<Encounter>,
    pending: VecDeque<PendingReply>,
    clock: GameTime,
    sink: Option<Box<dyn LearningSink>>,
    counters: Arc<AgentCounters>,
    combats_since_flush: u32,
    dirty: bool,
    introduced: bool,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("guid", &self.guid)
            .field("identity", &self.identity)
            .field("state", &self.machine.current())
            .field("goal", &self.goals.current())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// Create a fresh agent with a rolled identity and personality.
    pub fn new(
        guid: CreatureGuid,
        config: Arc<AgentConfig>,
        mut rng: Box<dyn RandomSource>,
        counters: Arc<AgentCounters>,
    ) -> Self {
        let identity = CreatureIdentity::roll(rng.as_mut());
        let personality =
            Personality::generate(rng.as_mut(), &config.personality, config.combat.aggressive_mode);
        let mut learning = LearningStore::new(&config);
        learning.reward_role(identity.class.natural_role(), CLASS_ROLE_SEED);
        let first_exploration = rng.range_u64(config.exploration.cooldown_min_ms, config.exploration.cooldown_max_ms);
        let now = GameTime::default();

        debug!(
            creature = %guid,
            race = %identity.race,
            class = %identity.class,
            dominant = ?personality.dominant(),
            "Agent created"
        );

        Self {
            guid,
            identity,
            personality,
            learning,
            goals: GoalSelector::new(now, Capabilities::default(), &config.goals),
            machine: StateMachine::new(now),
            capabilities: Capabilities::default(),
            timers: CycleTimers::new(&config, first_exploration),
            rng,
            encounter: None,
            pending: VecDeque::new(),
            clock: now,
            sink: None,
            counters,
            combats_since_flush: 0,
            dirty: false,
            introduced: false,
            config,
        }
    }

    /// Restrict what the agent may do.
    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self.goals.restrict(capabilities);
        self
    }

    /// Attach a persistence sink and restore anything it already holds for
    /// this creature (when persistence is enabled).
    #[must_use]
    pub fn with_sink(mut self, mut sink: Box<dyn LearningSink>) -> Self {
        if self.config.persistence.persist_learning_data {
            if let Some(data) = sink.fetch(self.guid) {
                info!(creature = %self.guid, combats = data.total_combats, "Restored learning data");
                self.restore(&data);
            }
        }
        self.sink = Some(sink);
        self
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Creature GUID.
    #[must_use]
    pub fn guid(&self) -> CreatureGuid {
        self.guid
    }

    /// Rolled identity.
    #[must_use]
    pub fn identity(&self) -> &CreatureIdentity {
        &self.identity
    }

    /// Current personality.
    #[must_use]
    pub fn personality(&self) -> &Personality {
        &self.personality
    }

    /// Learning store.
    #[must_use]
    pub fn learning(&self) -> &LearningStore {
        &self.learning
    }

    /// Current behavior state.
    #[must_use]
    pub fn state(&self) -> BehaviorState {
        self.machine.current()
    }

    /// Current goal; `None` when the creature's gates rule every goal out.
    #[must_use]
    pub fn goal(&self) -> Option<Goal> {
        self.goals.current()
    }

    /// Goal selector (priorities and progress).
    #[must_use]
    pub fn goals(&self) -> &GoalSelector {
        &self.goals
    }

    /// Capability flags.
    #[must_use]
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// Agent-local clock.
    #[must_use]
    pub fn clock(&self) -> GameTime {
        self.clock
    }

    /// Whether an encounter is being tracked.
    #[must_use]
    pub fn in_combat(&self) -> bool {
        self.encounter.is_some()
    }

    /// Interactions waiting for a reply.
    #[must_use]
    pub fn pending_replies(&self) -> usize {
        self.pending.len()
    }

    /// Snapshot of the persistable learning data.
    #[must_use]
    pub fn learning_data(&self) -> LearningData {
        self.learning.to_data()
    }

    /// Replace learned state with a persisted snapshot.
    pub fn restore(&mut self, data: &LearningData) {
        self.learning.restore(data, self.clock);
        self.dirty = false;
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance every cycle by `diff` milliseconds.
    pub fn update(&mut self, host: &mut dyn CreatureHost, diff: u64) {
        self.clock = self.clock.advanced(diff);
        if !host.is_alive() {
            return;
        }

        if self.timers.behavior.tick(diff) {
            self.behavior_cycle(host);
        }
        if self.timers.learning.tick(diff) {
            self.learning_cycle();
        }
        if self.timers.social.tick(diff) {
            self.social_cycle(host);
        }
        if self.timers.exploration.tick(diff) {
            self.exploration_cycle(host);
        }
        if self.timers.adaptation.tick(diff) {
            self.adaptation_cycle();
        }
        if self.timers.save.tick(diff) && self.dirty {
            self.flush();
        }
    }

    fn executor<'a>(&'a mut self, host: &'a mut dyn CreatureHost) -> BehaviorExecutor<'a> {
        BehaviorExecutor {
            host,
            rng: self.rng.as_mut(),
            config: &self.config,
            personality: &mut self.personality,
            learning: &mut self.learning,
            goals: &mut self.goals,
            capabilities: self.capabilities,
            counters: &self.counters,
            now: self.clock,
        }
    }

    fn behavior_cycle(&mut self, host: &mut dyn CreatureHost) {
        let inputs = GoalInputs {
            personality: &self.personality,
            learning: &self.learning,
            capabilities: self.capabilities,
            level: host.level(),
        };
        if let Some(change) = self.goals.update(
            self.clock,
            &inputs,
            &self.config.goals,
            self.config.intervals.goal_reevaluation_ms,
        ) {
            info!(
                creature = %self.guid,
                from = ?change.from,
                to = ?change.to,
                reason = ?change.reason,
                "Goal changed"
            );
        }

        if host.victim().is_some_and(|v| v.is_valid()) && self.state() != BehaviorState::Combat {
            self.machine.transition(BehaviorState::Combat, self.clock);
        }

        let state = self.state();
        let step = self.executor(host).execute(state);
        if self.config.general.debug_logging {
            debug!(creature = %self.guid, state = ?state, step = ?step, goal = ?self.goal(), "Behavior tick");
        }
        match step {
            Step::Stay => {}
            Step::Switch(next) => {
                self.machine.transition(next, self.clock);
            }
            Step::Evade => self.evade(host),
        }
    }

    fn learning_cycle(&mut self) {
        let before = self.learning.primary_role();
        let after = self.learning.derive_role_affinity();
        if before != after {
            debug!(creature = %self.guid, from = ?before, to = ?after, "Primary role changed");
        }
        if self.combats_since_flush >= self.config.persistence.flush_every_combats {
            self.flush();
        }
    }

    fn social_cycle(&mut self, host: &mut dyn CreatureHost) {
        let config = Arc::clone(&self.config);
        let social = &config.social;
        self.learning.decay_relationships(
            self.clock,
            social.relationship_decay_time_ms,
            social.relationship_decay_step,
        );
        if !social.enable_social_interaction || !self.capabilities.can_socialize {
            self.pending.clear();
            return;
        }

        #[allow(clippy::cast_precision_loss)]
        let reply_chance = config.chat.chat_response_chance as f32;
        while let Some(reply) = self.pending.pop_front() {
            if !self.rng.chance(reply_chance) {
                continue;
            }
            let command = self.reply_to(reply);
            trace!(creature = %self.guid, player = %reply.player, command = ?command, "Replying");
            host.execute(command);
        }

        if self.state() == BehaviorState::Combat {
            return;
        }
        let anyone_near = host
            .nearby_players(social.interaction_radius)
            .iter()
            .any(ActorRef::is_valid);
        #[allow(clippy::cast_precision_loss)]
        let speech_chance =
            config.chat.spontaneous_speech_chance as f32 * self.personality.get(TraitKind::Sociability);
        if anyone_near && self.rng.chance(speech_chance) {
            let line = self.pick_line();
            host.execute(HostCommand::Say(line));
        }
    }

    fn exploration_cycle(&mut self, host: &mut dyn CreatureHost) {
        let exploration = &self.config.exploration;
        let next_delay = self.rng.range_u64(exploration.cooldown_min_ms, exploration.cooldown_max_ms);
        self.timers.exploration.reset_to(next_delay);

        if exploration.enable_exploration && self.capabilities.can_explore && self.state() == BehaviorState::Idle {
            self.executor(host).explore_once();
            self.dirty = true;
        }
    }

    fn adaptation_cycle(&mut self) {
        let tuning = &self.config.tuning;
        let step = tuning.adaptation_step;
        let window = tuning.adaptation_window;
        let p = &mut self.personality;

        if let Some(ratio) = self.learning.recent_win_ratio(window) {
            if ratio > 0.6 {
                p.mutate(TraitKind::Aggression, step);
                p.mutate(TraitKind::Caution, -step / 2.0);
            } else if ratio < 0.4 {
                p.mutate(TraitKind::Caution, step);
                p.mutate(TraitKind::Aggression, -step);
            }
        }
        if let Some(ratio) = self.learning.recent_positive_social_ratio(window) {
            if ratio > 0.6 {
                p.mutate(TraitKind::Sociability, step / 2.0);
            } else if ratio < 0.4 {
                p.mutate(TraitKind::Sociability, -step / 2.0);
            }
        }
        if let Some(ratio) = self.learning.recent_discovery_ratio(window) {
            if ratio > 0.5 {
                p.mutate(TraitKind::Curiosity, step / 2.0);
            } else if ratio < 0.2 {
                p.mutate(TraitKind::Curiosity, -step / 2.0);
            }
        }
        p.normalize(step / 4.0);

        if self.learning.normalize_affinity(tuning.role_affinity_cap) {
            debug!(creature = %self.guid, "Role affinity rescaled");
        }
        trace!(creature = %self.guid, personality = ?self.personality, "Adapted");
    }

    // ------------------------------------------------------------------
    // Host events
    // ------------------------------------------------------------------

    /// The creature spawned or was reset by the host.
    pub fn on_reset(&mut self, host: &mut dyn CreatureHost) {
        self.encounter = None;
        self.machine.transition(BehaviorState::Idle, self.clock);
        if !self.introduced {
            self.introduced = true;
            host.execute(HostCommand::Say(self.identity.introduction()));
        }
    }

    /// Combat started against `enemy`.
    pub fn on_enter_combat(&mut self, host: &dyn CreatureHost, enemy: &ActorRef) {
        if !enemy.is_valid() {
            return;
        }
        if self.encounter.is_none() {
            self.encounter = Some(Encounter::new(Some(*enemy), self.clock, host.zone()));
            debug!(creature = %self.guid, enemy = %enemy.id, "Entered combat");
        }
        self.machine.transition(BehaviorState::Combat, self.clock);
    }

    /// The creature took `amount` damage from `attacker`.
    ///
    /// Ends the encounter with an evade when health is low and the agent
    /// is cautious enough.
    pub fn on_damage_taken(&mut self, host: &mut dyn CreatureHost, attacker: &ActorRef, amount: u32) {
        if !attacker.is_valid() {
            return;
        }
        let zone = host.zone();
        let encounter = self.encounter_for(Some(*attacker), zone);
        encounter.damage_taken = encounter.damage_taken.saturating_add(amount);

        let combat = &self.config.combat;
        if host.health_pct() < combat.low_health_pct
            && self.personality.get(TraitKind::Caution) > combat.evade_caution_threshold
        {
            self.evade(host);
        }
    }

    /// The creature dealt `amount` damage to `victim`.
    pub fn on_damage_dealt(&mut self, victim: &ActorRef, amount: u32) {
        if !victim.is_valid() {
            return;
        }
        if let Some(encounter) = self.encounter.as_mut() {
            encounter.damage_dealt = encounter.damage_dealt.saturating_add(amount);
        }
    }

    /// The creature was healed for `amount` by `healer`.
    pub fn on_heal_received(&mut self, healer: &ActorRef, amount: u32) {
        if !healer.is_valid() {
            return;
        }
        match self.encounter.as_mut() {
            Some(encounter) => {
                encounter.healing_received = encounter.healing_received.saturating_add(amount);
            }
            None => {
                if let Some(player) = healer.id.player() {
                    self.note_social(player, InteractionKind::Helpful, "heal".to_string());
                }
            }
        }
    }

    /// The creature healed `target` for `amount`.
    pub fn on_healing_done(&mut self, target: &ActorRef, amount: u32) {
        if !target.is_valid() {
            return;
        }
        if let Some(encounter) = self.encounter.as_mut() {
            encounter.healing_done = encounter.healing_done.saturating_add(amount);
        }
    }

    /// A spell cast by the creature hit `target` with the given effectiveness.
    pub fn on_spell_hit_target(&mut self, target: &ActorRef, spell: SpellId, effectiveness: f32) {
        if !target.is_valid() || !effectiveness.is_finite() {
            return;
        }
        if let Some(encounter) = self.encounter.as_mut() {
            encounter.spells.push((spell, effectiveness.clamp(0.0, 1.0)));
        }
    }

    /// The creature was hit by `spell` from `caster`.
    ///
    /// Out of combat a player's spell is taken as a buff.
    pub fn on_spell_hit(&mut self, caster: &ActorRef, spell: SpellId) {
        if !caster.is_valid() || self.encounter.is_some() {
            return;
        }
        if let Some(player) = caster.id.player() {
            self.note_social(player, InteractionKind::Helpful, format!("spell: {spell}"));
        }
    }

    /// The creature killed `victim`.
    pub fn on_killed_unit(&mut self, host: &dyn CreatureHost, victim: &ActorRef) {
        if !victim.is_valid() {
            return;
        }
        self.encounter_for(Some(*victim), host.zone());
        self.end_encounter(CombatOutcome::Victory);
        self.personality
            .mutate(TraitKind::Aggression, self.config.tuning.victory_aggression);
        if self.goals.pursuing(Goal::LevelUp) {
            self.goals.advance(VICTORY_PROGRESS);
        }
        self.machine.transition(BehaviorState::Idle, self.clock);
    }

    /// The creature died. `killer` may be unknown.
    pub fn on_just_died(&mut self, host: &dyn CreatureHost, killer: Option<&ActorRef>) {
        let killer = killer.filter(|k| k.is_valid()).copied();
        self.encounter_for(killer, host.zone());
        self.end_encounter(CombatOutcome::Defeat);

        let tuning = &self.config.tuning;
        self.personality.mutate(TraitKind::Caution, tuning.death_caution);
        self.personality.mutate(TraitKind::Aggression, tuning.death_aggression);
        self.machine.transition(BehaviorState::Resting, self.clock);
        info!(creature = %self.guid, killer = ?killer.map(|k| k.id), "Agent died");
        self.flush();
    }

    /// The host forced the creature out of combat.
    pub fn on_evade(&mut self) {
        if self.encounter.is_some() {
            self.end_encounter(CombatOutcome::Fled);
        }
        self.machine.transition(BehaviorState::Resting, self.clock);
    }

    /// A player performed `emote` at the creature.
    pub fn on_receive_emote(&mut self, player: &ActorRef, emote: Emote) {
        let Some(guid) = player.id.player().filter(|_| player.is_valid()) else {
            return;
        };
        let kind = classify_emote(emote);
        self.note_social(guid, kind, format!("emote: {emote:?}"));
        self.queue_reply(guid, kind);
    }

    /// A player said `text` near the creature.
    pub fn on_chat_heard(&mut self, speaker: &ActorRef, text: &str) {
        let Some(guid) = speaker.id.player().filter(|_| speaker.is_valid()) else {
            return;
        };
        if text.trim().is_empty() {
            return;
        }
        if self.config.chat.enable_chat_learning && self.learning.learn_phrase(text) {
            AgentCounters::bump(&self.counters.phrases_learned);
            trace!(creature = %self.guid, phrase = %text.trim(), "Learned phrase");
        }
        let kind = classify_chat(text);
        self.note_social(guid, kind, format!("chat: {}", text.trim()));
        self.queue_reply(guid, kind);
    }

    /// The creature reached a movement target.
    pub fn on_movement_inform(&mut self) {
        if self.state() == BehaviorState::Exploring
            && self.rng.chance(self.config.behavior.return_to_idle_chance)
        {
            self.machine.transition(BehaviorState::Idle, self.clock);
        }
    }

    /// The creature is about to be removed. Flushes learning data.
    pub fn on_despawn(&mut self) {
        if self.encounter.is_some() {
            self.end_encounter(CombatOutcome::Fled);
        }
        self.flush();
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn encounter_for(&mut self, opponent: Option<ActorRef>, zone: ZoneId) -> &mut Encounter {
        let now = self.clock;
        self.encounter.get_or_insert_with(|| Encounter::new(opponent, now, zone))
    }

    fn evade(&mut self, host: &mut dyn CreatureHost) {
        host.execute(HostCommand::Evade);
        AgentCounters::bump(&self.counters.evades);
        debug!(creature = %self.guid, health = host.health_pct(), "Evading at low health");
        if self.encounter.is_some() {
            self.end_encounter(CombatOutcome::Fled);
        }
        self.personality
            .mutate(TraitKind::Caution, self.config.tuning.fled_caution);
        self.machine.transition(BehaviorState::Resting, self.clock);
    }

    fn end_encounter(&mut self, outcome: CombatOutcome) {
        let Some(encounter) = self.encounter.take() else {
            return;
        };
        if !self.config.combat.enable_combat_learning {
            return;
        }
        let experience = CombatExperience {
            opponent: encounter.opponent.map(|o| o.id),
            opponent_level: encounter.opponent.map_or(0, |o| o.level),
            damage_dealt: encounter.damage_dealt,
            damage_taken: encounter.damage_taken,
            healing_done: encounter.healing_done,
            healing_received: encounter.healing_received,
            duration_ms: self.clock.since(encounter.started_at),
            outcome,
            spells: encounter.spells,
            zone: encounter.zone,
        };
        debug!(
            creature = %self.guid,
            outcome = ?outcome,
            dealt = experience.damage_dealt,
            taken = experience.damage_taken,
            duration_ms = experience.duration_ms,
            "Encounter recorded"
        );
        self.learning.record_combat(experience);
        AgentCounters::bump(&self.counters.combats_recorded);
        self.combats_since_flush = self.combats_since_flush.saturating_add(1);
        self.dirty = true;
    }

    fn note_social(&mut self, player: PlayerGuid, kind: InteractionKind, context: String) {
        self.learning.record_social(SocialInteraction {
            player,
            kind,
            context,
            at: self.clock,
        });
        let tuning = &self.config.tuning;
        let delta = match kind {
            InteractionKind::Friendly | InteractionKind::Helpful => tuning.friendly_sociability,
            InteractionKind::Hostile => tuning.hostile_sociability,
            InteractionKind::Neutral => 0.0,
        };
        self.personality.mutate(TraitKind::Sociability, delta);
        if kind.is_positive() && self.goals.pursuing(Goal::HelpPlayers) {
            self.goals.advance(HELP_PROGRESS);
        }
        self.dirty = true;
    }

    fn queue_reply(&mut self, player: PlayerGuid, kind: InteractionKind) {
        if self.pending.len() >= self.config.social.max_pending_replies.max(1) {
            self.pending.pop_front();
        }
        self.pending.push_back(PendingReply { player, kind });
    }

    fn reply_to(&mut self, reply: PendingReply) -> HostCommand {
        match reply.kind {
            InteractionKind::Hostile => {
                if self.personality.get(TraitKind::Aggression) > 0.5 {
                    HostCommand::Emote(Emote::Threaten)
                } else {
                    HostCommand::Emote(Emote::Rude)
                }
            }
            InteractionKind::Helpful => HostCommand::Emote(Emote::Thank),
            InteractionKind::Friendly => HostCommand::Emote(Emote::Wave),
            InteractionKind::Neutral => HostCommand::Say(self.pick_line()),
        }
    }

    fn pick_line(&mut self) -> String {
        let phrases = self.learning.phrases();
        if let Some(idx) = self.rng.pick_index(phrases.len()) {
            if let Some(line) = phrases.get(idx) {
                return line.to_string();
            }
        }
        let idx = self.rng.pick_index(GREETINGS.len()).unwrap_or(0);
        GREETINGS[idx].to_string()
    }

    /// Persist learning data through the sink, if persistence is enabled.
    ///
    /// Failures are logged and counted; nothing propagates.
    pub fn flush(&mut self) {
        self.combats_since_flush = 0;
        if !self.config.persistence.persist_learning_data {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let data = self.learning.to_data();
        if sink.persist(self.guid, &data) {
            AgentCounters::bump(&self.counters.flushes);
            self.dirty = false;
        } else {
            AgentCounters::bump(&self.counters.flush_failures);
            warn!(creature = %self.guid, "Learning data flush failed");
        }
    }
}

fn classify_emote(emote: Emote) -> InteractionKind {
    match emote {
        Emote::Wave | Emote::Bow | Emote::Cheer | Emote::Hug | Emote::Laugh | Emote::Dance => {
            InteractionKind::Friendly
        }
        Emote::Thank => InteractionKind::Helpful,
        Emote::Rude | Emote::Spit | Emote::Threaten => InteractionKind::Hostile,
        Emote::Work | Emote::Read | Emote::Talk | Emote::Other(_) => InteractionKind::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;
    use crate::testing::RecordingHost;
    use crate::types::Position;

    fn agent_with(rng: ScriptedRandom) -> Agent {
        Agent::new(
            CreatureGuid(1),
            Arc::new(AgentConfig::default()),
            Box::new(rng),
            Arc::new(AgentCounters::new()),
        )
    }

    fn player(guid: u64) -> ActorRef {
        ActorRef::player(guid, 20, Position::new(3.0, 0.0, 0.0))
    }

    #[test]
    fn introduces_itself_once() {
        let mut agent = agent_with(ScriptedRandom::constant(0.5));
        let mut host = RecordingHost::new();
        agent.on_reset(&mut host);
        agent.on_reset(&mut host);
        assert_eq!(host.said().len(), 1);
        assert!(host.said()[0].starts_with("Greetings!"));
    }

    #[test]
    fn invalid_actors_are_ignored() {
        let mut agent = agent_with(ScriptedRandom::constant(0.5));
        let host = RecordingHost::new();
        let ghost = ActorRef::player(0, 1, Position::default());
        agent.on_enter_combat(&host, &ghost);
        agent.on_receive_emote(&ghost, Emote::Wave);
        agent.on_chat_heard(&ghost, "hello");
        assert!(!agent.in_combat());
        assert_eq!(agent.state(), BehaviorState::Idle);
        assert_eq!(agent.pending_replies(), 0);
        assert!(agent.learning().social_history().is_empty());
    }

    #[test]
    fn unannounced_kill_and_death_use_current_zone() {
        let mut agent = agent_with(ScriptedRandom::constant(0.5));
        let mut host = RecordingHost::new();
        host.base_zone = ZoneId(17);
        let boar = ActorRef::creature(40, 6, Position::default());

        agent.on_killed_unit(&host, &boar);
        let won = agent.learning().combat_history().last().expect("victory");
        assert_eq!(won.zone, ZoneId(17));

        host.base_zone = ZoneId(23);
        agent.on_just_died(&host, None);
        let lost = agent.learning().combat_history().last().expect("defeat");
        assert_eq!(lost.zone, ZoneId(23));
        assert_eq!(lost.outcome, CombatOutcome::Defeat);
    }

    #[test]
    fn chat_is_learned_and_queued() {
        let mut agent = agent_with(ScriptedRandom::constant(0.5));
        agent.on_chat_heard(&player(5), "Hello there, stranger");
        assert_eq!(agent.learning().phrases().len(), 1);
        assert_eq!(agent.pending_replies(), 1);
        assert_eq!(agent.learning().relationships().value(PlayerGuid(5)), 5);
    }

    #[test]
    fn pending_replies_are_bounded() {
        let mut agent = agent_with(ScriptedRandom::constant(0.5));
        for _ in 0..50 {
            agent.on_receive_emote(&player(8), Emote::Wave);
        }
        assert_eq!(agent.pending_replies(), AgentConfig::default().social.max_pending_replies);
    }

    #[test]
    fn social_cycle_answers_with_certain_chance() {
        // Roll 0 always passes the 30% reply chance.
        let mut agent = agent_with(ScriptedRandom::constant(0.0));
        let mut host = RecordingHost::new();
        agent.on_receive_emote(&player(8), Emote::Thank);
        agent.update(&mut host, 10_000);
        assert!(host.commands.contains(&HostCommand::Emote(Emote::Thank)));
        assert_eq!(agent.pending_replies(), 0);
    }

    #[test]
    fn low_health_cautious_agent_evades() {
        let mut agent = agent_with(ScriptedRandom::constant(0.5));
        agent.personality = Personality::from_values([0.2, 0.9, 0.5, 0.5, 0.5, 0.5, 0.5]);
        let mut host = RecordingHost::new();
        host.health_pct = 10.0;
        let wolf = ActorRef::creature(77, 10, Position::new(2.0, 0.0, 0.0));
        agent.on_enter_combat(&host, &wolf);
        agent.on_damage_taken(&mut host, &wolf, 120);

        assert_eq!(agent.state(), BehaviorState::Resting);
        assert!(host.commands.contains(&HostCommand::Evade));
        let last = agent.learning().combat_history().last().expect("recorded");
        assert_eq!(last.outcome, CombatOutcome::Fled);
        assert_eq!(last.damage_taken, 120);
    }

    #[test]
    fn bold_agent_fights_on_at_low_health() {
        let mut agent = agent_with(ScriptedRandom::constant(0.5));
        agent.personality = Personality::from_values([0.9, 0.1, 0.5, 0.5, 0.5, 0.5, 0.5]);
        let mut host = RecordingHost::new();
        host.health_pct = 10.0;
        let wolf = ActorRef::creature(77, 10, Position::new(2.0, 0.0, 0.0));
        agent.on_enter_combat(&host, &wolf);
        agent.on_damage_taken(&mut host, &wolf, 120);
        assert_eq!(agent.state(), BehaviorState::Combat);
        assert!(agent.in_combat());
    }

    #[test]
    fn flush_every_tenth_combat() {
        let sink = crate::persistence::MemorySink::new();
        let mut agent = agent_with(ScriptedRandom::constant(0.5)).with_sink(Box::new(sink.clone()));
        let mut host = RecordingHost::new();
        for i in 0..10 {
            let foe = ActorRef::creature(100 + i, 5, Position::default());
            agent.on_enter_combat(&host, &foe);
            agent.on_killed_unit(&host, &foe);
        }
        assert_eq!(sink.writes(), 0);
        agent.update(&mut host, 5_000);
        assert_eq!(sink.writes(), 1);
        assert_eq!(sink.get(CreatureGuid(1)).expect("saved").total_combats, 10);
    }
}
