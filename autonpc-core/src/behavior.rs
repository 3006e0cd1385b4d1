//! Behavior state machine and executor.
//!
//! ```text
//!            ┌──────────── any peaceful state ────────────┐
//!   IDLE ⇄ EXPLORING ⇄ SOCIALIZING ⇄ LEARNING ⇄ CRAFTING ⇄ TRADING
//!     ▲                                                     │
//!     │            engagement signal (from anywhere)        ▼
//!     └──────────── COMBAT ──── evade / flee / death ──► RESTING
//! ```
//!
//! The [`StateMachine`] only validates transitions. What happens inside a
//! state is decided once per behavior tick by [`BehaviorExecutor`], which
//! issues at most one [`HostCommand`] per call.

use std::f32::consts::TAU;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::AgentConfig;
use crate::goal::{Capabilities, Goal, GoalSelector};
use crate::host::{CreatureHost, HostCommand};
use crate::learning::{Discovery, LearningStore, Role};
use crate::metrics::AgentCounters;
use crate::personality::{Personality, TraitKind};
use crate::rng::RandomSource;
use crate::types::{ActorRef, Emote, GameTime};

/// Health percent at which a resting agent gets back up.
const REST_UNTIL_HEALTH_PCT: f32 = 80.0;
/// Goal progress per first-time zone discovery.
const DISCOVERY_PROGRESS: f32 = 0.2;
/// Goal progress per revisit or activity tick.
const ACTIVITY_PROGRESS: f32 = 0.05;
/// Goal progress per social approach.
const SOCIAL_PROGRESS: f32 = 0.1;
/// Trader affinity per trading tick.
const TRADER_PER_TICK: f32 = 0.05;

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

/// Low-level action mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BehaviorState {
    /// Waiting for something to do.
    #[default]
    Idle,
    /// Walking to random points.
    Exploring,
    /// Approaching and greeting players.
    Socializing,
    /// Working a profession.
    Crafting,
    /// Studying.
    Learning,
    /// Fighting.
    Combat,
    /// Recovering after a fight.
    Resting,
    /// Buying and selling.
    Trading,
}

impl BehaviorState {
    /// Position on the peaceful activity chain, if this is a peaceful activity.
    const fn chain_index(self) -> Option<u8> {
        match self {
            Self::Exploring => Some(0),
            Self::Socializing => Some(1),
            Self::Learning => Some(2),
            Self::Crafting => Some(3),
            Self::Trading => Some(4),
            Self::Idle | Self::Combat | Self::Resting => None,
        }
    }

    /// Whether this is one of the peaceful activities.
    #[must_use]
    pub const fn is_activity(self) -> bool {
        self.chain_index().is_some()
    }
}

/// Current and previous behavior state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateMachine {
    current: BehaviorState,
    previous: BehaviorState,
    entered_at: GameTime,
}

impl StateMachine {
    /// A machine idling since `now`.
    #[must_use]
    pub const fn new(now: GameTime) -> Self {
        Self {
            current: BehaviorState::Idle,
            previous: BehaviorState::Idle,
            entered_at: now,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn current(&self) -> BehaviorState {
        self.current
    }

    /// State before the last transition.
    #[must_use]
    pub const fn previous(&self) -> BehaviorState {
        self.previous
    }

    /// When the current state was entered.
    #[must_use]
    pub const fn entered_at(&self) -> GameTime {
        self.entered_at
    }

    /// Whether `from → to` is an allowed edge.
    #[must_use]
    pub fn can_transition(from: BehaviorState, to: BehaviorState) -> bool {
        use BehaviorState::{Combat, Idle, Resting};
        if from == to {
            return false;
        }
        match (from, to) {
            (_, Combat | Resting | Idle) | (Idle, _) => true,
            (Combat | Resting, _) => false,
            (a, b) => match (a.chain_index(), b.chain_index()) {
                (Some(x), Some(y)) => x.abs_diff(y) == 1,
                _ => false,
            },
        }
    }

    /// Move to `to` if the edge is allowed. Returns `true` on success.
    pub fn transition(&mut self, to: BehaviorState, now: GameTime) -> bool {
        if !Self::can_transition(self.current, to) {
            return false;
        }
        trace!(from = ?self.current, to = ?to, "Behavior transition");
        self.previous = self.current;
        self.current = to;
        self.entered_at = now;
        true
    }
}

/// Pick the state to leave IDLE for, if any.
///
/// The goal's preferred state is tried first with `goal_commit_chance`, then
/// curiosity, sociability and intelligence each get one roll against `[0, 100)`.
pub fn roll_idle_transition(
    personality: &Personality,
    goal: Option<Goal>,
    config: &AgentConfig,
    rng: &mut dyn RandomSource,
) -> Option<BehaviorState> {
    let b = &config.behavior;
    if let Some(preferred) = goal.and_then(Goal::preferred_state) {
        if rng.chance(b.goal_commit_chance) {
            return Some(preferred);
        }
    }
    let rolls = [
        (TraitKind::Curiosity, b.curiosity_weight, BehaviorState::Exploring),
        (TraitKind::Sociability, b.sociability_weight, BehaviorState::Socializing),
        (TraitKind::Intelligence, b.intelligence_weight, BehaviorState::Learning),
    ];
    for (kind, weight, state) in rolls {
        if rng.roll_percent() < personality.get(kind) * weight {
            return Some(state);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Executor
// ---------------------------------------------------------------------------

/// What the agent should do after an executor call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Remain in the current state.
    Stay,
    /// Request a transition.
    Switch(BehaviorState),
    /// Low health and cautious: drop the fight.
    Evade,
}

/// Everything one behavior tick may read or touch, borrowed from the agent.
pub struct BehaviorExecutor<'a> {
    /// The creature's host handle.
    pub host: &'a mut dyn CreatureHost,
    /// Random source.
    pub rng: &'a mut dyn RandomSource,
    /// Configuration.
    pub config: &'a AgentConfig,
    /// Personality (discoveries nudge curiosity).
    pub personality: &'a mut Personality,
    /// Learning store.
    pub learning: &'a mut LearningStore,
    /// Goal selector (activities advance progress).
    pub goals: &'a mut GoalSelector,
    /// Capability flags.
    pub capabilities: Capabilities,
    /// Shared counters.
    pub counters: &'a AgentCounters,
    /// Agent-local time.
    pub now: GameTime,
}

impl BehaviorExecutor<'_> {
    /// Run the handler for `state`.
    pub fn execute(&mut self, state: BehaviorState) -> Step {
        match state {
            BehaviorState::Idle => self.idle(),
            BehaviorState::Exploring => self.exploring(),
            BehaviorState::Socializing => self.socializing(),
            BehaviorState::Crafting => self.crafting(),
            BehaviorState::Learning => self.learning(),
            BehaviorState::Combat => self.combat(),
            BehaviorState::Resting => self.resting(),
            BehaviorState::Trading => self.trading(),
        }
    }

    /// Hunt when levelling, otherwise maybe pick an activity.
    pub fn idle(&mut self) -> Step {
        if self.goals.pursuing(Goal::LevelUp) && self.capabilities.can_fight {
            let aggression = self.personality.get(TraitKind::Aggression);
            if self.rng.chance(aggression * 100.0) {
                if let Some(prey) = self.nearest_hostile() {
                    debug!(target_unit = %prey.id, "Hunting");
                    self.host.execute(HostCommand::Chase(prey.id));
                    return Step::Stay;
                }
            }
        }
        match roll_idle_transition(self.personality, self.goals.current(), self.config, self.rng) {
            Some(next) => Step::Switch(next),
            None => Step::Stay,
        }
    }

    /// Walk somewhere random and log the zone.
    pub fn exploring(&mut self) -> Step {
        if !self.capabilities.can_explore {
            return Step::Switch(BehaviorState::Idle);
        }
        self.explore_once();
        self.maybe_return_to_idle()
    }

    /// Single exploration move: pick a point, walk there, record the zone.
    ///
    /// Also used by the independent exploration cycle while idle.
    pub fn explore_once(&mut self) -> Discovery {
        let origin = self.host.position();
        let angle = self.rng.range(0.0, TAU);
        let distance = self.rng.range(0.0, self.config.exploration.radius);
        let destination = origin.offset(angle, distance);
        let zone = self.host.zone_at(destination);

        self.host.execute(HostCommand::MoveTo(destination));
        let discovery = self.learning.record_exploration(zone, destination, self.now);

        let pursuing = matches!(self.goals.current(), Some(Goal::Explore | Goal::HuntTreasure));
        match discovery {
            Discovery::FirstVisit => {
                debug!(zone = %zone, "Discovered zone");
                AgentCounters::bump(&self.counters.discoveries);
                self.personality
                    .mutate(TraitKind::Curiosity, self.config.tuning.discovery_curiosity);
                if pursuing {
                    self.goals.advance(DISCOVERY_PROGRESS);
                }
            }
            Discovery::Revisit(_) => {
                if pursuing {
                    self.goals.advance(ACTIVITY_PROGRESS);
                }
            }
        }
        discovery
    }

    /// Approach a nearby player with a greeting, a learned phrase or a rude gesture.
    pub fn socializing(&mut self) -> Step {
        if !self.capabilities.can_socialize {
            return Step::Switch(BehaviorState::Idle);
        }
        let players: Vec<ActorRef> = self
            .host
            .nearby_players(self.config.social.interaction_radius)
            .into_iter()
            .filter(ActorRef::is_valid)
            .collect();

        if let Some(idx) = self.rng.pick_index(players.len()) {
            let player = players[idx];
            let standing = player.id.player().map_or(0, |p| self.learning.relationships().value(p));
            let command = if standing < 0 {
                HostCommand::Emote(Emote::Rude)
            } else {
                let chatty = self.personality.get(TraitKind::Sociability) * 100.0;
                match self.pick_phrase() {
                    Some(line) if self.rng.chance(chatty) => HostCommand::Say(line),
                    _ => HostCommand::Emote(Emote::Wave),
                }
            };
            self.host.execute(command);
            if matches!(self.goals.current(), Some(Goal::Socialize | Goal::HelpPlayers)) {
                self.goals.advance(SOCIAL_PROGRESS);
            }
        }
        self.maybe_return_to_idle()
    }

    /// Practise a profession.
    pub fn crafting(&mut self) -> Step {
        self.activity(Emote::Work, Goal::LearnProfession)
    }

    /// Study.
    pub fn learning(&mut self) -> Step {
        self.activity(Emote::Read, Goal::LearnProfession)
    }

    /// Trade with whoever is around.
    pub fn trading(&mut self) -> Step {
        if !self.capabilities.can_trade {
            return Step::Switch(BehaviorState::Idle);
        }
        self.learning.reward_role(Role::Trader, TRADER_PER_TICK);
        self.activity(Emote::Talk, Goal::Trade)
    }

    /// Role-conditioned fighting.
    pub fn combat(&mut self) -> Step {
        let config = self.config;
        let combat = &config.combat;
        if self.host.health_pct() < combat.low_health_pct
            && self.personality.get(TraitKind::Caution) > combat.evade_caution_threshold
        {
            return Step::Evade;
        }
        let Some(victim) = self.host.victim().filter(ActorRef::is_valid) else {
            return Step::Switch(BehaviorState::Idle);
        };

        let here = self.host.position();
        let distance = here.distance(&victim.position);
        let role = self.learning.primary_role().unwrap_or(Role::MeleeDps);
        let command = match role {
            Role::Healer => {
                (distance < combat.healer_distance).then(|| HostCommand::Retreat {
                    from: victim.id,
                    to: here.away_from(&victim.position, combat.retreat_distance),
                })
            }
            r if r.is_ranged() => Some(if distance < combat.ranged_min_distance {
                HostCommand::Retreat {
                    from: victim.id,
                    to: here.away_from(&victim.position, combat.retreat_distance),
                }
            } else {
                HostCommand::Attack(victim.id)
            }),
            _ => Some(if distance > combat.melee_range {
                HostCommand::Chase(victim.id)
            } else {
                HostCommand::Attack(victim.id)
            }),
        };
        if let Some(command) = command {
            self.host.execute(command);
        }
        Step::Stay
    }

    /// Sit until health recovers.
    pub fn resting(&mut self) -> Step {
        if self.host.health_pct() >= REST_UNTIL_HEALTH_PCT {
            Step::Switch(BehaviorState::Idle)
        } else {
            Step::Stay
        }
    }

    fn activity(&mut self, emote: Emote, goal: Goal) -> Step {
        if self.rng.chance(self.config.behavior.activity_emote_chance) {
            self.host.execute(HostCommand::Emote(emote));
        }
        if self.goals.pursuing(goal) {
            self.goals.advance(ACTIVITY_PROGRESS);
        }
        self.maybe_return_to_idle()
    }

    fn maybe_return_to_idle(&mut self) -> Step {
        if self.rng.chance(self.config.behavior.return_to_idle_chance) {
            Step::Switch(BehaviorState::Idle)
        } else {
            Step::Stay
        }
    }

    fn nearest_hostile(&self) -> Option<ActorRef> {
        let here = self.host.position();
        self.host
            .nearby_hostiles(self.config.combat.hunt_radius)
            .into_iter()
            .filter(ActorRef::is_valid)
            .min_by(|a, b| here.distance(&a.position).total_cmp(&here.distance(&b.position)))
    }

    fn pick_phrase(&mut self) -> Option<String> {
        let phrases = self.learning.phrases();
        let idx = self.rng.pick_index(phrases.len())?;
        phrases.get(idx).map(str::to_string)
    }
}
