//! Goal selection.
//!
//! Each candidate goal is scored as
//!
//! ```text
//! score = stored priority + personality bonus + learning bonus
//! ```
//!
//! and zeroed when a capability it needs is missing or a level gate is not
//! met. The best score wins; ties go to the goal declared first. When no goal
//! passes its gates the creature has no goal at all and idles on personality
//! rolls alone.
//!
//! Stored priorities start at fixed base values and move by
//! `goals.feedback_step` when a goal completes (up) or times out (down),
//! always staying within `[0.1, 1.0]`.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::behavior::BehaviorState;
use crate::config::GoalConfig;
use crate::learning::{LearningStore, Role};
use crate::personality::{Personality, TraitKind};
use crate::types::GameTime;

/// Lowest stored priority.
pub const MIN_PRIORITY: f32 = 0.1;
/// Highest stored priority.
pub const MAX_PRIORITY: f32 = 1.0;

/// A high-level objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Goal {
    /// Fight to gain experience.
    #[default]
    LevelUp,
    /// Wander into new zones.
    Explore,
    /// Seek out players.
    Socialize,
    /// Buy and sell.
    Trade,
    /// Train and practise a profession.
    LearnProfession,
    /// Search remote places for loot.
    HuntTreasure,
    /// Assist players nearby.
    HelpPlayers,
}

impl Goal {
    /// All goals in declaration order.
    pub const ALL: [Self; 7] = [
        Self::LevelUp,
        Self::Explore,
        Self::Socialize,
        Self::Trade,
        Self::LearnProfession,
        Self::HuntTreasure,
        Self::HelpPlayers,
    ];

    const fn index(self) -> usize {
        self as usize
    }

    /// Stored priority before any feedback.
    #[must_use]
    pub const fn base_priority(self) -> f32 {
        match self {
            Self::LevelUp => 0.8,
            Self::Explore => 0.5,
            Self::Socialize | Self::LearnProfession => 0.4,
            Self::Trade | Self::HuntTreasure | Self::HelpPlayers => 0.3,
        }
    }

    /// Behavior state the goal is pursued in, if it has one.
    ///
    /// Levelling up has none: it is pursued by picking fights from idle.
    #[must_use]
    pub const fn preferred_state(self) -> Option<BehaviorState> {
        match self {
            Self::LevelUp => None,
            Self::Explore | Self::HuntTreasure => Some(BehaviorState::Exploring),
            Self::Socialize | Self::HelpPlayers => Some(BehaviorState::Socializing),
            Self::Trade => Some(BehaviorState::Trading),
            Self::LearnProfession => Some(BehaviorState::Crafting),
        }
    }
}

/// What the creature is able to do at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Has access to vendors or an auction house.
    pub can_trade: bool,
    /// Can train professions.
    pub can_learn_professions: bool,
    /// May leave its spawn area.
    pub can_explore: bool,
    /// May talk to players.
    pub can_socialize: bool,
    /// May start fights.
    pub can_fight: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            can_trade: true,
            can_learn_professions: true,
            can_explore: true,
            can_socialize: true,
            can_fight: true,
        }
    }
}

/// The goal being pursued right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalState {
    /// Current goal; `None` when nothing is eligible.
    pub goal: Option<Goal>,
    /// When pursuit began.
    pub started_at: GameTime,
    /// Pursuit is abandoned after this long.
    pub timeout_ms: u64,
    /// Completion in `[0, 1]`.
    pub progress: f32,
}

impl GoalState {
    /// Whether the goal has run out of time at `now`.
    #[must_use]
    pub fn timed_out(&self, now: GameTime) -> bool {
        now.since(self.started_at) >= self.timeout_ms
    }

    /// Whether the goal is finished.
    #[must_use]
    pub fn completed(&self) -> bool {
        self.progress >= 1.0
    }
}

/// Why the selector picked a new goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalChangeReason {
    /// The previous goal reached full progress.
    Completed,
    /// The previous goal ran out of time.
    TimedOut,
    /// Periodic re-evaluation preferred another goal.
    Reevaluated,
    /// The previous goal no longer passed its gates, or there was none.
    Ineligible,
}

/// A goal switch reported by [`GoalSelector::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalChange {
    /// Goal given up.
    pub from: Option<Goal>,
    /// Goal taken up.
    pub to: Option<Goal>,
    /// Trigger.
    pub reason: GoalChangeReason,
}

/// Inputs to goal scoring.
#[derive(Debug, Clone, Copy)]
pub struct GoalInputs<'a> {
    /// Current personality.
    pub personality: &'a Personality,
    /// Learned statistics.
    pub learning: &'a LearningStore,
    /// Capability flags.
    pub capabilities: Capabilities,
    /// Creature level.
    pub level: u8,
}

/// Scores goals and tracks the current one.
#[derive(Debug, Clone)]
pub struct GoalSelector {
    priorities: [f32; 7],
    state: GoalState,
    last_evaluated: GameTime,
}

impl GoalSelector {
    /// A selector pursuing [`Goal::LevelUp`] from `now`, or nothing when the
    /// creature may not fight.
    #[must_use]
    pub fn new(now: GameTime, capabilities: Capabilities, config: &GoalConfig) -> Self {
        let start = Goal::default();
        Self {
            priorities: Goal::ALL.map(Goal::base_priority),
            state: GoalState {
                goal: Self::is_capable(start, capabilities).then_some(start),
                started_at: now,
                timeout_ms: config.goal_timeout_ms,
                progress: 0.0,
            },
            last_evaluated: now,
        }
    }

    /// Current goal.
    #[must_use]
    pub fn current(&self) -> Option<Goal> {
        self.state.goal
    }

    /// Whether `goal` is the one being pursued.
    #[must_use]
    pub fn pursuing(&self, goal: Goal) -> bool {
        self.state.goal == Some(goal)
    }

    /// Drop the current goal if `capabilities` rule it out.
    ///
    /// The next [`update`](Self::update) picks a replacement.
    pub fn restrict(&mut self, capabilities: Capabilities) {
        if self.state.goal.is_some_and(|g| !Self::is_capable(g, capabilities)) {
            self.state.goal = None;
            self.state.progress = 0.0;
        }
    }

    /// Full state of the current goal.
    #[must_use]
    pub fn state(&self) -> &GoalState {
        &self.state
    }

    /// Stored priority of `goal`.
    #[must_use]
    pub fn priority(&self, goal: Goal) -> f32 {
        self.priorities[goal.index()]
    }

    /// Whether the capabilities `goal` needs are all present.
    #[must_use]
    pub fn is_capable(goal: Goal, capabilities: Capabilities) -> bool {
        let c = capabilities;
        match goal {
            Goal::LevelUp => c.can_fight,
            Goal::Explore | Goal::HuntTreasure => c.can_explore,
            Goal::Socialize => c.can_socialize,
            Goal::Trade => c.can_trade,
            Goal::LearnProfession => c.can_learn_professions,
            Goal::HelpPlayers => c.can_socialize && c.can_fight,
        }
    }

    /// Whether `goal` passes its capability and level gates.
    #[must_use]
    pub fn is_eligible(goal: Goal, capabilities: Capabilities, level: u8, config: &GoalConfig) -> bool {
        Self::is_capable(goal, capabilities)
            && match goal {
                Goal::LevelUp => level < config.max_level,
                Goal::LearnProfession => level >= config.profession_min_level,
                Goal::HuntTreasure => level >= config.treasure_min_level,
                Goal::HelpPlayers => level >= config.help_players_min_level,
                Goal::Explore | Goal::Socialize | Goal::Trade => true,
            }
    }

    /// Score of `goal`; zero when it is not eligible.
    #[must_use]
    pub fn score(&self, goal: Goal, inputs: &GoalInputs<'_>, config: &GoalConfig) -> f32 {
        if !Self::is_eligible(goal, inputs.capabilities, inputs.level, config) {
            return 0.0;
        }
        let p = inputs.personality;
        let affinity = inputs.learning.affinity();
        let personality_bonus = match goal {
            Goal::LevelUp => p.get(TraitKind::Aggression) * 0.5,
            Goal::Explore => p.get(TraitKind::Curiosity) * 0.6,
            Goal::Socialize => p.get(TraitKind::Sociability) * 0.6,
            Goal::Trade => p.get(TraitKind::Trader) * 0.6,
            Goal::LearnProfession => p.get(TraitKind::Crafter) * 0.4 + p.get(TraitKind::Intelligence) * 0.2,
            Goal::HuntTreasure => p.get(TraitKind::Curiosity) * 0.3 + p.get(TraitKind::Aggression) * 0.2,
            Goal::HelpPlayers => p.get(TraitKind::Sociability) * 0.4,
        };
        let learning_bonus = match goal {
            Goal::LevelUp => inputs.learning.win_rate() * 0.2,
            Goal::Explore => affinity.share(Role::Explorer) * 0.2,
            Goal::Trade => affinity.share(Role::Trader) * 0.2,
            Goal::HelpPlayers => affinity.share(Role::Support) * 0.2,
            Goal::Socialize | Goal::LearnProfession | Goal::HuntTreasure => 0.0,
        };
        self.priority(goal) + personality_bonus + learning_bonus
    }

    /// Best-scoring eligible goal; ties go to the earlier-declared goal.
    ///
    /// `None` when every goal is gated off.
    #[must_use]
    pub fn select_goal(&self, inputs: &GoalInputs<'_>, config: &GoalConfig) -> Option<Goal> {
        let mut best: Option<(Goal, OrderedFloat<f32>)> = None;
        for goal in Goal::ALL {
            if !Self::is_eligible(goal, inputs.capabilities, inputs.level, config) {
                continue;
            }
            let score = OrderedFloat(self.score(goal, inputs, config));
            if best.is_none_or(|(_, b)| score > b) {
                best = Some((goal, score));
            }
        }
        best.map(|(g, _)| g)
    }

    /// Settle completion or timeout, then re-select if one happened, the
    /// current goal lost its gates, or the re-evaluation interval has passed.
    ///
    /// Returns the change when the goal switched.
    pub fn update(
        &mut self,
        now: GameTime,
        inputs: &GoalInputs<'_>,
        config: &GoalConfig,
        reevaluation_ms: u64,
    ) -> Option<GoalChange> {
        let reason = match self.state.goal {
            None => GoalChangeReason::Ineligible,
            Some(goal) if !Self::is_eligible(goal, inputs.capabilities, inputs.level, config) => {
                GoalChangeReason::Ineligible
            }
            Some(goal) if self.state.completed() => {
                self.adjust_priority(goal, config.feedback_step);
                GoalChangeReason::Completed
            }
            Some(goal) if self.state.timed_out(now) => {
                self.adjust_priority(goal, -config.feedback_step);
                GoalChangeReason::TimedOut
            }
            Some(_) if now.since(self.last_evaluated) >= reevaluation_ms => GoalChangeReason::Reevaluated,
            Some(_) => return None,
        };
        self.last_evaluated = now;

        let next = self.select_goal(inputs, config);
        let from = self.state.goal;
        let settled = matches!(reason, GoalChangeReason::Reevaluated | GoalChangeReason::Ineligible);
        if next == from && settled {
            return None;
        }
        self.state = GoalState {
            goal: next,
            started_at: now,
            timeout_ms: config.goal_timeout_ms,
            progress: 0.0,
        };
        Some(GoalChange { from, to: next, reason })
    }

    /// Add progress toward the current goal.
    pub fn advance(&mut self, amount: f32) {
        if self.state.goal.is_some() && amount.is_finite() && amount > 0.0 {
            self.state.progress = (self.state.progress + amount).min(1.0);
        }
    }

    /// Nudge a stored priority, staying within `[0.1, 1.0]`.
    pub fn adjust_priority(&mut self, goal: Goal, delta: f32) {
        if delta.is_finite() {
            let slot = &mut self.priorities[goal.index()];
            *slot = (*slot + delta).clamp(MIN_PRIORITY, MAX_PRIORITY);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;

    fn fixture() -> (AgentConfig, LearningStore) {
        let config = AgentConfig::default();
        let learning = LearningStore::new(&config);
        (config, learning)
    }

    #[test]
    fn neutral_agent_prefers_levelling() {
        let (config, learning) = fixture();
        let selector = GoalSelector::new(GameTime(0), Capabilities::default(), &config.goals);
        let personality = Personality::default();
        let inputs = GoalInputs {
            personality: &personality,
            learning: &learning,
            capabilities: Capabilities::default(),
            level: 20,
        };
        assert_eq!(selector.select_goal(&inputs, &config.goals), Some(Goal::LevelUp));
    }

    #[test]
    fn curious_agent_explores() {
        let (config, learning) = fixture();
        let selector = GoalSelector::new(GameTime(0), Capabilities::default(), &config.goals);
        let personality = Personality::from_values([0.0, 0.5, 0.2, 1.0, 0.2, 0.1, 0.1]);
        let inputs = GoalInputs {
            personality: &personality,
            learning: &learning,
            capabilities: Capabilities::default(),
            level: 20,
        };
        assert_eq!(selector.select_goal(&inputs, &config.goals), Some(Goal::Explore));
    }

    #[test]
    fn gated_goals_score_zero() {
        let (config, learning) = fixture();
        let selector = GoalSelector::new(GameTime(0), Capabilities::default(), &config.goals);
        let personality = Personality::from_values([0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        let inputs = GoalInputs {
            personality: &personality,
            learning: &learning,
            capabilities: Capabilities {
                can_trade: false,
                ..Capabilities::default()
            },
            level: 3,
        };
        assert!(selector.score(Goal::Trade, &inputs, &config.goals).abs() < f32::EPSILON);
        assert!(selector.score(Goal::LearnProfession, &inputs, &config.goals).abs() < f32::EPSILON);
        assert!(selector.score(Goal::HelpPlayers, &inputs, &config.goals).abs() < f32::EPSILON);
        let chosen = selector.select_goal(&inputs, &config.goals);
        assert!(!matches!(chosen, Some(Goal::Trade | Goal::LearnProfession)));
    }

    #[test]
    fn max_level_disables_levelling() {
        let (config, learning) = fixture();
        let selector = GoalSelector::new(GameTime(0), Capabilities::default(), &config.goals);
        let personality = Personality::from_values([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let inputs = GoalInputs {
            personality: &personality,
            learning: &learning,
            capabilities: Capabilities::default(),
            level: 80,
        };
        assert_ne!(selector.select_goal(&inputs, &config.goals), Some(Goal::LevelUp));
    }

    #[test]
    fn completion_reinforces_and_timeout_weakens() {
        let (config, learning) = fixture();
        let mut selector = GoalSelector::new(GameTime(0), Capabilities::default(), &config.goals);
        let personality = Personality::default();
        let inputs = GoalInputs {
            personality: &personality,
            learning: &learning,
            capabilities: Capabilities::default(),
            level: 20,
        };

        selector.advance(1.5);
        let change = selector.update(GameTime(10), &inputs, &config.goals, 30_000).expect("change");
        assert_eq!(change.reason, GoalChangeReason::Completed);
        assert!((selector.priority(Goal::LevelUp) - 0.85).abs() < 1e-6);
        assert!(selector.state().progress.abs() < f32::EPSILON);

        let later = GameTime(10 + config.goals.goal_timeout_ms);
        let change = selector.update(later, &inputs, &config.goals, 30_000).expect("change");
        assert_eq!(change.reason, GoalChangeReason::TimedOut);
        assert!((selector.priority(Goal::LevelUp) - 0.8).abs() < 1e-6);
    }

    #[test]
    fn reevaluation_waits_for_interval() {
        let (config, learning) = fixture();
        let mut selector = GoalSelector::new(GameTime(0), Capabilities::default(), &config.goals);
        let personality = Personality::from_values([0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        let inputs = GoalInputs {
            personality: &personality,
            learning: &learning,
            capabilities: Capabilities::default(),
            level: 20,
        };
        assert_eq!(selector.update(GameTime(29_999), &inputs, &config.goals, 30_000), None);
        let change = selector.update(GameTime(30_000), &inputs, &config.goals, 30_000).expect("change");
        assert_eq!(change.to, Some(Goal::Socialize));
        assert_eq!(change.reason, GoalChangeReason::Reevaluated);
    }

    #[test]
    fn priorities_stay_bounded() {
        let config = GoalConfig::default();
        let mut selector = GoalSelector::new(GameTime(0), Capabilities::default(), &config);
        for _ in 0..100 {
            selector.adjust_priority(Goal::Trade, -0.05);
        }
        assert!((selector.priority(Goal::Trade) - MIN_PRIORITY).abs() < f32::EPSILON);
        for _ in 0..100 {
            selector.adjust_priority(Goal::Trade, 0.05);
        }
        assert!((selector.priority(Goal::Trade) - MAX_PRIORITY).abs() < f32::EPSILON);
    }

    const NOTHING: Capabilities = Capabilities {
        can_trade: false,
        can_learn_professions: false,
        can_explore: false,
        can_socialize: false,
        can_fight: false,
    };

    #[test]
    fn nothing_eligible_means_no_goal() {
        let (config, learning) = fixture();
        let selector = GoalSelector::new(GameTime(0), NOTHING, &config.goals);
        assert_eq!(selector.current(), None);
        let personality = Personality::from_values([1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let inputs = GoalInputs {
            personality: &personality,
            learning: &learning,
            capabilities: NOTHING,
            level: 1,
        };
        assert_eq!(selector.select_goal(&inputs, &config.goals), None);
    }

    #[test]
    fn restricted_goal_is_dropped_and_replaced() {
        let (config, learning) = fixture();
        let mut selector = GoalSelector::new(GameTime(0), Capabilities::default(), &config.goals);
        let pacifist = Capabilities {
            can_fight: false,
            ..Capabilities::default()
        };
        selector.restrict(pacifist);
        assert_eq!(selector.current(), None);

        let personality = Personality::from_values([0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        let inputs = GoalInputs {
            personality: &personality,
            learning: &learning,
            capabilities: pacifist,
            level: 20,
        };
        let change = selector.update(GameTime(1), &inputs, &config.goals, 30_000).expect("change");
        assert_eq!(change.reason, GoalChangeReason::Ineligible);
        assert_eq!(change.to, Some(Goal::Socialize));
    }

    #[test]
    fn goal_losing_its_level_gate_is_replaced_at_once() {
        let (config, learning) = fixture();
        let mut selector = GoalSelector::new(GameTime(0), Capabilities::default(), &config.goals);
        let personality = Personality::from_values([1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let inputs = GoalInputs {
            personality: &personality,
            learning: &learning,
            capabilities: Capabilities::default(),
            level: config.goals.max_level,
        };
        let change = selector.update(GameTime(1), &inputs, &config.goals, 30_000).expect("change");
        assert_eq!(change.from, Some(Goal::LevelUp));
        assert_ne!(change.to, Some(Goal::LevelUp));
        assert!((selector.priority(Goal::LevelUp) - Goal::LevelUp.base_priority()).abs() < f32::EPSILON);
    }

    #[test]
    fn no_goal_makes_no_progress() {
        let config = GoalConfig::default();
        let mut selector = GoalSelector::new(GameTime(0), NOTHING, &config);
        selector.advance(1.0);
        assert!(selector.state().progress.abs() < f32::EPSILON);
    }
}
