//! Configuration for the autonomous NPC engine.
//!
//! Maps directly to `autonpc.toml`. Every field has a serde default, so a
//! partial file (or an empty one) yields a working configuration. Call
//! [`AgentConfig::validate`] after loading: out-of-range values are clamped
//! and reported, never rejected.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::persistence::BlobFormat;

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Spawn admission and population limits.
    #[serde(default)]
    pub population: PopulationConfig,
    /// Cycle timer intervals.
    #[serde(default)]
    pub intervals: IntervalConfig,
    /// Chat learning and speech.
    #[serde(default)]
    pub chat: ChatConfig,
    /// Combat learning and role-conditioned tactics.
    #[serde(default)]
    pub combat: CombatConfig,
    /// Exploration behaviour.
    #[serde(default)]
    pub exploration: ExplorationConfig,
    /// Social interaction behaviour.
    #[serde(default)]
    pub social: SocialConfig,
    /// Learning-data persistence.
    #[serde(default)]
    pub persistence: PersistenceConfig,
    /// Personality generation.
    #[serde(default)]
    pub personality: PersonalityConfig,
    /// Goal selection.
    #[serde(default)]
    pub goals: GoalConfig,
    /// Behavior state machine probabilities.
    #[serde(default)]
    pub behavior: BehaviorConfig,
    /// Reward and drift magnitudes.
    #[serde(default)]
    pub tuning: TuningConfig,
}

impl AgentConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `AutonpcError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::AutonpcError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Whether agents may be spawned at all.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.general.enabled && self.population.max_active_npcs > 0
    }

    /// Clamp out-of-range values to safe defaults.
    ///
    /// Every adjustment (and every suspicious-but-kept value) is logged with
    /// `warn!` and returned, so callers can surface it at startup.
    pub fn validate(&mut self) -> Vec<String> {
        let mut notes = Vec::new();
        let mut note = |msg: String| {
            warn!(target: "autonpc::config", "{msg}");
            notes.push(msg);
        };

        if self.population.max_active_npcs > 100 {
            note(format!(
                "population.max_active_npcs is very high ({}); recommended <= 100",
                self.population.max_active_npcs
            ));
        }

        if self.chat.chat_response_chance > 100 {
            note(format!(
                "chat.chat_response_chance is invalid ({}); using {}",
                self.chat.chat_response_chance,
                default_chat_response_chance()
            ));
            self.chat.chat_response_chance = default_chat_response_chance();
        }
        if self.chat.spontaneous_speech_chance > 100 {
            note(format!(
                "chat.spontaneous_speech_chance is invalid ({}); using {}",
                self.chat.spontaneous_speech_chance,
                default_spontaneous_speech_chance()
            ));
            self.chat.spontaneous_speech_chance = default_spontaneous_speech_chance();
        }
        if self.chat.min_phrase_len > self.chat.max_phrase_len {
            note(format!(
                "chat.min_phrase_len ({}) exceeds chat.max_phrase_len ({}); swapping",
                self.chat.min_phrase_len, self.chat.max_phrase_len
            ));
            std::mem::swap(&mut self.chat.min_phrase_len, &mut self.chat.max_phrase_len);
        }

        if self.exploration.radius <= 0.0 || !self.exploration.radius.is_finite() {
            note(format!(
                "exploration.radius is invalid ({}); using {}",
                self.exploration.radius,
                default_exploration_radius()
            ));
            self.exploration.radius = default_exploration_radius();
        } else if self.exploration.radius > 500.0 {
            note(format!(
                "exploration.radius is very high ({:.1}); may hurt performance",
                self.exploration.radius
            ));
        }
        if self.exploration.cooldown_min_ms > self.exploration.cooldown_max_ms {
            note(format!(
                "exploration.cooldown_min_ms ({}) exceeds cooldown_max_ms ({}); swapping",
                self.exploration.cooldown_min_ms, self.exploration.cooldown_max_ms
            ));
            std::mem::swap(
                &mut self.exploration.cooldown_min_ms,
                &mut self.exploration.cooldown_max_ms,
            );
        }
        if self.exploration.cooldown_min_ms == 0 {
            note("exploration.cooldown_min_ms is 0; using default".to_string());
            self.exploration.cooldown_min_ms = default_exploration_cooldown_min();
            self.exploration.cooldown_max_ms = self
                .exploration
                .cooldown_max_ms
                .max(self.exploration.cooldown_min_ms);
        }

        if self.social.interaction_radius <= 0.0 || !self.social.interaction_radius.is_finite() {
            note(format!(
                "social.interaction_radius is invalid ({}); using {}",
                self.social.interaction_radius,
                default_social_radius()
            ));
            self.social.interaction_radius = default_social_radius();
        }

        if self.intervals.ai_update_ms < 1000 {
            note(format!(
                "intervals.ai_update_ms is very low ({}ms); may hurt performance",
                self.intervals.ai_update_ms
            ));
        }
        for (name, value, fallback) in [
            ("intervals.ai_update_ms", &mut self.intervals.ai_update_ms, default_ai_update()),
            ("intervals.learning_update_ms", &mut self.intervals.learning_update_ms, default_learning_update()),
            ("intervals.social_update_ms", &mut self.intervals.social_update_ms, default_social_update()),
            ("intervals.adaptation_ms", &mut self.intervals.adaptation_ms, default_adaptation()),
            ("intervals.goal_reevaluation_ms", &mut self.intervals.goal_reevaluation_ms, default_goal_reevaluation()),
        ] {
            if *value == 0 {
                note(format!("{name} is 0; using {fallback}"));
                *value = fallback;
            }
        }

        for (name, value, fallback) in [
            ("combat.max_combat_history", &mut self.combat.max_combat_history, default_combat_history()),
            ("social.max_social_history", &mut self.social.max_social_history, default_social_history()),
            ("exploration.max_history", &mut self.exploration.max_history, default_exploration_history()),
            ("chat.max_learned_phrases", &mut self.chat.max_learned_phrases, default_max_phrases()),
        ] {
            if *value == 0 {
                note(format!("{name} is 0; using {fallback}"));
                *value = fallback;
            }
        }

        let p = &mut self.personality;
        if !(0.0..=1.0).contains(&p.seed_min) || !(0.0..=1.0).contains(&p.seed_max) || p.seed_min > p.seed_max {
            note(format!(
                "personality seed band [{}, {}] is invalid; using [{}, {}]",
                p.seed_min,
                p.seed_max,
                default_seed_min(),
                default_seed_max()
            ));
            p.seed_min = default_seed_min();
            p.seed_max = default_seed_max();
        }
        if p.max_trait_sum <= 0.0 || !p.max_trait_sum.is_finite() {
            note(format!(
                "personality.max_trait_sum is invalid ({}); using {}",
                p.max_trait_sum,
                default_max_trait_sum()
            ));
            p.max_trait_sum = default_max_trait_sum();
        }

        for (name, value, fallback) in [
            ("behavior.return_to_idle_chance", &mut self.behavior.return_to_idle_chance, default_return_to_idle()),
            ("behavior.goal_commit_chance", &mut self.behavior.goal_commit_chance, default_goal_commit()),
            ("behavior.activity_emote_chance", &mut self.behavior.activity_emote_chance, default_activity_emote()),
        ] {
            if !(0.0..=100.0).contains(value) {
                note(format!("{name} is out of range ({value}); using {fallback}"));
                *value = fallback;
            }
        }

        notes
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General system settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Whether the subsystem is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit per-decision debug events.
    #[serde(default)]
    pub debug_logging: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_level: "info".to_string(),
            debug_logging: false,
        }
    }
}

/// Spawn admission limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    /// Hard cap on concurrently active agents. 0 disables the subsystem.
    #[serde(default = "default_max_active")]
    pub max_active_npcs: u32,
    /// Keep slots free for real players when the realm is near its limit.
    #[serde(default = "default_true")]
    pub respect_player_cap: bool,
    /// Retire agents when real players need their slots.
    #[serde(default = "default_true")]
    pub auto_logout_on_player_limit: bool,
}

impl Default for PopulationConfig {
    fn default() -> Self {
        Self {
            max_active_npcs: 25,
            respect_player_cap: true,
            auto_logout_on_player_limit: true,
        }
    }
}

/// Cycle intervals, all in milliseconds of tick time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervalConfig {
    /// Behavior cycle.
    #[serde(default = "default_ai_update")]
    pub ai_update_ms: u64,
    /// Learning cycle.
    #[serde(default = "default_learning_update")]
    pub learning_update_ms: u64,
    /// Social cycle.
    #[serde(default = "default_social_update")]
    pub social_update_ms: u64,
    /// Adaptation (personality drift) cycle.
    #[serde(default = "default_adaptation")]
    pub adaptation_ms: u64,
    /// Minimum time between goal re-evaluations.
    #[serde(default = "default_goal_reevaluation")]
    pub goal_reevaluation_ms: u64,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            ai_update_ms: 2000,
            learning_update_ms: 5000,
            social_update_ms: 10_000,
            adaptation_ms: 30_000,
            goal_reevaluation_ms: 30_000,
        }
    }
}

/// Chat learning and speech.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Learn phrases from player chat.
    #[serde(default = "default_true")]
    pub enable_chat_learning: bool,
    /// Phrase memory capacity.
    #[serde(default = "default_max_phrases")]
    pub max_learned_phrases: usize,
    /// Percent chance to answer a pending chat line or emote.
    #[serde(default = "default_chat_response_chance")]
    pub chat_response_chance: u32,
    /// Percent chance (scaled by sociability) to speak unprompted on a social cycle.
    #[serde(default = "default_spontaneous_speech_chance")]
    pub spontaneous_speech_chance: u32,
    /// Shortest phrase worth remembering, in characters.
    #[serde(default = "default_min_phrase_len")]
    pub min_phrase_len: usize,
    /// Longest phrase worth remembering, in characters.
    #[serde(default = "default_max_phrase_len")]
    pub max_phrase_len: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enable_chat_learning: true,
            max_learned_phrases: 100,
            chat_response_chance: 30,
            spontaneous_speech_chance: 10,
            min_phrase_len: 3,
            max_phrase_len: 120,
        }
    }
}

/// Combat learning and tactics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatConfig {
    /// Record encounters into the learning store.
    #[serde(default = "default_true")]
    pub enable_combat_learning: bool,
    /// Combat history capacity.
    #[serde(default = "default_combat_history")]
    pub max_combat_history: usize,
    /// Spawn agents with boosted aggression.
    #[serde(default)]
    pub aggressive_mode: bool,
    /// Health percent below which a cautious agent evades.
    #[serde(default = "default_low_health")]
    pub low_health_pct: f32,
    /// Caution above which a low-health agent evades.
    #[serde(default = "default_evade_caution")]
    pub evade_caution_threshold: f32,
    /// Melee reach.
    #[serde(default = "default_melee_range")]
    pub melee_range: f32,
    /// Ranged roles back off when the target is closer than this.
    #[serde(default = "default_ranged_min")]
    pub ranged_min_distance: f32,
    /// How far ranged roles step back.
    #[serde(default = "default_retreat_distance")]
    pub retreat_distance: f32,
    /// Healers keep at least this far from the fight.
    #[serde(default = "default_healer_distance")]
    pub healer_distance: f32,
    /// Radius searched for prey while pursuing the level-up goal.
    #[serde(default = "default_hunt_radius")]
    pub hunt_radius: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            enable_combat_learning: true,
            max_combat_history: 50,
            aggressive_mode: false,
            low_health_pct: 25.0,
            evade_caution_threshold: 0.6,
            melee_range: 5.0,
            ranged_min_distance: 8.0,
            retreat_distance: 10.0,
            healer_distance: 15.0,
            hunt_radius: 40.0,
        }
    }
}

/// Exploration behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationConfig {
    /// Whether the exploration cycle runs.
    #[serde(default = "default_true")]
    pub enable_exploration: bool,
    /// Max distance of a random exploration point.
    #[serde(default = "default_exploration_radius")]
    pub radius: f32,
    /// Shortest delay between exploration cycles.
    #[serde(default = "default_exploration_cooldown_min")]
    pub cooldown_min_ms: u64,
    /// Longest delay between exploration cycles.
    #[serde(default = "default_exploration_cooldown_max")]
    pub cooldown_max_ms: u64,
    /// Exploration history capacity.
    #[serde(default = "default_exploration_history")]
    pub max_history: usize,
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            enable_exploration: true,
            radius: 100.0,
            cooldown_min_ms: 15_000,
            cooldown_max_ms: 45_000,
            max_history: 200,
        }
    }
}

/// Social interaction behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SocialConfig {
    /// Whether the social cycle runs.
    #[serde(default = "default_true")]
    pub enable_social_interaction: bool,
    /// Radius scanned for nearby players.
    #[serde(default = "default_social_radius")]
    pub interaction_radius: f32,
    /// Quiet time after which a relationship starts drifting back to neutral.
    #[serde(default = "default_relationship_decay")]
    pub relationship_decay_time_ms: u64,
    /// Points a stale relationship moves toward zero per social cycle.
    #[serde(default = "default_1_i32")]
    pub relationship_decay_step: i32,
    /// Social history capacity.
    #[serde(default = "default_social_history")]
    pub max_social_history: usize,
    /// Pending replies kept between social cycles.
    #[serde(default = "default_max_pending")]
    pub max_pending_replies: usize,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            enable_social_interaction: true,
            interaction_radius: 15.0,
            relationship_decay_time_ms: 86_400_000,
            relationship_decay_step: 1,
            max_social_history: 50,
            max_pending_replies: 8,
        }
    }
}

/// Learning-data persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Whether agents flush learning data at all.
    #[serde(default = "default_true")]
    pub persist_learning_data: bool,
    /// SQLite table name.
    #[serde(default = "default_table")]
    pub learning_data_table: String,
    /// Periodic flush even without new combats.
    #[serde(default = "default_save_interval")]
    pub save_interval_ms: u64,
    /// Flush after this many completed combats.
    #[serde(default = "default_flush_every")]
    pub flush_every_combats: u32,
    /// Blob encoding.
    #[serde(default)]
    pub format: BlobFormat,
    /// Store a CRC-32 alongside each blob.
    #[serde(default = "default_true")]
    pub checksum_enabled: bool,
    /// Use WAL journal mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            persist_learning_data: true,
            learning_data_table: default_table(),
            save_interval_ms: 300_000,
            flush_every_combats: 10,
            format: BlobFormat::default(),
            checksum_enabled: true,
            wal_mode: true,
        }
    }
}

/// Personality generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalityConfig {
    /// Lower bound of the seed band.
    #[serde(default = "default_seed_min")]
    pub seed_min: f32,
    /// Upper bound of the seed band.
    #[serde(default = "default_seed_max")]
    pub seed_max: f32,
    /// Sum of all traits an initial personality may not exceed.
    #[serde(default = "default_max_trait_sum")]
    pub max_trait_sum: f32,
    /// Per-trait ceiling applied when a draw is too extreme.
    #[serde(default = "default_trait_cap")]
    pub trait_cap: f32,
    /// Bonus given to the strongest trait.
    #[serde(default = "default_dominant_boost")]
    pub dominant_boost: f32,
    /// Aggression bonus under `combat.aggressive_mode`.
    #[serde(default = "default_aggressive_bonus")]
    pub aggressive_mode_bonus: f32,
}

impl Default for PersonalityConfig {
    fn default() -> Self {
        Self {
            seed_min: 0.2,
            seed_max: 0.8,
            max_trait_sum: 4.0,
            trait_cap: 0.6,
            dominant_boost: 0.1,
            aggressive_mode_bonus: 0.2,
        }
    }
}

/// Goal selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalConfig {
    /// A goal still unfinished after this long is abandoned.
    #[serde(default = "default_goal_timeout")]
    pub goal_timeout_ms: u64,
    /// Level at which professions can be learned.
    #[serde(default = "default_5_u8")]
    pub profession_min_level: u8,
    /// Level at which treasure hunting opens up.
    #[serde(default = "default_10_u8")]
    pub treasure_min_level: u8,
    /// Level at which the agent starts helping players.
    #[serde(default = "default_10_u8")]
    pub help_players_min_level: u8,
    /// Level cap; levelling up is pointless beyond it.
    #[serde(default = "default_80_u8")]
    pub max_level: u8,
    /// Priority change on completion (+) or timeout (−).
    #[serde(default = "default_feedback_step")]
    pub feedback_step: f32,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            goal_timeout_ms: 600_000,
            profession_min_level: 5,
            treasure_min_level: 10,
            help_players_min_level: 10,
            max_level: 80,
            feedback_step: 0.05,
        }
    }
}

/// Behavior state machine probabilities, all percentages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Chance per tick that an activity state gives up and returns to idle.
    #[serde(default = "default_return_to_idle")]
    pub return_to_idle_chance: f32,
    /// Chance per idle tick to enter the current goal's preferred state.
    #[serde(default = "default_goal_commit")]
    pub goal_commit_chance: f32,
    /// Curiosity multiplier for the idle → exploring roll.
    #[serde(default = "default_30_f32")]
    pub curiosity_weight: f32,
    /// Sociability multiplier for the idle → socializing roll.
    #[serde(default = "default_30_f32")]
    pub sociability_weight: f32,
    /// Intelligence multiplier for the idle → learning roll.
    #[serde(default = "default_20_f32")]
    pub intelligence_weight: f32,
    /// Chance that a crafting/learning/trading tick shows an emote.
    #[serde(default = "default_activity_emote")]
    pub activity_emote_chance: f32,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            return_to_idle_chance: 25.0,
            goal_commit_chance: 50.0,
            curiosity_weight: 30.0,
            sociability_weight: 30.0,
            intelligence_weight: 20.0,
            activity_emote_chance: 20.0,
        }
    }
}

/// Reward and drift magnitudes shared by every event source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuningConfig {
    /// Caution gained on death.
    #[serde(default = "default_0_10")]
    pub death_caution: f32,
    /// Aggression change on death.
    #[serde(default = "default_neg_0_05")]
    pub death_aggression: f32,
    /// Aggression gained on a kill.
    #[serde(default = "default_0_02")]
    pub victory_aggression: f32,
    /// Caution gained after fleeing.
    #[serde(default = "default_0_02")]
    pub fled_caution: f32,
    /// Sociability change after a friendly or helpful interaction.
    #[serde(default = "default_0_01")]
    pub friendly_sociability: f32,
    /// Sociability change after a hostile interaction.
    #[serde(default = "default_neg_0_02")]
    pub hostile_sociability: f32,
    /// Curiosity gained on discovering a zone.
    #[serde(default = "default_0_01")]
    pub discovery_curiosity: f32,
    /// Step size of periodic adaptation drift.
    #[serde(default = "default_0_02")]
    pub adaptation_step: f32,
    /// Number of recent records each adaptation pass looks at.
    #[serde(default = "default_10_usize")]
    pub adaptation_window: usize,
    /// Largest value any role affinity may hold before rescaling.
    #[serde(default = "default_affinity_cap")]
    pub role_affinity_cap: f32,
    /// Relationship change per interaction category: hostile, neutral, friendly, helpful.
    #[serde(default = "default_relationship_deltas")]
    pub relationship_deltas: [i32; 4],
}

impl Default for TuningConfig {
    fn default() -> Self {
        Self {
            death_caution: 0.10,
            death_aggression: -0.05,
            victory_aggression: 0.02,
            fled_caution: 0.02,
            friendly_sociability: 0.01,
            hostile_sociability: -0.02,
            discovery_curiosity: 0.01,
            adaptation_step: 0.02,
            adaptation_window: 10,
            role_affinity_cap: 100.0,
            relationship_deltas: default_relationship_deltas(),
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_table() -> String { "autonomous_npc_learning".to_string() }
fn default_max_active() -> u32 { 25 }
fn default_ai_update() -> u64 { 2000 }
fn default_learning_update() -> u64 { 5000 }
fn default_social_update() -> u64 { 10_000 }
fn default_adaptation() -> u64 { 30_000 }
fn default_goal_reevaluation() -> u64 { 30_000 }
fn default_max_phrases() -> usize { 100 }
fn default_chat_response_chance() -> u32 { 30 }
fn default_spontaneous_speech_chance() -> u32 { 10 }
fn default_min_phrase_len() -> usize { 3 }
fn default_max_phrase_len() -> usize { 120 }
fn default_combat_history() -> usize { 50 }
fn default_low_health() -> f32 { 25.0 }
fn default_evade_caution() -> f32 { 0.6 }
fn default_melee_range() -> f32 { 5.0 }
fn default_ranged_min() -> f32 { 8.0 }
fn default_retreat_distance() -> f32 { 10.0 }
fn default_healer_distance() -> f32 { 15.0 }
fn default_hunt_radius() -> f32 { 40.0 }
fn default_exploration_radius() -> f32 { 100.0 }
fn default_exploration_cooldown_min() -> u64 { 15_000 }
fn default_exploration_cooldown_max() -> u64 { 45_000 }
fn default_exploration_history() -> usize { 200 }
fn default_social_radius() -> f32 { 15.0 }
fn default_relationship_decay() -> u64 { 86_400_000 }
fn default_social_history() -> usize { 50 }
fn default_max_pending() -> usize { 8 }
fn default_save_interval() -> u64 { 300_000 }
fn default_flush_every() -> u32 { 10 }
fn default_seed_min() -> f32 { 0.2 }
fn default_seed_max() -> f32 { 0.8 }
fn default_max_trait_sum() -> f32 { 4.0 }
fn default_trait_cap() -> f32 { 0.6 }
fn default_dominant_boost() -> f32 { 0.1 }
fn default_aggressive_bonus() -> f32 { 0.2 }
fn default_goal_timeout() -> u64 { 600_000 }
fn default_feedback_step() -> f32 { 0.05 }
fn default_return_to_idle() -> f32 { 25.0 }
fn default_goal_commit() -> f32 { 50.0 }
fn default_activity_emote() -> f32 { 20.0 }
fn default_affinity_cap() -> f32 { 100.0 }
fn default_relationship_deltas() -> [i32; 4] { [-10, 0, 5, 10] }
fn default_1_i32() -> i32 { 1 }
fn default_5_u8() -> u8 { 5 }
fn default_10_u8() -> u8 { 10 }
fn default_80_u8() -> u8 { 80 }
fn default_10_usize() -> usize { 10 }
fn default_20_f32() -> f32 { 20.0 }
fn default_30_f32() -> f32 { 30.0 }
fn default_0_01() -> f32 { 0.01 }
fn default_0_02() -> f32 { 0.02 }
fn default_0_10() -> f32 { 0.10 }
fn default_neg_0_02() -> f32 { -0.02 }
fn default_neg_0_05() -> f32 { -0.05 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = AgentConfig::from_toml("").expect("parse");
        assert_eq!(config.population.max_active_npcs, 25);
        assert_eq!(config.intervals.ai_update_ms, 2000);
        assert_eq!(config.chat.chat_response_chance, 30);
        assert!(config.is_enabled());
    }

    #[test]
    fn partial_toml_overrides_only_given_keys() {
        let config = AgentConfig::from_toml(
            r#"
            [population]
            max_active_npcs = 5

            [exploration]
            radius = 42.5
            "#,
        )
        .expect("parse");
        assert_eq!(config.population.max_active_npcs, 5);
        assert!((config.exploration.radius - 42.5).abs() < f32::EPSILON);
        assert_eq!(config.exploration.cooldown_min_ms, 15_000);
    }

    #[test]
    fn invalid_toml_is_config_error() {
        let err = AgentConfig::from_toml("population = [").expect_err("should fail");
        assert!(matches!(err, crate::AutonpcError::Config(_)));
    }

    #[test]
    fn chat_chance_over_100_is_clamped() {
        let mut config = AgentConfig::default();
        config.chat.chat_response_chance = 250;
        let notes = config.validate();
        assert_eq!(config.chat.chat_response_chance, 30);
        assert!(notes.iter().any(|n| n.contains("chat_response_chance")));
    }

    #[test]
    fn zero_intervals_fall_back() {
        let mut config = AgentConfig::default();
        config.intervals.learning_update_ms = 0;
        config.combat.max_combat_history = 0;
        config.validate();
        assert_eq!(config.intervals.learning_update_ms, 5000);
        assert_eq!(config.combat.max_combat_history, 50);
    }

    #[test]
    fn inverted_exploration_cooldown_is_swapped() {
        let mut config = AgentConfig::default();
        config.exploration.cooldown_min_ms = 50_000;
        config.exploration.cooldown_max_ms = 20_000;
        config.validate();
        assert_eq!(config.exploration.cooldown_min_ms, 20_000);
        assert_eq!(config.exploration.cooldown_max_ms, 50_000);
    }

    #[test]
    fn high_values_warn_but_are_kept() {
        let mut config = AgentConfig::default();
        config.population.max_active_npcs = 500;
        config.exploration.radius = 800.0;
        let notes = config.validate();
        assert_eq!(config.population.max_active_npcs, 500);
        assert!((config.exploration.radius - 800.0).abs() < f32::EPSILON);
        assert_eq!(notes.len(), 2);
    }

    #[test]
    fn defaults_validate_cleanly() {
        let mut config = AgentConfig::default();
        assert!(config.validate().is_empty());
    }

    #[test]
    fn disabled_when_cap_is_zero() {
        let mut config = AgentConfig::default();
        config.population.max_active_npcs = 0;
        assert!(!config.is_enabled());
    }
}
