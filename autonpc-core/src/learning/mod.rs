//! Learning store: bounded experience logs and the statistics derived from them.
//!
//! Three FIFO logs (combat, social, exploration) feed running statistics
//! that are updated on every record, so the read side ([`LearningStore::win_rate`],
//! [`LearningStore::spell_effectiveness`], ...) is always O(1).
//!
//! Role affinity is the exception: it is folded in batches by
//! [`LearningStore::derive_role_affinity`] on the learning cycle, covering
//! only the records added since the previous derivation. Every record is
//! folded exactly once, including records later evicted from the bounded
//! logs, so the map reflects the whole combat history rather than the last
//! `max_combat_history` fights.

pub mod combat;
pub mod exploration;
pub mod history;
pub mod role;
pub mod social;

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::AgentConfig;
use crate::persistence::LearningData;
use crate::types::{GameTime, Position, SpellId, ZoneId};

pub use combat::{CombatExperience, CombatOutcome, CombatStats};
pub use exploration::{Discovery, ExplorationRecord, ZoneAtlas};
pub use history::BoundedHistory;
pub use role::{Role, RoleAffinity};
pub use social::{InteractionKind, PhraseBook, Relationships, SocialInteraction};

/// Support affinity per friendly interaction.
const SUPPORT_PER_FRIENDLY: f32 = 0.05;
/// Support affinity per helpful interaction.
const SUPPORT_PER_HELPFUL: f32 = 0.1;
/// Explorer affinity per distinct zone.
const EXPLORER_PER_ZONE: f32 = 0.1;
/// Tank affinity per encounter is capped at this survivability ratio.
const MAX_SURVIVABILITY: f32 = 2.0;

/// Everything an agent has learned.
#[derive(Debug, Clone)]
pub struct LearningStore {
    combats: BoundedHistory<CombatExperience>,
    stats: CombatStats,
    socials: BoundedHistory<SocialInteraction>,
    explorations: BoundedHistory<ExplorationRecord>,
    atlas: ZoneAtlas,
    affinity: RoleAffinity,
    primary_role: Option<Role>,
    relationships: Relationships,
    phrases: PhraseBook,
    relationship_deltas: [i32; 4],
    unfolded_combats: usize,
    unfolded_socials: usize,
}

impl LearningStore {
    /// An empty store sized from `config`.
    #[must_use]
    pub fn new(config: &AgentConfig) -> Self {
        Self {
            combats: BoundedHistory::new(config.combat.max_combat_history),
            stats: CombatStats::default(),
            socials: BoundedHistory::new(config.social.max_social_history),
            explorations: BoundedHistory::new(config.exploration.max_history),
            atlas: ZoneAtlas::default(),
            affinity: RoleAffinity::default(),
            primary_role: None,
            relationships: Relationships::default(),
            phrases: PhraseBook::new(
                config.chat.max_learned_phrases,
                config.chat.min_phrase_len,
                config.chat.max_phrase_len,
            ),
            relationship_deltas: config.tuning.relationship_deltas,
            unfolded_combats: 0,
            unfolded_socials: 0,
        }
    }

    // ------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------

    /// Append a finished encounter and update the running statistics.
    pub fn record_combat(&mut self, experience: CombatExperience) {
        if self.unfolded_combats >= self.combats.capacity() {
            self.derive_role_affinity();
        }
        self.stats.record(&experience);
        self.combats.push(experience);
        self.unfolded_combats = (self.unfolded_combats + 1).min(self.combats.capacity());
    }

    /// Append an interaction and adjust the relationship with that player.
    pub fn record_social(&mut self, interaction: SocialInteraction) {
        let delta = self.relationship_deltas[interaction.kind.index()];
        self.relationships.adjust(interaction.player, delta, interaction.at);
        if self.unfolded_socials >= self.socials.capacity() {
            self.derive_role_affinity();
        }
        self.socials.push(interaction);
        self.unfolded_socials = (self.unfolded_socials + 1).min(self.socials.capacity());
    }

    /// Count a visit to `zone` and log the move.
    pub fn record_exploration(&mut self, zone: ZoneId, position: Position, at: GameTime) -> Discovery {
        let discovery = self.atlas.visit(zone);
        let visit_count = match discovery {
            Discovery::FirstVisit => 1,
            Discovery::Revisit(n) => n,
        };
        self.explorations.push(ExplorationRecord {
            zone,
            position,
            at,
            visit_count,
        });
        discovery
    }

    /// Remember a phrase heard from a player. Returns `true` if it was new.
    pub fn learn_phrase(&mut self, text: &str) -> bool {
        self.phrases.learn(text)
    }

    /// Grant affinity directly (class seed, trading activity).
    pub fn reward_role(&mut self, role: Role, amount: f32) {
        self.affinity.add(role, amount);
    }

    // ------------------------------------------------------------------
    // Derivation
    // ------------------------------------------------------------------

    /// Fold the records added since the last call into the role affinity map
    /// and recompute the primary role.
    pub fn derive_role_affinity(&mut self) -> Option<Role> {
        let win_rate = self.stats.win_rate();

        for exp in self.combats.recent(self.unfolded_combats) {
            #[allow(clippy::cast_precision_loss)]
            let damage = exp.damage_dealt as f32 / 1000.0 * win_rate;
            for role in Role::DPS {
                self.affinity.add(role, damage);
            }

            #[allow(clippy::cast_precision_loss)]
            let healing = exp.healing_done as f32 / 1000.0 * win_rate;
            self.affinity.add(Role::Healer, healing);

            if exp.damage_taken > 0 {
                #[allow(clippy::cast_precision_loss)]
                let survivability = exp.healing_received as f32 / exp.damage_taken as f32;
                self.affinity.add(Role::Tank, survivability.min(MAX_SURVIVABILITY));
            }
        }

        for interaction in self.socials.recent(self.unfolded_socials) {
            let amount = match interaction.kind {
                InteractionKind::Helpful => SUPPORT_PER_HELPFUL,
                InteractionKind::Friendly => SUPPORT_PER_FRIENDLY,
                InteractionKind::Neutral | InteractionKind::Hostile => 0.0,
            };
            self.affinity.add(Role::Support, amount);
        }

        #[allow(clippy::cast_precision_loss)]
        let explorer = self.atlas.distinct() as f32 * EXPLORER_PER_ZONE;
        self.affinity.raise_to(Role::Explorer, explorer);

        if self.unfolded_combats > 0 || self.unfolded_socials > 0 {
            debug!(
                combats = self.unfolded_combats,
                socials = self.unfolded_socials,
                "Folded records into role affinity"
            );
        }
        self.unfolded_combats = 0;
        self.unfolded_socials = 0;
        self.primary_role = self.affinity.primary();
        self.primary_role
    }

    /// Keep affinity scores from growing without bound.
    pub fn normalize_affinity(&mut self, cap: f32) -> bool {
        self.affinity.rescale(cap)
    }

    /// Let stale relationships drift back toward neutral.
    pub fn decay_relationships(&mut self, now: GameTime, after_ms: u64, step: i32) -> usize {
        self.relationships.decay(now, after_ms, step)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Wins over total encounters; `0.0` before the first fight.
    #[must_use]
    pub fn win_rate(&self) -> f32 {
        self.stats.win_rate()
    }

    /// Mean encounter length in ms.
    #[must_use]
    pub fn average_combat_duration(&self) -> Option<f64> {
        self.stats.average_duration()
    }

    /// Mean effectiveness of `spell`.
    #[must_use]
    pub fn spell_effectiveness(&self, spell: SpellId) -> Option<f32> {
        self.stats.spell_effectiveness(spell)
    }

    /// Lifetime combat statistics.
    #[must_use]
    pub fn stats(&self) -> &CombatStats {
        &self.stats
    }

    /// Total encounters ever recorded.
    #[must_use]
    pub fn total_combats(&self) -> u32 {
        self.stats.total
    }

    /// Retained combat log.
    #[must_use]
    pub fn combat_history(&self) -> &BoundedHistory<CombatExperience> {
        &self.combats
    }

    /// Retained social log.
    #[must_use]
    pub fn social_history(&self) -> &BoundedHistory<SocialInteraction> {
        &self.socials
    }

    /// Retained exploration log.
    #[must_use]
    pub fn exploration_history(&self) -> &BoundedHistory<ExplorationRecord> {
        &self.explorations
    }

    /// Zones seen so far.
    #[must_use]
    pub fn atlas(&self) -> &ZoneAtlas {
        &self.atlas
    }

    /// Current role affinity.
    #[must_use]
    pub fn affinity(&self) -> &RoleAffinity {
        &self.affinity
    }

    /// Role chosen by the last derivation.
    #[must_use]
    pub fn primary_role(&self) -> Option<Role> {
        self.primary_role
    }

    /// Per-player relationships.
    #[must_use]
    pub fn relationships(&self) -> &Relationships {
        &self.relationships
    }

    /// Learned phrases.
    #[must_use]
    pub fn phrases(&self) -> &PhraseBook {
        &self.phrases
    }

    /// Victory share among the last `window` encounters.
    #[must_use]
    pub fn recent_win_ratio(&self, window: usize) -> Option<f32> {
        ratio(self.combats.recent(window), |c| c.outcome == CombatOutcome::Victory)
    }

    /// Friendly or helpful share among the last `window` interactions.
    #[must_use]
    pub fn recent_positive_social_ratio(&self, window: usize) -> Option<f32> {
        ratio(self.socials.recent(window), |s| s.kind.is_positive())
    }

    /// First-visit share among the last `window` exploration moves.
    #[must_use]
    pub fn recent_discovery_ratio(&self, window: usize) -> Option<f32> {
        ratio(self.explorations.recent(window), |e| e.visit_count == 1)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Snapshot everything that survives a respawn.
    #[must_use]
    pub fn to_data(&self) -> LearningData {
        LearningData {
            total_combats: self.stats.total,
            wins: self.stats.wins,
            losses: self.stats.losses,
            average_combat_time_ms: self.stats.average_duration_ms,
            spell_success_rates: self.stats.spells.iter().map(|(s, st)| (*s, st.mean)).collect(),
            spell_casts: self.stats.spells.iter().map(|(s, st)| (*s, st.casts)).collect(),
            role_affinities: self.affinity.iter().collect(),
            primary_role: self.primary_role,
            visited_zones: self.atlas.visited().to_vec(),
            zone_preferences: self.atlas.preferences().clone(),
            learned_phrases: self.phrases.to_vec(),
            relationship_values: self.relationships.values(),
        }
    }

    /// Replace learned state with a persisted snapshot.
    ///
    /// Histories are left empty: only the aggregates are persisted.
    pub fn restore(&mut self, data: &LearningData, now: GameTime) {
        let mut spells = BTreeMap::new();
        for (&spell, &mean) in &data.spell_success_rates {
            let casts = data.spell_casts.get(&spell).copied().unwrap_or(1);
            spells.insert(spell, combat::SpellStats { mean, casts });
        }
        self.stats = CombatStats {
            total: data.total_combats,
            wins: data.wins,
            losses: data.losses,
            average_duration_ms: data.average_combat_time_ms,
            spells,
        };

        self.affinity = RoleAffinity::default();
        for (&role, &score) in &data.role_affinities {
            self.affinity.set(role, score);
        }
        self.primary_role = data.primary_role;
        self.atlas = ZoneAtlas::from_parts(&data.visited_zones, &data.zone_preferences);
        self.phrases.restore(&data.learned_phrases);
        self.relationships = Relationships::from_values(&data.relationship_values, now);
        self.unfolded_combats = 0;
        self.unfolded_socials = 0;
    }
}

fn ratio<'a, T: 'a>(items: impl Iterator<Item = &'a T>, hit: impl Fn(&T) -> bool) -> Option<f32> {
    let (mut total, mut hits) = (0_u32, 0_u32);
    for item in items {
        total += 1;
        if hit(item) {
            hits += 1;
        }
    }
    #[allow(clippy::cast_precision_loss)]
    let r = (total > 0).then(|| hits as f32 / total as f32);
    r
}
