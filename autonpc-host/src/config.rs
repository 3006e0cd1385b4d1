//! World-configuration loading for autonomous creatures.
//!
//! Game servers keep their settings as flat `Key = Value` pairs. This module
//! reads the `AutonomousNPC.*` keys from such a source on top of an existing
//! [`AgentConfig`] (normally the defaults), then runs the core validation.

use std::collections::BTreeMap;
use std::str::FromStr;

use autonpc_core::config::AgentConfig;
use tracing::{debug, warn};

/// Key prefix shared by every setting this module reads.
pub const KEY_PREFIX: &str = "AutonomousNPC.";

/// A static key→value lookup supplied by the host.
pub trait ConfigSource {
    /// Raw value for `key`, if set.
    fn get(&self, key: &str) -> Option<String>;
}

/// An in-memory source, usually parsed from a `.conf` file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapConfigSource {
    values: BTreeMap<String, String>,
}

impl MapConfigSource {
    /// Empty source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `Key = Value` lines. `#` starts a comment, blank lines and lines
    /// without `=` are skipped, and surrounding quotes are stripped.
    #[must_use]
    pub fn from_conf_str(text: &str) -> Self {
        let mut source = Self::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"');
            source.set(key.trim(), value);
        }
        source
    }

    /// Set one key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no keys are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl ConfigSource for MapConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

/// Typed lookup with the `AutonomousNPC.` prefix applied.
///
/// Missing keys leave the target unchanged; unparsable values are logged and
/// ignored.
fn read<T: FromStr>(source: &dyn ConfigSource, name: &str, target: &mut T) {
    let key = format!("{KEY_PREFIX}{name}");
    let Some(raw) = source.get(&key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *target = value,
        Err(_) => warn!(target: "autonpc::config", key = %key, value = %raw, "Unparsable setting ignored"),
    }
}

/// Boolean lookup accepting `1`/`0` as well as `true`/`false`.
fn read_bool(source: &dyn ConfigSource, name: &str, target: &mut bool) {
    let key = format!("{KEY_PREFIX}{name}");
    let Some(raw) = source.get(&key) else {
        return;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => *target = true,
        "0" | "false" | "no" => *target = false,
        _ => warn!(target: "autonpc::config", key = %key, value = %raw, "Unparsable setting ignored"),
    }
}

/// Apply every `AutonomousNPC.*` key found in `source` to `base`, then
/// validate.
///
/// Returns the resulting configuration and the validation notes.
#[must_use]
pub fn load_agent_config(source: &dyn ConfigSource, base: AgentConfig) -> (AgentConfig, Vec<String>) {
    let mut c = base;

    read(source, "MaxCount", &mut c.population.max_active_npcs);
    read_bool(source, "RespectPlayerCap", &mut c.population.respect_player_cap);
    read_bool(source, "AutoLogoutOnPlayerLimit", &mut c.population.auto_logout_on_player_limit);

    read_bool(source, "PersistLearningData", &mut c.persistence.persist_learning_data);
    read(source, "LearningDataTable", &mut c.persistence.learning_data_table);
    read(source, "SaveInterval", &mut c.persistence.save_interval_ms);

    read_bool(source, "EnableDebugLogging", &mut c.general.debug_logging);
    if c.general.debug_logging {
        c.general.log_level = "debug".to_string();
    }

    read_bool(source, "EnableChatLearning", &mut c.chat.enable_chat_learning);
    read(source, "MaxLearnedPhrases", &mut c.chat.max_learned_phrases);
    read(source, "ChatResponseChance", &mut c.chat.chat_response_chance);

    read_bool(source, "EnableCombatLearning", &mut c.combat.enable_combat_learning);
    read(source, "MaxCombatHistory", &mut c.combat.max_combat_history);
    read_bool(source, "AggressiveMode", &mut c.combat.aggressive_mode);

    read_bool(source, "EnableExploration", &mut c.exploration.enable_exploration);
    read(source, "ExplorationRadius", &mut c.exploration.radius);
    let min_before = c.exploration.cooldown_min_ms;
    read(source, "ExplorationCooldown", &mut c.exploration.cooldown_min_ms);
    if c.exploration.cooldown_min_ms != min_before {
        // The single cooldown key sets the lower bound; keep the band's width.
        let width = c
            .exploration
            .cooldown_max_ms
            .saturating_sub(min_before);
        c.exploration.cooldown_max_ms = c.exploration.cooldown_min_ms.saturating_add(width);
    }

    read_bool(source, "EnableSocialInteraction", &mut c.social.enable_social_interaction);
    read(source, "SocialInteractionRadius", &mut c.social.interaction_radius);
    read(source, "RelationshipDecayTime", &mut c.social.relationship_decay_time_ms);

    read(source, "AIUpdateInterval", &mut c.intervals.ai_update_ms);
    read(source, "LearningUpdateInterval", &mut c.intervals.learning_update_ms);
    read(source, "SocialUpdateInterval", &mut c.intervals.social_update_ms);

    let notes = c.validate();
    debug!(
        max_active = c.population.max_active_npcs,
        persist = c.persistence.persist_learning_data,
        notes = notes.len(),
        "Loaded autonomous creature configuration"
    );
    (c, notes)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONF: &str = r#"
# Autonomous creatures
AutonomousNPC.MaxCount = 40
AutonomousNPC.RespectPlayerCap = 0
AutonomousNPC.ChatResponseChance = 55
AutonomousNPC.LearningDataTable = "npc_learning"
AutonomousNPC.ExplorationRadius = 80.5
AutonomousNPC.ExplorationCooldown = 20000
AutonomousNPC.EnableDebugLogging = 1
Unrelated.Key = 7
"#;

    #[test]
    fn conf_lines_are_parsed() {
        let source = MapConfigSource::from_conf_str(CONF);
        assert_eq!(source.len(), 8);
        assert_eq!(source.get("AutonomousNPC.LearningDataTable").as_deref(), Some("npc_learning"));
    }

    #[test]
    fn keys_map_onto_config() {
        let source = MapConfigSource::from_conf_str(CONF);
        let (config, notes) = load_agent_config(&source, AgentConfig::default());
        assert!(notes.is_empty(), "{notes:?}");
        assert_eq!(config.population.max_active_npcs, 40);
        assert!(!config.population.respect_player_cap);
        assert_eq!(config.chat.chat_response_chance, 55);
        assert_eq!(config.persistence.learning_data_table, "npc_learning");
        assert!((config.exploration.radius - 80.5).abs() < f32::EPSILON);
        assert_eq!(config.exploration.cooldown_min_ms, 20_000);
        assert_eq!(config.exploration.cooldown_max_ms, 50_000);
        assert!(config.general.debug_logging);
        assert_eq!(config.general.log_level, "debug");
    }

    #[test]
    fn missing_keys_keep_defaults() {
        let (config, _) = load_agent_config(&MapConfigSource::new(), AgentConfig::default());
        let defaults = AgentConfig::default();
        assert_eq!(config.population.max_active_npcs, defaults.population.max_active_npcs);
        assert_eq!(config.intervals.ai_update_ms, defaults.intervals.ai_update_ms);
    }

    #[test]
    fn garbage_is_ignored_and_range_is_clamped() {
        let mut source = MapConfigSource::new();
        source.set("AutonomousNPC.MaxCount", "lots");
        source.set("AutonomousNPC.ChatResponseChance", "250");
        let (config, notes) = load_agent_config(&source, AgentConfig::default());
        assert_eq!(config.population.max_active_npcs, 25);
        assert_eq!(config.chat.chat_response_chance, 30);
        assert!(notes.iter().any(|n| n.contains("chat_response_chance")));
    }
}
