//! Social interactions, per-player relationships and learned phrases.

use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::types::{GameTime, PlayerGuid};

/// Category of a social interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionKind {
    /// Insults, threats, attacks.
    Hostile,
    /// Small talk with no clear tone.
    Neutral,
    /// Waves, greetings, cheers.
    Friendly,
    /// Thanks, buffs, heals.
    Helpful,
}

impl InteractionKind {
    /// Friendly and helpful interactions count as successful.
    #[must_use]
    pub const fn is_positive(self) -> bool {
        matches!(self, Self::Friendly | Self::Helpful)
    }

    /// Index into `TuningConfig::relationship_deltas`.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// One recorded interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialInteraction {
    /// Who the agent interacted with.
    pub player: PlayerGuid,
    /// Tone of the interaction.
    pub kind: InteractionKind,
    /// What happened, free text ("emote: wave", "chat: hello there").
    pub context: String,
    /// Agent-local time of the interaction.
    pub at: GameTime,
}

/// Lower bound of a relationship value.
pub const RELATIONSHIP_MIN: i32 = -100;
/// Upper bound of a relationship value.
pub const RELATIONSHIP_MAX: i32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Relationship {
    value: i32,
    last_at: GameTime,
}

/// Player → relationship value in `[-100, 100]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Relationships {
    entries: BTreeMap<PlayerGuid, Relationship>,
}

impl Relationships {
    /// Shift the relationship with `player` by `delta` and mark it fresh.
    pub fn adjust(&mut self, player: PlayerGuid, delta: i32, now: GameTime) {
        let entry = self.entries.entry(player).or_insert(Relationship {
            value: 0,
            last_at: now,
        });
        entry.value = entry.value.saturating_add(delta).clamp(RELATIONSHIP_MIN, RELATIONSHIP_MAX);
        entry.last_at = now;
    }

    /// Current value, `0` for strangers.
    #[must_use]
    pub fn value(&self, player: PlayerGuid) -> i32 {
        self.entries.get(&player).map_or(0, |r| r.value)
    }

    /// Move every relationship untouched for `after_ms` one `step` toward zero.
    ///
    /// Entries that reach zero are forgotten. Returns how many entries moved.
    pub fn decay(&mut self, now: GameTime, after_ms: u64, step: i32) -> usize {
        let step = step.max(0);
        if step == 0 {
            return 0;
        }
        let mut moved = 0;
        for rel in self.entries.values_mut() {
            if now.since(rel.last_at) < after_ms || rel.value == 0 {
                continue;
            }
            rel.value = if rel.value > 0 {
                (rel.value - step).max(0)
            } else {
                (rel.value + step).min(0)
            };
            moved += 1;
        }
        self.entries.retain(|_, r| r.value != 0);
        moved
    }

    /// Snapshot of all non-neutral relationships.
    #[must_use]
    pub fn values(&self) -> BTreeMap<PlayerGuid, i32> {
        self.entries
            .iter()
            .filter(|(_, r)| r.value != 0)
            .map(|(p, r)| (*p, r.value))
            .collect()
    }

    /// Rebuild from persisted values. Restored entries count as fresh at `now`.
    #[must_use]
    pub fn from_values(values: &BTreeMap<PlayerGuid, i32>, now: GameTime) -> Self {
        let entries = values
            .iter()
            .filter(|(_, v)| **v != 0)
            .map(|(p, v)| {
                (
                    *p,
                    Relationship {
                        value: (*v).clamp(RELATIONSHIP_MIN, RELATIONSHIP_MAX),
                        last_at: now,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Number of tracked players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no player is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// De-duplicated, bounded phrase memory.
#[derive(Debug, Clone, PartialEq)]
pub struct PhraseBook {
    phrases: VecDeque<String>,
    capacity: usize,
    min_len: usize,
    max_len: usize,
}

impl PhraseBook {
    /// Empty phrase book.
    #[must_use]
    pub fn new(capacity: usize, min_len: usize, max_len: usize) -> Self {
        Self {
            phrases: VecDeque::new(),
            capacity: capacity.max(1),
            min_len,
            max_len,
        }
    }

    /// Remember `text` if it is a usable phrase not already known.
    ///
    /// Returns `true` if the phrase was added.
    pub fn learn(&mut self, text: &str) -> bool {
        let phrase = text.trim();
        let len = phrase.chars().count();
        if len < self.min_len || len > self.max_len {
            return false;
        }
        if self.phrases.iter().any(|p| p.eq_ignore_ascii_case(phrase)) {
            return false;
        }
        if self.phrases.len() >= self.capacity {
            self.phrases.pop_front();
        }
        self.phrases.push_back(phrase.to_string());
        true
    }

    /// Phrase at `index`, oldest first.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.phrases.get(index).map(String::as_str)
    }

    /// Number of remembered phrases.
    #[must_use]
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    /// Whether nothing has been learned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// All phrases, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.phrases.iter().cloned().collect()
    }

    /// Replace the contents with persisted phrases (newest kept on overflow).
    pub fn restore(&mut self, phrases: &[String]) {
        self.phrases.clear();
        let skip = phrases.len().saturating_sub(self.capacity);
        self.phrases.extend(phrases.iter().skip(skip).cloned());
    }
}

/// Classify a chat line by its wording.
#[must_use]
pub fn classify_chat(text: &str) -> InteractionKind {
    const HOSTILE: [&str; 6] = ["noob", "idiot", "die", "kill you", "stupid", "loser"];
    const HELPFUL: [&str; 4] = ["thanks", "thank you", "ty", "appreciate"];
    const FRIENDLY: [&str; 6] = ["hello", "hi", "hey", "greetings", "well met", "friend"];

    let lower = text.to_lowercase();
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    let has_word = |needle: &str| {
        let parts: Vec<&str> = needle.split(' ').collect();
        words.windows(parts.len()).any(|w| w == parts.as_slice())
    };

    if HOSTILE.iter().any(|w| has_word(w)) {
        InteractionKind::Hostile
    } else if HELPFUL.iter().any(|w| has_word(w)) {
        InteractionKind::Helpful
    } else if FRIENDLY.iter().any(|w| has_word(w)) {
        InteractionKind::Friendly
    } else {
        InteractionKind::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relationships_clamp_to_range() {
        let mut rel = Relationships::default();
        let p = PlayerGuid(7);
        for _ in 0..30 {
            rel.adjust(p, 10, GameTime(0));
        }
        assert_eq!(rel.value(p), RELATIONSHIP_MAX);
        for _ in 0..30 {
            rel.adjust(p, -10, GameTime(0));
        }
        assert_eq!(rel.value(p), RELATIONSHIP_MIN);
    }

    #[test]
    fn stale_relationships_decay_toward_zero() {
        let mut rel = Relationships::default();
        rel.adjust(PlayerGuid(1), 3, GameTime(0));
        rel.adjust(PlayerGuid(2), -2, GameTime(0));
        rel.adjust(PlayerGuid(3), 5, GameTime(9_000));

        assert_eq!(rel.decay(GameTime(10_000), 5_000, 1), 2);
        assert_eq!(rel.value(PlayerGuid(1)), 2);
        assert_eq!(rel.value(PlayerGuid(2)), -1);
        assert_eq!(rel.value(PlayerGuid(3)), 5);

        rel.decay(GameTime(11_000), 5_000, 1);
        assert_eq!(rel.value(PlayerGuid(2)), 0);
        assert_eq!(rel.len(), 2);
    }

    #[test]
    fn phrase_book_dedups_and_bounds() {
        let mut book = PhraseBook::new(2, 3, 20);
        assert!(book.learn("Well met, traveler"));
        assert!(!book.learn("  well met, TRAVELER "));
        assert!(!book.learn("hi"));
        assert!(!book.learn("this line is far too long to be worth repeating"));
        assert!(book.learn("For the Horde"));
        assert!(book.learn("Light be with you"));
        assert_eq!(book.to_vec(), vec!["For the Horde".to_string(), "Light be with you".to_string()]);
    }

    #[test]
    fn chat_classification() {
        assert_eq!(classify_chat("Hello there!"), InteractionKind::Friendly);
        assert_eq!(classify_chat("thanks for the buff"), InteractionKind::Helpful);
        assert_eq!(classify_chat("you noob"), InteractionKind::Hostile);
        assert_eq!(classify_chat("where is the inn"), InteractionKind::Neutral);
        assert_eq!(classify_chat("this is thin ice"), InteractionKind::Neutral);
    }
}
