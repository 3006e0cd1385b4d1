//! Rolled race, class and gender of an autonomous creature.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::learning::Role;
use crate::rng::RandomSource;

/// Affinity a class grants its natural role at spawn.
pub const CLASS_ROLE_SEED: f32 = 0.1;

/// Playable race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Race {
    /// Human.
    Human,
    /// Orc.
    Orc,
    /// Night elf.
    NightElf,
    /// Undead.
    Undead,
}

/// Playable class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Class {
    /// Warrior.
    Warrior,
    /// Mage.
    Mage,
    /// Warlock.
    Warlock,
    /// Priest.
    Priest,
}

/// Character gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// Male.
    Male,
    /// Female.
    Female,
}

impl Race {
    const ALL: [Self; 4] = [Self::Human, Self::Orc, Self::NightElf, Self::Undead];
}

impl Class {
    const ALL: [Self; 4] = [Self::Warrior, Self::Mage, Self::Warlock, Self::Priest];

    /// Role the class naturally leans toward.
    #[must_use]
    pub const fn natural_role(self) -> Role {
        match self {
            Self::Warrior => Role::Tank,
            Self::Mage | Self::Warlock => Role::CasterDps,
            Self::Priest => Role::Healer,
        }
    }
}

/// Who the creature pretends to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureIdentity {
    /// Race.
    pub race: Race,
    /// Class.
    pub class: Class,
    /// Gender.
    pub gender: Gender,
}

impl CreatureIdentity {
    /// Roll a random identity.
    pub fn roll(rng: &mut dyn RandomSource) -> Self {
        let race = Race::ALL[rng.pick_index(Race::ALL.len()).unwrap_or(0)];
        let class = Class::ALL[rng.pick_index(Class::ALL.len()).unwrap_or(0)];
        let gender = if rng.chance(50.0) { Gender::Male } else { Gender::Female };
        Self { race, class, gender }
    }

    /// One-line self introduction.
    #[must_use]
    pub fn introduction(&self) -> String {
        let race = self.race.to_string();
        let article = if race.starts_with(['a', 'e', 'i', 'o', 'u']) { "an" } else { "a" };
        format!("Greetings! I am {article} {race} {}, ready for adventure!", self.class)
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Human => "human",
            Self::Orc => "orc",
            Self::NightElf => "night elf",
            Self::Undead => "undead",
        })
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Warrior => "warrior",
            Self::Mage => "mage",
            Self::Warlock => "warlock",
            Self::Priest => "priest",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRandom;

    #[test]
    fn roll_uses_each_draw_in_turn() {
        let mut rng = ScriptedRandom::new(vec![0.30, 0.80, 0.10]);
        let id = CreatureIdentity::roll(&mut rng);
        assert_eq!(id.race, Race::Orc);
        assert_eq!(id.class, Class::Priest);
        assert_eq!(id.gender, Gender::Male);
        assert_eq!(id.introduction(), "Greetings! I am an orc priest, ready for adventure!");
    }

    #[test]
    fn classes_map_to_roles() {
        assert_eq!(Class::Warrior.natural_role(), Role::Tank);
        assert_eq!(Class::Warlock.natural_role(), Role::CasterDps);
        assert_eq!(Class::Priest.natural_role(), Role::Healer);
    }
}
