//! Engine events that reach a creature script.
//!
//! Hosts that queue events instead of calling hooks directly record them as
//! [`CreatureEvent`]s and hand them to [`dispatch`] in order.

use autonpc_core::host::CreatureHost;
use autonpc_core::types::{ActorRef, Emote, SpellId};
use tracing::trace;

use crate::brain::CreatureBrain;

/// One engine event for one creature.
#[derive(Debug, Clone, PartialEq)]
pub enum CreatureEvent {
    /// Spawn or reset.
    Reset,
    /// Tick with elapsed milliseconds.
    Update {
        /// Milliseconds since the previous update.
        diff: u64,
    },
    /// Combat started.
    EnterCombat {
        /// Who started it.
        enemy: ActorRef,
    },
    /// Forced out of combat.
    Evade,
    /// The creature died.
    JustDied {
        /// Killing blow, when known.
        killer: Option<ActorRef>,
    },
    /// The creature killed something.
    KilledUnit {
        /// The dead unit.
        victim: ActorRef,
    },
    /// Took damage.
    DamageTaken {
        /// Source of the damage.
        attacker: ActorRef,
        /// Amount taken.
        amount: u32,
    },
    /// Dealt damage.
    DamageDealt {
        /// Target of the damage.
        victim: ActorRef,
        /// Amount dealt.
        amount: u32,
    },
    /// Was healed.
    HealReceived {
        /// Healer.
        healer: ActorRef,
        /// Amount healed.
        amount: u32,
    },
    /// Healed someone.
    HealingDone {
        /// Who was healed.
        target: ActorRef,
        /// Amount healed.
        amount: u32,
    },
    /// Hit by a spell.
    SpellHit {
        /// Caster.
        caster: ActorRef,
        /// Spell.
        spell: SpellId,
    },
    /// Own spell landed.
    SpellHitTarget {
        /// Target.
        target: ActorRef,
        /// Spell.
        spell: SpellId,
        /// Effectiveness in `[0, 1]`.
        effectiveness: f32,
    },
    /// A player emoted at the creature.
    ReceiveEmote {
        /// Emoting player.
        player: ActorRef,
        /// Emote played.
        emote: Emote,
    },
    /// A player spoke nearby.
    ChatHeard {
        /// Speaker.
        speaker: ActorRef,
        /// What was said.
        text: String,
    },
    /// Reached a movement target.
    MovementInform,
    /// Leaving the world.
    Despawn,
}

impl CreatureEvent {
    /// Short name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Reset => "reset",
            Self::Update { .. } => "update",
            Self::EnterCombat { .. } => "enter_combat",
            Self::Evade => "evade",
            Self::JustDied { .. } => "just_died",
            Self::KilledUnit { .. } => "killed_unit",
            Self::DamageTaken { .. } => "damage_taken",
            Self::DamageDealt { .. } => "damage_dealt",
            Self::HealReceived { .. } => "heal_received",
            Self::HealingDone { .. } => "healing_done",
            Self::SpellHit { .. } => "spell_hit",
            Self::SpellHitTarget { .. } => "spell_hit_target",
            Self::ReceiveEmote { .. } => "receive_emote",
            Self::ChatHeard { .. } => "chat_heard",
            Self::MovementInform => "movement_inform",
            Self::Despawn => "despawn",
        }
    }
}

/// Deliver one event to `brain`.
pub fn dispatch(brain: &mut dyn CreatureBrain, host: &mut dyn CreatureHost, event: &CreatureEvent) {
    if !matches!(event, CreatureEvent::Update { .. }) {
        trace!(creature = %brain.guid(), event = event.kind(), "Dispatching creature event");
    }
    match event {
        CreatureEvent::Reset => brain.reset(host),
        CreatureEvent::Update { diff } => brain.update(host, *diff),
        CreatureEvent::EnterCombat { enemy } => brain.enter_combat(host, enemy),
        CreatureEvent::Evade => brain.evade(host),
        CreatureEvent::JustDied { killer } => brain.just_died(host, killer.as_ref()),
        CreatureEvent::KilledUnit { victim } => brain.killed_unit(host, victim),
        CreatureEvent::DamageTaken { attacker, amount } => brain.damage_taken(host, attacker, *amount),
        CreatureEvent::DamageDealt { victim, amount } => brain.damage_dealt(host, victim, *amount),
        CreatureEvent::HealReceived { healer, amount } => brain.heal_received(host, healer, *amount),
        CreatureEvent::HealingDone { target, amount } => brain.healing_done(host, target, *amount),
        CreatureEvent::SpellHit { caster, spell } => brain.spell_hit(host, caster, *spell),
        CreatureEvent::SpellHitTarget {
            target,
            spell,
            effectiveness,
        } => brain.spell_hit_target(host, target, *spell, *effectiveness),
        CreatureEvent::ReceiveEmote { player, emote } => brain.receive_emote(host, player, *emote),
        CreatureEvent::ChatHeard { speaker, text } => brain.chat_heard(host, speaker, text),
        CreatureEvent::MovementInform => brain.movement_inform(host),
        CreatureEvent::Despawn => brain.despawn(),
    }
}
