//! The host-engine seam.
//!
//! The core never touches engine objects. Everything it needs to know about
//! its own creature comes through [`CreatureHost`] queries, and everything it
//! wants to do goes out as a single [`HostCommand`].

use crate::types::{ActorId, ActorRef, Emote, Position, ZoneId};

/// A world action the agent asks the host to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCommand {
    /// Walk to a point.
    MoveTo(Position),
    /// Follow a unit into melee range.
    Chase(ActorId),
    /// Back away from `from` to `to`.
    Retreat {
        /// Unit being avoided.
        from: ActorId,
        /// Where to go.
        to: Position,
    },
    /// Auto-attack a unit.
    Attack(ActorId),
    /// Say a line in local chat.
    Say(String),
    /// Play an emote.
    Emote(Emote),
    /// Drop combat and reset.
    Evade,
}

/// Queries and commands the host engine provides for one creature.
pub trait CreatureHost {
    /// Whether the creature is alive.
    fn is_alive(&self) -> bool;
    /// Current level.
    fn level(&self) -> u8;
    /// Health in percent (`0..=100`).
    fn health_pct(&self) -> f32;
    /// Mana in percent (`0..=100`); zero for units without mana.
    fn mana_pct(&self) -> f32;
    /// Current position.
    fn position(&self) -> Position;
    /// Zone of an arbitrary point.
    fn zone_at(&self, position: Position) -> ZoneId;
    /// Current combat target.
    fn victim(&self) -> Option<ActorRef>;
    /// Players within `radius`.
    fn nearby_players(&self, radius: f32) -> Vec<ActorRef>;
    /// Hostile units within `radius`.
    fn nearby_hostiles(&self, radius: f32) -> Vec<ActorRef>;
    /// Perform a world action.
    fn execute(&mut self, command: HostCommand);

    /// Zone the creature stands in.
    fn zone(&self) -> ZoneId {
        self.zone_at(self.position())
    }
}
