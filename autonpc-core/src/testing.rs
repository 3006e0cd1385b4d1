//! Test doubles for driving agents without a game engine.

use crate::host::{CreatureHost, HostCommand};
use crate::types::{ActorRef, Position, ZoneId};

/// A scripted creature that records every command it receives.
///
/// Fields are public so tests can set the world up directly. With
/// `zone_span` set, zones are laid out as concentric bands of that width
/// around the origin; otherwise every point is in `base_zone`.
#[derive(Debug, Clone)]
pub struct RecordingHost {
    /// Alive flag.
    pub alive: bool,
    /// Level.
    pub level: u8,
    /// Health percent.
    pub health_pct: f32,
    /// Mana percent.
    pub mana_pct: f32,
    /// Position.
    pub position: Position,
    /// Zone for the origin band.
    pub base_zone: ZoneId,
    /// Width of each zone band.
    pub zone_span: Option<f32>,
    /// Current combat target.
    pub victim: Option<ActorRef>,
    /// Players in the world.
    pub players: Vec<ActorRef>,
    /// Hostiles in the world.
    pub hostiles: Vec<ActorRef>,
    /// Commands received, oldest first.
    pub commands: Vec<HostCommand>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            alive: true,
            level: 20,
            health_pct: 100.0,
            mana_pct: 100.0,
            position: Position::default(),
            base_zone: ZoneId(1),
            zone_span: None,
            victim: None,
            players: Vec::new(),
            hostiles: Vec::new(),
            commands: Vec::new(),
        }
    }
}

impl RecordingHost {
    /// Healthy level-20 creature at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines passed to [`HostCommand::Say`].
    #[must_use]
    pub fn said(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                HostCommand::Say(line) => Some(line.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Drain the recorded commands.
    pub fn take_commands(&mut self) -> Vec<HostCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl CreatureHost for RecordingHost {
    fn is_alive(&self) -> bool {
        self.alive
    }

    fn level(&self) -> u8 {
        self.level
    }

    fn health_pct(&self) -> f32 {
        self.health_pct
    }

    fn mana_pct(&self) -> f32 {
        self.mana_pct
    }

    fn position(&self) -> Position {
        self.position
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn zone_at(&self, position: Position) -> ZoneId {
        match self.zone_span {
            Some(span) if span > 0.0 => {
                let band = (position.distance(&Position::default()) / span).floor() as u32;
                ZoneId(self.base_zone.0.saturating_add(band))
            }
            _ => self.base_zone,
        }
    }

    fn victim(&self) -> Option<ActorRef> {
        self.victim
    }

    fn nearby_players(&self, radius: f32) -> Vec<ActorRef> {
        self.players
            .iter()
            .filter(|p| p.position.distance(&self.position) <= radius)
            .copied()
            .collect()
    }

    fn nearby_hostiles(&self, radius: f32) -> Vec<ActorRef> {
        self.hostiles
            .iter()
            .filter(|h| h.position.distance(&self.position) <= radius)
            .copied()
            .collect()
    }

    fn execute(&mut self, command: HostCommand) {
        if let HostCommand::MoveTo(to) = &command {
            self.position = *to;
        }
        self.commands.push(command);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_bands_grow_with_distance() {
        let host = RecordingHost {
            zone_span: Some(50.0),
            ..RecordingHost::new()
        };
        assert_eq!(host.zone_at(Position::new(10.0, 0.0, 0.0)), ZoneId(1));
        assert_eq!(host.zone_at(Position::new(120.0, 0.0, 0.0)), ZoneId(3));
    }

    #[test]
    fn move_commands_update_position() {
        let mut host = RecordingHost::new();
        let to = Position::new(4.0, 5.0, 0.0);
        host.execute(HostCommand::MoveTo(to));
        assert_eq!(host.position, to);
        assert_eq!(host.take_commands().len(), 1);
        assert!(host.commands.is_empty());
    }
}
