//! Zone discovery log and per-zone preference counters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{GameTime, Position, ZoneId};

/// One exploration move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExplorationRecord {
    /// Zone of the destination.
    pub zone: ZoneId,
    /// Destination point.
    pub position: Position,
    /// Agent-local time of the visit.
    pub at: GameTime,
    /// Visits to this zone including this one.
    pub visit_count: u32,
}

/// Whether a recorded visit was new.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discovery {
    /// First time in this zone.
    FirstVisit,
    /// Seen before; carries the updated visit count.
    Revisit(u32),
}

/// Distinct zones in discovery order plus a visit counter per zone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneAtlas {
    visited: Vec<ZoneId>,
    preferences: BTreeMap<ZoneId, u32>,
}

impl ZoneAtlas {
    /// Count one visit to `zone`.
    pub fn visit(&mut self, zone: ZoneId) -> Discovery {
        let count = self.preferences.entry(zone).or_insert(0);
        *count = count.saturating_add(1);
        if *count == 1 {
            self.visited.push(zone);
            Discovery::FirstVisit
        } else {
            Discovery::Revisit(*count)
        }
    }

    /// Distinct zones seen.
    #[must_use]
    pub fn distinct(&self) -> usize {
        self.visited.len()
    }

    /// Zones in discovery order.
    #[must_use]
    pub fn visited(&self) -> &[ZoneId] {
        &self.visited
    }

    /// Visit counters.
    #[must_use]
    pub fn preferences(&self) -> &BTreeMap<ZoneId, u32> {
        &self.preferences
    }

    /// Rebuild from persisted data.
    ///
    /// Zones present in the list but missing a counter get a count of one.
    #[must_use]
    pub fn from_parts(visited: &[ZoneId], preferences: &BTreeMap<ZoneId, u32>) -> Self {
        let mut atlas = Self {
            visited: Vec::with_capacity(visited.len()),
            preferences: preferences.clone(),
        };
        for &zone in visited {
            if !atlas.visited.contains(&zone) {
                atlas.visited.push(zone);
            }
            atlas.preferences.entry(zone).or_insert(1);
        }
        atlas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_visit_then_revisits() {
        let mut atlas = ZoneAtlas::default();
        assert_eq!(atlas.visit(ZoneId(12)), Discovery::FirstVisit);
        assert_eq!(atlas.visit(ZoneId(12)), Discovery::Revisit(2));
        assert_eq!(atlas.visit(ZoneId(40)), Discovery::FirstVisit);
        assert_eq!(atlas.visited(), &[ZoneId(12), ZoneId(40)]);
        assert_eq!(atlas.preferences().get(&ZoneId(12)), Some(&2));
    }

    #[test]
    fn from_parts_keeps_order_and_fills_counts() {
        let mut prefs = BTreeMap::new();
        prefs.insert(ZoneId(3), 4);
        let atlas = ZoneAtlas::from_parts(&[ZoneId(9), ZoneId(3), ZoneId(9)], &prefs);
        assert_eq!(atlas.visited(), &[ZoneId(9), ZoneId(3)]);
        assert_eq!(atlas.preferences()[&ZoneId(9)], 1);
        assert_eq!(atlas.preferences()[&ZoneId(3)], 4);
    }
}
