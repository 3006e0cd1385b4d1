//! Error types for the autonomous NPC core.
//!
//! Nothing inside the per-tick decision loop returns these: agents degrade to
//! a no-op instead. They surface only at the fallible edges (config parsing,
//! learning-data codecs, SQLite, spawn admission).

use thiserror::Error;

use crate::types::CreatureGuid;

/// Top-level error type for all fallible autonpc operations.
#[derive(Error, Debug)]
pub enum AutonpcError {
    /// Serialization or deserialization of a learning-data blob failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// SQLite persistence error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No learning data was stored for this creature.
    #[error("No learning data stored for creature {0}")]
    NotFound(CreatureGuid),

    /// The manager refused to admit a new agent.
    #[error(transparent)]
    SpawnDenied(#[from] SpawnDenied),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why the [`AgentManager`](crate::manager::AgentManager) refused a spawn.
///
/// Not fatal: the caller decides whether to retry later.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnDenied {
    /// The subsystem is switched off (`max_active_npcs == 0` or `enabled = false`).
    #[error("autonomous NPCs are disabled")]
    Disabled,

    /// The active-agent cap is reached.
    #[error("active NPC limit reached ({active}/{max})")]
    AtCapacity {
        /// Agents currently alive.
        active: u32,
        /// Configured maximum.
        max: u32,
    },

    /// Admitting another agent would eat into the slots reserved for real players.
    #[error("player capacity reached ({players}/{max_players} players, {reserved} slots reserved)")]
    PlayerCapReached {
        /// Real players online.
        players: u32,
        /// Realm player limit.
        max_players: u32,
        /// Slots held back for real players.
        reserved: u32,
    },
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, AutonpcError>;
