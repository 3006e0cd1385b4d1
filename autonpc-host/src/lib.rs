//! # autonpc-host: engine integration for autonomous creatures
//!
//! Glue between a game server's creature-AI framework and the
//! engine-agnostic `autonpc-core` crate.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │               Game server                   │
//! │  worldserver.conf    creature events        │
//! │        │                   │                │
//! │        ▼                   ▼                │
//! │  ┌──────────┐   ┌─────────────────────┐    │
//! │  │  config  │   │ events::dispatch    │    │
//! │  └────┬─────┘   └──────────┬──────────┘    │
//! │       ▼                    ▼                │
//! │  ┌──────────┐   ┌─────────────────────┐    │
//! │  │ registry │──▶│ AutonomousCreatureAi│    │
//! │  └──────────┘   └──────────┬──────────┘    │
//! │                            ▼                │
//! │                 ┌─────────────────────┐    │
//! │                 │    autonpc-core     │    │
//! │                 └─────────────────────┘    │
//! └────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `brain`: the creature-AI lifecycle trait and its autonomous implementation
//! - `config`: `AutonomousNPC.*` key→value loading into `AgentConfig`
//! - `events`: engine event records and their dispatch onto a brain
//! - `registry`: named script factories gated by the agent manager
//! - `logging`: tracing subscriber setup

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod brain;
pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod registry;

pub use brain::{AutonomousCreatureAi, CreatureBrain};
pub use error::HostError;
pub use events::{CreatureEvent, dispatch};
pub use registry::{AUTONOMOUS_SCRIPT_NAME, ScriptRegistry, SpawnRequest};
