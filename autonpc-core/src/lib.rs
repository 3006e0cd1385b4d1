//! # autonpc Core Library
//!
//! Game-agnostic engine that makes server-side creatures behave like
//! players. Every autonomous creature gets an [`Agent`] holding:
//!
//! - **Personality**: seven bounded traits that drift with experience
//! - **Learning**: bounded combat, social and exploration histories with
//!   derived aggregates (win rate, role affinity, relationships, phrases)
//! - **Goals**: a weighted, gated selector with timeout and feedback
//! - **Behavior**: an eight-state machine whose handlers emit host commands
//!
//! The host engine talks to the core through the [`CreatureHost`] trait and
//! the agent's `on_*` callbacks; learning data survives restarts through a
//! [`LearningSink`](persistence::LearningSink), normally the SQLite-backed
//! [`LearningDb`](persistence::LearningDb).
//!
//! ## Determinism
//!
//! All randomness goes through [`RandomSource`](rng::RandomSource) and all
//! time through the tick `diff`, so an agent driven by a seeded source and a
//! scripted host replays exactly.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod agent;
pub mod behavior;
pub mod config;
pub mod error;
pub mod goal;
pub mod host;
pub mod identity;
pub mod learning;
pub mod manager;
pub mod metrics;
pub mod persistence;
pub mod personality;
pub mod rng;
pub mod timer;
pub mod types;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use agent::Agent;
pub use config::AgentConfig;
pub use error::{AutonpcError, Result, SpawnDenied};
pub use host::{CreatureHost, HostCommand};
pub use manager::{AgentManager, PlayerPopulation};
pub use types::*;
