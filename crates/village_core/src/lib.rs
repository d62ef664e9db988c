//! # Village Core
//!
//! Deterministic simulation core for the island village game.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//! - No wall clock
//!
//! This separation enables:
//! - Headless soak runs and CI verification
//! - Replay from a seed
//! - Determinism testing (same seed, same inputs, same state hash)
//!
//! ## Crate Structure
//!
//! - [`rng`] - Seeded PRNG and hashing primitives
//! - [`world`] - Tile grid and generation config
//! - [`map_generation`] - Procedural island generation
//! - [`economy`] - Resources, inventory, costs
//! - [`buildings`] - Building and task model
//! - [`villagers`] - Villagers, animals, needs
//! - [`state`] - The full game state and event log
//! - [`commands`] - Player intents as pure state transitions
//! - [`systems`] - Per-tick subsystem passes
//! - [`simulation`] - Game creation and the tick loop

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod buildings;
pub mod commands;
pub mod data;
pub mod economy;
pub mod error;
pub mod map_generation;
pub mod math;
pub mod rng;
pub mod simulation;
pub mod state;
pub mod systems;
pub mod villagers;
pub mod world;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::buildings::{Building, BuildingId, BuildingKind, Task, TaskId, TaskKind};
    pub use crate::economy::{Cost, Inventory, Resource, Yield};
    pub use crate::error::{CommandError, Result};
    pub use crate::math::Vec2;
    pub use crate::simulation::{create_game, create_game_with_config, tick};
    pub use crate::state::{
        Alerts, GameConfig, GameEvent, GameEventPayload, GameFlags, GameState, Phase, Quest,
        Speed, TimeState,
    };
    pub use crate::villagers::{Animal, AnimalId, Job, Villager, VillagerId};
    pub use crate::world::{TileId, World, WorldConfig};
}
