//! Error types for the simulation command layer.

use thiserror::Error;

use crate::buildings::{BuildingId, BuildingKind, TaskId};
use crate::villagers::VillagerId;

/// Result type alias using [`CommandError`].
pub type Result<T> = std::result::Result<T, CommandError>;

/// Why a command was rejected.
///
/// The public command API swallows these (a rejected command returns the
/// state unchanged), but the reasons are kept for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// Villager id does not exist.
    #[error("villager not found: {0:?}")]
    VillagerNotFound(VillagerId),

    /// Building id does not exist.
    #[error("building not found: {0:?}")]
    BuildingNotFound(BuildingId),

    /// Villager is dead and cannot act.
    #[error("villager is dead: {0:?}")]
    VillagerDead(VillagerId),

    /// Kind cannot be placed by the player.
    #[error("building kind is not placeable: {0:?}")]
    NotPlaceable(BuildingKind),

    /// Footprint would leave the map.
    #[error("footprint out of bounds at ({x}, {y})")]
    OutOfBounds {
        /// Requested top-left tile x.
        x: u32,
        /// Requested top-left tile y.
        y: u32,
    },

    /// Footprint covers water.
    #[error("cannot build on water at ({x}, {y})")]
    OnWater {
        /// Blocking tile x.
        x: u32,
        /// Blocking tile y.
        y: u32,
    },

    /// Footprint overlaps an existing building.
    #[error("tile ({x}, {y}) is occupied by {by:?}")]
    Occupied {
        /// Blocking tile x.
        x: u32,
        /// Blocking tile y.
        y: u32,
        /// Building already covering the tile.
        by: BuildingId,
    },

    /// Inventory does not cover the cost.
    #[error("cannot afford cost")]
    CannotAfford,

    /// Building kind does not host this task.
    #[error("{kind:?} does not host task {task:?}")]
    NoSuchTask {
        /// Building kind.
        kind: BuildingKind,
        /// Requested task.
        task: TaskId,
    },

    /// A task is already running on this building.
    #[error("task already running on {0:?}")]
    TaskBusy(BuildingId),

    /// Nothing is ready to collect.
    #[error("nothing to collect from {0:?}")]
    NothingToCollect(BuildingId),

    /// Building is already at its maximum level.
    #[error("already at max level: {0:?}")]
    MaxLevel(BuildingId),
}
