//! Buildings, natural resources, and the task model.
//!
//! "Building" covers both player-placed structures (campfire, huts, sawmill,
//! townhall) and spawner-placed natural resources (trees, rocks, berry
//! bushes, mushrooms). Every building carries a [`Task`]; production and
//! regrowth both run through it.

use serde::{Deserialize, Serialize};

use crate::data::building_specs;
use crate::economy::Yield;
use crate::math::Vec2;
use crate::villagers::VillagerId;
use crate::world::TilePos;

/// Unique building identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BuildingId(pub u32);

/// Building kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingKind {
    /// Village fire; idle villagers gather here. Hosts the feast recipe.
    Campfire,
    /// Housing; capacity grows with level.
    SleepHut,
    /// Berry and mushroom foraging workplace.
    GatherHut,
    /// Lumber workplace.
    Sawmill,
    /// Village administration; hosts the night watch recipe.
    Townhall,
    /// Natural: fellable tree.
    Tree,
    /// Natural: minable rock.
    Rock,
    /// Natural: berry bush, regrows after harvest.
    BerryBush,
    /// Natural: edible mushroom.
    Mushroom,
}

impl BuildingKind {
    /// Kinds the player can place directly.
    pub const PLACEABLE: [Self; 5] = [
        Self::Campfire,
        Self::SleepHut,
        Self::GatherHut,
        Self::Sawmill,
        Self::Townhall,
    ];

    /// Whether the player may place this kind.
    #[must_use]
    pub const fn is_placeable(self) -> bool {
        matches!(
            self,
            Self::Campfire | Self::SleepHut | Self::GatherHut | Self::Sawmill | Self::Townhall
        )
    }

    /// Whether this kind is a spawner-placed natural resource.
    #[must_use]
    pub const fn is_natural(self) -> bool {
        matches!(self, Self::Tree | Self::Rock | Self::BerryBush | Self::Mushroom)
    }

    /// Natural resources that disappear when harvested.
    #[must_use]
    pub const fn is_finite_resource(self) -> bool {
        matches!(self, Self::Tree | Self::Rock | Self::Mushroom)
    }

    /// Natural resources that regrow after harvest.
    #[must_use]
    pub const fn is_renewable_resource(self) -> bool {
        matches!(self, Self::BerryBush)
    }

    /// Resources any villager picks up just by walking over them.
    #[must_use]
    pub const fn is_contact_harvestable(self) -> bool {
        matches!(self, Self::Rock | Self::Mushroom)
    }

    /// Resource kinds a workplace of this kind sends its workers to.
    #[must_use]
    pub const fn gather_targets(self) -> &'static [Self] {
        match self {
            Self::GatherHut => &[Self::BerryBush, Self::Mushroom],
            Self::Sawmill => &[Self::Tree],
            _ => &[],
        }
    }

    /// Footprint in tiles (width, height).
    #[must_use]
    pub const fn footprint(self) -> (u32, u32) {
        match self {
            Self::Townhall => (3, 3),
            Self::SleepHut | Self::GatherHut | Self::Sawmill => (2, 2),
            Self::Campfire | Self::Tree | Self::Rock | Self::BerryBush | Self::Mushroom => (1, 1),
        }
    }
}

/// What kind of work a task represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TaskKind {
    /// Nothing running.
    #[default]
    Idle,
    /// Worker-driven production; advances only during working hours with at
    /// least one assigned worker.
    Produce,
    /// Passive regrowth; advances with simulation time regardless of
    /// workers or the working flag.
    Grow,
}

/// The closed set of startable tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskId {
    /// Gather hut production run.
    Forage,
    /// Sawmill production run.
    CutLumber,
    /// Campfire recipe: feed the whole village.
    Feast,
    /// Townhall recipe: organize a night watch.
    NightWatch,
}

/// What collecting a finished task grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskReward {
    /// Credit the building's configured output yield.
    Output,
    /// Everyone eats: hunger relief and a morale bump.
    Feast,
    /// Morale bump for the whole village.
    NightWatch,
}

/// A building's current work item.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Task {
    /// Produce, grow, or idle.
    pub kind: TaskKind,
    /// Elapsed work, milliseconds. Never exceeds `duration_ms`.
    pub progress_ms: f64,
    /// Total work required, milliseconds.
    pub duration_ms: f64,
    /// Blocked tasks hold progress without advancing.
    pub blocked: bool,
    /// Finished and awaiting collection.
    pub collectable: bool,
    /// Whether the task has been started (production tasks start via
    /// command; grow tasks start on their own).
    pub started: bool,
    /// Startable task this run came from, when not the built-in cycle.
    pub recipe: Option<TaskId>,
}

impl Task {
    /// An idle task (campfire, townhall, sleep hut at rest).
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    /// A production task awaiting a start command.
    #[must_use]
    pub fn production(duration_ms: f64) -> Self {
        Self {
            kind: TaskKind::Produce,
            duration_ms,
            ..Self::default()
        }
    }

    /// A natural resource that is ready to harvest right now.
    #[must_use]
    pub fn ready() -> Self {
        Self {
            collectable: true,
            ..Self::default()
        }
    }

    /// A grow cycle, optionally already complete (bushes spawn grown).
    #[must_use]
    pub fn grow(duration_ms: f64, grown: bool) -> Self {
        Self {
            kind: TaskKind::Grow,
            progress_ms: if grown { duration_ms } else { 0.0 },
            duration_ms,
            collectable: grown,
            started: true,
            ..Self::default()
        }
    }

    /// Whether the task is actively consuming work time.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.started && !self.blocked && !self.collectable
    }

    /// Advance by `dt_ms`, capping at the duration. Returns `true` when this
    /// call completed the task.
    pub fn advance(&mut self, dt_ms: f64) -> bool {
        if !self.is_running() || self.duration_ms <= 0.0 {
            return false;
        }
        self.progress_ms = (self.progress_ms + dt_ms).min(self.duration_ms);
        if self.progress_ms >= self.duration_ms {
            self.collectable = true;
            true
        } else {
            false
        }
    }

    /// Restart the cycle after a collection or harvest.
    pub fn reset(&mut self) {
        self.progress_ms = 0.0;
        self.collectable = false;
    }
}

/// A placed building or natural resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    /// Unique id.
    pub id: BuildingId,
    /// What this building is.
    pub kind: BuildingKind,
    /// Top-left tile of the footprint.
    pub pos: TilePos,
    /// Current level, starting at 1.
    pub level: u32,
    /// Villagers working here. Bounded by the worker capacity.
    pub assigned_villager_ids: Vec<VillagerId>,
    /// Villagers living here. Bounded by the resident capacity.
    pub resident_ids: Vec<VillagerId>,
    /// Current work item.
    pub task: Task,
    /// Resource granted per completed cycle or harvest.
    pub output: Option<Yield>,
}

impl Building {
    /// Create a level-1 building with its kind-specific initial task and
    /// output.
    #[must_use]
    pub fn new(id: BuildingId, kind: BuildingKind, pos: TilePos) -> Self {
        Self {
            id,
            kind,
            pos,
            level: 1,
            assigned_villager_ids: Vec::new(),
            resident_ids: Vec::new(),
            task: building_specs::initial_task(kind),
            output: building_specs::initial_output(kind),
        }
    }

    /// Footprint in tiles (width, height).
    #[must_use]
    pub const fn footprint(&self) -> (u32, u32) {
        self.kind.footprint()
    }

    /// Whether the footprint covers a tile.
    #[must_use]
    pub fn covers(&self, x: u32, y: u32) -> bool {
        let (w, h) = self.footprint();
        x >= self.pos.x && x < self.pos.x + w && y >= self.pos.y && y < self.pos.y + h
    }

    /// Center of the footprint in world coordinates.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        let (w, h) = self.footprint();
        Vec2::new(
            self.pos.x as f32 + w as f32 / 2.0,
            self.pos.y as f32 + h as f32 / 2.0,
        )
    }

    /// How many workers this building accepts at its current level.
    #[must_use]
    pub fn worker_capacity(&self) -> usize {
        building_specs::level_spec(self.kind, self.level)
            .map_or(0, |spec| spec.workers as usize)
    }

    /// How many residents this building houses at its current level.
    #[must_use]
    pub fn resident_capacity(&self) -> usize {
        building_specs::level_spec(self.kind, self.level)
            .map_or(0, |spec| spec.residents as usize)
    }
}
