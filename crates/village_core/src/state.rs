//! The full game state: clock, world, entities, inventory, quests, events.
//!
//! `GameState` is a plain, acyclic value. Entities reference each other by
//! id only, every map is a `BTreeMap` so iteration and serialization order
//! are deterministic, and the whole struct round-trips through JSON.

use std::collections::BTreeMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::buildings::{Building, BuildingId, BuildingKind, TaskId};
use crate::data::tuning;
use crate::economy::{Inventory, Resource};
use crate::math::Vec2;
use crate::villagers::{Animal, AnimalId, Villager, VillagerId};
use crate::world::{World, WorldConfig};

/// Day phases, in cycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// 00:00-06:00.
    Night,
    /// 06:00-12:00.
    Morning,
    /// 12:00-18:00.
    Day,
    /// 18:00-24:00.
    Evening,
}

impl Phase {
    /// All phases in cycle order.
    pub const ALL: [Self; 4] = [Self::Night, Self::Morning, Self::Day, Self::Evening];

    /// Index within the day (night = 0).
    #[must_use]
    pub const fn index(self) -> u32 {
        match self {
            Self::Night => 0,
            Self::Morning => 1,
            Self::Day => 2,
            Self::Evening => 3,
        }
    }

    /// The phase that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Night => Self::Morning,
            Self::Morning => Self::Day,
            Self::Day => Self::Evening,
            Self::Evening => Self::Night,
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Night => "night",
            Self::Morning => "morning",
            Self::Day => "day",
            Self::Evening => "evening",
        }
    }
}

/// Simulation speed multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Speed {
    /// Normal speed.
    #[default]
    One,
    /// Double speed.
    Two,
}

impl Speed {
    /// Multiplier applied to every frame delta.
    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::One => 1.0,
            Self::Two => 2.0,
        }
    }
}

/// The simulation clock.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeState {
    /// Day counter; increments on the night-to-morning transition.
    pub day: u32,
    /// Current phase.
    pub phase: Phase,
    /// Time into the current phase, ms.
    pub phase_elapsed_ms: f64,
    /// Total scaled simulation time since game start, ms.
    pub total_ms: f64,
}

impl TimeState {
    /// Clock at game start: day 1, dawn.
    #[must_use]
    pub const fn start() -> Self {
        Self {
            day: 1,
            phase: Phase::Morning,
            phase_elapsed_ms: 0.0,
            total_ms: 0.0,
        }
    }

    /// Minute of the 24h clock in `[0, 1440)` derived from the phase and the
    /// time into it. Values past the phase end (before the rollover pass
    /// runs) wrap into the following phase, which keeps mark-crossing
    /// detection exact.
    #[must_use]
    pub fn minute_of_day(&self, ms_per_day: f64) -> u32 {
        let phase_ms = ms_per_day / f64::from(tuning::PHASES_PER_DAY);
        let per_phase = tuning::MINUTES_PER_DAY / tuning::PHASES_PER_DAY;
        let within = ((self.phase_elapsed_ms / phase_ms) * f64::from(per_phase)).floor();
        // within is non-negative and small; the cast cannot truncate in play.
        (self.phase.index() * per_phase + within as u32) % tuning::MINUTES_PER_DAY
    }
}

/// Global toggles: pause, speed, and the shared schedule flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GameFlags {
    /// Paused games scale every frame delta to zero.
    pub paused: bool,
    /// Speed multiplier.
    pub speed: Speed,
    /// Working hours (08:00-20:00): production advances, workers commute.
    pub working: bool,
    /// Sleeping hours (20:00-08:00): villagers head home, needs shift.
    pub sleeping: bool,
}

/// Alert severities per category: 0 = none, 1 = warning, 2 = critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Alerts {
    /// Driven by the hungriest living villager.
    pub hunger: u8,
    /// Driven by the sickest living villager. Illness never rises under the
    /// current rules, so this stays 0.
    pub illness: u8,
    /// Reserved for combat rules; always 0.
    pub attack: u8,
}

/// Tutorial quest identifiers, in chain order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestKind {
    /// Place a campfire.
    LightTheHearth,
    /// Place a sleep hut.
    RaiseAShelter,
    /// Place a gather hut.
    StockThePantry,
    /// Place a sawmill.
    MillTheForest,
    /// Place a townhall.
    FoundTheVillage,
}

impl QuestKind {
    /// The full tutorial chain, in order.
    pub const ALL: [Self; 5] = [
        Self::LightTheHearth,
        Self::RaiseAShelter,
        Self::StockThePantry,
        Self::MillTheForest,
        Self::FoundTheVillage,
    ];

    /// The building whose presence completes this quest.
    #[must_use]
    pub const fn required_building(self) -> BuildingKind {
        match self {
            Self::LightTheHearth => BuildingKind::Campfire,
            Self::RaiseAShelter => BuildingKind::SleepHut,
            Self::StockThePantry => BuildingKind::GatherHut,
            Self::MillTheForest => BuildingKind::Sawmill,
            Self::FoundTheVillage => BuildingKind::Townhall,
        }
    }

    /// Display title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::LightTheHearth => "Light the Hearth",
            Self::RaiseAShelter => "Raise a Shelter",
            Self::StockThePantry => "Stock the Pantry",
            Self::MillTheForest => "Mill the Forest",
            Self::FoundTheVillage => "Found the Village",
        }
    }
}

/// One tutorial quest. Fully recomputed by the evaluator every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    /// Which quest.
    pub kind: QuestKind,
    /// Progress toward the goal.
    pub progress: u32,
    /// Completion target.
    pub goal: u32,
    /// Whether the goal is met.
    pub done: bool,
    /// Locked until the previous quest in the chain is done.
    pub locked: bool,
}

impl Quest {
    /// The initial quest list: everything pending, only the first unlocked.
    #[must_use]
    pub fn initial_set() -> Vec<Self> {
        QuestKind::ALL
            .iter()
            .enumerate()
            .map(|(i, kind)| Self {
                kind: *kind,
                progress: 0,
                goal: 1,
                done: false,
                locked: i > 0,
            })
            .collect()
    }
}

/// UI selection state. The tick engine never touches this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    /// Selected villager, if any.
    pub villager: Option<VillagerId>,
    /// Selected building, if any.
    pub building: Option<BuildingId>,
}

/// Next eligible day per spawner category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpawnerState {
    /// Rock spawner.
    pub rocks: u32,
    /// Tree spawner.
    pub trees: u32,
    /// Berry bush spawner.
    pub berries: u32,
    /// Mushroom spawner.
    pub mushrooms: u32,
    /// Dog spawner.
    pub dogs: u32,
}

/// What happened, attached to every [`GameEvent`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEventPayload {
    /// A building was placed by the player.
    BuildingPlaced {
        /// New building.
        building: BuildingId,
        /// Its kind.
        kind: BuildingKind,
    },
    /// A building reached a new level.
    BuildingUpgraded {
        /// Upgraded building.
        building: BuildingId,
        /// The level reached.
        level: u32,
    },
    /// A finite natural resource was harvested away.
    BuildingRemoved {
        /// Removed building.
        building: BuildingId,
        /// Its kind.
        kind: BuildingKind,
    },
    /// A task was started on a building.
    TaskStarted {
        /// Host building.
        building: BuildingId,
        /// Which task.
        task: TaskId,
    },
    /// Resources entered the inventory.
    ResourceCollected {
        /// Resource kind.
        resource: Resource,
        /// Amount credited (after the storage cap).
        amount: u32,
    },
    /// Resources left the inventory.
    ResourceSpent {
        /// Resource kind.
        resource: Resource,
        /// Amount removed.
        amount: u32,
    },
    /// A meal could not be fully served.
    FoodShortage {
        /// Berries missing from the full meal.
        missing: u32,
    },
    /// A new day began (night rolled into morning).
    DayStarted {
        /// The day that began.
        day: u32,
    },
    /// 08:00 - working hours began.
    WorkStarted,
    /// 20:00 - sleeping hours began.
    SleepStarted,
    /// A spawner run placed natural resources.
    ResourcesSpawned {
        /// What was spawned.
        kind: BuildingKind,
        /// How many.
        count: u32,
    },
    /// A spawner run produced an animal.
    AnimalSpawned {
        /// The new animal.
        animal: AnimalId,
    },
    /// A quest flipped to done.
    QuestCompleted {
        /// The completed quest.
        quest: QuestKind,
    },
}

/// An entry in the append-only event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    /// Monotonic event id.
    pub id: u64,
    /// Simulation timestamp at emission, ms.
    pub at_ms: f64,
    /// What happened.
    pub payload: GameEventPayload,
}

/// Game-wide configuration, embedded in the state so transitions stay pure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// World generation settings.
    pub world: WorldConfig,
    /// Simulated day length, ms.
    pub ms_per_day: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            ms_per_day: tuning::MS_PER_DAY,
        }
    }
}

impl GameConfig {
    /// Set the world seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u32) -> Self {
        self.world.seed = seed;
        self
    }

    /// Duration of one phase, ms.
    #[must_use]
    pub fn phase_ms(&self) -> f64 {
        self.ms_per_day / f64::from(tuning::PHASES_PER_DAY)
    }
}

/// Monotonic id counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub(crate) struct IdCounters {
    pub(crate) villager: u32,
    pub(crate) building: u32,
    pub(crate) animal: u32,
    pub(crate) event: u64,
}

/// The complete simulation state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Configuration this game was created with.
    pub config: GameConfig,
    /// World seed (same as `config.world.seed`, kept handy).
    pub seed: u32,
    /// The generated island.
    pub world: World,
    /// The clock.
    pub time: TimeState,
    /// Pause, speed, and schedule flags.
    pub flags: GameFlags,
    /// Shared resource stock.
    pub inventory: Inventory,
    /// All villagers by id.
    pub villagers: BTreeMap<VillagerId, Villager>,
    /// All buildings and natural resources by id.
    pub buildings: BTreeMap<BuildingId, Building>,
    /// All animals by id.
    pub animals: BTreeMap<AnimalId, Animal>,
    /// Tutorial quests.
    pub quests: Vec<Quest>,
    /// Current alert severities.
    pub alerts: Alerts,
    /// Append-only event log.
    pub events: Vec<GameEvent>,
    /// Spawner schedule.
    pub spawners: SpawnerState,
    /// UI selection (never mutated by `tick`).
    pub selection: Selection,
    /// Pending placement intent (never mutated by `tick`).
    pub placement: Option<BuildingKind>,
    counters: IdCounters,
}

impl GameState {
    /// Create an empty state around a generated world. Entities, inventory,
    /// and the spawner schedule are filled in by game creation.
    #[must_use]
    pub fn empty(config: GameConfig, world: World) -> Self {
        Self {
            seed: config.world.seed,
            config,
            world,
            time: TimeState::start(),
            flags: GameFlags::default(),
            inventory: Inventory::default(),
            villagers: BTreeMap::new(),
            buildings: BTreeMap::new(),
            animals: BTreeMap::new(),
            quests: Quest::initial_set(),
            alerts: Alerts::default(),
            events: Vec::new(),
            spawners: SpawnerState::default(),
            selection: Selection::default(),
            placement: None,
            counters: IdCounters::default(),
        }
    }

    pub(crate) fn alloc_villager_id(&mut self) -> VillagerId {
        let id = VillagerId(self.counters.villager);
        self.counters.villager += 1;
        id
    }

    pub(crate) fn alloc_building_id(&mut self) -> BuildingId {
        let id = BuildingId(self.counters.building);
        self.counters.building += 1;
        id
    }

    pub(crate) fn alloc_animal_id(&mut self) -> AnimalId {
        let id = AnimalId(self.counters.animal);
        self.counters.animal += 1;
        id
    }

    /// Append an event stamped with the current simulation time.
    pub(crate) fn push_event(&mut self, payload: GameEventPayload) {
        let id = self.counters.event;
        self.counters.event += 1;
        self.events.push(GameEvent {
            id,
            at_ms: self.time.total_ms,
            payload,
        });
    }

    /// The building whose footprint covers a tile, if any.
    #[must_use]
    pub fn building_covering(&self, x: u32, y: u32) -> Option<&Building> {
        self.buildings.values().find(|b| b.covers(x, y))
    }

    /// The building of a matching kind nearest to a point. Ties break toward
    /// the lowest id because iteration is id-ordered and strict comparison
    /// keeps the first minimum.
    #[must_use]
    pub fn nearest_building<F>(&self, from: Vec2, mut pred: F) -> Option<&Building>
    where
        F: FnMut(&Building) -> bool,
    {
        let mut best: Option<(&Building, f32)> = None;
        for building in self.buildings.values() {
            if !pred(building) {
                continue;
            }
            let d = from.distance_squared(building.center());
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((building, d)),
            }
        }
        best.map(|(b, _)| b)
    }

    /// Living villagers, id order.
    pub fn living_villagers(&self) -> impl Iterator<Item = &Villager> {
        self.villagers.values().filter(|v| v.alive)
    }

    /// Number of living villagers.
    #[must_use]
    pub fn living_count(&self) -> u32 {
        self.living_villagers().count() as u32
    }

    /// Count buildings of a kind.
    #[must_use]
    pub fn count_buildings(&self, kind: BuildingKind) -> usize {
        self.buildings.values().filter(|b| b.kind == kind).count()
    }

    /// Order-stable hash over the simulation-relevant state. Two games that
    /// ran the same inputs from the same seed hash identically.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        self.time.day.hash(&mut hasher);
        self.time.phase.hash(&mut hasher);
        self.time.phase_elapsed_ms.to_bits().hash(&mut hasher);
        self.time.total_ms.to_bits().hash(&mut hasher);
        self.flags.paused.hash(&mut hasher);
        self.flags.speed.hash(&mut hasher);
        self.flags.working.hash(&mut hasher);
        self.flags.sleeping.hash(&mut hasher);
        for r in Resource::ALL {
            self.inventory.get(r).hash(&mut hasher);
        }
        for (id, v) in &self.villagers {
            id.hash(&mut hasher);
            v.pos.x.to_bits().hash(&mut hasher);
            v.pos.y.to_bits().hash(&mut hasher);
            v.needs.hunger.to_bits().hash(&mut hasher);
            v.needs.energy.to_bits().hash(&mut hasher);
            v.needs.illness.to_bits().hash(&mut hasher);
            v.stats.morale.to_bits().hash(&mut hasher);
            v.job.hash(&mut hasher);
            v.assigned_building.hash(&mut hasher);
            v.home.hash(&mut hasher);
            v.alive.hash(&mut hasher);
        }
        for (id, b) in &self.buildings {
            id.hash(&mut hasher);
            b.kind.hash(&mut hasher);
            b.pos.hash(&mut hasher);
            b.level.hash(&mut hasher);
            b.task.progress_ms.to_bits().hash(&mut hasher);
            b.task.collectable.hash(&mut hasher);
            b.task.started.hash(&mut hasher);
            b.assigned_villager_ids.hash(&mut hasher);
            b.resident_ids.hash(&mut hasher);
        }
        for (id, a) in &self.animals {
            id.hash(&mut hasher);
            a.pos.x.to_bits().hash(&mut hasher);
            a.pos.y.to_bits().hash(&mut hasher);
        }
        self.alerts.hunger.hash(&mut hasher);
        self.alerts.illness.hash(&mut hasher);
        self.alerts.attack.hash(&mut hasher);
        for quest in &self.quests {
            quest.done.hash(&mut hasher);
            quest.locked.hash(&mut hasher);
        }
        self.events.len().hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_cycle_order() {
        assert_eq!(Phase::Night.next(), Phase::Morning);
        assert_eq!(Phase::Evening.next(), Phase::Night);
        for (i, phase) in Phase::ALL.iter().enumerate() {
            assert_eq!(phase.index(), i as u32);
        }
    }

    #[test]
    fn test_minute_of_day_mapping() {
        let ms_per_day = tuning::MS_PER_DAY;
        let phase_ms = ms_per_day / 4.0;

        let mut t = TimeState::start();
        // Morning starts at 06:00.
        assert_eq!(t.minute_of_day(ms_per_day), 360);

        // One hour into morning: 07:00.
        t.phase_elapsed_ms = phase_ms / 6.0;
        assert_eq!(t.minute_of_day(ms_per_day), 420);

        // Unrolled overshoot wraps into the next phase.
        t.phase = Phase::Evening;
        t.phase_elapsed_ms = phase_ms + phase_ms / 6.0;
        assert_eq!(t.minute_of_day(ms_per_day), 60);
    }

    #[test]
    fn test_quest_initial_set_locking() {
        let quests = Quest::initial_set();
        assert_eq!(quests.len(), QuestKind::ALL.len());
        assert!(!quests[0].locked);
        assert!(quests[1..].iter().all(|q| q.locked));
        assert!(quests.iter().all(|q| !q.done && q.progress == 0));
    }

    #[test]
    fn test_speed_multiplier() {
        assert_eq!(Speed::One.multiplier(), 1.0);
        assert_eq!(Speed::Two.multiplier(), 2.0);
    }
}
