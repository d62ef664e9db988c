//! Villagers and animals: identity, jobs, needs, and movement state.

use serde::{Deserialize, Serialize};

use crate::buildings::BuildingId;
use crate::math::Vec2;

/// Unique villager identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct VillagerId(pub u32);

/// Unique animal identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct AnimalId(pub u32);

/// A villager's job. Gatherers and woodcutters walk out to resources for
/// their workplace; laborers pick up whatever they step on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Job {
    /// General hand without a specialist workplace.
    #[default]
    Laborer,
    /// Works a gather hut; forages bushes and mushrooms.
    Gatherer,
    /// Works a sawmill; fells trees.
    Woodcutter,
}

/// Sprite facing. Flips only on meaningful lateral movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Facing left (negative x).
    Left,
    /// Facing right (positive x).
    #[default]
    Right,
}

/// Rolled-at-birth attributes plus morale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    /// Work aptitude, 1-10.
    pub work: u8,
    /// Intellect, 1-10.
    pub intellect: u8,
    /// Strength, 1-10.
    pub strength: u8,
    /// Morale, 0-1.
    pub morale: f32,
}

impl Stats {
    /// Create stats with the standard starting morale.
    #[must_use]
    pub const fn new(work: u8, intellect: u8, strength: u8) -> Self {
        Self {
            work,
            intellect,
            strength,
            morale: 0.7,
        }
    }
}

/// Unit-interval needs. Hunger and illness rise toward 1; energy falls
/// toward 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Needs {
    /// 0 = sated, 1 = starving.
    pub hunger: f32,
    /// 0 = exhausted, 1 = fresh.
    pub energy: f32,
    /// 0 = healthy, 1 = gravely ill. Carried but never driven yet.
    pub illness: f32,
}

impl Needs {
    /// Needs of a freshly rested villager.
    #[must_use]
    pub const fn rested() -> Self {
        Self {
            hunger: 0.2,
            energy: 0.9,
            illness: 0.0,
        }
    }
}

/// A villager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Villager {
    /// Unique id.
    pub id: VillagerId,
    /// Display name.
    pub name: String,
    /// Position in tile units, sub-tile precision.
    pub pos: Vec2,
    /// Sprite facing.
    pub facing: Facing,
    /// Simulation timestamp of the last facing flip, ms.
    pub facing_changed_at: f64,
    /// Current job.
    pub job: Job,
    /// Workplace, mirrored by the building's `assigned_villager_ids`.
    pub assigned_building: Option<BuildingId>,
    /// Home, mirrored by the building's `resident_ids`.
    pub home: Option<BuildingId>,
    /// Attributes and morale.
    pub stats: Stats,
    /// Needs.
    pub needs: Needs,
    /// Villagers never die in the current rules; the flag exists so state
    /// and serialization already cover it.
    pub alive: bool,
}

impl Villager {
    /// Create a living villager at a position.
    #[must_use]
    pub fn new(id: VillagerId, name: String, pos: Vec2, stats: Stats) -> Self {
        Self {
            id,
            name,
            pos,
            facing: Facing::default(),
            facing_changed_at: 0.0,
            job: Job::default(),
            assigned_building: None,
            home: None,
            stats,
            needs: Needs::rested(),
            alive: true,
        }
    }
}

/// Name pool for generated villagers.
pub const NAMES: [&str; 12] = [
    "Alda", "Bram", "Cedany", "Doran", "Eilin", "Fenn", "Greta", "Halvar", "Ines", "Jorun",
    "Kessa", "Loric",
];

/// Animal kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimalKind {
    /// A stray dog.
    Dog,
}

/// Animal behavior state.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum AnimalBehavior {
    /// Standing still; picks a wander target on the next tick.
    #[default]
    Idle,
    /// Walking toward a point.
    Wandering {
        /// Destination in tile units.
        target: Vec2,
    },
    /// Trailing a villager. Reachable only through future taming rules.
    Following {
        /// The villager being followed.
        villager: VillagerId,
    },
    /// Dead. Reachable only through future combat rules.
    Dead,
}

/// A wild animal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animal {
    /// Unique id.
    pub id: AnimalId,
    /// Species.
    pub kind: AnimalKind,
    /// Position in tile units.
    pub pos: Vec2,
    /// Behavior state.
    pub behavior: AnimalBehavior,
}

impl Animal {
    /// Create an idle animal at a position.
    #[must_use]
    pub fn new(id: AnimalId, kind: AnimalKind, pos: Vec2) -> Self {
        Self {
            id,
            kind,
            pos,
            behavior: AnimalBehavior::Idle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_villager_defaults() {
        let v = Villager::new(
            VillagerId(1),
            "Alda".to_string(),
            Vec2::new(3.0, 3.0),
            Stats::new(5, 5, 5),
        );
        assert!(v.alive);
        assert_eq!(v.job, Job::Laborer);
        assert_eq!(v.facing, Facing::Right);
        assert!(v.assigned_building.is_none());
        assert!(v.home.is_none());
        assert_eq!(v.needs, Needs::rested());
        assert_eq!(v.stats.morale, 0.7);
    }

    #[test]
    fn test_new_animal_is_idle() {
        let dog = Animal::new(AnimalId(1), AnimalKind::Dog, Vec2::new(1.0, 1.0));
        assert_eq!(dog.behavior, AnimalBehavior::Idle);
    }
}
