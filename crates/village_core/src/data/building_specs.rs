//! Per-kind, per-level building definitions and startable task recipes.

use crate::buildings::{BuildingKind, Task, TaskId, TaskReward};
use crate::data::tuning;
use crate::economy::{Cost, Resource, Yield};

/// One level of a building kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelSpec {
    /// Level number, starting at 1.
    pub level: u32,
    /// Cost to upgrade to this level from the previous one. Unused at
    /// level 1.
    pub upgrade_cost: Cost,
    /// Worker slots at this level.
    pub workers: u32,
    /// Resident slots at this level.
    pub residents: u32,
    /// Production cycle duration at this level, ms (0 = no cycle).
    pub task_duration_ms: f64,
    /// Output amount per completed cycle or harvest.
    pub output_amount: u32,
}

const fn level(
    level: u32,
    upgrade_cost: Cost,
    workers: u32,
    residents: u32,
    task_duration_ms: f64,
    output_amount: u32,
) -> LevelSpec {
    LevelSpec {
        level,
        upgrade_cost,
        workers,
        residents,
        task_duration_ms,
        output_amount,
    }
}

const CAMPFIRE_LEVELS: &[LevelSpec] = &[level(1, Cost::FREE, 0, 0, 0.0, 0)];

const SLEEP_HUT_LEVELS: &[LevelSpec] = &[
    level(1, Cost::FREE, 0, 2, 0.0, 0),
    level(2, Cost::wood(15), 0, 3, 0.0, 0),
    level(3, Cost::wood_stone(25, 5), 0, 4, 0.0, 0),
    level(4, Cost::wood_stone(40, 10), 0, 5, 0.0, 0),
    level(5, Cost::wood_stone(60, 20), 0, 6, 0.0, 0),
];

const GATHER_HUT_LEVELS: &[LevelSpec] = &[
    level(1, Cost::FREE, 1, 0, 45_000.0, 6),
    level(2, Cost::wood_stone(20, 5), 2, 0, 40_000.0, 9),
    level(3, Cost::wood_stone(35, 12), 3, 0, 35_000.0, 13),
];

const SAWMILL_LEVELS: &[LevelSpec] = &[
    level(1, Cost::FREE, 1, 0, 60_000.0, 5),
    level(2, Cost::wood_stone(25, 8), 2, 0, 52_000.0, 8),
    level(3, Cost::wood_stone(45, 18), 3, 0, 45_000.0, 12),
];

const TOWNHALL_LEVELS: &[LevelSpec] = &[level(1, Cost::FREE, 0, 1, 0.0, 0)];

const TREE_LEVELS: &[LevelSpec] = &[level(1, Cost::FREE, 0, 0, 0.0, 3)];
const ROCK_LEVELS: &[LevelSpec] = &[level(1, Cost::FREE, 0, 0, 0.0, 2)];
const BERRY_BUSH_LEVELS: &[LevelSpec] =
    &[level(1, Cost::FREE, 0, 0, tuning::BUSH_REGROW_MS, 2)];
const MUSHROOM_LEVELS: &[LevelSpec] = &[level(1, Cost::FREE, 0, 0, 0.0, 1)];

/// All levels of a building kind, lowest first.
#[must_use]
pub const fn level_specs(kind: BuildingKind) -> &'static [LevelSpec] {
    match kind {
        BuildingKind::Campfire => CAMPFIRE_LEVELS,
        BuildingKind::SleepHut => SLEEP_HUT_LEVELS,
        BuildingKind::GatherHut => GATHER_HUT_LEVELS,
        BuildingKind::Sawmill => SAWMILL_LEVELS,
        BuildingKind::Townhall => TOWNHALL_LEVELS,
        BuildingKind::Tree => TREE_LEVELS,
        BuildingKind::Rock => ROCK_LEVELS,
        BuildingKind::BerryBush => BERRY_BUSH_LEVELS,
        BuildingKind::Mushroom => MUSHROOM_LEVELS,
    }
}

/// Spec for one level, or `None` past the maximum.
#[must_use]
pub fn level_spec(kind: BuildingKind, level: u32) -> Option<&'static LevelSpec> {
    level_specs(kind).iter().find(|spec| spec.level == level)
}

/// Spec for the level above `level`, or `None` at the maximum.
#[must_use]
pub fn next_level_spec(kind: BuildingKind, level: u32) -> Option<&'static LevelSpec> {
    level_spec(kind, level + 1)
}

/// Placement cost for player-placeable kinds; `None` for naturals.
#[must_use]
pub const fn place_cost(kind: BuildingKind) -> Option<Cost> {
    match kind {
        BuildingKind::Campfire => Some(Cost::wood(5)),
        BuildingKind::SleepHut => Some(Cost::wood(12)),
        BuildingKind::GatherHut => Some(Cost::wood(10)),
        BuildingKind::Sawmill => Some(Cost::wood_stone(14, 4)),
        BuildingKind::Townhall => Some(Cost::wood_stone(40, 10)),
        BuildingKind::Tree
        | BuildingKind::Rock
        | BuildingKind::BerryBush
        | BuildingKind::Mushroom => None,
    }
}

/// The resource a kind produces, if any.
#[must_use]
pub const fn output_resource(kind: BuildingKind) -> Option<Resource> {
    match kind {
        BuildingKind::GatherHut | BuildingKind::BerryBush => Some(Resource::Berries),
        BuildingKind::Sawmill | BuildingKind::Tree => Some(Resource::Wood),
        BuildingKind::Rock => Some(Resource::Stone),
        BuildingKind::Mushroom => Some(Resource::Mushrooms),
        BuildingKind::Campfire | BuildingKind::SleepHut | BuildingKind::Townhall => None,
    }
}

/// Output at level 1, if the kind produces anything.
#[must_use]
pub fn initial_output(kind: BuildingKind) -> Option<Yield> {
    let resource = output_resource(kind)?;
    let spec = level_spec(kind, 1)?;
    Some(Yield::new(resource, spec.output_amount))
}

/// The task a freshly created building carries.
#[must_use]
pub fn initial_task(kind: BuildingKind) -> Task {
    match kind {
        BuildingKind::GatherHut | BuildingKind::Sawmill => {
            let duration = level_spec(kind, 1).map_or(0.0, |s| s.task_duration_ms);
            Task::production(duration)
        }
        BuildingKind::BerryBush => Task::grow(tuning::BUSH_REGROW_MS, true),
        BuildingKind::Tree | BuildingKind::Rock | BuildingKind::Mushroom => Task::ready(),
        BuildingKind::Campfire | BuildingKind::SleepHut | BuildingKind::Townhall => Task::idle(),
    }
}

/// A startable task: its price, runtime, and reward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskSpec {
    /// Paid up front when the task starts.
    pub cost: Cost,
    /// Runtime in milliseconds.
    pub duration_ms: f64,
    /// Granted when the finished task is collected.
    pub reward: TaskReward,
}

const FEAST_COST: Cost = Cost {
    wood: 2,
    stone: 0,
    berries: 6,
    mushrooms: 0,
};

/// Look up what starting `id` on a `kind` building at `level` means.
/// `None` when the building kind does not host that task.
#[must_use]
pub fn task_spec(kind: BuildingKind, id: TaskId, level: u32) -> Option<TaskSpec> {
    match (kind, id) {
        (BuildingKind::GatherHut, TaskId::Forage)
        | (BuildingKind::Sawmill, TaskId::CutLumber) => {
            let spec = level_spec(kind, level)?;
            Some(TaskSpec {
                cost: Cost::FREE,
                duration_ms: spec.task_duration_ms,
                reward: TaskReward::Output,
            })
        }
        (BuildingKind::Campfire, TaskId::Feast) => Some(TaskSpec {
            cost: FEAST_COST,
            duration_ms: 60_000.0,
            reward: TaskReward::Feast,
        }),
        (BuildingKind::Townhall, TaskId::NightWatch) => Some(TaskSpec {
            cost: Cost::wood(5),
            duration_ms: 90_000.0,
            reward: TaskReward::NightWatch,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_are_contiguous_from_one() {
        for kind in [
            BuildingKind::Campfire,
            BuildingKind::SleepHut,
            BuildingKind::GatherHut,
            BuildingKind::Sawmill,
            BuildingKind::Townhall,
            BuildingKind::Tree,
            BuildingKind::Rock,
            BuildingKind::BerryBush,
            BuildingKind::Mushroom,
        ] {
            for (i, spec) in level_specs(kind).iter().enumerate() {
                assert_eq!(spec.level, i as u32 + 1, "{kind:?}");
            }
        }
    }

    #[test]
    fn test_sleep_hut_capacity_curve() {
        let caps: Vec<u32> = SLEEP_HUT_LEVELS.iter().map(|s| s.residents).collect();
        assert_eq!(caps, vec![2, 3, 4, 5, 6]);
        assert!(next_level_spec(BuildingKind::SleepHut, 5).is_none());
    }

    #[test]
    fn test_production_improves_with_level() {
        for kind in [BuildingKind::GatherHut, BuildingKind::Sawmill] {
            let specs = level_specs(kind);
            for pair in specs.windows(2) {
                assert!(pair[1].output_amount > pair[0].output_amount);
                assert!(pair[1].task_duration_ms < pair[0].task_duration_ms);
                assert!(pair[1].workers > pair[0].workers);
                assert!(!pair[1].upgrade_cost.is_free());
            }
        }
    }

    #[test]
    fn test_task_specs_host_binding() {
        assert!(task_spec(BuildingKind::Campfire, TaskId::Feast, 1).is_some());
        assert!(task_spec(BuildingKind::Campfire, TaskId::CutLumber, 1).is_none());
        assert!(task_spec(BuildingKind::Sawmill, TaskId::Feast, 1).is_none());
        let forage = task_spec(BuildingKind::GatherHut, TaskId::Forage, 2).unwrap();
        assert!(forage.cost.is_free());
        assert_eq!(forage.duration_ms, 40_000.0);
        assert_eq!(forage.reward, TaskReward::Output);
    }

    #[test]
    fn test_natural_outputs() {
        assert_eq!(
            initial_output(BuildingKind::Tree),
            Some(Yield::new(Resource::Wood, 3))
        );
        assert_eq!(
            initial_output(BuildingKind::Mushroom),
            Some(Yield::new(Resource::Mushrooms, 1))
        );
        assert_eq!(initial_output(BuildingKind::Campfire), None);
    }
}
