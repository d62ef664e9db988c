//! Player intents as pure state transitions.
//!
//! Every command consumes a `GameState` and returns a new one, and is total:
//! when a precondition fails the input state comes back unchanged. The
//! preconditions live in internal `try_*` functions that report a
//! [`CommandError`]; the public wrappers log the rejection and swallow it.
//! Each `try_*` validates everything before mutating anything.

use tracing::debug;

use crate::buildings::{Building, BuildingId, BuildingKind, Task, TaskId, TaskKind, TaskReward};
use crate::data::building_specs;
use crate::data::tuning;
use crate::economy::{Cost, Resource, Yield};
use crate::error::{CommandError, Result};
use crate::math::clamp01;
use crate::state::{GameEventPayload, GameState, Speed};
use crate::villagers::{Job, VillagerId};
use crate::world::TilePos;

/// Place a building of `kind` with its top-left corner at `pos`.
///
/// Requires a placeable kind, an in-bounds footprint on land free of other
/// buildings, and an affordable cost.
#[must_use]
pub fn place_building(mut state: GameState, kind: BuildingKind, pos: TilePos) -> GameState {
    if let Err(err) = try_place_building(&mut state, kind, pos) {
        debug!(%err, ?kind, ?pos, "place_building rejected");
    }
    state
}

/// Change a villager's job. Changing jobs detaches the villager from its
/// workplace.
#[must_use]
pub fn assign_villager_job(mut state: GameState, villager: VillagerId, job: Job) -> GameState {
    if let Err(err) = try_assign_villager_job(&mut state, villager, job) {
        debug!(%err, ?villager, "assign_villager_job rejected");
    }
    state
}

/// Assign a villager to a workplace (or detach with `None`). The villager
/// always leaves its previous workplace; it joins the new one only if a
/// worker slot is free, and stays unassigned otherwise.
#[must_use]
pub fn assign_villager_to_building(
    mut state: GameState,
    villager: VillagerId,
    building: Option<BuildingId>,
) -> GameState {
    if let Err(err) = try_assign_villager_to_building(&mut state, villager, building) {
        debug!(%err, ?villager, "assign_villager_to_building rejected");
    }
    state
}

/// Assign a villager a home (or evict with `None`). Same slot semantics as
/// workplace assignment, against the resident capacity.
#[must_use]
pub fn assign_villager_home(
    mut state: GameState,
    villager: VillagerId,
    building: Option<BuildingId>,
) -> GameState {
    if let Err(err) = try_assign_villager_home(&mut state, villager, building) {
        debug!(%err, ?villager, "assign_villager_home rejected");
    }
    state
}

/// Start a task on a building, paying its cost up front.
#[must_use]
pub fn start_building_task(
    mut state: GameState,
    building: BuildingId,
    task: TaskId,
) -> GameState {
    if let Err(err) = try_start_building_task(&mut state, building, task) {
        debug!(%err, ?building, ?task, "start_building_task rejected");
    }
    state
}

/// Collect a finished task: credit output or apply the recipe effect, then
/// reset the task (finite natural resources are removed instead).
#[must_use]
pub fn collect_from_building(mut state: GameState, building: BuildingId) -> GameState {
    if let Err(err) = try_collect_from_building(&mut state, building) {
        debug!(%err, ?building, "collect_from_building rejected");
    }
    state
}

/// Upgrade a building to its next level, paying the upgrade cost.
#[must_use]
pub fn upgrade_building(mut state: GameState, building: BuildingId) -> GameState {
    if let Err(err) = try_upgrade_building(&mut state, building) {
        debug!(%err, ?building, "upgrade_building rejected");
    }
    state
}

/// Pause or resume the simulation.
#[must_use]
pub fn set_paused(mut state: GameState, paused: bool) -> GameState {
    state.flags.paused = paused;
    state
}

/// Change the simulation speed.
#[must_use]
pub fn set_speed(mut state: GameState, speed: Speed) -> GameState {
    state.flags.speed = speed;
    state
}

/// Select a villager for the UI. Unknown ids are ignored.
#[must_use]
pub fn select_villager(mut state: GameState, villager: Option<VillagerId>) -> GameState {
    if villager.map_or(true, |id| state.villagers.contains_key(&id)) {
        state.selection.villager = villager;
    }
    state
}

/// Select a building for the UI. Unknown ids are ignored.
#[must_use]
pub fn select_building(mut state: GameState, building: Option<BuildingId>) -> GameState {
    if building.map_or(true, |id| state.buildings.contains_key(&id)) {
        state.selection.building = building;
    }
    state
}

/// Set or clear the pending placement intent. Non-placeable kinds are
/// ignored.
#[must_use]
pub fn set_placement(mut state: GameState, kind: Option<BuildingKind>) -> GameState {
    if kind.map_or(true, BuildingKind::is_placeable) {
        state.placement = kind;
    }
    state
}

/// Whether the inventory covers a cost.
fn can_afford_cost(state: &GameState, cost: &Cost) -> bool {
    state.inventory.can_afford(cost)
}

/// Deduct a cost and emit a spent event per non-zero component.
fn pay_cost(state: &mut GameState, cost: &Cost) -> Result<()> {
    if !can_afford_cost(state, cost) {
        return Err(CommandError::CannotAfford);
    }
    state.inventory.pay(cost);
    for resource in Resource::ALL {
        let amount = cost.get(resource);
        if amount > 0 {
            state.push_event(GameEventPayload::ResourceSpent { resource, amount });
        }
    }
    Ok(())
}

fn try_place_building(state: &mut GameState, kind: BuildingKind, pos: TilePos) -> Result<()> {
    if !kind.is_placeable() {
        return Err(CommandError::NotPlaceable(kind));
    }
    let (w, h) = kind.footprint();
    let fits_x = pos.x.checked_add(w).map_or(false, |end| end <= state.world.width);
    let fits_y = pos.y.checked_add(h).map_or(false, |end| end <= state.world.height);
    if !fits_x || !fits_y {
        return Err(CommandError::OutOfBounds { x: pos.x, y: pos.y });
    }
    for ty in pos.y..pos.y + h {
        for tx in pos.x..pos.x + w {
            if !state.world.is_buildable(tx, ty) {
                return Err(CommandError::OnWater { x: tx, y: ty });
            }
            if let Some(blocking) = state.building_covering(tx, ty) {
                return Err(CommandError::Occupied {
                    x: tx,
                    y: ty,
                    by: blocking.id,
                });
            }
        }
    }
    let cost = building_specs::place_cost(kind).ok_or(CommandError::NotPlaceable(kind))?;
    pay_cost(state, &cost)?;

    let id = state.alloc_building_id();
    state.buildings.insert(id, Building::new(id, kind, pos));
    state.push_event(GameEventPayload::BuildingPlaced { building: id, kind });
    debug!(?kind, ?pos, ?id, "building placed");
    Ok(())
}

/// Remove a villager from its workplace's worker list.
fn detach_worker(state: &mut GameState, villager: VillagerId) {
    let Some(v) = state.villagers.get_mut(&villager) else {
        return;
    };
    if let Some(bid) = v.assigned_building.take() {
        if let Some(building) = state.buildings.get_mut(&bid) {
            building.assigned_villager_ids.retain(|w| *w != villager);
        }
    }
}

/// Remove a villager from its home's resident list.
fn detach_resident(state: &mut GameState, villager: VillagerId) {
    let Some(v) = state.villagers.get_mut(&villager) else {
        return;
    };
    if let Some(bid) = v.home.take() {
        if let Some(building) = state.buildings.get_mut(&bid) {
            building.resident_ids.retain(|r| *r != villager);
        }
    }
}

fn living_villager(state: &GameState, villager: VillagerId) -> Result<()> {
    let v = state
        .villagers
        .get(&villager)
        .ok_or(CommandError::VillagerNotFound(villager))?;
    if !v.alive {
        return Err(CommandError::VillagerDead(villager));
    }
    Ok(())
}

fn try_assign_villager_job(state: &mut GameState, villager: VillagerId, job: Job) -> Result<()> {
    living_villager(state, villager)?;
    detach_worker(state, villager);
    if let Some(v) = state.villagers.get_mut(&villager) {
        v.job = job;
    }
    Ok(())
}

fn try_assign_villager_to_building(
    state: &mut GameState,
    villager: VillagerId,
    building: Option<BuildingId>,
) -> Result<()> {
    living_villager(state, villager)?;
    if let Some(bid) = building {
        if !state.buildings.contains_key(&bid) {
            return Err(CommandError::BuildingNotFound(bid));
        }
    }
    detach_worker(state, villager);
    if let Some(bid) = building {
        let has_room = state
            .buildings
            .get(&bid)
            .map_or(false, |b| b.assigned_villager_ids.len() < b.worker_capacity());
        if !has_room {
            // The villager stays unassigned; this is the documented outcome,
            // not a rejection.
            debug!(?villager, ?bid, "no free worker slot, villager left unassigned");
            return Ok(());
        }
        if let Some(b) = state.buildings.get_mut(&bid) {
            b.assigned_villager_ids.push(villager);
        }
        if let Some(v) = state.villagers.get_mut(&villager) {
            v.assigned_building = Some(bid);
        }
    }
    Ok(())
}

fn try_assign_villager_home(
    state: &mut GameState,
    villager: VillagerId,
    building: Option<BuildingId>,
) -> Result<()> {
    living_villager(state, villager)?;
    if let Some(bid) = building {
        if !state.buildings.contains_key(&bid) {
            return Err(CommandError::BuildingNotFound(bid));
        }
    }
    detach_resident(state, villager);
    if let Some(bid) = building {
        let has_room = state
            .buildings
            .get(&bid)
            .map_or(false, |b| b.resident_ids.len() < b.resident_capacity());
        if !has_room {
            debug!(?villager, ?bid, "no free resident slot, villager left homeless");
            return Ok(());
        }
        if let Some(b) = state.buildings.get_mut(&bid) {
            b.resident_ids.push(villager);
        }
        if let Some(v) = state.villagers.get_mut(&villager) {
            v.home = Some(bid);
        }
    }
    Ok(())
}

fn try_start_building_task(
    state: &mut GameState,
    building: BuildingId,
    task: TaskId,
) -> Result<()> {
    let (kind, level, busy) = {
        let b = state
            .buildings
            .get(&building)
            .ok_or(CommandError::BuildingNotFound(building))?;
        (b.kind, b.level, b.task.started || b.task.collectable)
    };
    let spec = building_specs::task_spec(kind, task, level)
        .ok_or(CommandError::NoSuchTask { kind, task })?;
    if busy {
        return Err(CommandError::TaskBusy(building));
    }
    pay_cost(state, &spec.cost)?;

    if let Some(b) = state.buildings.get_mut(&building) {
        b.task = Task {
            kind: TaskKind::Produce,
            progress_ms: 0.0,
            duration_ms: spec.duration_ms,
            blocked: false,
            collectable: false,
            started: true,
            recipe: match spec.reward {
                TaskReward::Output => None,
                TaskReward::Feast | TaskReward::NightWatch => Some(task),
            },
        };
    }
    state.push_event(GameEventPayload::TaskStarted { building, task });
    Ok(())
}

fn try_collect_from_building(state: &mut GameState, building: BuildingId) -> Result<()> {
    let (kind, level, collectable, output, recipe) = {
        let b = state
            .buildings
            .get(&building)
            .ok_or(CommandError::BuildingNotFound(building))?;
        (b.kind, b.level, b.task.collectable, b.output, b.task.recipe)
    };
    if !collectable {
        return Err(CommandError::NothingToCollect(building));
    }

    let reward = match recipe {
        Some(task) => {
            building_specs::task_spec(kind, task, level)
                .map_or(TaskReward::Output, |spec| spec.reward)
        }
        None => TaskReward::Output,
    };

    match reward {
        TaskReward::Output => {
            if let Some(Yield { resource, amount }) = output {
                let stored = state.inventory.credit(resource, amount);
                state.push_event(GameEventPayload::ResourceCollected {
                    resource,
                    amount: stored,
                });
            }
            if kind.is_finite_resource() {
                remove_building(state, building, kind);
            } else if let Some(b) = state.buildings.get_mut(&building) {
                b.task.reset();
            }
        }
        TaskReward::Feast => {
            for v in state.villagers.values_mut().filter(|v| v.alive) {
                v.needs.hunger = clamp01(v.needs.hunger - tuning::FEAST_HUNGER_RELIEF);
                v.stats.morale = clamp01(v.stats.morale + tuning::FEAST_MORALE_GAIN);
            }
            if let Some(b) = state.buildings.get_mut(&building) {
                b.task = Task::idle();
            }
        }
        TaskReward::NightWatch => {
            for v in state.villagers.values_mut().filter(|v| v.alive) {
                v.stats.morale = clamp01(v.stats.morale + tuning::NIGHT_WATCH_MORALE_GAIN);
            }
            if let Some(b) = state.buildings.get_mut(&building) {
                b.task = Task::idle();
            }
        }
    }
    Ok(())
}

/// Delete a harvested-out natural resource, clearing any references to it.
pub(crate) fn remove_building(state: &mut GameState, building: BuildingId, kind: BuildingKind) {
    state.buildings.remove(&building);
    if state.selection.building == Some(building) {
        state.selection.building = None;
    }
    state.push_event(GameEventPayload::BuildingRemoved { building, kind });
}

fn try_upgrade_building(state: &mut GameState, building: BuildingId) -> Result<()> {
    let (kind, level) = {
        let b = state
            .buildings
            .get(&building)
            .ok_or(CommandError::BuildingNotFound(building))?;
        (b.kind, b.level)
    };
    let next = building_specs::next_level_spec(kind, level)
        .ok_or(CommandError::MaxLevel(building))?;
    pay_cost(state, &next.upgrade_cost)?;

    if let Some(b) = state.buildings.get_mut(&building) {
        b.level = next.level;
        if let Some(resource) = building_specs::output_resource(kind) {
            b.output = Some(Yield::new(resource, next.output_amount));
        }
        if b.task.kind == TaskKind::Produce {
            b.task.duration_ms = next.task_duration_ms;
            b.task.progress_ms = b.task.progress_ms.min(next.task_duration_ms);
            // A shorter cycle can complete a run that was already past it.
            if b.task.started && b.task.duration_ms > 0.0
                && b.task.progress_ms >= b.task.duration_ms
            {
                b.task.collectable = true;
            }
        }
    }
    state.push_event(GameEventPayload::BuildingUpgraded {
        building,
        level: next.level,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::state::GameConfig;
    use crate::villagers::{Stats, Villager};
    use crate::world::{TileId, World, WorldConfig};

    fn test_state() -> GameState {
        let config = GameConfig {
            world: WorldConfig::default().with_size(16, 16).with_seed(1),
            ms_per_day: tuning::MS_PER_DAY,
        };
        let world = World {
            width: 16,
            height: 16,
            tiles: vec![TileId::Grass; 256],
            water_level: 0.0,
        };
        let mut state = GameState::empty(config, world);
        state.inventory.credit(Resource::Wood, 200);
        state.inventory.credit(Resource::Stone, 100);
        state.inventory.credit(Resource::Berries, 50);
        for i in 0..3 {
            let id = state.alloc_villager_id();
            state.villagers.insert(
                id,
                Villager::new(
                    id,
                    format!("Tester {i}"),
                    Vec2::new(8.0, 8.0),
                    Stats::new(5, 5, 5),
                ),
            );
        }
        state
    }

    fn first_building_of(state: &GameState, kind: BuildingKind) -> BuildingId {
        state
            .buildings
            .values()
            .find(|b| b.kind == kind)
            .map(|b| b.id)
            .expect("building should exist")
    }

    #[test]
    fn test_place_building_success() {
        let state = test_state();
        let wood_before = state.inventory.wood;
        let state = place_building(state, BuildingKind::Campfire, TilePos::new(4, 4));
        assert_eq!(state.count_buildings(BuildingKind::Campfire), 1);
        assert_eq!(state.inventory.wood, wood_before - 5);
        assert!(state.events.iter().any(|e| matches!(
            e.payload,
            GameEventPayload::BuildingPlaced {
                kind: BuildingKind::Campfire,
                ..
            }
        )));
    }

    #[test]
    fn test_place_building_rejections_leave_state_unchanged() {
        let mut state = test_state();
        let idx = state.world.idx(2, 2);
        state.world.tiles[idx] = TileId::Water;
        let state = place_building(state, BuildingKind::SleepHut, TilePos::new(5, 5));

        let before = state.clone();
        // Natural kind.
        let state = place_building(state, BuildingKind::Tree, TilePos::new(4, 4));
        assert_eq!(state, before);
        // Out of bounds (footprint pokes past the edge).
        let state = place_building(state, BuildingKind::Townhall, TilePos::new(14, 14));
        assert_eq!(state, before);
        // Corner coordinates at the integer limit must not wrap past the
        // bounds check.
        let state = place_building(state, BuildingKind::GatherHut, TilePos::new(u32::MAX, 0));
        assert_eq!(state, before);
        let state = place_building(state, BuildingKind::GatherHut, TilePos::new(0, u32::MAX));
        assert_eq!(state, before);
        // On water.
        let state = place_building(state, BuildingKind::SleepHut, TilePos::new(2, 2));
        assert_eq!(state, before);
        // Overlapping the existing hut.
        let state = place_building(state, BuildingKind::Campfire, TilePos::new(5, 6));
        assert_eq!(state, before);
        // Unaffordable.
        let mut broke = state.clone();
        broke.inventory.wood = 0;
        let still_broke = place_building(broke.clone(), BuildingKind::Campfire, TilePos::new(9, 9));
        assert_eq!(still_broke, broke);
    }

    #[test]
    fn test_assign_job_detaches_from_workplace() {
        let state = test_state();
        let state = place_building(state, BuildingKind::GatherHut, TilePos::new(3, 3));
        let hut = first_building_of(&state, BuildingKind::GatherHut);
        let villager = *state.villagers.keys().next().expect("has villagers");

        let state = assign_villager_to_building(state, villager, Some(hut));
        assert_eq!(state.villagers[&villager].assigned_building, Some(hut));
        assert_eq!(state.buildings[&hut].assigned_villager_ids, vec![villager]);

        let state = assign_villager_job(state, villager, Job::Woodcutter);
        assert_eq!(state.villagers[&villager].job, Job::Woodcutter);
        assert_eq!(state.villagers[&villager].assigned_building, None);
        assert!(state.buildings[&hut].assigned_villager_ids.is_empty());
    }

    #[test]
    fn test_worker_capacity_leaves_overflow_unassigned() {
        let state = test_state();
        let state = place_building(state, BuildingKind::GatherHut, TilePos::new(3, 3));
        let hut = first_building_of(&state, BuildingKind::GatherHut);
        let ids: Vec<VillagerId> = state.villagers.keys().copied().collect();

        // Level 1 gather hut holds one worker.
        let state = assign_villager_to_building(state, ids[0], Some(hut));
        let state = assign_villager_to_building(state, ids[1], Some(hut));
        assert_eq!(state.buildings[&hut].assigned_villager_ids, vec![ids[0]]);
        assert_eq!(state.villagers[&ids[1]].assigned_building, None);
    }

    #[test]
    fn test_reassignment_detaches_even_when_target_is_full() {
        let state = test_state();
        let state = place_building(state, BuildingKind::GatherHut, TilePos::new(3, 3));
        let state = place_building(state, BuildingKind::Sawmill, TilePos::new(8, 8));
        let hut = first_building_of(&state, BuildingKind::GatherHut);
        let mill = first_building_of(&state, BuildingKind::Sawmill);
        let ids: Vec<VillagerId> = state.villagers.keys().copied().collect();

        let state = assign_villager_to_building(state, ids[0], Some(mill));
        let state = assign_villager_to_building(state, ids[1], Some(hut));
        // Mill is full (capacity 1); moving the hut worker there detaches it
        // from the hut and leaves it unassigned.
        let state = assign_villager_to_building(state, ids[1], Some(mill));
        assert_eq!(state.villagers[&ids[1]].assigned_building, None);
        assert!(state.buildings[&hut].assigned_villager_ids.is_empty());
        assert_eq!(state.buildings[&mill].assigned_villager_ids, vec![ids[0]]);
    }

    #[test]
    fn test_home_assignment_capacity() {
        let state = test_state();
        let state = place_building(state, BuildingKind::SleepHut, TilePos::new(3, 3));
        let hut = first_building_of(&state, BuildingKind::SleepHut);
        let ids: Vec<VillagerId> = state.villagers.keys().copied().collect();

        // Level 1 sleep hut houses two.
        let state = assign_villager_home(state, ids[0], Some(hut));
        let state = assign_villager_home(state, ids[1], Some(hut));
        let state = assign_villager_home(state, ids[2], Some(hut));
        assert_eq!(state.buildings[&hut].resident_ids, vec![ids[0], ids[1]]);
        assert_eq!(state.villagers[&ids[2]].home, None);

        // Eviction frees the slot.
        let state = assign_villager_home(state, ids[0], None);
        assert_eq!(state.villagers[&ids[0]].home, None);
        let state = assign_villager_home(state, ids[2], Some(hut));
        assert_eq!(state.buildings[&hut].resident_ids, vec![ids[1], ids[2]]);
    }

    #[test]
    fn test_start_task_pays_and_starts() {
        let state = test_state();
        let state = place_building(state, BuildingKind::Campfire, TilePos::new(4, 4));
        let fire = first_building_of(&state, BuildingKind::Campfire);
        let berries_before = state.inventory.berries;

        let state = start_building_task(state, fire, TaskId::Feast);
        let task = &state.buildings[&fire].task;
        assert!(task.started);
        assert_eq!(task.recipe, Some(TaskId::Feast));
        assert_eq!(state.inventory.berries, berries_before - 6);

        // Already running: rejected, unchanged.
        let before = state.clone();
        let state = start_building_task(state, fire, TaskId::Feast);
        assert_eq!(state, before);
    }

    #[test]
    fn test_start_task_wrong_host_rejected() {
        let state = test_state();
        let state = place_building(state, BuildingKind::Campfire, TilePos::new(4, 4));
        let fire = first_building_of(&state, BuildingKind::Campfire);
        let before = state.clone();
        let state = start_building_task(state, fire, TaskId::CutLumber);
        assert_eq!(state, before);
    }

    #[test]
    fn test_collect_requires_collectable() {
        let state = test_state();
        let state = place_building(state, BuildingKind::GatherHut, TilePos::new(3, 3));
        let hut = first_building_of(&state, BuildingKind::GatherHut);
        let before = state.clone();
        let state = collect_from_building(state, hut);
        assert_eq!(state, before);
    }

    #[test]
    fn test_collect_finite_resource_removes_building() {
        let mut state = test_state();
        let id = state.alloc_building_id();
        state
            .buildings
            .insert(id, Building::new(id, BuildingKind::Rock, TilePos::new(6, 6)));
        state.selection.building = Some(id);

        let state = collect_from_building(state, id);
        assert_eq!(state.inventory.stone, 102);
        assert!(!state.buildings.contains_key(&id));
        assert_eq!(state.selection.building, None);
        assert!(state.events.iter().any(|e| matches!(
            e.payload,
            GameEventPayload::BuildingRemoved {
                kind: BuildingKind::Rock,
                ..
            }
        )));
    }

    #[test]
    fn test_collect_bush_resets_instead_of_removing() {
        let mut state = test_state();
        let id = state.alloc_building_id();
        state.buildings.insert(
            id,
            Building::new(id, BuildingKind::BerryBush, TilePos::new(6, 6)),
        );

        let berries_before = state.inventory.berries;
        let state = collect_from_building(state, id);
        assert_eq!(state.inventory.berries, berries_before + 2);
        let task = &state.buildings[&id].task;
        assert!(!task.collectable);
        assert_eq!(task.progress_ms, 0.0);
        assert!(task.started);
    }

    #[test]
    fn test_collect_feast_feeds_everyone() {
        let mut state = test_state();
        for v in state.villagers.values_mut() {
            v.needs.hunger = 0.9;
        }
        let state = place_building(state, BuildingKind::Campfire, TilePos::new(4, 4));
        let fire = first_building_of(&state, BuildingKind::Campfire);
        let mut state = start_building_task(state, fire, TaskId::Feast);
        if let Some(b) = state.buildings.get_mut(&fire) {
            b.task.progress_ms = b.task.duration_ms;
            b.task.collectable = true;
        }

        let state = collect_from_building(state, fire);
        for v in state.villagers.values() {
            assert!((v.needs.hunger - 0.55).abs() < 1e-6);
        }
        assert_eq!(state.buildings[&fire].task, Task::idle());
    }

    #[test]
    fn test_upgrade_building() {
        let state = test_state();
        let state = place_building(state, BuildingKind::GatherHut, TilePos::new(3, 3));
        let hut = first_building_of(&state, BuildingKind::GatherHut);

        let state = upgrade_building(state, hut);
        let b = &state.buildings[&hut];
        assert_eq!(b.level, 2);
        assert_eq!(b.output.map(|y| y.amount), Some(9));
        assert_eq!(b.task.duration_ms, 40_000.0);
        assert_eq!(b.worker_capacity(), 2);

        // Walk to max level, then further upgrades are rejected.
        let state = upgrade_building(state, hut);
        assert_eq!(state.buildings[&hut].level, 3);
        let before = state.clone();
        let state = upgrade_building(state, hut);
        assert_eq!(state, before);
    }

    #[test]
    fn test_upgrade_unaffordable_rejected() {
        let state = test_state();
        let mut state = place_building(state, BuildingKind::GatherHut, TilePos::new(3, 3));
        let hut = first_building_of(&state, BuildingKind::GatherHut);
        state.inventory.wood = 0;
        state.inventory.stone = 0;
        let before = state.clone();
        let state = upgrade_building(state, hut);
        assert_eq!(state, before);
    }

    #[test]
    fn test_flag_and_selection_commands() {
        let state = test_state();
        let villager = *state.villagers.keys().next().expect("has villagers");

        let state = set_paused(state, true);
        assert!(state.flags.paused);
        let state = set_speed(state, Speed::Two);
        assert_eq!(state.flags.speed, Speed::Two);

        let state = select_villager(state, Some(villager));
        assert_eq!(state.selection.villager, Some(villager));
        let state = select_villager(state, Some(VillagerId(999)));
        assert_eq!(state.selection.villager, Some(villager));

        let state = set_placement(state, Some(BuildingKind::Sawmill));
        assert_eq!(state.placement, Some(BuildingKind::Sawmill));
        let state = set_placement(state, Some(BuildingKind::Tree));
        assert_eq!(state.placement, Some(BuildingKind::Sawmill));
        let state = set_placement(state, None);
        assert_eq!(state.placement, None);
    }
}
