//! Per-tick subsystem passes, called by the tick loop in a fixed order.
//!
//! Every pass takes the whole state and the scaled frame delta. Iteration is
//! always in id order (the entity maps are `BTreeMap`s), so a pass is
//! deterministic for identical inputs.

use std::collections::BTreeSet;

use tracing::debug;

use crate::buildings::{Building, BuildingId, BuildingKind, TaskKind};
use crate::commands::remove_building;
use crate::data::tuning;
use crate::economy::Resource;
use crate::math::{clamp01, Vec2};
use crate::rng::{day_seed, hash2_unit, hash_u32, Mulberry32};
use crate::state::{GameEventPayload, GameState};
use crate::villagers::{Animal, AnimalBehavior, AnimalId, AnimalKind, Job, VillagerId};
use crate::world::{TileId, TilePos};

/// True when `mark` lies in the half-open minute interval `(prev, cur]`,
/// accounting for midnight wraparound.
fn crossed_minute(prev: u32, cur: u32, mark: u32) -> bool {
    if cur == prev {
        return false;
    }
    if cur > prev {
        mark > prev && mark <= cur
    } else {
        mark > prev || mark <= cur
    }
}

/// Fire the fixed daily schedule marks that the clock crossed this tick:
/// breakfast, work start, dinner, sleep start.
pub(crate) fn process_minute_marks(state: &mut GameState, prev_minute: u32, new_minute: u32) {
    if crossed_minute(prev_minute, new_minute, tuning::BREAKFAST_MINUTE) {
        debug!(day = state.time.day, "breakfast");
        consume_food(state);
    }
    if crossed_minute(prev_minute, new_minute, tuning::WORK_START_MINUTE) {
        state.flags.working = true;
        state.flags.sleeping = false;
        state.push_event(GameEventPayload::WorkStarted);
    }
    if crossed_minute(prev_minute, new_minute, tuning::DINNER_MINUTE) {
        debug!(day = state.time.day, "dinner");
        consume_food(state);
    }
    if crossed_minute(prev_minute, new_minute, tuning::SLEEP_START_MINUTE) {
        state.flags.sleeping = true;
        state.flags.working = false;
        state.push_event(GameEventPayload::SleepStarted);
    }
}

/// Serve a village meal: two berries per living villager, with effects
/// proportional to how much of the meal the stock covered.
pub(crate) fn consume_food(state: &mut GameState) {
    let living = state.living_count();
    if living == 0 {
        return;
    }
    let need = tuning::BERRIES_PER_MEAL * living;
    let consumed = state.inventory.take_up_to(Resource::Berries, need);
    let shortfall = need - consumed;
    let satiety = consumed as f32 / need as f32;

    for v in state.villagers.values_mut().filter(|v| v.alive) {
        v.needs.hunger = clamp01(v.needs.hunger - tuning::MEAL_HUNGER_RELIEF * satiety);
        v.needs.energy = clamp01(v.needs.energy + tuning::MEAL_ENERGY_GAIN * satiety);
        v.stats.morale = clamp01(v.stats.morale + tuning::MEAL_MORALE_GAIN * satiety);
        if shortfall > 0 {
            v.stats.morale =
                clamp01(v.stats.morale - tuning::SHORTAGE_MORALE_PENALTY * (1.0 - satiety));
            v.needs.hunger =
                clamp01(v.needs.hunger + tuning::SHORTAGE_HUNGER_REBOUND * (1.0 - satiety));
        }
    }

    if consumed > 0 {
        state.push_event(GameEventPayload::ResourceSpent {
            resource: Resource::Berries,
            amount: consumed,
        });
    }
    if shortfall > 0 {
        debug!(shortfall, "food shortage");
        state.push_event(GameEventPayload::FoodShortage { missing: shortfall });
    }
}

/// Where a villager wants to be right now, plus the resource it intends to
/// harvest when the goal is a fetch run.
fn villager_goal(state: &GameState, villager: &crate::villagers::Villager) -> (Option<Vec2>, Option<BuildingId>) {
    // Specialist fetch: a gatherer or woodcutter serving a hut with a
    // running task walks out to the nearest matching resource.
    if matches!(villager.job, Job::Gatherer | Job::Woodcutter) {
        if let Some(hut) = villager
            .assigned_building
            .and_then(|bid| state.buildings.get(&bid))
        {
            let job_matches = matches!(
                (villager.job, hut.kind),
                (Job::Gatherer, BuildingKind::GatherHut) | (Job::Woodcutter, BuildingKind::Sawmill)
            );
            if job_matches && hut.task.started && !hut.task.blocked {
                if hut.task.collectable {
                    return (Some(hut.center()), None);
                }
                let targets = hut.kind.gather_targets();
                if let Some(resource) = state.nearest_building(villager.pos, |b| {
                    targets.contains(&b.kind) && b.task.collectable
                }) {
                    return (Some(resource.center()), Some(resource.id));
                }
                return (Some(hut.center()), None);
            }
        }
    }
    if state.flags.sleeping {
        if let Some(home) = villager.home.and_then(|bid| state.buildings.get(&bid)) {
            return (Some(home.center()), None);
        }
    }
    if state.flags.working {
        if let Some(work) = villager
            .assigned_building
            .and_then(|bid| state.buildings.get(&bid))
        {
            return (Some(work.center()), None);
        }
    }
    if let Some(fire) = state.nearest_building(villager.pos, |b| b.kind == BuildingKind::Campfire)
    {
        return (Some(fire.center()), None);
    }
    (None, None)
}

/// Move villagers toward their goals, handle facing, idle wander, and
/// harvest-on-touch.
pub(crate) fn move_villagers(state: &mut GameState, dt_ms: f64) {
    if dt_ms <= 0.0 {
        return;
    }
    let step = (f64::from(tuning::VILLAGER_SPEED) * dt_ms) as f32;
    let total_ms = state.time.total_ms;
    let ids: Vec<VillagerId> = state.villagers.keys().copied().collect();

    for id in ids {
        let Some(v) = state.villagers.get(&id) else {
            continue;
        };
        if !v.alive {
            continue;
        }
        let pos = v.pos;
        let job = v.job;
        let facing_changed_at = v.facing_changed_at;
        let (target, fetch) = villager_goal(state, v);

        let mut new_pos = pos;
        if let Some(goal) = target {
            let arrived = pos.distance(goal) <= tuning::HARVEST_RADIUS;
            if !arrived {
                new_pos = pos.step_toward(goal, step);
            } else if fetch.is_none() {
                // Parked at the goal: orbit it slightly so a crowd does not
                // stack on one point.
                let unit = f64::from(hash_u32(id.0)) / f64::from(u32::MAX);
                let angle = unit * std::f64::consts::TAU + total_ms * tuning::IDLE_WANDER_RATE;
                new_pos = Vec2::new(
                    goal.x + (angle.cos() as f32) * tuning::IDLE_WANDER_RADIUS,
                    goal.y + (angle.sin() as f32) * tuning::IDLE_WANDER_RADIUS,
                );
            }
        }

        let dx = new_pos.x - pos.x;
        if let Some(v) = state.villagers.get_mut(&id) {
            v.pos = new_pos;
            if dx.abs() > tuning::FACING_DEADZONE
                && total_ms - facing_changed_at >= tuning::FACING_COOLDOWN_MS
            {
                let desired = if dx < 0.0 {
                    crate::villagers::Facing::Left
                } else {
                    crate::villagers::Facing::Right
                };
                if v.facing != desired {
                    v.facing = desired;
                    v.facing_changed_at = total_ms;
                }
            }
        }

        // Specialist touch: mark the fetched resource harvested. The yield
        // is credited later through the hut's own task collection.
        if let Some(rid) = fetch {
            let touched = state
                .buildings
                .get(&rid)
                .map_or(false, |r| new_pos.distance(r.center()) <= tuning::HARVEST_RADIUS);
            if touched {
                let kind = state.buildings.get(&rid).map(|r| r.kind);
                match kind {
                    Some(k) if k.is_renewable_resource() => {
                        if let Some(r) = state.buildings.get_mut(&rid) {
                            r.task.reset();
                        }
                    }
                    Some(k) => remove_building(state, rid, k),
                    None => {}
                }
            }
        }

        // Laborers pick up whatever harvestable they step on.
        if job == Job::Laborer {
            let touch = state
                .buildings
                .values()
                .find(|b| {
                    b.kind.is_contact_harvestable()
                        && b.task.collectable
                        && new_pos.distance(b.center()) <= tuning::HARVEST_RADIUS
                })
                .map(|b| (b.id, b.kind, b.output));
            if let Some((bid, kind, output)) = touch {
                if let Some(y) = output {
                    let stored = state.inventory.credit(y.resource, y.amount);
                    state.push_event(GameEventPayload::ResourceCollected {
                        resource: y.resource,
                        amount: stored,
                    });
                }
                remove_building(state, bid, kind);
            }
        }
    }
}

/// Pick a wander destination near `from`, derived from the animal id and the
/// current retarget window; stays on land.
fn wander_target(state: &GameState, id: AnimalId, from: Vec2, window: i32) -> Option<Vec2> {
    let salt = state.seed ^ 0x0DD0_F00D;
    let angle = f64::from(hash2_unit(id.0 as i32, window, salt)) * std::f64::consts::TAU;
    let reach =
        hash2_unit(id.0 as i32, window.wrapping_add(7919), salt) * tuning::ANIMAL_WANDER_RANGE;
    let candidate = Vec2::new(
        from.x + (angle.cos() as f32) * reach,
        from.y + (angle.sin() as f32) * reach,
    );
    let (tx, ty) = candidate.to_tile();
    if state.world.is_buildable(tx, ty) {
        Some(candidate)
    } else {
        None
    }
}

/// Move animals: idle ones pick a wander leg, wanderers walk it, followers
/// trail their villager.
pub(crate) fn move_animals(state: &mut GameState, dt_ms: f64) {
    if dt_ms <= 0.0 {
        return;
    }
    let step = (f64::from(tuning::ANIMAL_SPEED) * dt_ms) as f32;
    // New wander legs start every few seconds of scaled time.
    let window = (state.time.total_ms / tuning::ANIMAL_RETARGET_MS) as i32;
    let ids: Vec<AnimalId> = state.animals.keys().copied().collect();

    for id in ids {
        let Some(animal) = state.animals.get(&id) else {
            continue;
        };
        match animal.behavior {
            AnimalBehavior::Dead => {}
            AnimalBehavior::Idle => {
                if let Some(target) = wander_target(state, id, animal.pos, window) {
                    if let Some(a) = state.animals.get_mut(&id) {
                        a.behavior = AnimalBehavior::Wandering { target };
                    }
                }
            }
            AnimalBehavior::Wandering { target } => {
                let pos = animal.pos;
                let next = pos.step_toward(target, step);
                let arrived = next.distance(target) <= 0.1;
                let retarget = if arrived {
                    wander_target(state, id, next, window)
                } else {
                    None
                };
                if let Some(a) = state.animals.get_mut(&id) {
                    a.pos = next;
                    if arrived {
                        a.behavior = match retarget {
                            Some(t) => AnimalBehavior::Wandering { target: t },
                            None => AnimalBehavior::Idle,
                        };
                    }
                }
            }
            AnimalBehavior::Following { villager } => {
                let target = state.villagers.get(&villager).map(|v| v.pos);
                if let Some(a) = state.animals.get_mut(&id) {
                    if let Some(t) = target {
                        a.pos = a.pos.step_toward(t, step);
                    }
                }
            }
        }
    }
}

/// Continuous needs drift. Rates depend on the schedule flags and whether
/// the villager has a workplace.
pub(crate) fn drift_needs(state: &mut GameState, dt_ms: f64) {
    let sleeping = state.flags.sleeping;
    let working = state.flags.working;
    for v in state.villagers.values_mut().filter(|v| v.alive) {
        let hunger_rate = if sleeping {
            tuning::HUNGER_RATE_SLEEPING
        } else {
            tuning::HUNGER_RATE_AWAKE
        };
        v.needs.hunger = clamp01(v.needs.hunger + (hunger_rate * dt_ms) as f32);

        let energy_delta = if sleeping {
            tuning::ENERGY_REGEN_SLEEPING * dt_ms
        } else if working && v.assigned_building.is_some() {
            -(tuning::ENERGY_DRAIN_WORKING * dt_ms)
        } else {
            -(tuning::ENERGY_DRAIN_IDLE * dt_ms)
        };
        v.needs.energy = clamp01(v.needs.energy + energy_delta as f32);
    }
}

/// Advance building tasks. Production needs working hours and, where the
/// building has worker slots, at least one assigned worker. Growth is
/// passive.
pub(crate) fn progress_tasks(state: &mut GameState, dt_ms: f64) {
    let working = state.flags.working;
    for b in state.buildings.values_mut() {
        match b.task.kind {
            TaskKind::Grow => {
                b.task.advance(dt_ms);
            }
            TaskKind::Produce => {
                let needs_workers = b.worker_capacity() > 0;
                if working && (!needs_workers || !b.assigned_villager_ids.is_empty())
                    && b.task.advance(dt_ms)
                {
                    debug!(building = ?b.id, kind = ?b.kind, "task complete");
                }
            }
            TaskKind::Idle => {}
        }
    }
}

/// Nightfall check: hungry or exhausted villagers lose morale overnight.
pub(crate) fn apply_nightfall(state: &mut GameState) {
    for v in state.villagers.values_mut().filter(|v| v.alive) {
        if v.needs.hunger > tuning::NIGHT_HUNGER_THRESHOLD {
            v.stats.morale = clamp01(v.stats.morale - tuning::NIGHT_MORALE_PENALTY);
        }
        if v.needs.energy < tuning::NIGHT_ENERGY_THRESHOLD {
            v.stats.morale = clamp01(v.stats.morale - tuning::NIGHT_MORALE_PENALTY);
        }
    }
}

fn severity(value: f32, warn: f32, critical: f32) -> u8 {
    if value >= critical {
        2
    } else if value >= warn {
        1
    } else {
        0
    }
}

/// Recompute alert severities from villager aggregates.
pub(crate) fn refresh_alerts(state: &mut GameState) {
    let mut max_hunger = 0.0_f32;
    let mut max_illness = 0.0_f32;
    for v in state.living_villagers() {
        max_hunger = max_hunger.max(v.needs.hunger);
        max_illness = max_illness.max(v.needs.illness);
    }
    state.alerts.hunger = severity(max_hunger, tuning::HUNGER_ALERT_WARN, tuning::HUNGER_ALERT_CRITICAL);
    state.alerts.illness = severity(
        max_illness,
        tuning::ILLNESS_ALERT_WARN,
        tuning::ILLNESS_ALERT_CRITICAL,
    );
    // No combat rules yet; the category exists so the alert surface is
    // complete.
    state.alerts.attack = 0;
}

/// Recompute the tutorial chain from building presence.
pub(crate) fn evaluate_quests(state: &mut GameState) {
    let counts: Vec<u32> = state
        .quests
        .iter()
        .map(|q| state.count_buildings(q.kind.required_building()) as u32)
        .collect();

    let mut completed = Vec::new();
    let mut prev_done = true;
    for (quest, count) in state.quests.iter_mut().zip(counts) {
        let was_done = quest.done;
        quest.progress = count.min(quest.goal);
        quest.done = quest.progress >= quest.goal;
        quest.locked = !prev_done;
        if quest.done && !was_done {
            completed.push(quest.kind);
        }
        prev_done = quest.done;
    }
    for quest in completed {
        debug!(?quest, "quest completed");
        state.push_event(GameEventPayload::QuestCompleted { quest });
    }
}

/// Tiles covered by any building footprint.
fn occupied_tiles(state: &GameState) -> BTreeSet<(u32, u32)> {
    let mut occupied = BTreeSet::new();
    for b in state.buildings.values() {
        let (w, h) = b.footprint();
        for y in b.pos.y..b.pos.y + h {
            for x in b.pos.x..b.pos.x + w {
                occupied.insert((x, y));
            }
        }
    }
    occupied
}

/// Free tiles whose terrain suits a natural resource kind.
fn eligible_tiles(state: &GameState, kind: BuildingKind) -> Vec<TilePos> {
    let occupied = occupied_tiles(state);
    let mut tiles = Vec::new();
    for y in 0..state.world.height {
        for x in 0..state.world.width {
            if occupied.contains(&(x, y)) {
                continue;
            }
            let Some(tile) = state.world.tile(x, y) else {
                continue;
            };
            let suits = match kind {
                BuildingKind::Tree | BuildingKind::Mushroom => tile == TileId::Forest,
                BuildingKind::Rock => {
                    matches!(tile, TileId::Rock | TileId::Mountain | TileId::Dirt)
                }
                BuildingKind::BerryBush => matches!(tile, TileId::Meadow | TileId::Grass),
                _ => false,
            };
            if suits {
                tiles.push(TilePos::new(x, y));
            }
        }
    }
    tiles
}

/// Place up to `count` natural resources on eligible tiles. Returns how many
/// were placed.
pub(crate) fn spawn_resources(
    state: &mut GameState,
    rng: &mut Mulberry32,
    kind: BuildingKind,
    count: u32,
    announce: bool,
) -> u32 {
    let mut candidates = eligible_tiles(state, kind);
    let mut placed = 0;
    for _ in 0..count {
        if candidates.is_empty() {
            break;
        }
        let idx = rng.range_usize(0, candidates.len() - 1);
        let pos = candidates.swap_remove(idx);
        let id = state.alloc_building_id();
        state.buildings.insert(id, Building::new(id, kind, pos));
        placed += 1;
    }
    if announce && placed > 0 {
        state.push_event(GameEventPayload::ResourcesSpawned {
            kind,
            count: placed,
        });
    }
    placed
}

/// Place up to `count` dogs on free forest tiles. Returns how many spawned.
pub(crate) fn spawn_dogs(
    state: &mut GameState,
    rng: &mut Mulberry32,
    count: u32,
    announce: bool,
) -> u32 {
    let mut candidates = eligible_tiles(state, BuildingKind::Tree);
    let mut placed = 0;
    for _ in 0..count {
        if candidates.is_empty() {
            break;
        }
        let idx = rng.range_usize(0, candidates.len() - 1);
        let pos = candidates.swap_remove(idx);
        let id = state.alloc_animal_id();
        state
            .animals
            .insert(id, Animal::new(id, AnimalKind::Dog, pos.center()));
        if announce {
            state.push_event(GameEventPayload::AnimalSpawned { animal: id });
        }
        placed += 1;
    }
    placed
}

/// How many trees the spawner would add to reach the forest fill ratio.
pub(crate) fn tree_deficit(state: &GameState) -> u32 {
    let forest_tiles = state.world.count(TileId::Forest) as f32;
    let target = (forest_tiles * tuning::TREE_FILL_RATIO).round() as u32;
    let live = state.count_buildings(BuildingKind::Tree) as u32;
    target.saturating_sub(live)
}

/// Morning spawner pass: every category whose day has come runs with the
/// day-seeded stream and reschedules itself.
pub(crate) fn run_spawners(state: &mut GameState) {
    let day = state.time.day;
    let mut rng = Mulberry32::new(day_seed(state.seed, day));

    if day >= state.spawners.rocks {
        let count = rng.range_u32(tuning::ROCK_SPAWN.0, tuning::ROCK_SPAWN.1);
        spawn_resources(state, &mut rng, BuildingKind::Rock, count, true);
        state.spawners.rocks = day + rng.range_u32(tuning::RESPAWN_DAYS.0, tuning::RESPAWN_DAYS.1);
    }
    if day >= state.spawners.trees {
        let count = tree_deficit(state).min(tuning::TREE_SPAWN_CAP);
        spawn_resources(state, &mut rng, BuildingKind::Tree, count, true);
        state.spawners.trees = day + rng.range_u32(tuning::RESPAWN_DAYS.0, tuning::RESPAWN_DAYS.1);
    }
    if day >= state.spawners.berries {
        let count = rng.range_u32(tuning::BERRY_SPAWN.0, tuning::BERRY_SPAWN.1);
        spawn_resources(state, &mut rng, BuildingKind::BerryBush, count, true);
        state.spawners.berries =
            day + rng.range_u32(tuning::RESPAWN_DAYS.0, tuning::RESPAWN_DAYS.1);
    }
    if day >= state.spawners.mushrooms {
        let count = rng.range_u32(tuning::MUSHROOM_SPAWN.0, tuning::MUSHROOM_SPAWN.1);
        spawn_resources(state, &mut rng, BuildingKind::Mushroom, count, true);
        state.spawners.mushrooms =
            day + rng.range_u32(tuning::RESPAWN_DAYS.0, tuning::RESPAWN_DAYS.1);
    }
    if day >= state.spawners.dogs {
        let count = rng.range_u32(tuning::DOG_SPAWN.0, tuning::DOG_SPAWN.1);
        spawn_dogs(state, &mut rng, count, true);
        state.spawners.dogs =
            day + rng.range_u32(tuning::DOG_RESPAWN_DAYS.0, tuning::DOG_RESPAWN_DAYS.1);
    }
    debug!(day, spawners = ?state.spawners, "spawner pass done");
}
