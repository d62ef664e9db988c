//! Scripted multi-day soak runs.
//!
//! A soak run simulates whole in-game days at a fixed frame delta while a
//! small [`Script`] plays the village: it places buildings as the stock
//! allows, staffs the workplaces, keeps production running, and collects
//! finished work. Every script decision reads only game state, so two runs
//! with the same configuration produce identical histories.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use village_core::buildings::{BuildingId, BuildingKind, TaskId, TaskKind};
use village_core::commands;
use village_core::data::building_specs::place_cost;
use village_core::economy::{Cost, Inventory, Resource};
use village_core::simulation::{create_game_with_config, tick};
use village_core::state::{GameConfig, GameEventPayload, GameState, Speed};
use village_core::villagers::{Job, VillagerId};
use village_core::world::TilePos;

/// Fixed frame delta for soak runs, ms.
pub const TICK_MS: f64 = 250.0;

/// How often the script hand-collects a natural resource to fund the next
/// building, in ticks. Paces construction the way a player clicking
/// resources would instead of strip-mining the map instantly.
const FUND_EVERY_TICKS: u64 = 8;

/// Configuration for one soak run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Game configuration (world size, seed, day length).
    pub game: GameConfig,
    /// Number of whole days to simulate.
    pub days: u32,
    /// Simulation speed.
    pub speed: Speed,
    /// Drive the scripted build-out. When `false` the village runs
    /// unmanaged: villagers idle around the anchor and nothing is built.
    pub script: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            days: 3,
            speed: Speed::One,
            script: true,
        }
    }
}

/// End-of-day snapshot, captured at the dawn that closes the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    /// The day that just ended.
    pub day: u32,
    /// Living villagers.
    pub living: u32,
    /// Village stock at dawn.
    pub inventory: Inventory,
    /// Mean villager hunger, 0..=1.
    pub hunger_avg: f32,
    /// Mean villager morale, 0..=1.
    pub morale_avg: f32,
    /// Food shortage events during the day.
    pub shortages: u32,
    /// Total buildings on the map, naturals included.
    pub buildings: u32,
}

impl DaySummary {
    fn capture(day: u32, shortages: u32, state: &GameState) -> Self {
        let living = state.living_count().max(1);
        let mut hunger = 0.0f32;
        let mut morale = 0.0f32;
        for v in state.living_villagers() {
            hunger += v.needs.hunger;
            morale += v.stats.morale;
        }
        Self {
            day,
            living: state.living_count(),
            inventory: state.inventory,
            hunger_avg: hunger / living as f32,
            morale_avg: morale / living as f32,
            shortages,
            buildings: state.buildings.len() as u32,
        }
    }
}

/// Summary of a finished soak run, suitable for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// World seed the run used.
    pub seed: u32,
    /// Days the caller asked for.
    pub days_requested: u32,
    /// Days actually completed before the tick bound hit.
    pub days_completed: u32,
    /// Frames simulated.
    pub ticks: u64,
    /// Simulated time covered, ms.
    pub sim_ms: f64,
    /// Wall-clock duration, seconds.
    pub wall_seconds: f64,
    /// Hash of the final state, for replay comparison.
    pub state_hash: u64,
    /// Completed quests.
    pub quests_done: u32,
    /// Total quests.
    pub quests_total: u32,
    /// Final village stock.
    pub final_inventory: Inventory,
    /// Per-day history.
    pub days: Vec<DaySummary>,
}

/// A finished soak run: the report plus the final state for snapshots.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Run summary.
    pub report: RunReport,
    /// Final game state.
    pub state: GameState,
}

/// Simulate `config.days` whole days and report per-day summaries.
///
/// The loop is bounded: it stops after one day's worth of ticks past the
/// requested horizon even if the day counter never reaches it.
#[must_use]
pub fn run(config: &RunConfig) -> RunOutcome {
    let started = Instant::now();
    let mut state = create_game_with_config(config.game);
    if config.speed != Speed::One {
        state = commands::set_speed(state, config.speed);
    }

    let ms_per_tick = TICK_MS * config.speed.multiplier();
    let ticks_per_day = (config.game.ms_per_day / ms_per_tick).ceil() as u64;
    let max_ticks = ticks_per_day * (u64::from(config.days) + 1);
    let target_day = config.days + 1;

    let mut script = config.script.then(Script::default);
    let mut days = Vec::with_capacity(config.days as usize);
    let mut ticks = 0u64;
    let mut seen_events = 0usize;

    info!(
        seed = config.game.world.seed,
        days = config.days,
        speed = config.speed.multiplier(),
        scripted = config.script,
        "Starting soak run"
    );

    while state.time.day < target_day && ticks < max_ticks {
        if let Some(s) = script.as_mut() {
            state = s.step(state, ticks);
        }
        let day_before = state.time.day;
        state = tick(state, TICK_MS);
        ticks += 1;

        if state.time.day > day_before {
            let shortages = state.events[seen_events..]
                .iter()
                .filter(|e| matches!(e.payload, GameEventPayload::FoodShortage { .. }))
                .count() as u32;
            seen_events = state.events.len();
            let summary = DaySummary::capture(day_before, shortages, &state);
            info!(
                day = summary.day,
                living = summary.living,
                wood = summary.inventory.wood,
                stone = summary.inventory.stone,
                berries = summary.inventory.berries,
                hunger_avg = format!("{:.2}", summary.hunger_avg),
                morale_avg = format!("{:.2}", summary.morale_avg),
                shortages = summary.shortages,
                "Day complete"
            );
            days.push(summary);
        }
    }

    let report = RunReport {
        seed: config.game.world.seed,
        days_requested: config.days,
        days_completed: days.len() as u32,
        ticks,
        sim_ms: state.time.total_ms,
        wall_seconds: started.elapsed().as_secs_f64(),
        state_hash: state.state_hash(),
        quests_done: state.quests.iter().filter(|q| q.done).count() as u32,
        quests_total: state.quests.len() as u32,
        final_inventory: state.inventory,
        days,
    };

    info!(
        days_completed = report.days_completed,
        ticks = report.ticks,
        wall_seconds = format!("{:.2}", report.wall_seconds),
        state_hash = format!("{:016x}", report.state_hash),
        "Soak run finished"
    );

    RunOutcome { report, state }
}

/// Deterministic build-out driver.
///
/// Places the five placeable kinds in a fixed order as resources allow,
/// hand-collects nearby naturals to fund the next placement, staffs the
/// gather hut and sawmill, houses villagers, and collects finished
/// production every step.
#[derive(Debug, Default)]
pub struct Script {
    next_build: usize,
}

impl Script {
    const BUILD_ORDER: [BuildingKind; 5] = [
        BuildingKind::Campfire,
        BuildingKind::GatherHut,
        BuildingKind::SleepHut,
        BuildingKind::Sawmill,
        BuildingKind::Townhall,
    ];

    /// Issue this step's commands against `state` and return it.
    #[must_use]
    pub fn step(&mut self, mut state: GameState, tick_index: u64) -> GameState {
        state = self.advance_build_order(state, tick_index);
        state = Self::staff_workplaces(state);
        state = Self::house_villagers(state);
        state = Self::feast_when_hungry(state);
        state = Self::collect_finished(state);
        state
    }

    fn advance_build_order(&mut self, mut state: GameState, tick_index: u64) -> GameState {
        let Some(&kind) = Self::BUILD_ORDER.get(self.next_build) else {
            return state;
        };
        let Some(cost) = place_cost(kind) else {
            return state;
        };

        if !state.inventory.can_afford(&cost) {
            if tick_index % FUND_EVERY_TICKS == 0 {
                state = Self::fund(state, &cost);
            }
            return state;
        }

        if let Some(pos) = find_spot(&state, kind) {
            let before = state.buildings.len();
            state = commands::place_building(state, kind, pos);
            if state.buildings.len() > before {
                info!(kind = ?kind, x = pos.x, y = pos.y, "Script placed building");
                self.next_build += 1;
            }
        } else {
            debug!(kind = ?kind, "Script found no free spot");
            self.next_build += 1;
        }
        state
    }

    /// Hand-collect the nearest natural that pays toward `cost`.
    fn fund(mut state: GameState, cost: &Cost) -> GameState {
        let need = if state.inventory.get(Resource::Wood) < cost.wood {
            BuildingKind::Tree
        } else if state.inventory.get(Resource::Stone) < cost.stone {
            BuildingKind::Rock
        } else {
            return state;
        };
        let Some(from) = state.living_villagers().next().map(|v| v.pos) else {
            return state;
        };
        let pick = state
            .nearest_building(from, |b| b.kind == need && b.task.collectable)
            .map(|b| b.id);
        if let Some(id) = pick {
            state = commands::collect_from_building(state, id);
        }
        state
    }

    fn staff_workplaces(mut state: GameState) -> GameState {
        for (kind, job, task) in [
            (BuildingKind::GatherHut, Job::Gatherer, TaskId::Forage),
            (BuildingKind::Sawmill, Job::Woodcutter, TaskId::CutLumber),
        ] {
            let Some(workplace) = state
                .buildings
                .values()
                .find(|b| b.kind == kind)
                .map(|b| (b.id, b.assigned_villager_ids.is_empty(), b.task.started))
            else {
                continue;
            };
            let (id, vacant, started) = workplace;
            if vacant {
                let recruit = state
                    .living_villagers()
                    .find(|v| v.job == Job::Laborer && v.assigned_building.is_none())
                    .map(|v| v.id);
                if let Some(villager) = recruit {
                    state = commands::assign_villager_job(state, villager, job);
                    state = commands::assign_villager_to_building(state, villager, Some(id));
                }
            }
            if !started {
                state = commands::start_building_task(state, id, task);
            }
        }
        state
    }

    fn house_villagers(mut state: GameState) -> GameState {
        let Some((hut, free)) = state
            .buildings
            .values()
            .find(|b| b.kind == BuildingKind::SleepHut)
            .map(|b| (b.id, b.resident_capacity().saturating_sub(b.resident_ids.len())))
        else {
            return state;
        };
        if free == 0 {
            return state;
        }
        let homeless: Vec<VillagerId> = state
            .living_villagers()
            .filter(|v| v.home.is_none())
            .map(|v| v.id)
            .take(free)
            .collect();
        for id in homeless {
            state = commands::assign_villager_home(state, id, Some(hut));
        }
        state
    }

    /// Throw a feast when someone is hungry and the larder can spare it.
    fn feast_when_hungry(mut state: GameState) -> GameState {
        let Some(fire) = state
            .buildings
            .values()
            .find(|b| b.kind == BuildingKind::Campfire && b.task.kind == TaskKind::Idle)
            .map(|b| b.id)
        else {
            return state;
        };
        let hungry = state.living_villagers().any(|v| v.needs.hunger > 0.6);
        if hungry && state.inventory.berries >= 20 && state.inventory.wood >= 10 {
            state = commands::start_building_task(state, fire, TaskId::Feast);
        }
        state
    }

    fn collect_finished(mut state: GameState) -> GameState {
        let ready: Vec<BuildingId> = state
            .buildings
            .values()
            .filter(|b| b.kind.is_placeable() && b.task.collectable)
            .map(|b| b.id)
            .collect();
        for id in ready {
            state = commands::collect_from_building(state, id);
        }
        state
    }
}

/// First tile (row-major) where a `kind` footprint fits on buildable,
/// unoccupied ground.
#[must_use]
pub fn find_spot(state: &GameState, kind: BuildingKind) -> Option<TilePos> {
    let (w, h) = kind.footprint();
    for y in 0..state.world.height.saturating_sub(h) {
        for x in 0..state.world.width.saturating_sub(w) {
            let clear = (0..h).all(|dy| {
                (0..w).all(|dx| {
                    state.world.is_buildable(x + dx, y + dy)
                        && state.building_covering(x + dx, y + dy).is_none()
                })
            });
            if clear {
                return Some(TilePos::new(x, y));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(seed: u32) -> RunConfig {
        let mut game = GameConfig::default().with_seed(seed);
        game.world.width = 48;
        game.world.height = 32;
        RunConfig {
            game,
            days: 1,
            speed: Speed::One,
            script: true,
        }
    }

    #[test]
    fn test_one_day_yields_one_summary() {
        let outcome = run(&small_config(11));
        assert_eq!(outcome.report.days_completed, 1);
        assert_eq!(outcome.report.days.len(), 1);
        assert_eq!(outcome.report.days[0].day, 1);
        assert_eq!(outcome.state.time.day, 2);
        // 480_000 ms per day at 250 ms per tick
        assert_eq!(outcome.report.ticks, 1920);
    }

    #[test]
    fn test_script_builds_and_staffs_the_village() {
        let mut config = small_config(11);
        config.days = 2;
        let outcome = run(&config);
        let state = &outcome.state;

        assert_eq!(state.count_buildings(BuildingKind::Campfire), 1);
        assert_eq!(state.count_buildings(BuildingKind::GatherHut), 1);
        assert_eq!(state.count_buildings(BuildingKind::SleepHut), 1);

        let hut = state
            .buildings
            .values()
            .find(|b| b.kind == BuildingKind::GatherHut)
            .unwrap();
        assert_eq!(hut.assigned_villager_ids.len(), 1);
        assert!(hut.task.started);
    }

    #[test]
    fn test_runs_replay_identically() {
        let mut config = small_config(77);
        config.days = 2;
        let a = run(&config);
        let b = run(&config);
        assert_eq!(a.report.state_hash, b.report.state_hash);
        assert_eq!(a.report.days, b.report.days);
    }

    #[test]
    fn test_unmanaged_run_places_nothing() {
        let mut config = small_config(11);
        config.script = false;
        let outcome = run(&config);
        assert_eq!(outcome.state.time.day, 2);
        assert_eq!(outcome.state.count_buildings(BuildingKind::Campfire), 0);
        assert_eq!(outcome.state.count_buildings(BuildingKind::GatherHut), 0);
    }

    #[test]
    fn test_double_speed_halves_the_tick_count() {
        let mut config = small_config(11);
        config.speed = Speed::Two;
        let outcome = run(&config);
        assert_eq!(outcome.report.ticks, 960);
        assert_eq!(outcome.state.time.day, 2);
    }

    #[test]
    fn test_find_spot_avoids_existing_buildings() {
        let config = small_config(5);
        let state = create_game_with_config(config.game);
        let spot = find_spot(&state, BuildingKind::Townhall).unwrap();
        for dy in 0..3 {
            for dx in 0..3 {
                assert!(state.world.is_buildable(spot.x + dx, spot.y + dy));
                assert!(state.building_covering(spot.x + dx, spot.y + dy).is_none());
            }
        }
    }
}
