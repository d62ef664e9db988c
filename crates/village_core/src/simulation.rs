//! Game creation and the pure tick transition.
//!
//! These are the two entry points a host loop needs: [`create_game`] turns a
//! seed into a fully populated starting state, and [`tick`] advances any
//! state by one frame. Neither touches IO, system time, or OS randomness, so
//! a seed plus a delta sequence always replays to the same state.

use tracing::debug;

use crate::buildings::BuildingKind;
use crate::data::tuning;
use crate::economy::Resource;
use crate::map_generation;
use crate::math::Vec2;
use crate::rng::{day_seed, Mulberry32};
use crate::state::{GameConfig, GameEventPayload, GameState, Phase, SpawnerState};
use crate::systems;
use crate::villagers::{Stats, Villager, NAMES};
use crate::world::TilePos;

/// Create a new game from a world seed with default settings.
#[must_use]
pub fn create_game(seed: u32) -> GameState {
    create_game_with_config(GameConfig::default().with_seed(seed))
}

/// Create a new game: generate the world, roll the starting party, stock the
/// larder, scatter the first natural resources, and schedule the spawners.
///
/// Everything random is drawn from the day-0 stream of the world seed, so a
/// seed fully determines the starting state.
#[must_use]
pub fn create_game_with_config(config: GameConfig) -> GameState {
    let world = map_generation::generate_world(&config.world);
    let mut state = GameState::empty(config, world);
    let mut rng = Mulberry32::new(day_seed(state.seed, 0));

    state.inventory.credit(Resource::Wood, tuning::INITIAL_WOOD);
    state.inventory.credit(Resource::Berries, tuning::INITIAL_BERRIES);

    // The party gathers near the most central land tile.
    let anchor = state.world.land_anchor().map_or_else(
        || {
            Vec2::new(
                state.world.width as f32 / 2.0,
                state.world.height as f32 / 2.0,
            )
        },
        TilePos::center,
    );
    for _ in 0..tuning::INITIAL_VILLAGERS {
        let name = NAMES[rng.range_usize(0, NAMES.len() - 1)].to_string();
        let stats = Stats::new(
            rng.range_u32(1, 10) as u8,
            rng.range_u32(1, 10) as u8,
            rng.range_u32(1, 10) as u8,
        );
        let dx = (rng.next_f32() - 0.5) * 4.0;
        let dy = (rng.next_f32() - 0.5) * 4.0;
        let mut pos = Vec2::new(anchor.x + dx, anchor.y + dy);
        let (tx, ty) = pos.to_tile();
        if !state.world.is_buildable(tx, ty) {
            pos = anchor;
        }
        let id = state.alloc_villager_id();
        state
            .villagers
            .insert(id, Villager::new(id, name, pos, stats));
    }

    // First natural resources. Trees fill the forest to its target ratio in
    // one go; the rest use their starting ranges.
    let trees = systems::tree_deficit(&state);
    systems::spawn_resources(&mut state, &mut rng, BuildingKind::Tree, trees, false);
    let rocks = rng.range_u32(tuning::INITIAL_ROCKS.0, tuning::INITIAL_ROCKS.1);
    systems::spawn_resources(&mut state, &mut rng, BuildingKind::Rock, rocks, false);
    let bushes = rng.range_u32(tuning::INITIAL_BERRY_BUSHES.0, tuning::INITIAL_BERRY_BUSHES.1);
    systems::spawn_resources(&mut state, &mut rng, BuildingKind::BerryBush, bushes, false);
    let mushrooms = rng.range_u32(tuning::INITIAL_MUSHROOMS.0, tuning::INITIAL_MUSHROOMS.1);
    systems::spawn_resources(&mut state, &mut rng, BuildingKind::Mushroom, mushrooms, false);

    let day = state.time.day;
    state.spawners = SpawnerState {
        rocks: day + rng.range_u32(tuning::RESPAWN_DAYS.0, tuning::RESPAWN_DAYS.1),
        trees: day + rng.range_u32(tuning::RESPAWN_DAYS.0, tuning::RESPAWN_DAYS.1),
        berries: day + rng.range_u32(tuning::RESPAWN_DAYS.0, tuning::RESPAWN_DAYS.1),
        mushrooms: day + rng.range_u32(tuning::RESPAWN_DAYS.0, tuning::RESPAWN_DAYS.1),
        dogs: day + rng.range_u32(tuning::DOG_RESPAWN_DAYS.0, tuning::DOG_RESPAWN_DAYS.1),
    };

    systems::refresh_alerts(&mut state);
    systems::evaluate_quests(&mut state);
    debug!(
        seed = state.seed,
        villagers = state.villagers.len(),
        buildings = state.buildings.len(),
        "game created"
    );
    state
}

/// Advance the simulation by one frame of `dt_ms` milliseconds.
///
/// The transition is pure: the result depends only on the input state and
/// the delta. Pause and speed scale the delta before any system runs, and a
/// zero scaled delta leaves the state unchanged.
#[must_use]
pub fn tick(state: GameState, dt_ms: f64) -> GameState {
    let mut state = state;
    let scaled = if state.flags.paused {
        0.0
    } else {
        dt_ms.max(0.0) * state.flags.speed.multiplier()
    };

    let ms_per_day = state.config.ms_per_day;
    let prev_minute = state.time.minute_of_day(ms_per_day);
    state.time.phase_elapsed_ms += scaled;
    state.time.total_ms += scaled;
    let new_minute = state.time.minute_of_day(ms_per_day);

    systems::process_minute_marks(&mut state, prev_minute, new_minute);
    systems::move_villagers(&mut state, scaled);
    systems::move_animals(&mut state, scaled);
    systems::drift_needs(&mut state, scaled);
    systems::progress_tasks(&mut state, scaled);

    // Phase rollover, carrying the remainder. A huge delta may cross several
    // phases; day and entry systems fire once per crossing.
    let phase_ms = state.config.phase_ms();
    while state.time.phase_elapsed_ms >= phase_ms {
        state.time.phase_elapsed_ms -= phase_ms;
        let entered = state.time.phase.next();
        state.time.phase = entered;
        match entered {
            Phase::Morning => {
                state.time.day += 1;
                let day = state.time.day;
                debug!(day, "day started");
                state.push_event(GameEventPayload::DayStarted { day });
                systems::run_spawners(&mut state);
            }
            Phase::Night => systems::apply_nightfall(&mut state),
            Phase::Day | Phase::Evening => {}
        }
    }

    systems::refresh_alerts(&mut state);
    systems::evaluate_quests(&mut state);
    state
}
