//! Determinism tests for the full simulation.
//!
//! A seed plus a sequence of deltas and commands must always replay to the
//! same state. Sources of non-determinism these tests guard against:
//!
//! - **Map iteration order**: entity maps are `BTreeMap`s keyed by id, so
//!   every pass visits entities in the same order.
//! - **System randomness**: every draw comes from seeded streams; nothing
//!   reads OS entropy.
//! - **Wall clock**: time only advances through explicit frame deltas.

use proptest::prelude::*;

use village_core::commands;
use village_core::prelude::*;
use village_core::world::TilePos;

fn small_config(seed: u32) -> GameConfig {
    GameConfig {
        world: WorldConfig::default().with_size(48, 32).with_seed(seed),
        ..GameConfig::default()
    }
}

/// First spot whose `w x h` footprint is clear land, scanning row-major.
fn find_spot(state: &GameState, w: u32, h: u32) -> Option<TilePos> {
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

/// Create a game, run a fixed build-out script, then tick for a while.
fn scripted_run(seed: u32, ticks: u32, dt_ms: f64) -> GameState {
    let mut state = create_game_with_config(small_config(seed));

    if let Some(spot) = find_spot(&state, 1, 1) {
        state = commands::place_building(state, BuildingKind::Campfire, spot);
    }
    if let Some(spot) = find_spot(&state, 2, 2) {
        state = commands::place_building(state, BuildingKind::GatherHut, spot);
    }
    let hut = state
        .buildings
        .values()
        .find(|b| b.kind == BuildingKind::GatherHut)
        .map(|b| b.id);
    let villager = state.villagers.keys().copied().next();
    if let (Some(hut), Some(villager)) = (hut, villager) {
        state = commands::assign_villager_job(state, villager, Job::Gatherer);
        state = commands::assign_villager_to_building(state, villager, Some(hut));
        state = commands::start_building_task(state, hut, TaskId::Forage);
    }

    for _ in 0..ticks {
        state = tick(state, dt_ms);
    }
    state
}

#[test]
fn test_same_seed_replays_identically() {
    let a = scripted_run(7, 400, 125.0);
    let b = scripted_run(7, 400, 125.0);
    assert_eq!(a.state_hash(), b.state_hash());
    assert_eq!(a, b);
}

#[test]
fn test_event_logs_match_between_replays() {
    let a = scripted_run(19, 300, 200.0);
    let b = scripted_run(19, 300, 200.0);
    assert_eq!(a.events.len(), b.events.len());
    assert_eq!(a.events, b.events);
}

#[test]
fn test_different_seeds_diverge() {
    let a = scripted_run(3, 100, 125.0);
    let b = scripted_run(4, 100, 125.0);
    assert_ne!(a.state_hash(), b.state_hash());
}

#[test]
fn test_state_hash_covers_villager_jobs() {
    // Two states identical except for one villager's job must not collide.
    let mut a = create_game_with_config(small_config(5));
    let b = a.clone();
    let villager = *a.villagers.keys().next().expect("game spawns villagers");
    a.villagers.get_mut(&villager).expect("villager exists").job = Job::Woodcutter;
    assert_ne!(a.state_hash(), b.state_hash());
}

#[test]
fn test_snapshot_roundtrip_resumes_identically() {
    let mut original = scripted_run(11, 200, 125.0);

    let json = serde_json::to_string(&original).expect("serialize");
    let mut restored: GameState = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(original, restored);
    assert_eq!(original.state_hash(), restored.state_hash());

    // The restored game must continue exactly like the original, which
    // exercises mid-sequence RNG state surviving the round trip.
    for _ in 0..100 {
        original = tick(original, 125.0);
        restored = tick(restored, 125.0);
    }
    assert_eq!(original.state_hash(), restored.state_hash());
    assert_eq!(original, restored);
}

#[test]
fn test_uneven_deltas_still_replay() {
    // The same irregular frame pattern twice: determinism must not depend
    // on a fixed timestep.
    let pattern = [16.0, 33.0, 7.0, 250.0, 90.0, 121.0];
    let run = || {
        let mut state = create_game_with_config(small_config(23));
        for i in 0..600 {
            state = tick(state, pattern[i % pattern.len()]);
        }
        state
    };
    let a = run();
    let b = run();
    assert_eq!(a.state_hash(), b.state_hash());
}

proptest! {
    /// Any seed must produce the same starting state twice.
    #[test]
    fn prop_fresh_games_match(seed in any::<u32>()) {
        let config = GameConfig {
            world: WorldConfig::default().with_size(32, 24).with_seed(seed),
            ..GameConfig::default()
        };
        let a = create_game_with_config(config);
        let b = create_game_with_config(config);
        prop_assert_eq!(a.state_hash(), b.state_hash());
        prop_assert_eq!(a, b);
    }

    /// Short runs from any seed are reproducible tick for tick.
    #[test]
    fn prop_short_runs_are_deterministic(seed in any::<u32>(), ticks in 0u32..60) {
        let config = GameConfig {
            world: WorldConfig::default().with_size(32, 24).with_seed(seed),
            ..GameConfig::default()
        };
        let run = || {
            let mut state = create_game_with_config(config);
            for _ in 0..ticks {
                state = tick(state, 200.0);
            }
            state
        };
        prop_assert_eq!(run().state_hash(), run().state_hash());
    }

    /// A paused game ignores any delta.
    #[test]
    fn prop_paused_games_freeze(seed in any::<u32>(), dt in 1u32..600_000) {
        let config = GameConfig {
            world: WorldConfig::default().with_size(32, 24).with_seed(seed),
            ..GameConfig::default()
        };
        let mut state = create_game_with_config(config);
        state = commands::set_paused(state, true);
        let before = state.clone();
        let after = tick(state, f64::from(dt));
        prop_assert_eq!(before, after);
    }

    /// Terrain never changes after generation; only entities do.
    #[test]
    fn prop_terrain_is_immutable_during_play(seed in any::<u32>(), ticks in 0u32..40) {
        let config = GameConfig {
            world: WorldConfig::default().with_size(32, 24).with_seed(seed),
            ..GameConfig::default()
        };
        let mut state = create_game_with_config(config);
        let tiles = state.world.tiles.clone();
        for _ in 0..ticks {
            state = tick(state, 500.0);
        }
        prop_assert_eq!(tiles, state.world.tiles);
    }
}
