//! Tuning constants for time, needs, movement, and spawning.
//!
//! Needs and morale are unit-interval quantities; rates are per millisecond
//! of scaled simulation time.

/// Simulated day length in milliseconds (8 real minutes at 1x speed).
pub const MS_PER_DAY: f64 = 480_000.0;

/// Phases per day (night, morning, day, evening).
pub const PHASES_PER_DAY: u32 = 4;

/// Clock minutes per day.
pub const MINUTES_PER_DAY: u32 = 1440;

/// 07:00 - the village eats breakfast.
pub const BREAKFAST_MINUTE: u32 = 420;
/// 08:00 - the working flag turns on.
pub const WORK_START_MINUTE: u32 = 480;
/// 19:00 - the village eats dinner.
pub const DINNER_MINUTE: u32 = 1140;
/// 20:00 - the sleeping flag turns on.
pub const SLEEP_START_MINUTE: u32 = 1200;

/// Berries consumed per villager per meal.
pub const BERRIES_PER_MEAL: u32 = 2;

/// Hunger relief per full meal.
pub const MEAL_HUNGER_RELIEF: f32 = 0.5;
/// Energy gained per full meal.
pub const MEAL_ENERGY_GAIN: f32 = 0.15;
/// Morale gained per full meal.
pub const MEAL_MORALE_GAIN: f32 = 0.05;
/// Morale lost per unit of unmet meal share.
pub const SHORTAGE_MORALE_PENALTY: f32 = 0.08;
/// Hunger regained per unit of unmet meal share.
pub const SHORTAGE_HUNGER_REBOUND: f32 = 0.10;

/// Hunger gain per ms while awake.
pub const HUNGER_RATE_AWAKE: f64 = 1.0 / 240_000.0;
/// Hunger gain per ms while sleeping.
pub const HUNGER_RATE_SLEEPING: f64 = 1.0 / 960_000.0;
/// Energy drain per ms during working hours.
pub const ENERGY_DRAIN_WORKING: f64 = 1.0 / 300_000.0;
/// Energy drain per ms while awake outside working hours.
pub const ENERGY_DRAIN_IDLE: f64 = 1.0 / 600_000.0;
/// Energy regeneration per ms while sleeping.
pub const ENERGY_REGEN_SLEEPING: f64 = 1.0 / 150_000.0;

/// Hunger above this at nightfall costs morale.
pub const NIGHT_HUNGER_THRESHOLD: f32 = 0.8;
/// Energy below this at nightfall costs morale.
pub const NIGHT_ENERGY_THRESHOLD: f32 = 0.2;
/// Morale lost per unmet nightfall threshold.
pub const NIGHT_MORALE_PENALTY: f32 = 0.1;

/// Hunger relief per villager from a feast.
pub const FEAST_HUNGER_RELIEF: f32 = 0.35;
/// Morale gained per villager from a feast.
pub const FEAST_MORALE_GAIN: f32 = 0.10;
/// Morale gained per villager from a night watch.
pub const NIGHT_WATCH_MORALE_GAIN: f32 = 0.15;

/// Max villager hunger that raises the hunger alert to warning.
pub const HUNGER_ALERT_WARN: f32 = 0.6;
/// Max villager hunger that raises the hunger alert to critical.
pub const HUNGER_ALERT_CRITICAL: f32 = 0.85;
/// Max villager illness that raises the illness alert to warning.
pub const ILLNESS_ALERT_WARN: f32 = 0.4;
/// Max villager illness that raises the illness alert to critical.
pub const ILLNESS_ALERT_CRITICAL: f32 = 0.75;

/// Villager walk speed, tiles per ms (2.5 tiles/s).
pub const VILLAGER_SPEED: f32 = 0.0025;
/// Animal walk speed, tiles per ms (1.5 tiles/s).
pub const ANIMAL_SPEED: f32 = 0.0015;
/// Distance within which a villager touches a building or resource.
pub const HARVEST_RADIUS: f32 = 0.6;
/// Lateral movement below this never flips facing.
pub const FACING_DEADZONE: f32 = 0.05;
/// Minimum ms between facing flips.
pub const FACING_COOLDOWN_MS: f64 = 250.0;
/// Radius of the idle-wander circle around an idle anchor.
pub const IDLE_WANDER_RADIUS: f32 = 0.3;
/// Angular speed of the idle-wander circle, radians per ms.
pub const IDLE_WANDER_RATE: f64 = 0.0004;
/// How far an animal wanders from its current spot per leg.
pub const ANIMAL_WANDER_RANGE: f32 = 3.0;
/// How often an animal picks a new wander target, ms.
pub const ANIMAL_RETARGET_MS: f64 = 4_000.0;

/// Berry bush regrow time, ms.
pub const BUSH_REGROW_MS: f64 = 90_000.0;

/// Villagers created at game start.
pub const INITIAL_VILLAGERS: u32 = 5;
/// Starting wood.
pub const INITIAL_WOOD: u32 = 20;
/// Starting berries.
pub const INITIAL_BERRIES: u32 = 15;

/// Fraction of forest tiles the tree spawner fills toward.
pub const TREE_FILL_RATIO: f32 = 0.22;
/// Most trees planted in a single spawner run.
pub const TREE_SPAWN_CAP: u32 = 12;
/// Initial rock count range (inclusive).
pub const INITIAL_ROCKS: (u32, u32) = (5, 6);
/// Initial berry bush count range (inclusive).
pub const INITIAL_BERRY_BUSHES: (u32, u32) = (4, 6);
/// Initial mushroom count range (inclusive).
pub const INITIAL_MUSHROOMS: (u32, u32) = (3, 5);
/// Rocks per spawner run (inclusive range).
pub const ROCK_SPAWN: (u32, u32) = (1, 2);
/// Berry bushes per spawner run (inclusive range).
pub const BERRY_SPAWN: (u32, u32) = (1, 3);
/// Mushrooms per spawner run (inclusive range).
pub const MUSHROOM_SPAWN: (u32, u32) = (1, 2);
/// Dogs per spawner run (inclusive range).
pub const DOG_SPAWN: (u32, u32) = (0, 1);
/// Days until a resource category respawns (inclusive range).
pub const RESPAWN_DAYS: (u32, u32) = (1, 2);
/// Days until the dog spawner runs again (inclusive range).
pub const DOG_RESPAWN_DAYS: (u32, u32) = (18, 22);
