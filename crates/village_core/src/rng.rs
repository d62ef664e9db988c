//! Seeded PRNG and hashing primitives.
//!
//! Everything random in the simulation flows through [`Mulberry32`] or the
//! stateless hashes in this module. All mixing is 32-bit integer arithmetic;
//! floats are derived at the end from the top 24 bits of a draw, so the same
//! seed yields the same sequence on every platform.

use serde::{Deserialize, Serialize};

/// Mulberry32 PRNG: 32-bit state, one increment + avalanche per draw.
///
/// Small, fast, and good enough for gameplay randomness. The full state is
/// serializable so a game snapshot resumes mid-sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    /// Create a generator from a seed.
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Next raw 32-bit draw.
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6D2B_79F5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    /// Uniform float in `[0, 1)`, from the top 24 bits of a draw.
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 * (1.0 / 16_777_216.0)
    }

    /// Uniform integer in `[min, max]` (inclusive). Returns `min` when the
    /// bounds are inverted or equal.
    pub fn range_u32(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        let span = max - min + 1;
        min + self.next_u32() % span
    }

    /// Uniform index in `[min, max]` (inclusive).
    pub fn range_usize(&mut self, min: usize, max: usize) -> usize {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as u32;
        min + (self.next_u32() % span) as usize
    }

    /// Pick a uniform element from a slice, or `None` if it is empty.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            let idx = self.range_usize(0, items.len() - 1);
            items.get(idx)
        }
    }

    /// True with probability `p` (clamped to `[0, 1]`).
    pub fn chance(&mut self, p: f32) -> bool {
        self.next_f32() < p.clamp(0.0, 1.0)
    }
}

/// Low-bias 32-bit avalanche hash.
///
/// Used to derive independent seeds (per day, per tile) from the world seed
/// without consuming generator state.
#[must_use]
pub fn hash_u32(mut x: u32) -> u32 {
    x ^= x >> 16;
    x = x.wrapping_mul(0x7FEB_352D);
    x ^= x >> 15;
    x = x.wrapping_mul(0x846C_A68B);
    x ^= x >> 16;
    x
}

/// Seed for day-scoped randomness: the world seed recombined with the day
/// index so each day has a fresh but reproducible stream.
#[must_use]
pub fn day_seed(world_seed: u32, day: u32) -> u32 {
    world_seed ^ hash_u32(day)
}

/// Stateless 2-D lattice hash (tile coordinates + seed).
#[must_use]
pub fn hash2(x: i32, y: i32, seed: u32) -> u32 {
    hash_u32(
        (x as u32)
            .wrapping_mul(0x9E37_79B1)
            .wrapping_add((y as u32).wrapping_mul(0x85EB_CA77))
            ^ seed,
    )
}

/// Stateless 2-D hash mapped to `[0, 1)`.
#[must_use]
pub fn hash2_unit(x: i32, y: i32, seed: u32) -> f32 {
    (hash2(x, y, seed) >> 8) as f32 * (1.0 / 16_777_216.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sequence() {
        // Frozen reference values; changing the mixing constants is a
        // save-breaking change and must fail here.
        let mut rng = Mulberry32::new(42);
        assert_eq!(rng.next_u32(), 0x99E1_EF7C);
        assert_eq!(rng.next_u32(), 0x72C3_2B8A);
        assert_eq!(rng.next_u32(), 0xDA3B_32C0);
        assert_eq!(rng.next_u32(), 0xAB73_B0AD);
    }

    #[test]
    fn test_known_float() {
        let mut rng = Mulberry32::new(42);
        // (0x99E1EF7C >> 8) / 2^24, exactly representable in f32.
        assert_eq!(rng.next_f32(), 10_084_847.0 / 16_777_216.0);
    }

    #[test]
    fn test_determinism() {
        let mut a = Mulberry32::new(123_456_789);
        let mut b = Mulberry32::new(123_456_789);
        for _ in 0..1000 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn test_seeds_diverge() {
        let mut a = Mulberry32::new(7);
        let mut b = Mulberry32::new(8);
        let same = (0..64).filter(|_| a.next_u32() == b.next_u32()).count();
        assert_eq!(same, 0);
    }

    #[test]
    fn test_float_range() {
        let mut rng = Mulberry32::new(99);
        for _ in 0..10_000 {
            let f = rng.next_f32();
            assert!((0.0..1.0).contains(&f));
        }
    }

    #[test]
    fn test_range_inclusive_bounds() {
        let mut rng = Mulberry32::new(5);
        let mut seen_min = false;
        let mut seen_max = false;
        for _ in 0..1000 {
            let v = rng.range_u32(3, 6);
            assert!((3..=6).contains(&v));
            seen_min |= v == 3;
            seen_max |= v == 6;
        }
        assert!(seen_min && seen_max);
        assert_eq!(rng.range_u32(9, 9), 9);
        assert_eq!(rng.range_u32(9, 2), 9);
    }

    #[test]
    fn test_hash_u32_reference_values() {
        assert_eq!(hash_u32(0), 0);
        assert_eq!(hash_u32(1), 0x6889_90C0);
        assert_eq!(hash_u32(42), 0x1727_33C2);
        assert_eq!(hash_u32(0xDEAD_BEEF), 0xE628_C683);
    }

    #[test]
    fn test_day_seed_varies_by_day() {
        let base = 42;
        let mut seeds = Vec::new();
        for day in 0..32 {
            seeds.push(day_seed(base, day));
        }
        seeds.sort_unstable();
        seeds.dedup();
        assert_eq!(seeds.len(), 32);
    }

    #[test]
    fn test_hash2_is_stateless_and_varied() {
        assert_eq!(hash2(10, -4, 77), hash2(10, -4, 77));
        assert_ne!(hash2(10, -4, 77), hash2(11, -4, 77));
        assert_ne!(hash2(10, -4, 77), hash2(10, -3, 77));
        assert_ne!(hash2(10, -4, 77), hash2(10, -4, 78));
        let u = hash2_unit(3, 9, 1);
        assert!((0.0..1.0).contains(&u));
    }

    #[test]
    fn test_pick_and_chance() {
        let mut rng = Mulberry32::new(11);
        assert_eq!(rng.pick::<u8>(&[]), None);
        let items = [10, 20, 30];
        for _ in 0..100 {
            assert!(items.contains(rng.pick(&items).unwrap()));
        }
        assert!(!rng.chance(0.0));
        assert!(rng.chance(1.0));
    }

    #[test]
    fn test_serde_roundtrip_resumes_sequence() {
        let mut rng = Mulberry32::new(314);
        rng.next_u32();
        rng.next_u32();
        let json = serde_json::to_string(&rng).unwrap();
        let mut restored: Mulberry32 = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.next_u32(), rng.next_u32());
    }
}
