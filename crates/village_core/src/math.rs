//! Small math utilities shared by world generation and movement.
//!
//! Positions are `f32` tile coordinates. All randomness happens upstream in
//! integer space ([`crate::rng`]); the float math here only ever consumes
//! identical inputs on identical platforms, so results stay reproducible.

use serde::{Deserialize, Serialize};

/// 2D vector in tile units (sub-tile precision).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X coordinate, in tiles.
    pub x: f32,
    /// Y coordinate, in tiles.
    pub y: f32,
}

impl Vec2 {
    /// Zero vector.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new vector.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Squared distance (avoids sqrt for comparisons).
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Euclidean distance.
    #[must_use]
    pub fn distance(self, other: Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Move from `self` toward `target` by at most `max_step`, without
    /// overshooting.
    #[must_use]
    pub fn step_toward(self, target: Self, max_step: f32) -> Self {
        let dist = self.distance(target);
        if dist <= max_step || dist <= f32::EPSILON {
            return target;
        }
        let t = max_step / dist;
        Self {
            x: self.x + (target.x - self.x) * t,
            y: self.y + (target.y - self.y) * t,
        }
    }

    /// Tile containing this position, clamped to non-negative coordinates.
    #[must_use]
    pub fn to_tile(self) -> (u32, u32) {
        (self.x.max(0.0) as u32, self.y.max(0.0) as u32)
    }

    /// Center of a tile.
    #[must_use]
    pub fn tile_center(x: u32, y: u32) -> Self {
        Self {
            x: x as f32 + 0.5,
            y: y as f32 + 0.5,
        }
    }
}

/// Linear interpolation between `a` and `b`.
#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Hermite smoothstep of `t` in `[0, 1]`.
#[must_use]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Clamp a unit-interval quantity (needs, morale, satiety).
#[must_use]
pub fn clamp01(v: f32) -> f32 {
    v.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_toward_no_overshoot() {
        let from = Vec2::new(0.0, 0.0);
        let to = Vec2::new(3.0, 4.0);
        let step = from.step_toward(to, 1.0);
        assert!((step.distance(from) - 1.0).abs() < 1e-5);
        let arrived = from.step_toward(to, 10.0);
        assert_eq!(arrived, to);
    }

    #[test]
    fn test_step_toward_zero_distance() {
        let p = Vec2::new(2.5, 2.5);
        assert_eq!(p.step_toward(p, 1.0), p);
    }

    #[test]
    fn test_tile_mapping() {
        assert_eq!(Vec2::new(3.9, 0.1).to_tile(), (3, 0));
        assert_eq!(Vec2::tile_center(3, 0), Vec2::new(3.5, 0.5));
        assert_eq!(Vec2::new(-0.3, -2.0).to_tile(), (0, 0));
    }

    #[test]
    fn test_smoothstep_endpoints() {
        assert_eq!(smoothstep(0.0), 0.0);
        assert_eq!(smoothstep(1.0), 1.0);
        assert_eq!(smoothstep(0.5), 0.5);
        assert!(smoothstep(0.25) < 0.25);
        assert!(smoothstep(0.75) > 0.75);
    }

    #[test]
    fn test_lerp() {
        assert_eq!(lerp(2.0, 6.0, 0.5), 4.0);
        assert_eq!(lerp(2.0, 6.0, 0.0), 2.0);
        assert_eq!(lerp(2.0, 6.0, 1.0), 6.0);
    }
}
