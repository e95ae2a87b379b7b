//! Collision detection between the player and falling objects
//!
//! Both sides are axis-aligned rectangles. Touching edges do not count as a
//! hit: the overlap test is strict on every side.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::GameState;

/// Axis-aligned bounding box (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub size: Vec2,
}

impl Aabb {
    #[inline]
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    /// Strict overlap: boxes sharing only an edge do not overlap
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let a_max = self.max();
        let b_max = other.max();
        other.min.x < a_max.x
            && b_max.x > self.min.x
            && other.min.y < a_max.y
            && b_max.y > self.min.y
    }
}

/// Result of one collision pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionResult {
    /// Objects removed because they hit the player
    pub hits: u32,
    /// Lives ran out during this pass
    pub lives_exhausted: bool,
}

/// Remove every object overlapping the player and take one life per hit.
///
/// The pass stops at the hit that leaves zero lives, so lives never go
/// negative. A hit taken with zero lives left (a run configured with no
/// lives) is fatal on its own.
pub fn check_collisions(state: &mut GameState) -> CollisionResult {
    let mut result = CollisionResult::default();
    if state.game_over {
        return result;
    }

    let player = state.player.bounds();
    let size = state.object_size;
    let mut lives = state.lives;
    let mut exhausted = false;

    state.objects.retain(|obj| {
        if exhausted || !obj.bounds(size).overlaps(&player) {
            return true;
        }
        lives = lives.saturating_sub(1);
        result.hits += 1;
        exhausted = lives == 0;
        false
    });

    state.lives = lives;
    result.lives_exhausted = exhausted;
    result
}
