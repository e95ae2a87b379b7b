//! Frame tick and entity updates
//!
//! One call to [`tick`] is one displayed frame. Order inside a frame:
//! objects fall, collisions resolve, then the player moves and is clamped.
//! Collisions therefore see the player where it was drawn last frame.

use glam::Vec2;
use rand::Rng;

use super::collision::{CollisionResult, check_collisions};
use super::state::{FallingObject, GamePhase, GameState};
use crate::tuning::Tuning;

/// Movement direction from a key or touch button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// What happened during one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// False when the tick was suppressed (paused or game over)
    pub advanced: bool,
    pub collisions: CollisionResult,
    /// Set on the frame that ended the run
    pub game_over: bool,
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, tuning: &Tuning, breathing: bool) -> TickOutcome {
    let mut outcome = TickOutcome::default();
    if state.is_frozen() {
        return outcome;
    }
    outcome.advanced = true;
    state.time_ticks += 1;

    update_positions(state);

    outcome.collisions = check_collisions(state);
    if outcome.collisions.lives_exhausted {
        state.game_over = true;
        state.phase = GamePhase::GameOver;
        outcome.game_over = true;
        return outcome;
    }

    move_player(state);
    if breathing {
        state.player.breathe(tuning.breath_min, tuning.breath_max);
    }

    outcome
}

/// Move every object down by the current speed and drop those past the bottom
pub fn update_positions(state: &mut GameState) {
    let speed = state.object_speed;
    let bottom = state.arena.height;
    state.objects.retain_mut(|obj| {
        obj.pos.y += speed;
        obj.pos.y <= bottom
    });
}

/// Spawn one object at the top edge with a uniformly random x
pub fn spawn_object<R: Rng + ?Sized>(state: &mut GameState, rng: &mut R) -> u32 {
    let max_x = (state.arena.width - state.object_size.x).max(0.0);
    let x = rng.random::<f32>() * max_x;
    let id = state.next_entity_id();
    state.objects.push(FallingObject {
        id,
        pos: Vec2::new(x, 0.0),
    });
    id
}

/// Set velocity on the direction's axis only; the other axis is untouched
pub fn set_player_velocity(state: &mut GameState, direction: Direction, speed: f32) {
    let vel = &mut state.player.vel;
    match direction {
        Direction::Left => vel.x = -speed,
        Direction::Right => vel.x = speed,
        Direction::Up => vel.y = -speed,
        Direction::Down => vel.y = speed,
    }
}

/// Zero both axes, whichever key was released
pub fn stop_player(state: &mut GameState) {
    state.player.vel = Vec2::ZERO;
}

/// Apply velocity, then clamp into the arena
pub fn move_player(state: &mut GameState) {
    state.player.pos += state.player.vel;
    state.player.clamp_to(&state.arena);
}
