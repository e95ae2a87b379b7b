//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One call to `tick` per frame, no wall-clock reads
//! - Seeded RNG only
//! - Objects kept in spawn order
//! - No rendering, timer or platform dependencies

pub mod collision;
pub mod difficulty;
pub mod state;
pub mod tick;

pub use collision::{Aabb, CollisionResult, check_collisions};
pub use difficulty::level_up;
pub use state::{Arena, FallingObject, GameEvent, GamePhase, GameState, Player};
pub use tick::{
    Direction, TickOutcome, move_player, set_player_velocity, spawn_object, stop_player, tick,
    update_positions,
};
