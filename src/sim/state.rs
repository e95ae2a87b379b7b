//! Game state and core simulation types
//!
//! Everything the frame tick, spawn timer and level-up timer mutate lives in
//! [`GameState`]. It is owned by exactly one [`crate::Game`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::tuning::Tuning;

/// Current phase of the game lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Intro message on screen, nothing moves
    Intro,
    /// Counting down to the start of play
    Countdown,
    /// Active gameplay
    Playing,
    /// Out of lives, waiting for retry
    GameOver,
}

/// Playable area, in canvas pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// The player's astronaut
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    /// Units per tick, set by input
    pub vel: Vec2,
    pub size: Vec2,
    /// Breathing animation scale factor
    pub breath_scale: f32,
    /// Signed per-tick change of `breath_scale`
    pub breath_step: f32,
}

impl Player {
    pub fn new(arena: &Arena, tuning: &Tuning) -> Self {
        let size = tuning.player_size();
        let mut player = Self {
            pos: Self::start_position(arena, size, tuning.player_bottom_margin),
            vel: Vec2::ZERO,
            size,
            breath_scale: tuning.breath_max,
            // Starts at the top of the range, so the first step shrinks
            breath_step: -tuning.breath_step.abs(),
        };
        player.clamp_to(arena);
        player
    }

    /// Horizontally centered, resting just above the bottom edge
    pub fn start_position(arena: &Arena, size: Vec2, bottom_margin: f32) -> Vec2 {
        Vec2::new(
            (arena.width - size.x) / 2.0,
            arena.height - size.y - bottom_margin,
        )
    }

    /// Put the player back at the start position, motionless
    pub fn reset(&mut self, arena: &Arena, tuning: &Tuning) {
        *self = Self::new(arena, tuning);
    }

    #[inline]
    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, self.size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }

    /// Largest legal top-left position (never negative, even on tiny canvases)
    #[inline]
    pub fn max_pos(&self, arena: &Arena) -> Vec2 {
        (arena.size() - self.size).max(Vec2::ZERO)
    }

    /// Clamp position into `[0, arena - size]` on both axes
    pub fn clamp_to(&mut self, arena: &Arena) {
        self.pos = self.pos.clamp(Vec2::ZERO, self.max_pos(arena));
    }

    /// Advance the ping-pong breathing oscillator by one step
    pub fn breathe(&mut self, min: f32, max: f32) {
        self.breath_scale += self.breath_step;
        if self.breath_scale > max {
            self.breath_scale = max;
            self.breath_step = -self.breath_step.abs();
        } else if self.breath_scale < min {
            self.breath_scale = min;
            self.breath_step = self.breath_step.abs();
        }
    }
}

/// A piece of debris falling from the top edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FallingObject {
    pub id: u32,
    /// Top-left corner; `x` is fixed at spawn
    pub pos: Vec2,
}

impl FallingObject {
    #[inline]
    pub fn bounds(&self, size: Vec2) -> Aabb {
        Aabb::new(self.pos, size)
    }
}

/// Notifications for the UI sinks (HUD text, overlays, audio)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    LivesChanged(u32),
    LevelChanged(u32),
    PhaseChanged(GamePhase),
    CountdownChanged(u32),
    Paused,
    Resumed,
    /// Run ended. `end_screen` is set when the player died on the last level.
    GameOver { level: u32, end_screen: bool },
}

/// Complete game state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub arena: Arena,
    pub player: Player,
    /// Active objects in spawn order
    pub objects: Vec<FallingObject>,
    /// Size shared by every falling object
    pub object_size: Vec2,
    pub lives: u32,
    pub level: u32,
    /// Fall speed in units per tick
    pub object_speed: f32,
    /// Current spawn period
    pub spawn_interval_ms: f64,
    pub game_over: bool,
    pub paused: bool,
    pub phase: GamePhase,
    /// Set the first time play begins; retry skips the intro afterwards
    pub game_started: bool,
    /// Value shown by the countdown overlay
    pub countdown: u32,
    /// Frame ticks that actually advanced the simulation
    pub time_ticks: u64,
    next_id: u32,
}

impl GameState {
    pub fn new(seed: u64, arena: Arena, tuning: &Tuning) -> Self {
        Self {
            seed,
            arena,
            player: Player::new(&arena, tuning),
            objects: Vec::new(),
            object_size: tuning.object_size(),
            lives: tuning.initial_lives,
            level: 1,
            object_speed: tuning.initial_object_speed,
            spawn_interval_ms: tuning.initial_spawn_interval_ms,
            game_over: false,
            paused: false,
            phase: GamePhase::Intro,
            game_started: false,
            countdown: tuning.countdown_start,
            time_ticks: 0,
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// No update or collision logic may run while this holds
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.paused || self.game_over
    }

    /// Restore the values a retry starts from. `game_started` and the seed survive.
    pub fn reset_for_retry(&mut self, tuning: &Tuning) {
        self.lives = tuning.initial_lives;
        self.level = 1;
        self.object_speed = tuning.initial_object_speed;
        self.spawn_interval_ms = tuning.retry_spawn_interval_ms;
        self.objects.clear();
        self.game_over = false;
        self.paused = false;
        self.countdown = tuning.countdown_start;
        self.player.reset(&self.arena, tuning);
    }

    /// Change the playable area and keep the player inside it
    pub fn resize(&mut self, arena: Arena) {
        self.arena = arena;
        self.player.clamp_to(&self.arena);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> Arena {
        Arena::new(800.0, 600.0)
    }

    #[test]
    fn test_new_state_defaults() {
        let state = GameState::new(7, arena(), &Tuning::default());
        assert_eq!(state.lives, 20);
        assert_eq!(state.level, 1);
        assert_eq!(state.object_speed, 4.0);
        assert_eq!(state.spawn_interval_ms, 1500.0);
        assert_eq!(state.phase, GamePhase::Intro);
        assert!(!state.game_started);
        assert!(state.objects.is_empty());
    }

    #[test]
    fn test_player_start_position() {
        let player = Player::new(&arena(), &Tuning::default());
        assert_eq!(player.pos, Vec2::new(375.0, 475.0));
        assert_eq!(player.vel, Vec2::ZERO);
    }

    #[test]
    fn test_player_clamped_on_tiny_arena() {
        let tiny = Arena::new(30.0, 40.0);
        let player = Player::new(&tiny, &Tuning::default());
        assert_eq!(player.pos, Vec2::ZERO);
    }

    #[test]
    fn test_breathing_ping_pong() {
        let mut player = Player::new(&arena(), &Tuning::default());
        let mut min_seen = f32::MAX;
        let mut max_seen = f32::MIN;
        let mut reversals = 0;
        let mut last_sign = player.breath_step.signum();
        for _ in 0..600 {
            player.breathe(0.95, 1.0);
            min_seen = min_seen.min(player.breath_scale);
            max_seen = max_seen.max(player.breath_scale);
            if player.breath_step.signum() != last_sign {
                reversals += 1;
                last_sign = player.breath_step.signum();
            }
        }
        assert!(min_seen >= 0.95 && max_seen <= 1.0);
        // 0.05 span at 0.0005 per step: one reversal every ~100 steps
        assert!(reversals >= 4);
    }

    #[test]
    fn test_reset_for_retry_uses_retry_interval() {
        let tuning = Tuning::default();
        let mut state = GameState::new(1, arena(), &tuning);
        state.lives = 0;
        state.level = 7;
        state.object_speed = 13.0;
        state.spawn_interval_ms = 100.0;
        state.game_over = true;
        state.game_started = true;
        state.player.pos = Vec2::ZERO;
        state.player.vel = Vec2::new(15.0, -15.0);
        let id = state.next_entity_id();
        state.objects.push(FallingObject { id, pos: Vec2::ZERO });

        state.reset_for_retry(&tuning);

        assert_eq!(state.lives, 20);
        assert_eq!(state.level, 1);
        assert_eq!(state.object_speed, 4.0);
        assert_eq!(state.spawn_interval_ms, 4000.0);
        assert!(state.objects.is_empty());
        assert!(!state.game_over);
        assert!(state.game_started);
        assert_eq!(state.player.vel, Vec2::ZERO);
        assert_eq!(state.player.pos, Vec2::new(375.0, 475.0));
    }

    #[test]
    fn test_resize_reclamps_player() {
        let mut state = GameState::new(1, arena(), &Tuning::default());
        state.player.pos = Vec2::new(750.0, 540.0);
        state.resize(Arena::new(400.0, 300.0));
        assert_eq!(state.player.pos, Vec2::new(350.0, 240.0));
    }
}
