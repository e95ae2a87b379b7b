//! Astro Dodge - A falling-debris arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, collisions, difficulty)
//! - `game`: Single-owner controller driving the phase machine and timers
//! - `platform`: Scheduler abstraction, virtual clock, input mapping
//! - `renderer`: Canvas 2D drawing (web only)
//! - `tuning`: Data-driven game balance

pub mod game;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::Game;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Frame period assumed by the virtual clock (60 Hz display)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Lives at the start of every run
    pub const INITIAL_LIVES: u32 = 20;

    /// Falling object size (shared by every object)
    pub const OBJECT_WIDTH: f32 = 300.0;
    pub const OBJECT_HEIGHT: f32 = 300.0;

    /// Player sprite size
    pub const PLAYER_WIDTH: f32 = 50.0;
    pub const PLAYER_HEIGHT: f32 = 60.0;
    /// Gap between the player's start position and the bottom edge
    pub const PLAYER_BOTTOM_MARGIN: f32 = 65.0;
    /// Velocity applied per axis while a direction is held (units/tick)
    pub const PLAYER_MOVE_SPEED: f32 = 15.0;

    /// Object fall speed at level 1 (units/tick)
    pub const INITIAL_OBJECT_SPEED: f32 = 4.0;
    /// Spawn period when the page first loads
    pub const INITIAL_SPAWN_INTERVAL_MS: f64 = 1500.0;
    /// Spawn period after a retry (differs from the first run on purpose)
    pub const RETRY_SPAWN_INTERVAL_MS: f64 = 4000.0;

    /// Difficulty progression
    pub const MAX_LEVEL: u32 = 10;
    pub const LEVEL_UP_INTERVAL_MS: f64 = 15000.0;
    pub const SPEED_PER_LEVEL: f32 = 1.5;
    pub const SPAWN_INTERVAL_FACTOR: f64 = 0.7;

    /// Intro and countdown timing
    pub const INTRO_DURATION_MS: f64 = 10000.0;
    pub const COUNTDOWN_DURATION_MS: f64 = 3000.0;
    pub const PHASE_POLL_MS: f64 = 1000.0;
    pub const COUNTDOWN_START: u32 = 3;

    /// Breathing animation bounds and per-tick step
    pub const BREATH_MIN: f32 = 0.95;
    pub const BREATH_MAX: f32 = 1.0;
    pub const BREATH_STEP: f32 = 0.0005;
}
