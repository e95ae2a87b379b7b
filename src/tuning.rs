//! Data-driven game balance
//!
//! Every gameplay constant lives here so a session can be re-tuned without a
//! rebuild. Missing JSON keys fall back to the values in [`crate::consts`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Balance values consumed by the simulation and the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub initial_lives: u32,

    pub object_width: f32,
    pub object_height: f32,

    pub player_width: f32,
    pub player_height: f32,
    pub player_bottom_margin: f32,
    pub player_move_speed: f32,

    pub initial_object_speed: f32,
    pub initial_spawn_interval_ms: f64,
    pub retry_spawn_interval_ms: f64,

    pub max_level: u32,
    pub level_up_interval_ms: f64,
    pub speed_per_level: f32,
    pub spawn_interval_factor: f64,

    pub intro_duration_ms: f64,
    pub countdown_duration_ms: f64,
    pub phase_poll_ms: f64,
    pub countdown_start: u32,

    pub breath_min: f32,
    pub breath_max: f32,
    pub breath_step: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            initial_lives: INITIAL_LIVES,
            object_width: OBJECT_WIDTH,
            object_height: OBJECT_HEIGHT,
            player_width: PLAYER_WIDTH,
            player_height: PLAYER_HEIGHT,
            player_bottom_margin: PLAYER_BOTTOM_MARGIN,
            player_move_speed: PLAYER_MOVE_SPEED,
            initial_object_speed: INITIAL_OBJECT_SPEED,
            initial_spawn_interval_ms: INITIAL_SPAWN_INTERVAL_MS,
            retry_spawn_interval_ms: RETRY_SPAWN_INTERVAL_MS,
            max_level: MAX_LEVEL,
            level_up_interval_ms: LEVEL_UP_INTERVAL_MS,
            speed_per_level: SPEED_PER_LEVEL,
            spawn_interval_factor: SPAWN_INTERVAL_FACTOR,
            intro_duration_ms: INTRO_DURATION_MS,
            countdown_duration_ms: COUNTDOWN_DURATION_MS,
            phase_poll_ms: PHASE_POLL_MS,
            countdown_start: COUNTDOWN_START,
            breath_min: BREATH_MIN,
            breath_max: BREATH_MAX,
            breath_step: BREATH_STEP,
        }
    }
}

impl Tuning {
    #[inline]
    pub fn object_size(&self) -> Vec2 {
        Vec2::new(self.object_width, self.object_height)
    }

    #[inline]
    pub fn player_size(&self) -> Vec2 {
        Vec2::new(self.player_width, self.player_height)
    }

    /// Parse tuning from JSON. Missing keys use defaults.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("invalid tuning JSON: {e}"))
    }

    /// Non-fatal sanity checks. Each entry describes one suspicious value.
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if self.initial_lives == 0 {
            w.push("initial_lives is 0: the first hit ends the run".to_string());
        }
        for (label, v) in [
            ("object_width", self.object_width),
            ("object_height", self.object_height),
            ("player_width", self.player_width),
            ("player_height", self.player_height),
        ] {
            if v <= 0.0 {
                w.push(format!("{label} must be positive (got {v})"));
            }
        }
        if self.initial_object_speed <= 0.0 {
            w.push(format!(
                "initial_object_speed {} never moves objects down",
                self.initial_object_speed
            ));
        }
        for (label, v) in [
            ("initial_spawn_interval_ms", self.initial_spawn_interval_ms),
            ("retry_spawn_interval_ms", self.retry_spawn_interval_ms),
            ("level_up_interval_ms", self.level_up_interval_ms),
            ("phase_poll_ms", self.phase_poll_ms),
        ] {
            if v < 1.0 {
                w.push(format!("{label} below 1 ms (got {v})"));
            }
        }
        if self.max_level == 0 {
            w.push("max_level must be at least 1".to_string());
        }
        if !(0.0..=1.0).contains(&self.spawn_interval_factor) {
            w.push(format!(
                "spawn_interval_factor {} outside [0, 1] slows spawning on level-up",
                self.spawn_interval_factor
            ));
        }
        if self.breath_min > self.breath_max {
            w.push(format!(
                "breath_min {} exceeds breath_max {}",
                self.breath_min, self.breath_max
            ));
        }
        w
    }

    /// Parse and validate, falling back to defaults on a parse error
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(tuning) => {
                for warning in tuning.validate() {
                    log::warn!("tuning: {warning}");
                }
                tuning
            }
            Err(e) => {
                log::warn!("{e}; using default tuning");
                Self::default()
            }
        }
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "astro_dodge_tuning";

    /// Load tuning overrides from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                log::info!("Loaded tuning overrides from LocalStorage");
                return Self::from_json_or_default(&json);
            }
        }

        Self::default()
    }

    /// Load tuning from a JSON file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
        Self::from_json(&json)
    }
}
