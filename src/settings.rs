//! Game settings and preferences
//!
//! Persisted separately from tuning in LocalStorage.

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Visual Effects ===
    /// Player breathing animation
    pub breathing: bool,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// End-of-game music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub muted: bool,

    // === Accessibility ===
    /// Reduced motion (no breathing animation)
    pub reduced_motion: bool,
    /// Pause automatically when the tab is hidden
    pub pause_on_hide: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            breathing: true,

            master_volume: 0.8,
            music_volume: 0.7,
            muted: false,

            reduced_motion: false,
            pause_on_hide: true,
        }
    }
}

impl Settings {
    /// Effective breathing animation (respects reduced_motion)
    pub fn effective_breathing(&self) -> bool {
        self.breathing && !self.reduced_motion
    }

    /// Volume for the end-of-game music, 0 when muted
    pub fn effective_music_volume(&self) -> f64 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.music_volume).clamp(0.0, 1.0) as f64
        }
    }

    /// Flip mute and return the new state
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Flip the breathing animation and return whether it now plays
    pub fn toggle_breathing(&mut self) -> bool {
        self.breathing = !self.breathing;
        self.effective_breathing()
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string(self).map_err(|e| format!("cannot encode settings: {e}"))
    }

    /// Stored preferences, or defaults when the JSON is unreadable
    pub fn from_json_or_default(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|e| {
            log::warn!("Ignoring stored settings: {e}");
            Self::default()
        })
    }
}

#[cfg(target_arch = "wasm32")]
mod storage {
    use super::Settings;

    const KEY: &str = "astro_dodge_settings";

    fn local_storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    impl Settings {
        pub fn load() -> Self {
            match local_storage().and_then(|s| s.get_item(KEY).ok().flatten()) {
                Some(json) => {
                    log::info!("Loaded settings from LocalStorage");
                    Self::from_json_or_default(&json)
                }
                None => Self::default(),
            }
        }

        pub fn save(&self) -> Result<(), String> {
            let storage = local_storage().ok_or("LocalStorage unavailable")?;
            storage
                .set_item(KEY, &self.to_json()?)
                .map_err(|e| format!("cannot store settings: {e:?}"))
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Settings {
    /// Native builds have no preference store
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_motion_disables_breathing() {
        let mut s = Settings::default();
        assert!(s.effective_breathing());
        s.reduced_motion = true;
        assert!(!s.effective_breathing());
    }

    #[test]
    fn test_music_volume() {
        let mut s = Settings::default();
        assert!((s.effective_music_volume() - 0.56).abs() < 1e-6);
        s.muted = true;
        assert_eq!(s.effective_music_volume(), 0.0);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let s = Settings::from_json_or_default(r#"{ "muted": true }"#);
        assert!(s.muted);
        assert!(s.breathing);
        assert!(s.pause_on_hide);
    }

    #[test]
    fn test_unreadable_json_falls_back() {
        assert_eq!(Settings::from_json_or_default("{ nope"), Settings::default());
    }

    #[test]
    fn test_toggles_survive_a_store_round() {
        let mut s = Settings::default();
        assert!(s.toggle_mute());
        assert!(!s.toggle_breathing());
        assert_eq!(s.effective_music_volume(), 0.0);

        let stored = Settings::from_json_or_default(&s.to_json().unwrap());
        assert!(stored.muted);
        assert!(!stored.effective_breathing());
    }
}
