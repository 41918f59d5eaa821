//! Game settings and preferences
//!
//! Persisted separately from progress under their own storage key.

use serde::{Deserialize, Serialize};

use crate::persistence::{Storage, StorageError, load_json, save_json};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Music volume (0.0 - 1.0)
    pub music_volume: f32,
    pub sfx_enabled: bool,
    pub music_enabled: bool,

    // === Appearance ===
    /// Selected player skin id
    pub skin: String,
    /// Selected background theme id
    pub theme: String,

    // === Visual Effects ===
    /// Player shake when the shield absorbs a hit
    pub screen_shake: bool,
    /// Particle bursts
    pub particles: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no particles)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sfx_volume: 0.7,
            music_volume: 0.3,
            sfx_enabled: true,
            music_enabled: true,

            skin: "default-snowman".to_string(),
            theme: "default-winter".to_string(),

            screen_shake: true,
            particles: true,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "snowfall_settings";

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective particles (respects reduced_motion)
    pub fn effective_particles(&self) -> bool {
        self.particles && !self.reduced_motion
    }

    /// Sound effect volume after the enable flag
    pub fn effective_sfx_volume(&self) -> f32 {
        if self.sfx_enabled {
            sanitize_volume(self.sfx_volume)
        } else {
            0.0
        }
    }

    pub fn effective_music_volume(&self) -> f32 {
        if self.music_enabled {
            sanitize_volume(self.music_volume)
        } else {
            0.0
        }
    }

    /// Load settings, using defaults for anything missing or malformed
    pub fn load(storage: &dyn Storage) -> Self {
        let mut settings: Self = load_json(storage, Self::STORAGE_KEY);
        settings.sfx_volume = sanitize_volume(settings.sfx_volume);
        settings.music_volume = sanitize_volume(settings.music_volume);
        log::info!("Settings loaded (skin '{}', theme '{}')", settings.skin, settings.theme);
        settings
    }

    pub fn save(&self, storage: &dyn Storage) -> Result<(), StorageError> {
        save_json(storage, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

fn sanitize_volume(vol: f32) -> f32 {
    if vol.is_finite() { vol.clamp(0.0, 1.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_reduced_motion_overrides() {
        let mut settings = Settings::default();
        assert!(settings.effective_screen_shake());
        assert!(settings.effective_particles());
        settings.reduced_motion = true;
        assert!(!settings.effective_screen_shake());
        assert!(!settings.effective_particles());
    }

    #[test]
    fn test_disabled_audio_is_silent() {
        let mut settings = Settings::default();
        settings.sfx_enabled = false;
        settings.music_enabled = false;
        assert_eq!(settings.effective_sfx_volume(), 0.0);
        assert_eq!(settings.effective_music_volume(), 0.0);
    }

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let mut settings = Settings::default();
        settings.skin = "santa-snowman".to_string();
        settings.sfx_volume = 0.4;
        settings.save(&storage).unwrap();

        let loaded = Settings::load(&storage);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_partial_and_malformed_values() {
        let storage = MemoryStorage::new();
        storage
            .set(Settings::STORAGE_KEY, r#"{"theme": "night-sky", "sfx_volume": 7.5}"#)
            .unwrap();
        let loaded = Settings::load(&storage);
        assert_eq!(loaded.theme, "night-sky");
        assert_eq!(loaded.skin, "default-snowman");
        assert_eq!(loaded.sfx_volume, 1.0);

        storage.set(Settings::STORAGE_KEY, "garbage").unwrap();
        assert_eq!(Settings::load(&storage), Settings::default());
    }
}
