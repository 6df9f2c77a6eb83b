//! Player preferences
//!
//! Persisted separately from records in LocalStorage. The core never plays
//! audio or moves the camera itself; these flags gate the presentation calls
//! a session makes (see [`crate::app::SettingsGate`]).

use serde::{Deserialize, Serialize};

use crate::persistence::{PersistenceStore, keys};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Mute all sound cues
    pub muted: bool,

    // === Visual Effects ===
    /// Camera shake on hits, kicks and saves
    pub screen_shake: bool,
    /// Particle bursts and floating score text
    pub particles: bool,

    // === Accessibility ===
    /// Reduced motion (no shake)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            muted: false,
            screen_shake: true,
            particles: true,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective cue volume (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume.clamp(0.0, 1.0)
        }
    }

    /// Load settings, falling back to defaults
    pub fn load(store: &PersistenceStore) -> Self {
        match store.read_json(keys::SETTINGS) {
            Some(settings) => {
                log::info!("Loaded settings");
                settings
            }
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &PersistenceStore) {
        store.write_json(keys::SETTINGS, self);
        log::info!("Settings saved");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reduced_motion_disables_shake() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        assert!(!settings.effective_screen_shake());
        assert!(Settings::default().effective_screen_shake());
    }

    #[test]
    fn test_partial_record_fills_defaults() {
        let store = PersistenceStore::in_memory();
        store.set(keys::SETTINGS, r#"{"muted":true}"#);
        let settings = Settings::load(&store);
        assert!(settings.muted);
        assert_eq!(settings.effective_volume(), 0.0);
        assert!(settings.screen_shake);
    }

    #[test]
    fn test_save_load_roundtrip() {
        let store = PersistenceStore::in_memory();
        let settings = Settings {
            master_volume: 0.3,
            particles: false,
            ..Default::default()
        };
        settings.save(&store);
        assert_eq!(Settings::load(&store), settings);
    }
}
