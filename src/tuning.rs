//! Data-driven game balance
//!
//! Every difficulty curve is a pure function of the level number. Defaults
//! reproduce the shipped game; a partial JSON override can be stored under
//! `stadium_tuning` for playtesting.

use serde::{Deserialize, Serialize};

use crate::persistence::{PersistenceStore, keys};

/// Dodgeball runner balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DodgeballTuning {
    /// Distance to run per level (px)
    pub level_length: f32,
    /// Forward auto-scroll speed (px/s)
    pub auto_scroll: f32,
    /// Fraction of player speed applied when holding back / forward
    pub back_factor: f32,
    pub forward_factor: f32,
    pub spawn_interval_base_ms: f32,
    pub spawn_interval_step_ms: f32,
    pub spawn_interval_floor_ms: f32,
    /// Delay between hazards of the same wave
    pub wave_stagger_ms: f32,
    pub flight_time_base_ms: f32,
    pub flight_time_level_factor: f32,
    pub ball_speed_base: f32,
    pub ball_speed_step: f32,
    /// Roll speed after landing, as a fraction of ball speed
    pub roll_factor: f32,
    pub roll_ms: f32,
    pub fade_ms: f32,
    pub kick_range: f32,
    pub kick_cooldown_ms: f32,
    pub kick_speed: f32,
    /// Lifetime of a deflected ball before it is dropped
    pub kicked_fade_ms: f32,
    pub points_per_kick: u64,
    /// Disable to practice movement without hazards
    pub spawn_hazards: bool,
}

impl Default for DodgeballTuning {
    fn default() -> Self {
        Self {
            level_length: 3000.0,
            auto_scroll: 100.0,
            back_factor: 0.6,
            forward_factor: 0.7,
            spawn_interval_base_ms: 1400.0,
            spawn_interval_step_ms: 100.0,
            spawn_interval_floor_ms: 400.0,
            wave_stagger_ms: 80.0,
            flight_time_base_ms: 2200.0,
            flight_time_level_factor: 0.05,
            ball_speed_base: 10.0,
            ball_speed_step: 8.0,
            roll_factor: 0.35,
            roll_ms: 1500.0,
            fade_ms: 300.0,
            kick_range: 40.0,
            kick_cooldown_ms: 300.0,
            kick_speed: 300.0,
            kicked_fade_ms: 800.0,
            points_per_kick: 10,
            spawn_hazards: true,
        }
    }
}

impl DodgeballTuning {
    /// Milliseconds between hazard waves
    pub fn spawn_interval_ms(&self, level: u32) -> f32 {
        let steps = level.saturating_sub(1) as f32;
        (self.spawn_interval_base_ms - steps * self.spawn_interval_step_ms)
            .max(self.spawn_interval_floor_ms)
    }

    /// Hazards launched per wave
    pub fn hazards_per_wave(&self, level: u32) -> u32 {
        1 + level / 2
    }

    /// Total rise + fall duration of a hazard arc
    pub fn flight_time_ms(&self, level: u32) -> f32 {
        let steps = level.saturating_sub(1) as f32;
        self.flight_time_base_ms / (1.0 + steps * self.flight_time_level_factor)
    }

    pub fn ball_speed(&self, level: u32) -> f32 {
        self.ball_speed_base + level.saturating_sub(1) as f32 * self.ball_speed_step
    }
}

/// Dribble mode balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DribbleTuning {
    pub sprint_factor: f32,
    /// Stamina drained per second while sprinting
    pub stamina_drain: f32,
    /// Stamina regenerated per second otherwise
    pub stamina_regen: f32,
    pub defender_speed_base: f32,
    pub defender_speed_step: f32,
    pub chase_range_base: f32,
    pub chase_range_step: f32,
    /// Fraction of defender speed used to walk back home
    pub home_speed_factor: f32,
    pub keeper_dive_base: f32,
    pub keeper_dive_step: f32,
    /// Random spread on the keeper's dive target
    pub keeper_dive_jitter: f32,
    /// Shot power gained per second of charging
    pub charge_rate: f32,
    pub shot_speed_min: f32,
    pub shot_speed_range: f32,
    pub shot_timeout_ms: f32,
    pub skill_cooldown_ms: f32,
    pub skill_duration_ms: f32,
    pub skill_burst_ms: f32,
    pub skill_burst_speed: f32,
    pub stun_range: f32,
    pub defender_stun_ms: f32,
    pub keeper_stun_ms: f32,
    pub defender_nudge: f32,
    pub keeper_nudge: f32,
    pub skill_points: u64,
    pub goal_points: u64,
}

impl Default for DribbleTuning {
    fn default() -> Self {
        Self {
            sprint_factor: 1.7,
            stamina_drain: 40.0,
            stamina_regen: 20.0,
            defender_speed_base: 35.0,
            defender_speed_step: 7.0,
            chase_range_base: 150.0,
            chase_range_step: 15.0,
            home_speed_factor: 0.4,
            keeper_dive_base: 30.0,
            keeper_dive_step: 5.0,
            keeper_dive_jitter: 20.0,
            charge_rate: 80.0,
            shot_speed_min: 100.0,
            shot_speed_range: 400.0,
            shot_timeout_ms: 3000.0,
            skill_cooldown_ms: 2000.0,
            skill_duration_ms: 350.0,
            skill_burst_ms: 100.0,
            skill_burst_speed: 350.0,
            stun_range: 80.0,
            defender_stun_ms: 800.0,
            keeper_stun_ms: 600.0,
            defender_nudge: 60.0,
            keeper_nudge: 50.0,
            skill_points: 25,
            goal_points: 100,
        }
    }
}

impl DribbleTuning {
    pub fn defender_count(&self, level: u32) -> u32 {
        level.max(1)
    }

    pub fn defender_speed(&self, level: u32) -> f32 {
        self.defender_speed_base + level.saturating_sub(1) as f32 * self.defender_speed_step
    }

    /// Distance inside which a defender chases the player
    pub fn chase_range(&self, level: u32) -> f32 {
        self.chase_range_base + level as f32 * self.chase_range_step
    }

    pub fn keeper_dive_speed(&self, level: u32) -> f32 {
        self.keeper_dive_base + level.saturating_sub(1) as f32 * self.keeper_dive_step
    }

    /// Exit speed for a shot of `power` (0-100)
    pub fn shot_speed(&self, power: f32) -> f32 {
        self.shot_speed_min + (power.clamp(0.0, 100.0) / 100.0) * self.shot_speed_range
    }
}

/// Penalty shootout balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyTuning {
    pub rounds: u32,
    /// Reticle speed (px/s)
    pub aim_speed: f32,
    pub charge_rate: f32,
    /// Keeper saves when its dive lands within this distance of the shot
    pub save_radius: f32,
    /// Time the player has to pick a dive before the AI shoots
    pub shot_delay_ms: f32,
    pub save_bonus: u64,
    /// Points per unit of power on a scored kick
    pub power_points_factor: f32,
    /// Cosmetic result display after each kick
    pub result_display_ms: f32,
    /// Cosmetic delay between keeper dive and verdict
    pub verdict_delay_ms: f32,
}

impl Default for PenaltyTuning {
    fn default() -> Self {
        Self {
            rounds: 5,
            aim_speed: 150.0,
            charge_rate: 70.0,
            save_radius: 35.0,
            shot_delay_ms: 1800.0,
            save_bonus: 50,
            power_points_factor: 2.0,
            result_display_ms: 1500.0,
            verdict_delay_ms: 350.0,
        }
    }
}

impl PenaltyTuning {
    /// Random aim error radius for a kick of `power`
    ///
    /// Accurate below 50, spreading from 50 to 80, wild above 80.
    pub fn error_scale(&self, power: f32) -> f32 {
        if power < 50.0 {
            power * 0.3
        } else if power < 80.0 {
            15.0 + (power - 50.0) * 1.2
        } else {
            51.0 + (power - 80.0) * 2.5
        }
    }

    /// Cosmetic flight time of the player's kick
    pub fn flight_ms(&self, power: f32) -> f32 {
        700.0 + (100.0 - power) * 6.0
    }
}

/// All balance tables
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub dodgeball: DodgeballTuning,
    pub dribble: DribbleTuning,
    pub penalty: PenaltyTuning,
}

impl Tuning {
    /// Load overrides from the store, falling back to defaults
    pub fn load(store: &PersistenceStore) -> Self {
        match store.read_json(keys::TUNING) {
            Some(tuning) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            None => Self::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_interval_clamps_to_floor() {
        let t = DodgeballTuning::default();
        assert_eq!(t.spawn_interval_ms(1), 1400.0);
        assert_eq!(t.spawn_interval_ms(5), 1000.0);
        assert_eq!(t.spawn_interval_ms(11), 400.0);
        assert_eq!(t.spawn_interval_ms(40), 400.0);
    }

    #[test]
    fn test_wave_size_and_flight_time() {
        let t = DodgeballTuning::default();
        assert_eq!(t.hazards_per_wave(1), 1);
        assert_eq!(t.hazards_per_wave(2), 2);
        assert_eq!(t.hazards_per_wave(5), 3);
        assert_eq!(t.flight_time_ms(1), 2200.0);
        assert!(t.flight_time_ms(10) < t.flight_time_ms(2));
    }

    #[test]
    fn test_dribble_curves() {
        let t = DribbleTuning::default();
        assert_eq!(t.defender_count(3), 3);
        assert_eq!(t.defender_speed(1), 35.0);
        assert_eq!(t.chase_range(2), 180.0);
        assert_eq!(t.shot_speed(0.0), 100.0);
        assert_eq!(t.shot_speed(100.0), 500.0);
    }

    #[test]
    fn test_penalty_error_grows_super_linearly() {
        let t = PenaltyTuning::default();
        assert_eq!(t.error_scale(0.0), 0.0);
        assert_eq!(t.error_scale(50.0), 15.0);
        assert_eq!(t.error_scale(80.0), 51.0);
        assert_eq!(t.error_scale(100.0), 101.0);
        // marginal error per power point increases across the bands
        assert!(
            t.error_scale(100.0) - t.error_scale(90.0) > t.error_scale(70.0) - t.error_scale(60.0)
        );
    }

    #[test]
    fn test_partial_override() {
        let store = PersistenceStore::in_memory();
        store.set(keys::TUNING, r#"{"penalty":{"rounds":3},"dodgeball":{"spawn_hazards":false}}"#);
        let tuning = Tuning::load(&store);
        assert_eq!(tuning.penalty.rounds, 3);
        assert_eq!(tuning.penalty.save_radius, 35.0);
        assert!(!tuning.dodgeball.spawn_hazards);
        assert_eq!(tuning.dribble, DribbleTuning::default());
    }
}
