use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sensors::mag::ist8310::{RESET_ATTEMPTS, RESET_DELAY};

/// Période par défaut du thread de filtrage
pub const SAMPLE_PERIOD: Duration = Duration::from_millis(50);

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// Echange des axes X et Y
    pub flip_xy: bool,
    /// Déclinaison magnétique (radians)
    pub mag_decl: f32,
    /// Active le filtre moyenneur et son thread d'acquisition
    pub soft_filter: bool,
    pub sample_period: Duration,
    pub reset_attempts: u32,
    pub reset_delay: Duration,
}

impl Config {
    pub fn new() -> Self {
        let config = Config {
            flip_xy: false,
            mag_decl: 0.0,
            soft_filter: true,
            sample_period: SAMPLE_PERIOD,
            reset_attempts: RESET_ATTEMPTS,
            reset_delay: RESET_DELAY,
        };

        config
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration modifiable après l'initialisation, protégée par le verrou du capteur
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct DeviceConfig {
    pub flip_xy: bool,
    pub mag_decl: f32,
}

impl From<&Config> for DeviceConfig {
    fn from(config: &Config) -> Self {
        DeviceConfig { flip_xy: config.flip_xy, mag_decl: config.mag_decl }
    }
}
