use std::time::Duration;

use clap::Parser;
use ist8310::Config;

#[derive(Debug, Parser, Clone)]
#[command(about = "Lecture du magnétomètre IST8310")]
pub struct Cli {
    /// Numéro du bus I2C (/dev/i2c-N)
    #[arg(long, default_value_t = 1)]
    pub bus: u8,

    /// Déclinaison magnétique en radians
    #[arg(long, default_value_t = 0.15, allow_negative_numbers = true)]
    pub declination: f32,

    /// Echange les axes X et Y
    #[arg(long)]
    pub flip: bool,

    /// Lecture directe, sans filtre moyenneur
    #[arg(long)]
    pub no_filter: bool,

    /// Période du thread de filtrage (ms)
    #[arg(long, default_value_t = 50)]
    pub period_ms: u64,

    /// Intervalle d'affichage (ms)
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,

    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config {
            flip_xy: self.flip,
            soft_filter: !self.no_filter,
            sample_period: Duration::from_millis(self.period_ms),
            ..Config::new()
        }
    }
}
