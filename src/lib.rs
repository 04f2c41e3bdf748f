//! Pilote du magnétomètre 3 axes IST8310 (I2C).
//!
//! Reset et vérification au démarrage, lecture des échantillons bruts, filtre moyenneur
//! optionnel alimenté par un thread, et calcul du cap compas.

pub mod config;
pub mod error;
pub mod i2c;
pub mod sensors;

pub use config::{Config, DeviceConfig};
pub use error::{Error, Result};
pub use i2c::Bus;
pub use sensors::mag::Ist8310;
