use thiserror::Error;

/// Erreur d'origine remontée par le bus (rppal, simulateur, ...)
pub type BusError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Erreurs remontées par le pilote IST8310
#[derive(Debug, Error)]
pub enum Error {
    /// Transaction I2C (écriture ou lecture) en échec
    #[error("[I2C] Transaction en échec: {0}")]
    Transport(#[source] BusError),

    /// Le capteur n'a pas terminé son reset dans le nombre d'essais autorisé
    #[error("[IST8310] Reset non terminé après {0} essais")]
    Timeout(u32),

    /// Ressource indisponible à l'initialisation (bus, thread, ...)
    #[error("[IST8310] Ressource indisponible: {0}")]
    Resource(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(feature = "real-sensors")]
impl From<rppal::i2c::Error> for Error {
    fn from(e: rppal::i2c::Error) -> Self {
        Error::Transport(Box::new(e))
    }
}
