use std::thread;
use std::time::Duration;

use nalgebra::Vector3;

use crate::error::{Error, Result};
use crate::i2c::Bus;
use crate::sensors::mag::registry;

/// Nombre d'essais par défaut pour attendre la fin du reset
pub const RESET_ATTEMPTS: u32 = 10;

/// Délai par défaut avant chaque essai
pub const RESET_DELAY: Duration = Duration::from_millis(10);

/// Echantillon brut issu des registres de données (complément à deux, big-endian)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl RawSample {
    /// Décode les 6 octets lus à partir de DATA_START : x_h, x_l, y_h, y_l, z_h, z_l
    pub fn decode(buffer: &[u8; registry::IST8310_DATA_SIZE]) -> Self {
        RawSample {
            x: i16::from_be_bytes([buffer[0], buffer[1]]),
            y: i16::from_be_bytes([buffer[2], buffer[3]]),
            z: i16::from_be_bytes([buffer[4], buffer[5]]),
        }
    }

    pub fn to_vector(self) -> Vector3<f32> {
        Vector3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

/// Reset logiciel puis attente que le capteur soit de nouveau prêt.
///
/// Le capteur peut ne pas répondre juste après le reset : une lecture en échec
/// n'interrompt pas l'attente, on passe simplement à l'essai suivant.
pub fn soft_reset<B: Bus + ?Sized>(i2c: &mut B, attempts: u32, delay: Duration) -> Result<()> {
    // Envoi de la commande de reset
    i2c.ecriture_word(registry::IST8310_CNTL2, registry::IST8310_CNTL2_SRST)?;

    // Attente de la fin du reset
    for attempt in 1..=attempts {
        thread::sleep(delay);

        // Vérifie l'identifiant du capteur
        let id = match i2c.lecture_word(registry::IST8310_WHO_AM_I) {
            Ok(id) => id,
            Err(e) => {
                log::debug!("[IST8310] Essai {}: WHO_AM_I illisible ({})", attempt, e);
                continue;
            }
        };

        if id != registry::IST8310_DEVICE_ID {
            log::debug!("[IST8310] Essai {}: identifiant inattendu {:#04x}", attempt, id);
            continue;
        }

        // Vérifie que le bit de reset est retombé
        match i2c.lecture_word(registry::IST8310_CNTL2) {
            Ok(cntl2) if cntl2 & registry::IST8310_CNTL2_SRST == 0 => {
                log::debug!("[IST8310] Reset terminé (essai {})", attempt);
                return Ok(());
            }
            _ => {}
        }
    }

    log::error!("[IST8310] Reset timeout");
    Err(Error::Timeout(attempts))
}

/// Déclenche une mesure unique et lit l'échantillon brut.
///
/// Aucun nouvel essai ici : c'est à l'appelant de décider.
pub fn read_raw<B: Bus + ?Sized>(i2c: &mut B) -> Result<RawSample> {
    // Démarre la mesure
    i2c.ecriture_word(registry::IST8310_CNTL1, registry::IST8310_CNTL1_SINGLE)?;

    // Lecture des données
    let mut buffer = [0u8; registry::IST8310_DATA_SIZE];
    i2c.lecture_bloc(registry::IST8310_DATA_START, &mut buffer)?;

    Ok(RawSample::decode(&buffer))
}
