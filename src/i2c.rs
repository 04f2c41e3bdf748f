use crate::error::{Error, Result};

/// Adresse 7 bits de l'IST8310 sur le bus I2C
pub const IST8310_ADDR: u16 = 0x0E;

/// Transport registre du capteur.
///
/// Chaque appel est une transaction atomique sur le bus : soit une écriture `[registre, valeur]`,
/// soit l'envoi de l'adresse du registre suivi d'une lecture de `buffer.len()` octets.
pub trait Bus {
    /// Ecrit un octet (word) dans un registre 8 bits
    fn ecriture_word(&mut self, command: u8, data: u8) -> Result<()>;

    /// Lecture de plusieurs octets à partir d'un registre 8 bits
    fn lecture_bloc(&mut self, command: u8, buffer: &mut [u8]) -> Result<()>;

    /// Lecture d'un octet (word) sur un registre 8 bits
    fn lecture_word(&mut self, command: u8) -> Result<u8> {
        let mut buffer = [0u8];
        self.lecture_bloc(command, &mut buffer)?;
        Ok(buffer[0])
    }
}

impl<B: Bus + ?Sized> Bus for Box<B> {
    fn ecriture_word(&mut self, command: u8, data: u8) -> Result<()> {
        (**self).ecriture_word(command, data)
    }

    fn lecture_bloc(&mut self, command: u8, buffer: &mut [u8]) -> Result<()> {
        (**self).lecture_bloc(command, buffer)
    }
}

#[cfg(feature = "real-sensors")]
mod real {
    use super::*;
    use rppal::i2c::I2c;

    /// Ouvre le bus I2C demandé et sélectionne l'IST8310
    pub fn open(bus: u8) -> Result<I2c> {
        let mut i2c = I2c::with_bus(bus)
            .map_err(|e| Error::Resource(format!("bus I2C {} introuvable: {}", bus, e)))?;
        i2c.set_slave_address(IST8310_ADDR)
            .map_err(|e| Error::Resource(e.to_string()))?;
        Ok(i2c)
    }

    impl Bus for I2c {
        fn ecriture_word(&mut self, command: u8, data: u8) -> Result<()> {
            let written = self.write(&[command, data])?;
            if written != 2 {
                log::error!("[I2C] Ecriture incomplète ({}/2)", written);
                return Err(Error::Transport(format!("écriture incomplète sur {:#04x}", command).into()));
            }
            Ok(())
        }

        fn lecture_bloc(&mut self, command: u8, buffer: &mut [u8]) -> Result<()> {
            // Adresse du registre puis lecture, avec repeated start
            self.write_read(&[command], buffer)?;
            Ok(())
        }
    }
}

#[cfg(feature = "real-sensors")]
pub use real::open;

#[cfg(feature = "fake-sensors")]
mod fake {
    use super::*;
    use crate::sensors::mag::registry;
    use rand::Rng;

    /// Bus simulé : se comporte comme un IST8310 qui renvoie des mesures aléatoires
    pub struct FakeBus {
        data: [u8; 6],
    }

    impl FakeBus {
        pub fn new() -> Self {
            FakeBus { data: [0; 6] }
        }
    }

    impl Default for FakeBus {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Bus for FakeBus {
        fn ecriture_word(&mut self, command: u8, data: u8) -> Result<()> {
            if command == registry::IST8310_CNTL1 && data == registry::IST8310_CNTL1_SINGLE {
                let mut rng = rand::thread_rng();
                for axis in self.data.chunks_exact_mut(2) {
                    let value: i16 = rng.gen_range(-600..=600);
                    axis.copy_from_slice(&value.to_be_bytes());
                }
            }
            Ok(())
        }

        fn lecture_bloc(&mut self, command: u8, buffer: &mut [u8]) -> Result<()> {
            buffer.fill(0);
            match command {
                registry::IST8310_WHO_AM_I => {
                    if let Some(id) = buffer.first_mut() {
                        *id = registry::IST8310_DEVICE_ID;
                    }
                }
                registry::IST8310_DATA_START => {
                    let len = buffer.len().min(self.data.len());
                    buffer[..len].copy_from_slice(&self.data[..len]);
                }
                // CNTL2 : reset toujours terminé
                _ => {}
            }
            Ok(())
        }
    }
}

#[cfg(feature = "fake-sensors")]
pub use fake::FakeBus;
