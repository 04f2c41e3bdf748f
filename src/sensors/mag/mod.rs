pub mod filter;
pub mod heading;
pub mod ist8310;
pub mod reader;
pub mod registry;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use nalgebra::Vector3;
use tokio_util::sync::CancellationToken;

use crate::config::{Config, DeviceConfig};
use crate::error::{Error, Result};
use crate::i2c::Bus;

use self::filter::SoftFilter;

/// Etat partagé entre l'appelant et le thread de filtrage
struct State<B> {
    i2c: B,
    config: DeviceConfig,
    filter: Option<SoftFilter>,
}

impl<B: Bus> State<B> {
    /// Un cycle du thread de filtrage : une mesure, poussée sur les trois axes
    fn refresh(&mut self) {
        let Some(filter) = self.filter.as_mut() else {
            return;
        };

        match ist8310::read_raw(&mut self.i2c) {
            Ok(raw) => filter.push_sample(&raw.to_vector()),
            // Erreur passagère : on retentera au prochain cycle
            Err(e) => log::trace!("[IST8310] Cycle ignoré: {}", e),
        }
    }

    /// Moyenne filtrée, ou mesure directe sans filtre. Echange X/Y selon la configuration.
    fn read(&mut self) -> Result<Vector3<f32>> {
        let field = match self.filter.as_ref() {
            Some(filter) => filter.average_vector(),
            None => ist8310::read_raw(&mut self.i2c)?.to_vector(),
        };

        if self.config.flip_xy {
            Ok(heading::swap_xy(&field))
        } else {
            Ok(field)
        }
    }
}

fn lock<B>(state: &Mutex<State<B>>) -> MutexGuard<'_, State<B>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Magnétomètre IST8310
pub struct Ist8310<B: Bus + Send + 'static> {
    state: Arc<Mutex<State<B>>>,
    token: CancellationToken,
    thread: Option<JoinHandle<()>>,
}

impl<B: Bus + Send + 'static> Ist8310<B> {
    /// Constructeur : reset du capteur puis démarrage du thread de filtrage si demandé.
    ///
    /// En cas d'échec, tout ce qui a été créé est libéré avant de retourner l'erreur.
    pub fn new(i2c: B, config: Config) -> Result<Self> {
        log::info!("[IST8310] Initialisation ...");

        let state = Arc::new(Mutex::new(State {
            i2c,
            config: DeviceConfig::from(&config),
            filter: config.soft_filter.then(SoftFilter::new),
        }));

        // Reset du capteur
        {
            let mut state = lock(&state);
            if let Err(e) = ist8310::soft_reset(&mut state.i2c, config.reset_attempts, config.reset_delay) {
                log::error!("[IST8310] Reset failed: {}", e);
                return Err(e);
            }
        }

        let mut mag = Ist8310 { state, token: CancellationToken::new(), thread: None };

        if config.soft_filter {
            mag.thread = Some(mag.spawn_filter(config.sample_period)?);
        }

        log::info!("[IST8310] Initialisation terminée.");
        Ok(mag)
    }

    fn spawn_filter(&self, period: Duration) -> Result<JoinHandle<()>> {
        let state = self.state.clone();
        let token = self.token.clone();

        log::debug!("[IST8310] Démarrage du thread de filtrage ...");
        thread::Builder::new()
            .name("ist8310".into())
            .spawn(move || {
                while !token.is_cancelled() {
                    lock(&state).refresh();
                    thread::sleep(period);
                }

                log::debug!("[IST8310] Fin du thread de filtrage.");
            })
            .map_err(|e| {
                log::error!("[IST8310] Impossible de créer le thread de filtrage: {}", e);
                Error::Resource(e.to_string())
            })
    }

    /// Récupère le champ magnétique (moyenne filtrée ou mesure directe)
    pub fn read_vector(&self) -> Result<Vector3<f32>> {
        lock(&self.state).read()
    }

    /// Champ magnétique et cap (degrés), lus sous le même verrou
    pub fn read_vector_and_heading(&self) -> Result<(Vector3<f32>, f32)> {
        let mut state = lock(&self.state);
        let field = state.read()?;

        // X/Y déjà échangés par read()
        let heading = heading::heading(&field, state.config.mag_decl, false);
        Ok((field, heading))
    }

    /// Cap en degrés, ou l'erreur de lecture
    pub fn try_read_heading(&self) -> Result<f32> {
        self.read_vector_and_heading().map(|(_, heading)| heading)
    }

    /// Cap en degrés. Renvoie 0.0 si la lecture échoue : utiliser `try_read_heading` pour
    /// distinguer l'échec d'un vrai cap nord.
    pub fn read_heading(&self) -> f32 {
        match self.try_read_heading() {
            Ok(heading) => heading,
            Err(e) => {
                log::warn!("[IST8310] Cap indisponible: {}", e);
                0.0
            }
        }
    }

    /// Echange des axes X et Y
    pub fn set_flip_xy(&self, flip: bool) {
        lock(&self.state).config.flip_xy = flip;
    }

    /// Déclinaison magnétique en radians (aucune validation)
    pub fn set_declination(&self, declination: f32) {
        lock(&self.state).config.mag_decl = declination;
    }

    pub fn config(&self) -> DeviceConfig {
        lock(&self.state).config
    }

    pub fn is_filtering(&self) -> bool {
        self.thread.is_some()
    }

    /// Arrête le thread de filtrage puis libère le capteur
    pub fn deinit(mut self) {
        self.stop();
        log::info!("[IST8310] Capteur libéré.");
    }

    fn stop(&mut self) {
        self.token.cancel();

        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("[IST8310] Le thread de filtrage a paniqué.");
            }
        }
    }
}

#[cfg(feature = "real-sensors")]
impl Ist8310<rppal::i2c::I2c> {
    /// Ouvre le bus I2C `bus` (ex: 1 pour /dev/i2c-1) et initialise le capteur
    pub fn open(bus: u8, config: Config) -> Result<Self> {
        let i2c = crate::i2c::open(bus)?;
        Self::new(i2c, config)
    }
}

impl<B: Bus + Send + 'static> Drop for Ist8310<B> {
    fn drop(&mut self) {
        self.stop();
    }
}
