mod cli;
mod logger;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use futures::StreamExt;
use ist8310::sensors::mag::reader::Reader;
use ist8310::{Bus, Ist8310};
use tokio_util::sync::CancellationToken;

#[cfg(unix)]
use tokio::signal::unix::SignalKind;
use tokio::signal::{self};

use cli::Cli;

#[cfg(not(any(feature = "real-sensors", feature = "fake-sensors")))]
compile_error!("activer la feature `real-sensors` ou `fake-sensors`");

#[cfg(feature = "fake-sensors")]
fn open_bus(_cli: &Cli) -> anyhow::Result<Box<dyn Bus + Send>> {
    log::info!("[IST8310] Bus simulé [FAKE]");
    Ok(Box::new(ist8310::i2c::FakeBus::new()))
}

#[cfg(all(feature = "real-sensors", not(feature = "fake-sensors")))]
fn open_bus(cli: &Cli) -> anyhow::Result<Box<dyn Bus + Send>> {
    Ok(Box::new(ist8310::i2c::open(cli.bus)?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose)?;

    let token = CancellationToken::new();

    // Préparation du capteur
    let bus = open_bus(&cli)?;
    let mag = Arc::new(Ist8310::new(bus, cli.config())?);

    // Déclinaison magnétique (selon le lieu)
    mag.set_declination(cli.declination);

    // MAG
    let task = {
        let token = token.child_token();
        let mut reader = Reader::new(mag.clone(), Duration::from_millis(cli.interval_ms), token.clone());
        tokio::spawn(async move {
            while let Some(data) = reader.next().await {
                match data {
                    Ok(data) => {
                        println!(
                            "Magnetic: X={:.2} µT, Y={:.2} µT, Z={:.2} µT",
                            data.field.x, data.field.y, data.field.z
                        );
                        println!("Heading: {:.2}°", data.heading);
                    }
                    Err(e) => {
                        log::warn!("[MAG] Erreur lors de la lecture: {}", e);
                    }
                }
            }
        })
    };

    #[cfg(unix)]
    {
        let mut interrupt = tokio::signal::unix::signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = interrupt.recv() => {
                println!("Signal d'interruption reçu");
                token.cancel();
            },
            _ = signal::ctrl_c() => {
                println!("Signal de contrôle C reçu");
                token.cancel();
            },
        }
    }

    #[cfg(not(unix))]
    {
        tokio::select! {
            _ = signal::ctrl_c() => {
                println!("Signal de contrôle C reçu");
                token.cancel();
            },
        }
    }

    task.await?;

    // Le reader est terminé : plus aucune autre référence au capteur
    match Arc::try_unwrap(mag) {
        Ok(mag) => mag.deinit(),
        Err(_) => log::warn!("[IST8310] Capteur encore utilisé, libération au drop."),
    }

    Ok(())
}
