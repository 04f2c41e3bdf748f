use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tokio_util::sync::{CancellationToken, WaitForCancellationFutureOwned};

use super::Ist8310;
use crate::error::{Error, Result};
use crate::i2c::Bus;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Data {
    pub field: Vector3<f32>,
    pub heading: f32,
}

/// Flux de lectures périodiques du magnétomètre.
///
/// Doit être créé depuis un runtime tokio. Chaque lecture (verrou + transactions I2C) tourne
/// sur le pool bloquant de tokio. Le flux se termine dès que le token est annulé.
pub struct Reader<B: Bus + Send + 'static> {
    mag: Arc<Ist8310<B>>,
    interval: Interval,
    cancelled: Pin<Box<WaitForCancellationFutureOwned>>,
    pending: Option<JoinHandle<Result<(Vector3<f32>, f32)>>>,
}

impl<B: Bus + Send + 'static> Reader<B> {
    pub fn new(mag: Arc<Ist8310<B>>, period: Duration, token: CancellationToken) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        Reader {
            mag,
            interval,
            cancelled: Box::pin(token.cancelled_owned()),
            pending: None,
        }
    }
}

impl<B: Bus + Send + 'static> Stream for Reader<B> {
    type Item = Result<Data>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        // Enregistre aussi le waker sur le token
        if this.cancelled.as_mut().poll(cx).is_ready() {
            this.pending = None;
            return Poll::Ready(None);
        }

        if this.pending.is_none() {
            if this.interval.poll_tick(cx).is_pending() {
                return Poll::Pending;
            }

            let mag = this.mag.clone();
            this.pending = Some(tokio::task::spawn_blocking(move || mag.read_vector_and_heading()));
        }

        let Some(pending) = this.pending.as_mut() else {
            return Poll::Pending;
        };

        let result = match Pin::new(pending).poll(cx) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(result) => result,
        };
        this.pending = None;

        let data = match result {
            Ok(read) => read.map(|(field, heading)| Data { field, heading }),
            Err(e) => {
                log::error!("[MAG] Tâche de lecture interrompue: {}", e);
                Err(Error::Resource(e.to_string()))
            }
        };

        Poll::Ready(Some(data))
    }
}
