//! Push subscription between a reading source and the monitor

use classifier::Reading;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Receiver of delivered readings
///
/// Called once per reading, in arrival order, never concurrently for the
/// same subscription.
pub trait ReadingSink: Send + Sync + 'static {
    fn on_reading(&self, reading: Reading);
}

impl<T: ReadingSink + ?Sized> ReadingSink for Arc<T> {
    fn on_reading(&self, reading: Reading) {
        (**self).on_reading(reading)
    }
}

struct Pump {
    source: String,
    stop: watch::Sender<bool>,
    task: JoinHandle<u64>,
}

/// Owns at most one live subscription feeding a sink
pub struct Ingestion<S: ReadingSink> {
    sink: Arc<S>,
    active: Mutex<Option<Pump>>,
}

impl<S: ReadingSink> Ingestion<S> {
    pub fn new(sink: Arc<S>) -> Self {
        Self {
            sink,
            active: Mutex::new(None),
        }
    }

    /// Start delivering readings from `readings` to the sink
    ///
    /// Returns `false` and drops `readings` if a subscription is already
    /// running, so a second registration never duplicates effects.
    pub async fn subscribe(&self, source: &str, mut readings: mpsc::Receiver<Reading>) -> bool {
        let mut active = self.active.lock().await;
        if let Some(pump) = active.as_ref() {
            if !pump.task.is_finished() {
                warn!(
                    "Ignoring subscription from {}: {} is already active",
                    source, pump.source
                );
                return false;
            }
        }

        let (stop, mut stopped) = watch::channel(false);
        let sink = Arc::clone(&self.sink);

        let task = tokio::spawn(async move {
            let mut delivered = 0u64;
            loop {
                tokio::select! {
                    biased;
                    _ = stopped.changed() => break,
                    next = readings.recv() => match next {
                        Some(reading) => {
                            sink.on_reading(reading);
                            delivered += 1;
                        }
                        None => break,
                    },
                }
            }
            delivered
        });

        info!("Subscribed to reading source {}", source);
        *active = Some(Pump {
            source: source.to_string(),
            stop,
            task,
        });
        true
    }

    /// Stop the current subscription and wait for it to finish
    ///
    /// Returns the number of readings delivered, or `None` when nothing was
    /// subscribed. Once this returns the sink receives no further readings.
    pub async fn teardown(&self) -> Option<u64> {
        let pump = self.active.lock().await.take()?;
        let _ = pump.stop.send(true);

        match pump.task.await {
            Ok(delivered) => {
                info!(
                    "Unsubscribed from {} after {} readings",
                    pump.source, delivered
                );
                Some(delivered)
            }
            Err(e) => {
                warn!("Subscription task for {} failed: {}", pump.source, e);
                None
            }
        }
    }

    /// Name of the running source, if any
    pub async fn active_source(&self) -> Option<String> {
        self.active
            .lock()
            .await
            .as_ref()
            .filter(|pump| !pump.task.is_finished())
            .map(|pump| pump.source.clone())
    }
}
