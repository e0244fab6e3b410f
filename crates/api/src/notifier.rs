//! Update observer
//!
//! Logs alert activity from the monitor's update stream, standing in for the
//! dashboard's notification surface.

use alerting::{AlertTransition, ClearCause};
use monitor::MonitorUpdate;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Follow `updates` until the monitor goes away
///
/// The task yields the number of notifications it emitted.
pub fn spawn_notifier(mut updates: broadcast::Receiver<MonitorUpdate>) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut emitted = 0u64;
        loop {
            match updates.recv().await {
                Ok(update) => {
                    if notify(&update) {
                        emitted += 1;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Notifier fell behind, skipped {} updates", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!("Update stream closed after {} notifications", emitted);
        emitted
    })
}

/// Log one update; returns whether it was worth a notification
fn notify(update: &MonitorUpdate) -> bool {
    match update.transition {
        AlertTransition::Unchanged => false,
        AlertTransition::Raised { class } if class.is_severe() => {
            warn!("{} impact detected ({}), awaiting driver", class.name(), class);
            true
        }
        AlertTransition::Raised { class } => {
            info!("{} impact detected ({}), driver prompted", class.name(), class);
            true
        }
        AlertTransition::Escalated { from, to } => {
            warn!("Impact escalated from {} to {}", from, to);
            true
        }
        AlertTransition::Acknowledged { class } => {
            info!("Class {} alert acknowledged", class);
            true
        }
        AlertTransition::Cleared {
            class,
            cause: ClearCause::EmergencyRequested,
        } => {
            error!("Driver requested emergency help after class {} impact", class);
            true
        }
        AlertTransition::Cleared { class, cause } => {
            info!("Class {} alert cleared: {}", class, cause.label());
            true
        }
    }
}
