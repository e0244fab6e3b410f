//! Synthetic reading source
//!
//! Draws readings from five severity tiers so the dashboard can be exercised
//! without the device: A 70%, B 15%, C 8%, D 4%, E 3%.

use chrono::{DateTime, Utc};
use classifier::{Reading, SeverityClass};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Synthetic source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Interval between readings (milliseconds)
    pub interval_ms: u64,
    /// RNG seed; random when absent
    pub seed: Option<u64>,
    /// Attach the tier as a device label
    pub labelled: bool,
    /// Channel buffer between generator and subscriber
    pub buffer: usize,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            interval_ms: 2000,
            seed: None,
            labelled: true,
            buffer: 16,
        }
    }
}

/// Value range `base..base + span`
type Span = (f64, f64);

struct Tier {
    /// Cumulative probability upper bound
    upper: f64,
    class: SeverityClass,
    accel: Span,
    gyro: Span,
    sound: Span,
}

static TIERS: [Tier; 5] = [
    Tier {
        upper: 0.70,
        class: SeverityClass::A,
        accel: (0.5, 0.5),
        gyro: (10.0, 20.0),
        sound: (300.0, 200.0),
    },
    Tier {
        upper: 0.85,
        class: SeverityClass::B,
        accel: (1.2, 0.8),
        gyro: (40.0, 40.0),
        sound: (550.0, 150.0),
    },
    Tier {
        upper: 0.93,
        class: SeverityClass::C,
        accel: (2.1, 0.9),
        gyro: (90.0, 50.0),
        sound: (720.0, 150.0),
    },
    Tier {
        upper: 0.97,
        class: SeverityClass::D,
        accel: (3.2, 1.3),
        gyro: (150.0, 80.0),
        sound: (900.0, 150.0),
    },
    Tier {
        upper: 1.0,
        class: SeverityClass::E,
        accel: (5.0, 2.0),
        gyro: (250.0, 100.0),
        sound: (1100.0, 200.0),
    },
];

const BASE_PRESSURE_HPA: f64 = 1008.0;
const PRESSURE_SWING_HPA: f64 = 4.0;

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Tiered random reading generator
pub struct MockGenerator {
    rng: StdRng,
    labelled: bool,
}

impl MockGenerator {
    /// Create a generator; the same seed yields the same sequence
    pub fn new(seed: Option<u64>, labelled: bool) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, labelled }
    }

    /// Draw the next reading
    pub fn next_reading(&mut self, timestamp: DateTime<Utc>) -> Reading {
        let roll: f64 = self.rng.gen();
        let tier = TIERS
            .iter()
            .find(|t| roll < t.upper)
            .unwrap_or(&TIERS[TIERS.len() - 1]);

        let accel = self.sample(tier.accel);
        let gyro = self.sample(tier.gyro);
        let sound = self.sample(tier.sound);
        let pressure = BASE_PRESSURE_HPA + (self.rng.gen::<f64>() - 0.5) * PRESSURE_SWING_HPA;

        let reading = Reading::new(
            round_to(accel, 2),
            round_to(gyro, 1),
            round_to(pressure, 2),
            sound.round(),
            timestamp,
        );

        if self.labelled {
            reading.with_reported_class(tier.class)
        } else {
            reading
        }
    }

    fn sample(&mut self, (base, span): Span) -> f64 {
        base + self.rng.gen::<f64>() * span
    }
}

/// Start a generator task emitting one reading per interval
///
/// The task stops once the returned receiver is dropped.
pub fn spawn_mock_source(config: MockConfig) -> mpsc::Receiver<Reading> {
    let (tx, rx) = mpsc::channel(config.buffer.max(1));
    let interval = Duration::from_millis(config.interval_ms.max(1));

    info!(
        "Starting synthetic reading source every {:?} (seed: {:?})",
        interval, config.seed
    );

    tokio::spawn(async move {
        let mut generator = MockGenerator::new(config.seed, config.labelled);
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;
            let reading = generator.next_reading(Utc::now());
            if tx.send(reading).await.is_err() {
                debug!("Synthetic source receiver dropped, stopping");
                break;
            }
        }
    });

    rx
}
