//! Device payload published by the impact module

use chrono::{DateTime, Utc};
use classifier::{Reading, ReadingError, SeverityClass};
use serde::{Deserialize, Serialize};

/// Latest sample as written by the device to the live data store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePayload {
    pub accel: Option<f64>,
    pub gyro: Option<f64>,
    pub pressure: Option<f64>,
    pub sound: Option<f64>,
    /// Index computed on the device; informational only
    pub sfi: Option<f64>,
    /// Discrete class computed on the device
    pub impact_level: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl DevicePayload {
    /// Convert into a reading, stamping `received_at` if the device sent no time
    pub fn into_reading(self, received_at: DateTime<Utc>) -> Result<Reading, ReadingError> {
        let acceleration = self.accel.ok_or(ReadingError::MissingField("accel"))?;
        let angular_rate = self.gyro.ok_or(ReadingError::MissingField("gyro"))?;
        let pressure = self.pressure.ok_or(ReadingError::MissingField("pressure"))?;
        let sound_level = self.sound.ok_or(ReadingError::MissingField("sound"))?;

        let mut reading = Reading::new(
            acceleration,
            angular_rate,
            pressure,
            sound_level,
            self.timestamp.unwrap_or(received_at),
        );

        if let Some(label) = self.impact_level {
            reading = reading.with_reported_class(label.parse::<SeverityClass>()?);
        }

        Ok(reading)
    }
}
