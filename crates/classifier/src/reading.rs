//! Raw sensor readings

use crate::error::ReadingError;
use crate::severity::SeverityClass;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One sample from the impact module
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Acceleration (g)
    pub acceleration: f64,
    /// Angular rate (deg/s)
    pub angular_rate: f64,
    /// Barometric pressure (hPa)
    pub pressure: f64,
    /// Sound level (ADC units)
    pub sound_level: f64,
    pub timestamp: DateTime<Utc>,
    /// Class computed on the device, overrides the dashboard's own mapping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_class: Option<SeverityClass>,
}

impl Reading {
    /// Create a reading without a device label
    pub fn new(
        acceleration: f64,
        angular_rate: f64,
        pressure: f64,
        sound_level: f64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            acceleration,
            angular_rate,
            pressure,
            sound_level,
            timestamp,
            reported_class: None,
        }
    }

    /// Attach a device-reported class
    pub fn with_reported_class(mut self, class: SeverityClass) -> Self {
        self.reported_class = Some(class);
        self
    }

    /// Reject non-finite sensor values
    pub fn validate(&self) -> Result<(), ReadingError> {
        let fields = [
            ("acceleration", self.acceleration),
            ("angular_rate", self.angular_rate),
            ("pressure", self.pressure),
            ("sound_level", self.sound_level),
        ];

        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ReadingError::NonFinite { field, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finite_reading_is_valid() {
        let reading = Reading::new(1.0, 20.0, 1008.0, 400.0, Utc::now());
        assert!(reading.validate().is_ok());
    }

    #[test]
    fn test_negative_values_pass_validation() {
        let reading = Reading::new(-1.0, -20.0, -5.0, -400.0, Utc::now());
        assert!(reading.validate().is_ok());
    }

    #[test]
    fn test_nan_is_rejected() {
        let reading = Reading::new(1.0, f64::NAN, 1008.0, 400.0, Utc::now());
        assert!(matches!(
            reading.validate(),
            Err(ReadingError::NonFinite { field: "angular_rate", .. })
        ));
    }

    #[test]
    fn test_infinite_pressure_is_rejected() {
        let reading = Reading::new(1.0, 20.0, f64::INFINITY, 400.0, Utc::now());
        assert!(matches!(
            reading.validate(),
            Err(ReadingError::NonFinite { field: "pressure", .. })
        ));
    }

    #[test]
    fn test_reported_class_is_optional() {
        let reading = Reading::new(1.0, 20.0, 1008.0, 400.0, Utc::now());
        assert_eq!(reading.reported_class, None);

        let labelled = reading.with_reported_class(SeverityClass::D);
        assert_eq!(labelled.reported_class, Some(SeverityClass::D));
    }
}
