//! Reading classification

use crate::error::ReadingError;
use crate::reading::Reading;
use crate::severity::{LogStatus, SeverityClass, SeverityIndex};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where the severity class of an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassSource {
    /// Mapped from the index thresholds
    Computed,
    /// Taken from the device label
    Reported,
}

/// A classified reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedEvent {
    pub timestamp: DateTime<Utc>,
    pub severity_index: SeverityIndex,
    pub severity_class: SeverityClass,
    pub log_status: LogStatus,
    pub class_source: ClassSource,
}

impl ClassifiedEvent {
    /// Build an event with a consistent log status
    pub fn new(
        timestamp: DateTime<Utc>,
        severity_index: SeverityIndex,
        severity_class: SeverityClass,
        class_source: ClassSource,
    ) -> Self {
        Self {
            timestamp,
            severity_index,
            severity_class,
            log_status: LogStatus::from(severity_class),
            class_source,
        }
    }
}

/// Classify a reading
///
/// The index is always recomputed from the raw values. A device-reported
/// class, when present, takes precedence over the threshold mapping.
pub fn classify(reading: &Reading) -> Result<ClassifiedEvent, ReadingError> {
    reading.validate()?;

    let index = SeverityIndex::compute(
        reading.acceleration,
        reading.angular_rate,
        reading.sound_level,
    );
    let computed = SeverityClass::from_index(index);

    let (class, source) = match reading.reported_class {
        Some(reported) => {
            if reported != computed {
                debug!(
                    "Device label {} overrides computed class {} (SFI {})",
                    reported, computed, index
                );
            }
            (reported, ClassSource::Reported)
        }
        None => (computed, ClassSource::Computed),
    };

    Ok(ClassifiedEvent::new(reading.timestamp, index, class, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reading(accel: f64, gyro: f64, sound: f64) -> Reading {
        Reading::new(accel, gyro, 1008.0, sound, Utc::now())
    }

    #[test]
    fn test_quiet_reading_is_class_a() {
        let event = classify(&reading(0.6, 12.0, 350.0)).unwrap();
        assert_eq!(event.severity_class, SeverityClass::A);
        assert_eq!(event.log_status, LogStatus::Normal);
        assert_eq!(event.class_source, ClassSource::Computed);
    }

    #[test]
    fn test_moderate_impact_is_class_c() {
        let r = Reading::new(4.0, 180.0, 1005.0, 950.0, Utc::now());
        let event = classify(&r).unwrap();
        assert!((event.severity_index.value() - 2.155).abs() < 1e-9);
        assert_eq!(event.severity_class, SeverityClass::C);
        assert_eq!(event.log_status, LogStatus::Alert);
        assert_eq!(event.timestamp, r.timestamp);
    }

    #[test]
    fn test_device_label_wins_on_disagreement() {
        let r = reading(0.6, 12.0, 350.0).with_reported_class(SeverityClass::D);
        let event = classify(&r).unwrap();
        assert_eq!(event.severity_class, SeverityClass::D);
        assert_eq!(event.log_status, LogStatus::Critical);
        assert_eq!(event.class_source, ClassSource::Reported);
        // The index still reflects the raw values
        assert!(event.severity_index.value() < 1.0);
    }

    #[test]
    fn test_device_label_agreeing_with_index() {
        let r = reading(4.0, 180.0, 950.0).with_reported_class(SeverityClass::C);
        let event = classify(&r).unwrap();
        assert_eq!(event.severity_class, SeverityClass::C);
        assert_eq!(event.class_source, ClassSource::Reported);
    }

    #[test]
    fn test_non_finite_reading_is_refused() {
        let r = reading(f64::NAN, 12.0, 350.0);
        assert!(matches!(
            classify(&r),
            Err(ReadingError::NonFinite { field: "acceleration", .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_index_is_finite_and_non_negative(
            accel in -1.0e6f64..1.0e6,
            gyro in -1.0e6f64..1.0e6,
            sound in -1.0e6f64..1.0e6,
        ) {
            let event = classify(&reading(accel, gyro, sound)).unwrap();
            prop_assert!(event.severity_index.value().is_finite());
            prop_assert!(event.severity_index.value() >= 0.0);
        }

        #[test]
        fn prop_class_is_monotonic_in_acceleration(
            accel in 0.0f64..20.0,
            delta in 0.0f64..20.0,
            gyro in 0.0f64..500.0,
            sound in 0.0f64..2000.0,
        ) {
            let lower = classify(&reading(accel, gyro, sound)).unwrap();
            let higher = classify(&reading(accel + delta, gyro, sound)).unwrap();
            prop_assert!(lower.severity_class <= higher.severity_class);
        }

        #[test]
        fn prop_low_index_without_label_is_class_a(
            accel in 0.0f64..1.0,
            gyro in 0.0f64..100.0,
            sound in 0.0f64..500.0,
        ) {
            let event = classify(&reading(accel, gyro, sound)).unwrap();
            // 0.4 + 0.15 + 0.15 < 1.0
            prop_assert_eq!(event.severity_class, SeverityClass::A);
        }
    }
}
