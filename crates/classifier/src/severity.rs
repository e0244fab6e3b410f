//! Severity classes, log status and the sensor fusion index

use crate::error::ReadingError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound of the SFI gauge. The index itself is never clamped.
pub const DISPLAY_CEILING: f64 = 10.0;

/// Lower SFI bound of class B
pub const MINOR_THRESHOLD: f64 = 1.0;
/// Lower SFI bound of class C
pub const MODERATE_THRESHOLD: f64 = 2.0;
/// Lower SFI bound of class D
pub const SEVERE_THRESHOLD: f64 = 3.5;
/// Lower SFI bound of class E
pub const CRITICAL_THRESHOLD: f64 = 5.0;

/// Impact severity class, ordered `A < B < C < D < E`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeverityClass {
    /// Normal
    A,
    /// Minor
    B,
    /// Moderate
    C,
    /// Severe
    D,
    /// Critical
    E,
}

impl SeverityClass {
    /// All classes in ascending order
    pub const ALL: [SeverityClass; 5] = [
        SeverityClass::A,
        SeverityClass::B,
        SeverityClass::C,
        SeverityClass::D,
        SeverityClass::E,
    ];

    /// Map a sensor fusion index onto its class
    pub fn from_index(index: SeverityIndex) -> Self {
        let sfi = index.value();
        if sfi >= CRITICAL_THRESHOLD {
            SeverityClass::E
        } else if sfi >= SEVERE_THRESHOLD {
            SeverityClass::D
        } else if sfi >= MODERATE_THRESHOLD {
            SeverityClass::C
        } else if sfi >= MINOR_THRESHOLD {
            SeverityClass::B
        } else {
            SeverityClass::A
        }
    }

    /// Single-letter label
    pub fn label(&self) -> &'static str {
        match self {
            SeverityClass::A => "A",
            SeverityClass::B => "B",
            SeverityClass::C => "C",
            SeverityClass::D => "D",
            SeverityClass::E => "E",
        }
    }

    /// Human-readable tier name
    pub fn name(&self) -> &'static str {
        match self {
            SeverityClass::A => "Normal",
            SeverityClass::B => "Minor",
            SeverityClass::C => "Moderate",
            SeverityClass::D => "Severe",
            SeverityClass::E => "Critical",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SeverityClass::A => "No impact detected",
            SeverityClass::B => "Small vibrations",
            SeverityClass::C => "Noticeable impact",
            SeverityClass::D => "Major collision",
            SeverityClass::E => "Emergency event",
        }
    }

    /// SFI interval covered by this class, as shown in the classification guide
    pub fn index_range(&self) -> &'static str {
        match self {
            SeverityClass::A => "SFI < 1.0",
            SeverityClass::B => "SFI 1.0-2.0",
            SeverityClass::C => "SFI 2.0-3.5",
            SeverityClass::D => "SFI 3.5-5.0",
            SeverityClass::E => "SFI >= 5.0",
        }
    }

    /// Classes B and above are logged and prompt the driver
    pub fn is_alerting(&self) -> bool {
        *self >= SeverityClass::B
    }

    /// Classes D and E drive the severe overlay and allow an emergency request
    pub fn is_severe(&self) -> bool {
        *self >= SeverityClass::D
    }
}

impl fmt::Display for SeverityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SeverityClass {
    type Err = ReadingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" => Ok(SeverityClass::A),
            "B" => Ok(SeverityClass::B),
            "C" => Ok(SeverityClass::C),
            "D" => Ok(SeverityClass::D),
            "E" => Ok(SeverityClass::E),
            other => Err(ReadingError::UnknownLabel(other.to_string())),
        }
    }
}

/// Presentation status attached to each logged event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogStatus {
    Normal,
    Alert,
    Critical,
}

impl From<SeverityClass> for LogStatus {
    fn from(class: SeverityClass) -> Self {
        match class {
            SeverityClass::D | SeverityClass::E => LogStatus::Critical,
            SeverityClass::C => LogStatus::Alert,
            SeverityClass::A | SeverityClass::B => LogStatus::Normal,
        }
    }
}

/// Sensor fusion index (SFI)
///
/// `0.4 * acceleration + 0.3 * (angular_rate / 200) + 0.3 * (sound_level / 1000)`,
/// with negative inputs treated as zero. Always finite and non-negative when
/// built from finite inputs.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeverityIndex(f64);

impl SeverityIndex {
    const ACCEL_WEIGHT: f64 = 0.4;
    const GYRO_WEIGHT: f64 = 0.3;
    const GYRO_SCALE: f64 = 200.0;
    const SOUND_WEIGHT: f64 = 0.3;
    const SOUND_SCALE: f64 = 1000.0;

    /// Fuse raw sensor values into an index
    pub fn compute(acceleration: f64, angular_rate: f64, sound_level: f64) -> Self {
        let accel = acceleration.max(0.0);
        let gyro = angular_rate.max(0.0);
        let sound = sound_level.max(0.0);

        Self(
            accel * Self::ACCEL_WEIGHT
                + (gyro / Self::GYRO_SCALE) * Self::GYRO_WEIGHT
                + (sound / Self::SOUND_SCALE) * Self::SOUND_WEIGHT,
        )
    }

    /// Raw, unclamped index
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Index clamped to the gauge ceiling
    pub fn display_value(&self) -> f64 {
        self.0.min(DISPLAY_CEILING)
    }
}

impl fmt::Display for SeverityIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
