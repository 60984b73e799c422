//! Threshold-based alert derivation for sensor readings.
//!
//! Pure logic with fixed thresholds. Alerts are never persisted; the server
//! derives them for the alerts endpoint and the dashboard client derives
//! them locally from whatever readings it fetched.

use serde::{Deserialize, Serialize};

use crate::reading::{device_display_name, Measurements, SensorReading};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Inclusive `[min, max]` band of acceptable values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub min: f64,
    pub max: f64,
}

impl Band {
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Nitrogen above this many ppm raises an `error` alert.
pub const NITROGEN_MAX_PPM: f64 = 200.0;

/// pH outside this band raises a `warning` alert.
pub const PH_BAND: Band = Band { min: 6.0, max: 7.0 };

/// Declared phosphorus band. Not checked by [`evaluate`].
pub const PHOSPHORUS_BAND: Band = Band {
    min: 0.0,
    max: 200.0,
};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    #[default]
    Warning,
    Error,
}

/// Card colour state shown by the dashboard for a reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Success,
    Warning,
    Error,
}

/// Result of evaluating one reading against the thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertInfo {
    pub triggered: bool,
    /// Meaningless when `triggered` is false; defaults to `warning`.
    pub severity: AlertSeverity,
    pub reasons: Vec<String>,
}

impl AlertInfo {
    pub fn status(&self) -> StatusLevel {
        match (self.triggered, self.severity) {
            (false, _) => StatusLevel::Success,
            (true, AlertSeverity::Error) => StatusLevel::Error,
            (true, AlertSeverity::Warning) => StatusLevel::Warning,
        }
    }
}

/// One alerting reading as listed in the dashboard banner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceAlert {
    pub reading_id: DbId,
    pub device_id: String,
    pub device_name: String,
    pub timestamp: Timestamp,
    pub severity: AlertSeverity,
    pub reasons: Vec<String>,
}

/// Alerts across a set of readings, split by severity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertSummary {
    pub all_normal: bool,
    pub errors: Vec<DeviceAlert>,
    pub warnings: Vec<DeviceAlert>,
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Evaluate a reading's measurements against the fixed thresholds.
///
/// Every violated threshold contributes a reason. A nitrogen violation makes
/// the alert an `error`; a pH violation alone is a `warning`.
pub fn evaluate(m: &Measurements) -> AlertInfo {
    let mut reasons = Vec::new();
    let mut severity = AlertSeverity::Warning;

    if m.nitrogen > NITROGEN_MAX_PPM {
        reasons.push(format!(
            "Nitrogen level ({} ppm) exceeds maximum threshold of {NITROGEN_MAX_PPM} ppm",
            m.nitrogen
        ));
        severity = AlertSeverity::Error;
    }

    if !PH_BAND.contains(m.ph) {
        reasons.push(format!(
            "pH level ({}) is outside optimal range of {}-{}",
            m.ph, PH_BAND.min, PH_BAND.max
        ));
    }

    AlertInfo {
        triggered: !reasons.is_empty(),
        severity,
        reasons,
    }
}

/// Card status for a reading: `success` when no alert fired, otherwise the
/// alert's severity.
pub fn status_level(m: &Measurements) -> StatusLevel {
    evaluate(m).status()
}

/// Evaluate each reading and group the triggered ones by severity,
/// preserving input order.
pub fn summarize<R: SensorReading>(readings: &[R]) -> AlertSummary {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for reading in readings {
        let info = evaluate(&reading.measurements());
        if !info.triggered {
            continue;
        }
        let alert = DeviceAlert {
            reading_id: reading.id(),
            device_id: reading.device_id().to_string(),
            device_name: device_display_name(reading.device_id()),
            timestamp: reading.timestamp(),
            severity: info.severity,
            reasons: info.reasons,
        };
        match alert.severity {
            AlertSeverity::Error => errors.push(alert),
            AlertSeverity::Warning => warnings.push(alert),
        }
    }

    AlertSummary {
        all_normal: errors.is_empty() && warnings.is_empty(),
        errors,
        warnings,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
