//! Sensor reading submissions: field constraints and normalization.
//!
//! Inbound payloads arrive loosely typed ([`ReadingSubmission`]) so that a
//! wrong type is reported per field rather than as an opaque decode error.
//! [`normalize_submission`] turns a submission into a [`NewReading`] ready
//! for persistence, or a [`CoreError::InvalidFields`] listing every problem.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CoreError, FieldError};
use crate::time::{parse_iso8601, to_stored_precision};
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Two uppercase letters followed by three digits, e.g. `GH001`.
pub const DEVICE_ID_PATTERN: &str = r"^[A-Z]{2}[0-9]{3}$";

static DEVICE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEVICE_ID_PATTERN).expect("valid regex"));

pub const DEVICE_ID_MESSAGE: &str = "Device ID must be in format XX000 (e.g., GH001)";

pub const TIMESTAMP_MESSAGE: &str = "Timestamp must be a valid ISO 8601 date string";

/// Accepted range and precision for one measured quantity.
#[derive(Debug, Clone, Copy)]
pub struct MeasurementRange {
    /// Wire name of the field.
    pub field: &'static str,
    /// Human label used in messages.
    pub label: &'static str,
    pub unit: &'static str,
    pub min: f64,
    pub max: f64,
    pub max_decimals: u32,
}

pub const NITROGEN_RANGE: MeasurementRange = MeasurementRange {
    field: "nitrogen",
    label: "Nitrogen",
    unit: "ppm",
    min: 0.0,
    max: 500.0,
    max_decimals: 2,
};

pub const PHOSPHORUS_RANGE: MeasurementRange = MeasurementRange {
    field: "phosphorus",
    label: "Phosphorus",
    unit: "ppm",
    min: 0.0,
    max: 200.0,
    max_decimals: 2,
};

pub const PH_RANGE: MeasurementRange = MeasurementRange {
    field: "ph",
    label: "pH",
    unit: "",
    min: 0.0,
    max: 14.0,
    max_decimals: 1,
};

impl MeasurementRange {
    fn range_message(&self) -> String {
        let message = format!("{} must be between {} and {}", self.label, self.min, self.max);
        if self.unit.is_empty() {
            message
        } else {
            format!("{message} {}", self.unit)
        }
    }
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A reading submission as received from a device or the dashboard form.
///
/// Every field is optional and untyped; `null` is treated as missing.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingSubmission {
    pub device_id: Option<Value>,
    pub timestamp: Option<Value>,
    pub nitrogen: Option<Value>,
    pub phosphorus: Option<Value>,
    pub ph: Option<Value>,
}

/// A validated reading, ready to be inserted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReading {
    pub device_id: String,
    pub timestamp: Timestamp,
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub ph: f64,
}

/// The measured values of a reading, as consumed by the alert evaluator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurements {
    pub nitrogen: f64,
    pub phosphorus: f64,
    pub ph: f64,
}

/// Read access to a stored reading.
///
/// Implemented by the database row model and by the client's wire model so
/// alert derivation runs identically on either side.
pub trait SensorReading {
    fn id(&self) -> DbId;
    fn device_id(&self) -> &str;
    fn timestamp(&self) -> Timestamp;
    fn measurements(&self) -> Measurements;
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Validate a submission and produce a [`NewReading`].
///
/// `now` is the single instant used when the submission has no timestamp;
/// the caller captures it once per request.
pub fn normalize_submission(
    submission: &ReadingSubmission,
    now: Timestamp,
) -> Result<NewReading, CoreError> {
    let mut errors = Vec::new();

    let device_id = collect(&mut errors, device_id_field(submission.device_id.as_ref()));
    let timestamp = collect(&mut errors, timestamp_field(submission.timestamp.as_ref(), now));
    let nitrogen = collect(
        &mut errors,
        measurement_field(submission.nitrogen.as_ref(), &NITROGEN_RANGE),
    );
    let phosphorus = collect(
        &mut errors,
        measurement_field(submission.phosphorus.as_ref(), &PHOSPHORUS_RANGE),
    );
    let ph = collect(&mut errors, measurement_field(submission.ph.as_ref(), &PH_RANGE));

    match (device_id, timestamp, nitrogen, phosphorus, ph) {
        (Some(device_id), Some(timestamp), Some(nitrogen), Some(phosphorus), Some(ph))
            if errors.is_empty() =>
        {
            Ok(NewReading {
                device_id,
                timestamp,
                nitrogen,
                phosphorus,
                ph,
            })
        }
        _ => Err(CoreError::InvalidFields(errors)),
    }
}

/// Check a device identifier against [`DEVICE_ID_PATTERN`].
pub fn is_valid_device_id(device_id: &str) -> bool {
    DEVICE_ID_RE.is_match(device_id)
}

fn collect<T>(errors: &mut Vec<FieldError>, result: Result<T, FieldError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(e);
            None
        }
    }
}

fn device_id_field(value: Option<&Value>) -> Result<String, FieldError> {
    match value {
        None => Err(FieldError::new("deviceId", "deviceId is required")),
        Some(Value::String(s)) if is_valid_device_id(s) => Ok(s.clone()),
        Some(Value::String(_)) => Err(FieldError::new("deviceId", DEVICE_ID_MESSAGE)),
        Some(_) => Err(FieldError::new("deviceId", "deviceId must be a string")),
    }
}

fn timestamp_field(value: Option<&Value>, now: Timestamp) -> Result<Timestamp, FieldError> {
    match value {
        None => Ok(to_stored_precision(now)),
        Some(Value::String(s)) => {
            parse_iso8601(s).ok_or_else(|| FieldError::new("timestamp", TIMESTAMP_MESSAGE))
        }
        Some(_) => Err(FieldError::new("timestamp", TIMESTAMP_MESSAGE)),
    }
}

fn measurement_field(value: Option<&Value>, range: &MeasurementRange) -> Result<f64, FieldError> {
    let value = value.ok_or_else(|| {
        FieldError::new(range.field, format!("{} is required", range.field))
    })?;

    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
    .ok_or_else(|| FieldError::new(range.field, format!("{} must be a number", range.label)))?;

    if !(range.min..=range.max).contains(&number) {
        return Err(FieldError::new(range.field, range.range_message()));
    }
    if !has_at_most_decimals(number, range.max_decimals) {
        return Err(FieldError::new(
            range.field,
            format!(
                "{} must have at most {} decimal place(s)",
                range.label, range.max_decimals
            ),
        ));
    }
    Ok(number)
}

/// Whether `value` has no more than `places` fractional digits in its
/// shortest round-trip decimal form.
fn has_at_most_decimals(value: f64, places: u32) -> bool {
    let rendered = value.to_string();
    let fraction = rendered.split_once('.').map_or("", |(_, fraction)| fraction);
    fraction.len() <= places as usize
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

/// Human-friendly device name: `GH001` becomes `Greenhouse 001`.
pub fn device_display_name(device_id: &str) -> String {
    let prefix: String = device_id.chars().take(2).collect();
    let number: String = device_id.chars().skip(2).collect();

    let kind = match prefix.as_str() {
        "GH" => "Greenhouse",
        "FD" => "Field",
        "TB" => "Tunnel",
        "PH" => "Polyhouse",
        _ => "Device",
    };
    format!("{kind} {number}")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
