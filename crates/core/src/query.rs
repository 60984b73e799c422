//! List-query parameters and their resolution into a concrete filter.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, FieldError};
use crate::time::parse_iso8601;
use crate::types::Timestamp;

/// Lookback applied when a query gives no `startDate`.
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

/// Row cap used when a query gives no `limit`.
pub const DEFAULT_LIST_LIMIT: i64 = 1000;

/// Largest accepted `limit`. Larger values are rejected, not clamped.
pub const MAX_LIST_LIMIT: i64 = 1000;

/// Raw `?deviceId=&startDate=&endDate=&limit=` parameters.
///
/// Values stay as strings until [`ReadingListQuery::resolve`] so that bad
/// input is reported as a field-level validation error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
}

/// A validated list filter with the time window fully resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingFilter {
    /// Exact device match, if any.
    pub device_id: Option<String>,
    /// Inclusive lower bound.
    pub since: Timestamp,
    /// Inclusive upper bound; `None` is unbounded.
    pub until: Option<Timestamp>,
    pub limit: i64,
}

impl ReadingListQuery {
    /// Validate the parameters and resolve defaults against `now`.
    ///
    /// Empty strings count as absent. Without `startDate` the lower bound
    /// is `now - 24h`.
    pub fn resolve(&self, now: Timestamp) -> Result<ReadingFilter, CoreError> {
        let since = match non_empty(&self.start_date) {
            Some(raw) => parse_date_param("startDate", raw),
            None => Ok(now - Duration::hours(DEFAULT_WINDOW_HOURS)),
        };
        let until = non_empty(&self.end_date)
            .map(|raw| parse_date_param("endDate", raw))
            .transpose();
        let limit = parse_limit(non_empty(&self.limit));

        match (since, until, limit) {
            (Ok(since), Ok(until), Ok(limit)) => Ok(ReadingFilter {
                device_id: non_empty(&self.device_id).map(str::to_string),
                since,
                until,
                limit,
            }),
            (since, until, limit) => Err(CoreError::InvalidFields(
                [since.err(), until.err(), limit.err()]
                    .into_iter()
                    .flatten()
                    .collect(),
            )),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_date_param(field: &'static str, raw: &str) -> Result<Timestamp, FieldError> {
    parse_iso8601(raw).ok_or_else(|| {
        FieldError::new(field, format!("{field} must be a valid ISO 8601 date string"))
    })
}

fn parse_limit(raw: Option<&str>) -> Result<i64, FieldError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_LIST_LIMIT);
    };
    match raw.parse::<i64>() {
        Ok(n) if (1..=MAX_LIST_LIMIT).contains(&n) => Ok(n),
        _ => Err(FieldError::new(
            "limit",
            format!("limit must be an integer between 1 and {MAX_LIST_LIMIT}"),
        )),
    }
}
