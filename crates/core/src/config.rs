//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into the parser and its collaborators. The reference instant is always supplied by
//! the caller, so relative dates and recency windows stay deterministic under test.

use crate::constants::{
    DEFAULT_DIGEST_MAX_LENGTH, DEFAULT_LAB_WINDOW_DAYS, DEFAULT_TIMELINE_WINDOW_DAYS,
};
use crate::{HealthMdError, HealthMdResult};
use chrono::{DateTime, NaiveDate, Utc};

/// Core configuration resolved at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoreConfig {
    reference: DateTime<Utc>,
    lab_window_days: u32,
    timeline_window_days: u32,
    digest_max_length: usize,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `HealthMdError::InvalidInput` if the digest length limit is zero.
    pub fn new(
        reference: DateTime<Utc>,
        lab_window_days: u32,
        timeline_window_days: u32,
        digest_max_length: usize,
    ) -> HealthMdResult<Self> {
        if digest_max_length == 0 {
            return Err(HealthMdError::InvalidInput(
                "digest max length must be greater than zero".into(),
            ));
        }

        Ok(Self {
            reference,
            lab_window_days,
            timeline_window_days,
            digest_max_length,
        })
    }

    /// Configuration with default windows and digest length for the given reference instant.
    pub fn with_reference(reference: DateTime<Utc>) -> Self {
        Self {
            reference,
            lab_window_days: DEFAULT_LAB_WINDOW_DAYS,
            timeline_window_days: DEFAULT_TIMELINE_WINDOW_DAYS,
            digest_max_length: DEFAULT_DIGEST_MAX_LENGTH,
        }
    }

    pub fn reference(&self) -> DateTime<Utc> {
        self.reference
    }

    pub fn lab_window_days(&self) -> u32 {
        self.lab_window_days
    }

    pub fn timeline_window_days(&self) -> u32 {
        self.timeline_window_days
    }

    pub fn digest_max_length(&self) -> usize {
        self.digest_max_length
    }
}

/// Parse the reference instant from an optional override value.
///
/// Accepts either an ISO date (`YYYY-MM-DD`, interpreted as midnight UTC) or an RFC 3339
/// timestamp. Returns `Ok(None)` if `value` is `None` or blank; the caller then picks the
/// current time.
///
/// # Errors
///
/// Returns `HealthMdError::InvalidReferenceDate` if the value is present but unparseable.
pub fn reference_from_env_value(value: Option<String>) -> HealthMdResult<Option<DateTime<Utc>>> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(value) = value else {
        return Ok(None);
    };

    if let Ok(date) = NaiveDate::parse_from_str(&value, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(Some(midnight.and_utc()));
        }
    }

    DateTime::parse_from_rfc3339(&value)
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .map_err(|_| HealthMdError::InvalidReferenceDate { value })
}
