//! Internal helpers for input validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every operation enforces the same rules.

use chrono::{DateTime, SubsecRound, Utc};

use crate::{EngineError, ResultEngine};

/// Trim a required text field, rejecting blanks.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidName(format!("{label} must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Trim an optional text field, mapping blanks to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Trim a description, falling back to `default` when blank.
pub(crate) fn description_or(value: Option<&str>, default: &str) -> String {
    normalize_optional_text(value).unwrap_or_else(|| default.to_string())
}

pub(crate) fn ensure_positive(amount: i64, label: &str) -> ResultEngine<()> {
    if amount <= 0 {
        return Err(EngineError::InvalidAmount(format!("{label} must be > 0")));
    }
    Ok(())
}

/// Stored timestamps carry whole seconds so range bounds such as
/// `23:59:59` compare exactly.
pub(crate) fn whole_seconds(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(0)
}

pub(crate) fn validate_range(from: DateTime<Utc>, to: DateTime<Utc>) -> ResultEngine<()> {
    if from > to {
        return Err(EngineError::InvalidAmount(
            "invalid range: date_in must be <= date_out".to_string(),
        ));
    }
    Ok(())
}
