//! Drift re-check scheduling
//!
//! A pass that converged successfully asks to be run again after the
//! object's `driftDetectionInterval`, so that edits made directly against
//! Harbor get detected and reverted even when the declared state never
//! changes.

use chrono::TimeDelta;
use std::time::Duration;

use crate::error::{CoreError, Result};

/// What the scheduler should do once a pass finishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requeue {
    /// Wait for the next change to the object
    Never,
    /// Run again right away (remote entity vanished and must be recreated)
    Immediately,
    /// Run again after the given delay
    After(Duration),
}

/// Compute the requeue decision for an optional interval
///
/// Unset or zero disables periodic re-checks; negative intervals are
/// rejected.
pub fn drift_check(interval: Option<TimeDelta>) -> Result<Requeue> {
    let Some(interval) = interval else {
        return Ok(Requeue::Never);
    };

    if interval < TimeDelta::zero() {
        return Err(CoreError::NegativeInterval {
            value: format_signed(interval),
        });
    }

    match interval.to_std() {
        Ok(d) if d.is_zero() => Ok(Requeue::Never),
        Ok(d) => Ok(Requeue::After(d)),
        Err(e) => Err(CoreError::InvalidInterval {
            value: format_signed(interval),
            message: e.to_string(),
        }),
    }
}

/// Parse an interval such as `30s`, `5m`, `1h 30m` or `-1s`
pub fn parse_interval(value: &str) -> Result<TimeDelta> {
    let trimmed = value.trim();
    let (negative, magnitude) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest.trim_start()),
        None => (false, trimmed),
    };

    // "0" is accepted without a unit
    let parsed = if magnitude == "0" {
        Duration::ZERO
    } else {
        humantime::parse_duration(magnitude).map_err(|e| CoreError::InvalidInterval {
            value: value.to_string(),
            message: e.to_string(),
        })?
    };

    let delta = TimeDelta::from_std(parsed).map_err(|e| CoreError::InvalidInterval {
        value: value.to_string(),
        message: e.to_string(),
    })?;

    Ok(if negative { -delta } else { delta })
}

/// Parse an optional configured interval and compute the requeue decision
pub fn requeue_for(interval: Option<&str>) -> Result<Requeue> {
    let parsed = interval.map(parse_interval).transpose()?;
    drift_check(parsed)
}

fn format_signed(delta: TimeDelta) -> String {
    let magnitude = delta.abs().to_std().unwrap_or_default();
    let formatted = humantime::format_duration(magnitude).to_string();
    if delta < TimeDelta::zero() {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drift_check_unset() {
        assert_eq!(drift_check(None).unwrap(), Requeue::Never);
    }

    #[test]
    fn test_drift_check_zero() {
        assert_eq!(drift_check(Some(TimeDelta::zero())).unwrap(), Requeue::Never);
    }

    #[test]
    fn test_drift_check_negative() {
        let result = drift_check(Some(TimeDelta::seconds(-1)));
        assert_eq!(
            result,
            Err(CoreError::NegativeInterval {
                value: "-1s".to_string()
            })
        );
    }

    #[test]
    fn test_drift_check_positive() {
        assert_eq!(
            drift_check(Some(TimeDelta::seconds(30))).unwrap(),
            Requeue::After(Duration::from_secs(30))
        );
    }

    #[test]
    fn test_parse_interval() {
        assert_eq!(parse_interval("30s").unwrap(), TimeDelta::seconds(30));
        assert_eq!(parse_interval("5m").unwrap(), TimeDelta::minutes(5));
        assert_eq!(parse_interval("1h 30m").unwrap(), TimeDelta::minutes(90));
        assert_eq!(parse_interval("-1s").unwrap(), TimeDelta::seconds(-1));
        assert_eq!(parse_interval("0").unwrap(), TimeDelta::zero());
        assert!(parse_interval("soon").is_err());
        assert!(parse_interval("").is_err());
    }

    #[test]
    fn test_requeue_for() {
        assert_eq!(requeue_for(None).unwrap(), Requeue::Never);
        assert_eq!(requeue_for(Some("0s")).unwrap(), Requeue::Never);
        assert_eq!(
            requeue_for(Some("2m")).unwrap(),
            Requeue::After(Duration::from_secs(120))
        );
        assert!(matches!(
            requeue_for(Some("-30s")),
            Err(CoreError::NegativeInterval { .. })
        ));
        assert!(matches!(
            requeue_for(Some("every day")),
            Err(CoreError::InvalidInterval { .. })
        ));
    }
}
