//! Deadline resolution.
//!
//! A deadline is supplied either as an absolute timestamp string or as a
//! relative (hours, minutes, seconds) offset from now. Resolution always
//! enforces the hard rule that an accepted deadline lies strictly in the
//! future; equality with `now` is rejected.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, TimeZone};

use crate::error::{Error, Result};

/// Default timestamp format for absolute deadlines, shared by parsing and
/// display so a formatted deadline round-trips exactly to the second.
pub const DEFAULT_DATETIME_FORMAT: &str = "%m/%d/%y %H:%M:%S";

/// Suggested starting value for relative deadline input fields.
pub const RELATIVE_ZERO: &str = "00:00:00";

/// User-supplied deadline, before resolution against a clock.
#[derive(Debug, Clone, PartialEq)]
pub enum DeadlineSpec {
    /// Timestamp string in the configured datetime format.
    Absolute(String),
    /// Offset from now. Fractional components are accepted; negatives are not.
    Relative {
        hours: f64,
        minutes: f64,
        seconds: f64,
    },
}

impl DeadlineSpec {
    /// Parse the CLI shorthand: `@<timestamp>` for absolute deadlines,
    /// `+H:M:S` for relative ones.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if let Some(stamp) = trimmed.strip_prefix('@') {
            let stamp = stamp.trim();
            if stamp.is_empty() {
                return Err(Error::InvalidDeadline(
                    "absolute deadline is empty".to_string(),
                ));
            }
            return Ok(DeadlineSpec::Absolute(stamp.to_string()));
        }

        if let Some(offset) = trimmed.strip_prefix('+') {
            let parts: Vec<&str> = offset.split(':').collect();
            if parts.len() != 3 {
                return Err(Error::InvalidDeadline(format!(
                    "expected +H:M:S, got '{trimmed}'"
                )));
            }
            let mut fields = [0.0f64; 3];
            for (slot, part) in fields.iter_mut().zip(&parts) {
                *slot = part.trim().parse::<f64>().map_err(|_| {
                    Error::InvalidDeadline(format!("'{part}' is not a number"))
                })?;
            }
            return Ok(DeadlineSpec::Relative {
                hours: fields[0],
                minutes: fields[1],
                seconds: fields[2],
            });
        }

        Err(Error::InvalidDeadline(format!(
            "deadline must start with '@' (absolute) or '+' (relative), got '{trimmed}'"
        )))
    }
}

/// Resolve a deadline spec against `now`.
///
/// Returns [`Error::PastDeadline`] when the resolved instant is not strictly
/// after `now`; the caller must not create or update any task in that case.
pub fn resolve(spec: &DeadlineSpec, now: DateTime<Local>, format: &str) -> Result<DateTime<Local>> {
    let deadline = match spec {
        DeadlineSpec::Absolute(raw) => parse_absolute(raw, format)?,
        DeadlineSpec::Relative {
            hours,
            minutes,
            seconds,
        } => now + relative_duration(*hours, *minutes, *seconds)?,
    };

    if deadline <= now {
        return Err(Error::PastDeadline {
            deadline: format_deadline(deadline, format),
            now: format_deadline(now, format),
        });
    }

    Ok(deadline)
}

/// Format an absolute deadline for display. Inverse of the absolute parse
/// for the same format string.
pub fn format_deadline(deadline: DateTime<Local>, format: &str) -> String {
    deadline.format(format).to_string()
}

/// Current time rendered in the deadline format, the natural pre-fill for an
/// absolute deadline input field.
pub fn suggest_absolute(now: DateTime<Local>, format: &str) -> String {
    format_deadline(now, format)
}

fn parse_absolute(raw: &str, format: &str) -> Result<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), format)
        .map_err(|err| Error::InvalidDeadline(format!("'{raw}': {err}")))?;

    match Local.from_local_datetime(&naive) {
        LocalResult::Single(instant) => Ok(instant),
        // DST fold: take the earlier of the two wall-clock mappings.
        LocalResult::Ambiguous(earliest, _) => Ok(earliest),
        LocalResult::None => Err(Error::InvalidDeadline(format!(
            "'{raw}' does not exist in the local timezone"
        ))),
    }
}

fn relative_duration(hours: f64, minutes: f64, seconds: f64) -> Result<Duration> {
    for (label, value) in [("hours", hours), ("minutes", minutes), ("seconds", seconds)] {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidDeadline(format!(
                "{label} component must be a non-negative number, got {value}"
            )));
        }
    }

    let total_ms = (hours * 3600.0 + minutes * 60.0 + seconds) * 1000.0;
    if total_ms > i64::MAX as f64 {
        return Err(Error::InvalidDeadline(
            "relative offset is too large".to_string(),
        ));
    }

    Ok(Duration::milliseconds(total_ms as i64))
}
