//! Duration and boolean value parsing
//!
//! Configuration values arrive as strings from flags, the environment and
//! the config file. Durations use the `1h2m3.5s` notation understood by the
//! StorageOS API; booleans accept the usual `1/t/true/0/f/false` spellings.

use crate::error::{Error, Result};
use std::time::Duration;

const NANOS_PER_MICRO: u128 = 1_000;
const NANOS_PER_MILLI: u128 = 1_000_000;
const NANOS_PER_SEC: u128 = 1_000_000_000;
const NANOS_PER_MIN: u128 = 60 * NANOS_PER_SEC;
const NANOS_PER_HOUR: u128 = 60 * NANOS_PER_MIN;

/// Parse a duration such as `15s`, `500ms`, `1m30s` or `1.5h`
pub fn parse_duration(s: &str) -> Result<Duration> {
    let input = s.trim();
    if input.is_empty() {
        return Err(Error::DurationParse("empty duration string".into()));
    }
    if input == "0" {
        return Ok(Duration::ZERO);
    }

    let mut rest = input.strip_prefix('+').unwrap_or(input);
    if rest.starts_with('-') {
        return Err(Error::DurationParse(format!("negative duration: {}", s)));
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        // Number
        let num_end = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .unwrap_or(rest.len());
        let num_str = &rest[..num_end];
        rest = &rest[num_end..];

        if num_str.is_empty() || num_str == "." {
            return Err(Error::DurationParse(format!("invalid duration: {}", s)));
        }

        // Unit
        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit_str = &rest[..unit_end];
        rest = &rest[unit_end..];

        let unit = match unit_str {
            "ns" => 1,
            "us" | "µs" | "μs" => NANOS_PER_MICRO,
            "ms" => NANOS_PER_MILLI,
            "s" => NANOS_PER_SEC,
            "m" => NANOS_PER_MIN,
            "h" => NANOS_PER_HOUR,
            "" => {
                return Err(Error::DurationParse(format!(
                    "missing unit in duration: {}",
                    s
                )))
            }
            other => {
                return Err(Error::DurationParse(format!(
                    "unknown unit {:?} in duration: {}",
                    other, s
                )))
            }
        };

        let nanos = scale(num_str, unit)
            .ok_or_else(|| Error::DurationParse(format!("invalid duration: {}", s)))?;
        total = total
            .checked_add(nanos)
            .ok_or_else(|| Error::DurationParse(format!("duration out of range: {}", s)))?;
    }

    let nanos = u64::try_from(total)
        .map_err(|_| Error::DurationParse(format!("duration out of range: {}", s)))?;
    Ok(Duration::from_nanos(nanos))
}

/// Multiply a decimal number string by `unit` nanoseconds without going
/// through floating point.
fn scale(num: &str, unit: u128) -> Option<u128> {
    let (whole, frac) = match num.split_once('.') {
        Some((w, f)) => (w, f),
        None => (num, ""),
    };
    if frac.contains('.') {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut nanos = whole.checked_mul(unit)?;

    // Digits beyond nanosecond precision are dropped
    let frac = &frac[..frac.len().min(18)];
    if !frac.is_empty() {
        let digits: u128 = frac.parse().ok()?;
        let denom = 10u128.checked_pow(frac.len() as u32)?;
        nanos = nanos.checked_add(digits.checked_mul(unit)? / denom)?;
    }
    Some(nanos)
}

/// Render a duration in the same notation accepted by [`parse_duration`]
pub fn format_duration(d: Duration) -> String {
    let nanos = d.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < NANOS_PER_MICRO {
        return format!("{}ns", nanos);
    }
    if nanos < NANOS_PER_MILLI {
        return format!("{}µs", decimal(nanos, NANOS_PER_MICRO));
    }
    if nanos < NANOS_PER_SEC {
        return format!("{}ms", decimal(nanos, NANOS_PER_MILLI));
    }

    let hours = nanos / NANOS_PER_HOUR;
    let mins = (nanos % NANOS_PER_HOUR) / NANOS_PER_MIN;
    let secs = decimal(nanos % NANOS_PER_MIN, NANOS_PER_SEC);

    if hours > 0 {
        format!("{}h{}m{}s", hours, mins, secs)
    } else if mins > 0 {
        format!("{}m{}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}

fn decimal(value: u128, unit: u128) -> String {
    let whole = value / unit;
    let frac = value % unit;
    if frac == 0 {
        return whole.to_string();
    }
    let width = unit.to_string().len() - 1;
    let frac = format!("{:0width$}", frac, width = width);
    format!("{}.{}", whole, frac.trim_end_matches('0'))
}

/// Parse a boolean configuration value
pub fn parse_bool(s: &str) -> Result<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(Error::BoolParse(s.to_string())),
    }
}
