// SPDX-License-Identifier: MIT OR Apache-2.0

//! Duration literal parsing and formatting.
//!
//! Literals are one or more `<decimal><unit>` pairs such as `"5s"`, `"1h30m"`
//! or `"1.5ms"`. Units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`.
//! The bare literal `"0"` is accepted as zero. Negative literals are rejected
//! because [`Duration`] is unsigned.

use std::time::Duration;

const NANOS_PER_SEC: u128 = 1_000_000_000;

fn unit_nanos(unit: &str) -> Option<u128> {
    match unit {
        "ns" => Some(1),
        "us" | "µs" | "μs" => Some(1_000),
        "ms" => Some(1_000_000),
        "s" => Some(NANOS_PER_SEC),
        "m" => Some(60 * NANOS_PER_SEC),
        "h" => Some(3_600 * NANOS_PER_SEC),
        _ => None,
    }
}

/// Parses a duration literal, returning `None` if it is malformed.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tierconf::domain::duration::parse_duration;
///
/// assert_eq!(parse_duration("2h"), Some(Duration::from_secs(7200)));
/// assert_eq!(parse_duration("1m30s"), Some(Duration::from_secs(90)));
/// assert_eq!(parse_duration("1.5s"), Some(Duration::from_millis(1500)));
/// assert_eq!(parse_duration("fast"), None);
/// ```
pub fn parse_duration(input: &str) -> Option<Duration> {
    let trimmed = input.trim();
    let mut rest = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if rest == "0" {
        return Some(Duration::ZERO);
    }
    if rest.is_empty() {
        return None;
    }

    let mut total: u128 = 0;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        let (number, after) = rest.split_at(number_len);

        let unit_len = after
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after.len());
        let (unit, after) = after.split_at(unit_len);

        let scale = unit_nanos(unit)?;
        total = total.checked_add(component_nanos(number, scale)?)?;
        rest = after;
    }

    let secs = u64::try_from(total / NANOS_PER_SEC).ok()?;
    // Remainder is always below one second.
    let nanos = (total % NANOS_PER_SEC) as u32;
    Some(Duration::new(secs, nanos))
}

/// Converts `<int>[.<frac>]` in a unit of `scale` nanoseconds to nanoseconds.
fn component_nanos(number: &str, scale: u128) -> Option<u128> {
    let (whole, frac) = match number.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (number, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if frac.contains('.') {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut nanos = whole.checked_mul(scale)?;

    // Digits beyond nanosecond precision cannot contribute.
    let frac = &frac[..frac.len().min(18)];
    if !frac.is_empty() {
        let digits: u128 = frac.parse().ok()?;
        let divisor = 10u128.pow(frac.len() as u32);
        nanos = nanos.checked_add(digits.checked_mul(scale)? / divisor)?;
    }
    Some(nanos)
}

/// Formats a duration using the same literal grammar [`parse_duration`] accepts.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tierconf::domain::duration::format_duration;
///
/// assert_eq!(format_duration(Duration::from_secs(7200)), "2h");
/// assert_eq!(format_duration(Duration::from_millis(90_250)), "1m30s250ms");
/// assert_eq!(format_duration(Duration::ZERO), "0s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    if duration.is_zero() {
        return "0s".to_string();
    }

    let mut out = String::new();
    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3_600, (secs % 3_600) / 60, secs % 60);
    let sub = duration.subsec_nanos();
    let (millis, micros, nanos) = (sub / 1_000_000, (sub / 1_000) % 1_000, sub % 1_000);

    for (amount, unit) in [
        (hours, "h"),
        (minutes, "m"),
        (seconds, "s"),
        (u64::from(millis), "ms"),
        (u64::from(micros), "us"),
        (u64::from(nanos), "ns"),
    ] {
        if amount > 0 {
            out.push_str(&amount.to_string());
            out.push_str(unit);
        }
    }
    out
}
