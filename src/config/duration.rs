//! Human-readable durations for TTLs and poll intervals.

use anyhow::{bail, Context, Result};
use std::time::Duration;

/// Parse a duration string like "3d", "24h", "30m", "45s" or "250ms".
///
/// A bare number is taken as seconds.
pub fn parse_ttl(ttl: &str) -> Result<Duration> {
    let ttl = ttl.trim().to_lowercase();
    if ttl.is_empty() {
        bail!("duration is empty");
    }

    let (digits, unit_secs, millis) = if let Some(ms) = ttl.strip_suffix("ms") {
        (ms, 0, true)
    } else if let Some(days) = ttl.strip_suffix('d') {
        (days, 86_400, false)
    } else if let Some(hours) = ttl.strip_suffix('h') {
        (hours, 3_600, false)
    } else if let Some(mins) = ttl.strip_suffix('m') {
        (mins, 60, false)
    } else if let Some(secs) = ttl.strip_suffix('s') {
        (secs, 1, false)
    } else {
        // Assume seconds if no suffix
        (ttl.as_str(), 1, false)
    };

    let n: u64 = digits
        .trim()
        .parse()
        .with_context(|| format!("invalid duration '{}'", ttl))?;

    if millis {
        return Ok(Duration::from_millis(n));
    }
    n.checked_mul(unit_secs)
        .map(Duration::from_secs)
        .with_context(|| format!("duration '{}' is too large", ttl))
}

/// Format a duration for display, using the largest whole unit.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs == 0 && duration.subsec_millis() > 0 {
        format!("{}ms", duration.subsec_millis())
    } else if secs >= 86400 && secs % 86400 == 0 {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}
