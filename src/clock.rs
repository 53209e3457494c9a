//! Expiry arithmetic for tokens whose upstream encoding is ambiguous.
//!
//! The identity API has, across versions, returned expiry stamps as a
//! seconds epoch, a milliseconds epoch, and the string form of either,
//! with no discriminator field. Everything in this module is a pure
//! function of its inputs; callers inject the current instant, which keeps
//! the polling policy testable without a timer.

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Raw stamps below this value cannot be a plausible milliseconds epoch
/// (it is year 2286 when read as seconds), so they are read as seconds.
const SECONDS_CUTOFF: f64 = 1e10;

/// Default margin before expiry at which a refresh becomes due.
pub const DEFAULT_REFRESH_THRESHOLD_SECS: i64 = 300;

/// An expiry stamp as it arrives from the provider: numeric or stringly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawExpiry {
    Number(f64),
    Text(String),
}

/// Normalizes a raw expiry stamp to an epoch-milliseconds value.
///
/// Numeric strings are parsed; values below the cutoff are interpreted as
/// seconds and scaled. Returns `None` for anything non-numeric or
/// non-finite — callers must treat that as already expired (fail closed).
pub fn normalize_to_millis(raw: &RawExpiry) -> Option<i64> {
    let value = match raw {
        RawExpiry::Number(n) => *n,
        RawExpiry::Text(s) => s.trim().parse::<f64>().ok()?,
    };

    if !value.is_finite() {
        return None;
    }

    if value.abs() < SECONDS_CUTOFF {
        Some((value * 1000.0) as i64)
    } else {
        Some(value as i64)
    }
}

/// Converts normalized epoch milliseconds to an instant.
pub fn to_instant(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Normalizes a raw stamp all the way to an instant, or `None` (fail closed).
pub fn normalize_to_instant(raw: &RawExpiry) -> Option<DateTime<Utc>> {
    normalize_to_millis(raw).and_then(to_instant)
}

/// Whole seconds until expiry, floored at zero.
pub fn ttl_seconds(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    ((expires_at - now).num_milliseconds() / 1000).max(0)
}

/// True once the instant has been reached.
pub fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now >= expires_at
}

/// True iff the token is still valid but inside the refresh margin.
pub fn should_refresh(expires_at: DateTime<Utc>, now: DateTime<Utc>, threshold: Duration) -> bool {
    !is_expired(expires_at, now) && ttl_seconds(expires_at, now) < threshold.num_seconds()
}

/// Tiered polling interval: far from expiry poll rarely, near expiry poll
/// often, expired poll immediately.
///
/// - more than 10 minutes remaining: 5 minutes
/// - 5 to 10 minutes remaining: 1 minute
/// - under 5 minutes remaining: 30 seconds
/// - expired: zero
pub fn next_poll_interval(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> std::time::Duration {
    if is_expired(expires_at, now) {
        return std::time::Duration::ZERO;
    }

    let ttl = ttl_seconds(expires_at, now);
    let secs = if ttl > 600 {
        300
    } else if ttl > 300 {
        60
    } else {
        30
    };

    std::time::Duration::from_secs(secs)
}
