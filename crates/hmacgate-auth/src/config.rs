//! Verifier configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use tracing::warn;

/// Default allowed difference between `x-date` and server time, in seconds.
pub const DEFAULT_CLOCK_SKEW_SECONDS: i64 = 300;
/// Default lifetime of a recorded nonce, in minutes.
pub const DEFAULT_REPLAY_WINDOW_MINUTES: i64 = 10;
/// Default bound on a single credential lookup, in milliseconds.
pub const DEFAULT_RESOLVER_TIMEOUT_MS: u64 = 2_000;

/// Tunables for [`HmacVerifier`](crate::verifier::HmacVerifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    /// Maximum accepted `|now - x-date|`. The bound is inclusive.
    pub clock_skew_tolerance: TimeDelta,
    /// How long an accepted nonce is remembered.
    pub replay_window: TimeDelta,
    /// Upper bound on a credential lookup.
    pub resolver_timeout: Duration,
}

impl VerifierConfig {
    /// Create configuration from environment variables.
    ///
    /// Reads `HMAC_CLOCK_SKEW_SECONDS`, `HMAC_REPLAY_WINDOW_MINUTES` and
    /// `HMAC_RESOLVER_TIMEOUT_MS`. Unset, unparsable or out-of-range values
    /// fall back to the defaults. The skew tolerance must not be negative; the
    /// replay window and resolver timeout must be positive.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            clock_skew_tolerance: TimeDelta::seconds(parse_setting(
                &lookup,
                "HMAC_CLOCK_SKEW_SECONDS",
                DEFAULT_CLOCK_SKEW_SECONDS,
                |v| *v >= 0,
            )),
            replay_window: TimeDelta::minutes(parse_setting(
                &lookup,
                "HMAC_REPLAY_WINDOW_MINUTES",
                DEFAULT_REPLAY_WINDOW_MINUTES,
                |v| *v > 0,
            )),
            resolver_timeout: Duration::from_millis(parse_setting(
                &lookup,
                "HMAC_RESOLVER_TIMEOUT_MS",
                DEFAULT_RESOLVER_TIMEOUT_MS,
                |v| *v > 0,
            )),
        }
    }
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            clock_skew_tolerance: TimeDelta::seconds(DEFAULT_CLOCK_SKEW_SECONDS),
            replay_window: TimeDelta::minutes(DEFAULT_REPLAY_WINDOW_MINUTES),
            resolver_timeout: Duration::from_millis(DEFAULT_RESOLVER_TIMEOUT_MS),
        }
    }
}

fn parse_setting<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    in_range: impl Fn(&T) -> bool,
) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(value) if in_range(&value) => value,
        Ok(value) => {
            warn!(key, %value, %default, "ignoring out-of-range configuration value");
            default
        }
        Err(_) => {
            warn!(key, value = %raw, %default, "ignoring unparsable configuration value");
            default
        }
    }
}
