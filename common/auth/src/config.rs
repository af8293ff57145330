use chrono::{Duration, Utc};
use tracing::warn;

use crate::algorithm::Algorithm;

/// Validity window applied when the configured value is missing or unusable.
pub const DEFAULT_VALIDITY_DAYS: i64 = 1;

/// Runtime policy shared by issuance and verification.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    issuer: String,
    audience: String,
    validity_days: i64,
    leeway_seconds: u32,
    algorithm: Algorithm,
}

impl JwtConfig {
    /// Construct config with a one day validity window, HS256 and no leeway.
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            validity_days: DEFAULT_VALIDITY_DAYS,
            leeway_seconds: 0,
            algorithm: Algorithm::HS256,
        }
    }

    /// Adjust the allowed clock skew when checking `exp`.
    pub fn with_leeway(mut self, seconds: u32) -> Self {
        self.leeway_seconds = seconds;
        self
    }

    /// Non-positive or unrepresentable values fall back to the default window.
    pub fn with_validity_days(mut self, days: i64) -> Self {
        self.validity_days = if days > 0 && window_fits(days) {
            days
        } else {
            DEFAULT_VALIDITY_DAYS
        };
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn audience(&self) -> &str {
        &self.audience
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn validity_days(&self) -> i64 {
        self.validity_days
    }

    /// `None` when the configured window does not fit a `chrono::Duration`.
    pub fn validity(&self) -> Option<Duration> {
        Duration::try_days(self.validity_days)
    }

    pub fn leeway(&self) -> Duration {
        Duration::seconds(i64::from(self.leeway_seconds))
    }

    pub fn leeway_seconds(&self) -> u32 {
        self.leeway_seconds
    }

    /// Algorithms the verifier accepts in a token header.
    pub fn allowed_algorithms(&self) -> &[Algorithm] {
        std::slice::from_ref(&self.algorithm)
    }
}

/// Parses a configured validity window in whole days.
///
/// Missing, unparseable, non-positive and out-of-range values fall back to
/// [`DEFAULT_VALIDITY_DAYS`] instead of failing; the fallback is logged.
pub fn parse_validity_days(raw: Option<&str>) -> i64 {
    let Some(raw) = raw else {
        warn!(
            fallback_days = DEFAULT_VALIDITY_DAYS,
            "token validity window not configured; using fallback"
        );
        return DEFAULT_VALIDITY_DAYS;
    };

    match raw.trim().parse::<i64>() {
        Ok(days) if days > 0 && window_fits(days) => days,
        Ok(days) if days > 0 => {
            warn!(
                configured = days,
                fallback_days = DEFAULT_VALIDITY_DAYS,
                "token validity window exceeds the supported time range; using fallback"
            );
            DEFAULT_VALIDITY_DAYS
        }
        // Zero and negative windows are accepted by plain integer parsing but
        // would mint already-expired tokens, so they take the fallback too.
        Ok(days) => {
            warn!(
                configured = days,
                fallback_days = DEFAULT_VALIDITY_DAYS,
                "token validity window must be positive; using fallback"
            );
            DEFAULT_VALIDITY_DAYS
        }
        Err(err) => {
            warn!(
                configured = raw,
                error = %err,
                fallback_days = DEFAULT_VALIDITY_DAYS,
                "token validity window is not an integer; using fallback"
            );
            DEFAULT_VALIDITY_DAYS
        }
    }
}

/// A window is usable only if an expiry computed from the current time fits.
fn window_fits(days: i64) -> bool {
    Duration::try_days(days)
        .and_then(|window| Utc::now().checked_add_signed(window))
        .is_some()
}
