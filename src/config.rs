//! Scan configuration.
//!
//! Defaults are tuned for interactive use; everything can be overridden
//! through builders or `SOCIOSCOPE_*` environment variables.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Weighting knobs for the overall risk score.
///
/// The three components (PII exposure, impersonation, correlation) are
/// capped independently and summed, then clamped to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskWeights {
    /// Points per distinct profile that exposes an email or phone.
    pub pii_per_profile: u32,
    /// Upper bound on the PII exposure component.
    pub pii_cap: u32,
    /// Upper bound on the impersonation component.
    pub impersonation_cap: u32,
    /// Flat bonus when cross-profile correlation is established.
    pub correlation_bonus: u32,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            pii_per_profile: 10,
            pii_cap: 40,
            impersonation_cap: 40,
            correlation_bonus: 20,
        }
    }
}

/// Runtime options for one scan.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Upper bound for one collection attempt against one platform.
    pub per_platform_timeout: Duration,
    /// Hard deadline for the whole scan; platforms still pending when it
    /// expires are cut off and the result is marked partial.
    pub global_deadline: Duration,
    /// Extra attempts allowed per platform, spent on transient failures only.
    pub retry_limit: u32,
    /// Username similarity (0-100) at or above which a non-canonical
    /// profile can be flagged as a potential impersonation.
    pub high_similarity_threshold: u8,
    /// Most human-readable flag strings kept on the correlation verdict.
    pub max_correlation_flags: usize,
    /// Scoring weights for the final risk aggregation.
    pub risk_weights: RiskWeights,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            per_platform_timeout: Duration::from_secs(30),
            global_deadline: Duration::from_secs(60),
            retry_limit: 0,
            high_similarity_threshold: 70,
            max_correlation_flags: 5,
            risk_weights: RiskWeights::default(),
        }
    }
}

impl ScanOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with any `SOCIOSCOPE_*` variables present.
    ///
    /// Unparseable values are ignored rather than fatal, so a stray
    /// variable cannot brick a scan.
    pub fn from_env() -> Self {
        let mut options = Self::default();
        if let Some(secs) = env_parse::<u64>("SOCIOSCOPE_PLATFORM_TIMEOUT_SECS") {
            options.per_platform_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = env_parse::<u64>("SOCIOSCOPE_GLOBAL_DEADLINE_SECS") {
            options.global_deadline = Duration::from_secs(secs);
        }
        if let Some(limit) = env_parse::<u32>("SOCIOSCOPE_RETRY_LIMIT") {
            options.retry_limit = limit;
        }
        if let Some(threshold) = env_parse::<u8>("SOCIOSCOPE_SIMILARITY_THRESHOLD") {
            options.high_similarity_threshold = threshold.min(100);
        }
        options
    }

    pub fn with_per_platform_timeout(mut self, timeout: Duration) -> Self {
        self.per_platform_timeout = timeout;
        self
    }

    pub fn with_global_deadline(mut self, deadline: Duration) -> Self {
        self.global_deadline = deadline;
        self
    }

    pub fn with_retry_limit(mut self, retries: u32) -> Self {
        self.retry_limit = retries;
        self
    }

    pub fn with_high_similarity_threshold(mut self, threshold: u8) -> Self {
        self.high_similarity_threshold = threshold.min(100);
        self
    }

    pub fn with_risk_weights(mut self, weights: RiskWeights) -> Self {
        self.risk_weights = weights;
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ScanOptions::default();
        assert_eq!(options.per_platform_timeout, Duration::from_secs(30));
        assert_eq!(options.global_deadline, Duration::from_secs(60));
        assert_eq!(options.retry_limit, 0);
        assert_eq!(options.high_similarity_threshold, 70);
        assert_eq!(options.max_correlation_flags, 5);
    }

    #[test]
    fn test_default_weights() {
        let weights = RiskWeights::default();
        assert_eq!(weights.pii_per_profile, 10);
        assert_eq!(weights.pii_cap, 40);
        assert_eq!(weights.impersonation_cap, 40);
        assert_eq!(weights.correlation_bonus, 20);
    }

    #[test]
    fn test_builder_chain() {
        let options = ScanOptions::new()
            .with_per_platform_timeout(Duration::from_millis(50))
            .with_retry_limit(2)
            .with_high_similarity_threshold(140);
        assert_eq!(options.per_platform_timeout, Duration::from_millis(50));
        assert_eq!(options.retry_limit, 2);
        // Thresholds are percentages and clamp at 100.
        assert_eq!(options.high_similarity_threshold, 100);
    }

    // The only test touching SOCIOSCOPE_* variables, so it can set and
    // clear them without racing other threads.
    #[test]
    fn test_env_overrides_and_garbage_values() {
        std::env::set_var("SOCIOSCOPE_PLATFORM_TIMEOUT_SECS", "5");
        std::env::set_var("SOCIOSCOPE_GLOBAL_DEADLINE_SECS", "7");
        std::env::set_var("SOCIOSCOPE_RETRY_LIMIT", "3");
        std::env::set_var("SOCIOSCOPE_SIMILARITY_THRESHOLD", "not-a-number");

        let options = ScanOptions::from_env();
        assert_eq!(options.per_platform_timeout, Duration::from_secs(5));
        assert_eq!(options.global_deadline, Duration::from_secs(7));
        assert_eq!(options.retry_limit, 3);
        // Unparseable values are ignored, not fatal.
        assert_eq!(options.high_similarity_threshold, 70);

        // Out-of-range percentages clamp like the builder does.
        std::env::set_var("SOCIOSCOPE_SIMILARITY_THRESHOLD", "140");
        assert_eq!(ScanOptions::from_env().high_similarity_threshold, 100);

        for key in [
            "SOCIOSCOPE_PLATFORM_TIMEOUT_SECS",
            "SOCIOSCOPE_GLOBAL_DEADLINE_SECS",
            "SOCIOSCOPE_RETRY_LIMIT",
            "SOCIOSCOPE_SIMILARITY_THRESHOLD",
        ] {
            std::env::remove_var(key);
        }
        assert_eq!(
            ScanOptions::from_env().per_platform_timeout,
            Duration::from_secs(30)
        );
    }
}
