//! Overall risk aggregation.
//!
//! Folds PII exposure, impersonation signals, and the correlation
//! verdict into one capped score with human-readable factors and
//! remediation guidance.

use crate::config::RiskWeights;
use crate::model::{
    CorrelationVerdict, ImpersonationFlag, OverallRisk, PlatformProfile, RiskLevel,
};
use tracing::debug;

/// Compute the final verdict for a scan.
///
/// Each component is capped independently, the sum is clamped to 100,
/// and the score is deterministic for identical inputs. An empty scan
/// scores zero but still carries a generic recommendation.
pub fn aggregate(
    profiles: &[&PlatformProfile],
    impersonation_flags: &[ImpersonationFlag],
    verdict: &CorrelationVerdict,
    weights: &RiskWeights,
) -> OverallRisk {
    let exposing: Vec<&&PlatformProfile> = profiles
        .iter()
        .filter(|profile| {
            profile
                .evidence
                .as_ref()
                .map(|evidence| evidence.has_contact_pii())
                .unwrap_or(false)
        })
        .collect();
    let pii_profiles = exposing.len();
    let pii_items: usize = exposing
        .iter()
        .filter_map(|profile| profile.evidence.as_ref())
        .map(|evidence| evidence.contact_pii_count())
        .sum();

    let pii_component = weights
        .pii_per_profile
        .saturating_mul(pii_profiles as u32)
        .min(weights.pii_cap);
    let impersonation_component =
        (verdict.impersonation_score * f64::from(weights.impersonation_cap)).round() as u32;
    let correlation_component = if verdict.correlated {
        weights.correlation_bonus
    } else {
        0
    };

    let score = (pii_component + impersonation_component + correlation_component).min(100);
    let level = if score < 30 {
        RiskLevel::Low
    } else if score < 60 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    };

    debug!(
        pii_component,
        impersonation_component, correlation_component, score, "Risk components summed"
    );

    let mut factors = Vec::new();
    if pii_profiles > 0 {
        factors.push(format!(
            "Found {} exposed PII item(s) across {} profile(s)",
            pii_items, pii_profiles
        ));
    }
    if !impersonation_flags.is_empty() {
        factors.push(format!(
            "Detected {} potential impersonation account(s)",
            impersonation_flags.len()
        ));
    }
    if verdict.correlated {
        factors.push("Cross-platform correlation established".to_string());
    }
    if !verdict.contradictions.is_empty() {
        factors.push("Contact details conflict across profiles".to_string());
    }

    let mut recommendations = Vec::new();
    if pii_profiles > 0 {
        recommendations.push(
            "Remove or mask email addresses and phone numbers from public bios.".to_string(),
        );
    }
    if !impersonation_flags.is_empty() {
        recommendations.push(
            "Report suspected impersonation accounts to the affected platforms.".to_string(),
        );
    }
    if verdict.correlated {
        recommendations.push(
            "Vary usernames and public details across platforms to reduce linkability."
                .to_string(),
        );
    }
    recommendations
        .push("Re-run scans periodically to track public exposure over time.".to_string());

    OverallRisk {
        level,
        score,
        factors,
        recommendations,
        pii_exposure: pii_profiles > 0,
        impersonation_detected: !impersonation_flags.is_empty(),
    }
}
