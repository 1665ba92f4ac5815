//! Impersonation detection across collected profiles.
//!
//! Elects the canonical profile (the account most likely to genuinely be
//! the searched identity) and flags look-alike accounts that sit close
//! to it in handle space but are not it.

use crate::identity::IdentityQuery;
use crate::model::{ImpersonationFlag, PlatformProfile, RiskLevel, SimilarityResult};
use tracing::{debug, info};

/// Username similarity at or above which a flag reason calls the handle
/// near-identical rather than merely similar.
const NEAR_IDENTICAL: u8 = 90;

/// Flag profiles that plausibly impersonate the canonical identity.
///
/// Requires at least two scored profiles; with fewer there is nothing to
/// compare against. The canonical profile is the one with the highest
/// combined username and bio similarity, earliest profile winning ties.
pub fn detect(
    query: &IdentityQuery,
    profiles: &[&PlatformProfile],
    threshold: u8,
) -> Vec<ImpersonationFlag> {
    let scored: Vec<(&PlatformProfile, SimilarityResult)> = profiles
        .iter()
        .filter_map(|profile| profile.similarity.map(|sim| (*profile, sim)))
        .collect();
    if scored.len() < 2 {
        return Vec::new();
    }

    let mut canonical_idx = 0;
    for (idx, (_, sim)) in scored.iter().enumerate().skip(1) {
        if sim.combined() > scored[canonical_idx].1.combined() {
            canonical_idx = idx;
        }
    }
    let canonical = scored[canonical_idx].0;
    debug!(
        platform = %canonical.platform,
        username = %canonical.username,
        "Elected canonical profile"
    );

    let mut flags = Vec::new();
    for (idx, (profile, sim)) in scored.iter().enumerate() {
        if idx == canonical_idx {
            continue;
        }
        if sim.username_similarity < threshold {
            continue;
        }
        // The canonical handle itself, on any platform, is presence, not
        // impersonation. The comparison is on the raw handle: a separator
        // variant is a distinct account and stays flaggable.
        if profile.username.eq_ignore_ascii_case(&canonical.username) {
            continue;
        }

        let confidence = (0.5 * f64::from(sim.username_similarity) / 100.0
            + 0.5 * f64::from(sim.bio_similarity) / 100.0)
            .clamp(0.0, 1.0);
        let risk_level = confidence_level(confidence);
        let reason = flag_reason(query, profile, sim, canonical);
        info!(
            platform = %profile.platform,
            username = %profile.username,
            confidence,
            level = %risk_level,
            "Flagged potential impersonation"
        );
        flags.push(ImpersonationFlag {
            platform: profile.platform,
            username: profile.username.clone(),
            risk_level,
            reason,
            confidence,
        });
    }
    flags
}

/// Bucket a `[0.0, 1.0]` confidence into a risk level.
pub(crate) fn confidence_level(confidence: f64) -> RiskLevel {
    if confidence < 0.5 {
        RiskLevel::Low
    } else if confidence < 0.8 {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

fn flag_reason(
    query: &IdentityQuery,
    profile: &PlatformProfile,
    sim: &SimilarityResult,
    canonical: &PlatformProfile,
) -> String {
    if sim.username_similarity >= NEAR_IDENTICAL {
        return format!(
            "Username '{}' is nearly identical to canonical profile '{}'",
            profile.username, canonical.username
        );
    }

    if let (Some(profile_ev), Some(canonical_ev)) = (&profile.evidence, &canonical.evidence) {
        let profile_values = profile_ev.entity_values();
        let canonical_values = canonical_ev.entity_values();
        if let Some(shared) = profile_values.intersection(&canonical_values).next() {
            return format!(
                "Shares mention of '{}' with canonical profile '{}'",
                shared, canonical.username
            );
        }
        if let Some(shared) = profile_ev.mentions.intersection(&canonical_ev.mentions).next() {
            return format!(
                "Tags the same account '@{}' as canonical profile '{}'",
                shared, canonical.username
            );
        }
    }

    format!(
        "Username similarity {}% to searched identity '{}'",
        sim.username_similarity, query.derived_username
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::Platform;

    fn scored(
        platform: Platform,
        username: &str,
        username_similarity: u8,
        bio_similarity: u8,
    ) -> PlatformProfile {
        let mut profile = PlatformProfile::collected(platform, username);
        profile.similarity = Some(SimilarityResult {
            username_similarity,
            bio_similarity,
            entity_overlap_count: 0,
        });
        profile
    }

    fn query() -> IdentityQuery {
        IdentityQuery::new("Cristiano Ronaldo", None, &[Platform::Instagram]).unwrap()
    }

    #[test]
    fn test_lookalike_flagged_at_medium() {
        let real = scored(Platform::Instagram, "cristiano", 72, 100);
        let fake = scored(Platform::Instagram, "cristiano_ronaldo_official", 80, 50);
        let flags = detect(&query(), &[&real, &fake], 70);

        assert_eq!(flags.len(), 1);
        let flag = &flags[0];
        assert_eq!(flag.username, "cristiano_ronaldo_official");
        assert_eq!(flag.risk_level, RiskLevel::Medium);
        assert!((flag.confidence - 0.65).abs() < 1e-9);
    }

    #[test]
    fn test_below_threshold_not_flagged() {
        let real = scored(Platform::Instagram, "cristiano", 72, 100);
        let other = scored(Platform::Instagram, "cr_seven_fanpage", 40, 0);
        assert!(detect(&query(), &[&real, &other], 70).is_empty());
    }

    #[test]
    fn test_single_profile_never_flagged() {
        let only = scored(Platform::Instagram, "cristiano_ronaldo_official", 95, 0);
        assert!(detect(&query(), &[&only], 70).is_empty());
    }

    #[test]
    fn test_same_handle_across_platforms_not_flagged() {
        let instagram = scored(Platform::Instagram, "cristiano", 72, 100);
        let twitter = scored(Platform::Twitter, "Cristiano", 72, 100);
        assert!(detect(&query(), &[&instagram, &twitter], 70).is_empty());
    }

    #[test]
    fn test_separator_swap_on_same_platform_is_flagged() {
        // A dot-for-underscore swap is a distinct account, not the
        // canonical handle reappearing.
        let real = scored(Platform::Instagram, "cristiano.ronaldo", 100, 100);
        let swap = scored(Platform::Instagram, "cristiano_ronaldo", 100, 0);
        let flags = detect(&query(), &[&real, &swap], 70);

        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].username, "cristiano_ronaldo");
        assert_eq!(flags[0].platform, Platform::Instagram);
        assert_eq!(flags[0].risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_canonical_tie_breaks_to_earliest() {
        // Equal combined scores; the first profile must win the election
        // and the second, with a different handle, gets flagged.
        let first = scored(Platform::Instagram, "cristiano.ronaldo", 100, 0);
        let second = scored(Platform::Twitter, "cristianoronaldo7", 90, 10);
        let flags = detect(&query(), &[&first, &second], 70);
        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].username, "cristianoronaldo7");
        assert_eq!(flags[0].platform, Platform::Twitter);
    }

    #[test]
    fn test_high_confidence_bucket_and_reason() {
        let real = scored(Platform::Instagram, "cristiano", 72, 100);
        let clone = scored(Platform::Twitter, "cristiano.official", 92, 70);
        let flags = detect(&query(), &[&real, &clone], 70);

        assert_eq!(flags.len(), 1);
        assert_eq!(flags[0].risk_level, RiskLevel::High);
        assert!(flags[0].reason.contains("nearly identical"));
    }

    #[test]
    fn test_confidence_buckets() {
        assert_eq!(confidence_level(0.0), RiskLevel::Low);
        assert_eq!(confidence_level(0.49), RiskLevel::Low);
        assert_eq!(confidence_level(0.5), RiskLevel::Medium);
        assert_eq!(confidence_level(0.79), RiskLevel::Medium);
        assert_eq!(confidence_level(0.8), RiskLevel::High);
        assert_eq!(confidence_level(1.0), RiskLevel::High);
    }
}
