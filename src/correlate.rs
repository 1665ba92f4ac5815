//! Cross-profile correlation.
//!
//! Decides whether the collected profiles plausibly belong to one person
//! by looking for evidence values that recur across platforms, and for
//! contact details that conflict instead.

use crate::impersonation;
use crate::model::{
    ContradictionKind, CorrelationVerdict, EntityKind, ImpersonationFlag, OverlapKind,
    PlatformProfile,
};
use crate::similarity;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

const OVERLAP_ORDER: [OverlapKind; 6] = [
    OverlapKind::NameTokens,
    OverlapKind::Organizations,
    OverlapKind::Urls,
    OverlapKind::Mentions,
    OverlapKind::Emails,
    OverlapKind::Phones,
];

/// Build the correlation verdict for one scan.
///
/// An overlap is recorded for a category when some value in it appears
/// on at least two distinct profiles. A contradiction is recorded for
/// emails or phones when two profiles each expose values with nothing in
/// common. With fewer than two successful profiles the verdict can only
/// carry impersonation signals.
pub fn correlate(
    profiles: &[&PlatformProfile],
    impersonation_flags: &[ImpersonationFlag],
    max_flags: usize,
) -> CorrelationVerdict {
    let sets: Vec<BTreeMap<OverlapKind, BTreeSet<String>>> = profiles
        .iter()
        .filter(|profile| profile.collection_success)
        .map(|profile| category_sets(profile))
        .collect();

    let mut overlaps = BTreeSet::new();
    if sets.len() >= 2 {
        for kind in OVERLAP_ORDER {
            let mut profiles_per_value: BTreeMap<&String, usize> = BTreeMap::new();
            for set in &sets {
                if let Some(values) = set.get(&kind) {
                    for value in values {
                        *profiles_per_value.entry(value).or_insert(0) += 1;
                    }
                }
            }
            if profiles_per_value.values().any(|&count| count >= 2) {
                overlaps.insert(kind);
            }
        }
    }

    let mut contradictions = BTreeSet::new();
    for (kind, source) in [
        (ContradictionKind::Emails, OverlapKind::Emails),
        (ContradictionKind::Phones, OverlapKind::Phones),
    ] {
        let exposed: Vec<&BTreeSet<String>> =
            sets.iter().filter_map(|set| set.get(&source)).collect();
        'pairs: for i in 0..exposed.len() {
            for j in (i + 1)..exposed.len() {
                if exposed[i].is_disjoint(exposed[j]) {
                    contradictions.insert(kind);
                    break 'pairs;
                }
            }
        }
    }

    let impersonation_score = impersonation_flags
        .iter()
        .map(|flag| flag.confidence)
        .fold(0.0_f64, f64::max);
    let impersonation_level = impersonation::confidence_level(impersonation_score);
    let correlated = !overlaps.is_empty() || !impersonation_flags.is_empty();

    debug!(
        profiles = sets.len(),
        overlaps = overlaps.len(),
        contradictions = contradictions.len(),
        impersonation_score,
        "Correlation verdict computed"
    );

    let mut flags = Vec::new();
    if !impersonation_flags.is_empty() {
        flags.push(format!(
            "{} profile(s) flagged as potential impersonations (strongest confidence {:.2})",
            impersonation_flags.len(),
            impersonation_score
        ));
    }
    for kind in &contradictions {
        flags.push(contradiction_text(*kind).to_string());
    }
    for kind in &overlaps {
        flags.push(overlap_text(*kind).to_string());
    }
    flags.truncate(max_flags);

    CorrelationVerdict {
        correlated,
        overlaps,
        contradictions,
        impersonation_score,
        impersonation_level,
        flags,
    }
}

/// Comparable value sets for one profile, keyed by category. Only
/// non-empty categories are present.
fn category_sets(profile: &PlatformProfile) -> BTreeMap<OverlapKind, BTreeSet<String>> {
    let mut map = BTreeMap::new();

    if let Some(display_name) = &profile.display_name {
        let tokens = similarity::tokenize(display_name);
        if !tokens.is_empty() {
            map.insert(OverlapKind::NameTokens, tokens);
        }
    }

    if let Some(evidence) = &profile.evidence {
        if let Some(orgs) = evidence.entities.get(&EntityKind::Organization) {
            let orgs: BTreeSet<String> = orgs.iter().map(|o| o.to_lowercase()).collect();
            if !orgs.is_empty() {
                map.insert(OverlapKind::Organizations, orgs);
            }
        }
        if !evidence.urls.is_empty() {
            map.insert(OverlapKind::Urls, evidence.urls.clone());
        }
        if !evidence.mentions.is_empty() {
            map.insert(OverlapKind::Mentions, evidence.mentions.clone());
        }
        if !evidence.emails.is_empty() {
            map.insert(OverlapKind::Emails, evidence.emails.clone());
        }
        if !evidence.phones.is_empty() {
            map.insert(OverlapKind::Phones, evidence.phones.clone());
        }
    }

    map
}

fn overlap_text(kind: OverlapKind) -> &'static str {
    match kind {
        OverlapKind::NameTokens => "The same name appears on multiple profiles",
        OverlapKind::Organizations => "Organization mentions recur across profiles",
        OverlapKind::Urls => "The same external link appears on multiple profiles",
        OverlapKind::Mentions => "The same account is tagged across profiles",
        OverlapKind::Emails => "The same email address is exposed on multiple profiles",
        OverlapKind::Phones => "The same phone number is exposed on multiple profiles",
    }
}

fn contradiction_text(kind: ContradictionKind) -> &'static str {
    match kind {
        ContradictionKind::Emails => "Conflicting email addresses exposed across profiles",
        ContradictionKind::Phones => "Conflicting phone numbers exposed across profiles",
    }
}
