//! Similarity scoring between the query identity and collected profiles.
//!
//! Everything here is pure and deterministic; the orchestrator calls
//! [`score`] once per successfully collected profile after extraction.

use crate::identity::IdentityQuery;
use crate::model::{Evidence, PlatformProfile, SimilarityResult};
use std::collections::BTreeSet;

/// Compute the similarity block for one collected profile.
pub fn score(query: &IdentityQuery, profile: &PlatformProfile) -> SimilarityResult {
    let username_similarity = username_ratio(&query.derived_username, &profile.username);
    let bio_similarity =
        bio_overlap(&query.name_tokens(), profile.bio.as_deref().unwrap_or(""));
    let entity_overlap_count = profile
        .evidence
        .as_ref()
        .map(|evidence| entity_overlap(&query.known_entities, evidence))
        .unwrap_or(0);

    SimilarityResult {
        username_similarity,
        bio_similarity,
        entity_overlap_count,
    }
}

/// Edit-distance ratio between two handles as an integer percentage.
///
/// Handles are lowercased and stripped of separator characters first, so
/// `cristiano.ronaldo` and `Cristiano_Ronaldo` compare as identical. The
/// ratio is `(len_a + len_b - distance) / (len_a + len_b)`, which rewards
/// a shared core even when one handle carries a long suffix.
pub fn username_ratio(query: &str, candidate: &str) -> u8 {
    let a: Vec<char> = normalize_handle(query).chars().collect();
    let b: Vec<char> = normalize_handle(candidate).chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    if a == b {
        return 100;
    }
    let distance = levenshtein(&a, &b);
    let total = a.len() + b.len();
    (((total - distance) as f64 / total as f64) * 100.0).round() as u8
}

/// Share of query name tokens that appear in the bio, as an integer
/// percentage. Empty bios and token-free queries score zero.
pub fn bio_overlap(query_tokens: &BTreeSet<String>, bio: &str) -> u8 {
    if query_tokens.is_empty() || bio.trim().is_empty() {
        return 0;
    }
    let bio_tokens = tokenize(bio);
    let hits = query_tokens
        .iter()
        .filter(|token| bio_tokens.contains(*token))
        .count();
    ((hits as f64 / query_tokens.len() as f64) * 100.0).round() as u8
}

/// Case-insensitive count of known entities found in extracted evidence.
pub fn entity_overlap(known: &BTreeSet<String>, evidence: &Evidence) -> usize {
    if known.is_empty() {
        return 0;
    }
    let values = evidence.entity_values();
    known
        .iter()
        .filter(|entity| values.contains(&entity.to_lowercase()))
        .count()
}

/// Lowercased alphanumeric tokens of length two or more.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.chars().count() >= 2)
        .map(|token| token.to_lowercase())
        .collect()
}

/// Lowercase a handle and strip separator characters, so variants like
/// `cr.7`, `cr_7`, and `CR-7` compare equal.
pub(crate) fn normalize_handle(handle: &str) -> String {
    handle
        .chars()
        .filter(|c| !matches!(c, '.' | '_' | '-'))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
