//! Result data model.
//!
//! These types are the serialization contract consumed by report
//! generators and API callers. Field names are stable; collections use
//! ordered containers so serialized output is deterministic.

use crate::error::ErrorKind;
use crate::identity::IdentityQuery;
use crate::platform::Platform;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use uuid::Uuid;

/// Kind of named entity an extractor can attach to a profile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Person,
    Organization,
    Location,
    Other,
}

/// Structured PII and entities extracted from one profile's public text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    pub emails: BTreeSet<String>,
    pub phones: BTreeSet<String>,
    pub urls: BTreeSet<String>,
    pub mentions: BTreeSet<String>,
    pub entities: BTreeMap<EntityKind, BTreeSet<String>>,
}

impl Evidence {
    /// True when the profile leaked a directly contactable identifier.
    pub fn has_contact_pii(&self) -> bool {
        !self.emails.is_empty() || !self.phones.is_empty()
    }

    /// Count of exposed contact items (emails plus phones).
    pub fn contact_pii_count(&self) -> usize {
        self.emails.len() + self.phones.len()
    }

    /// All entity values across kinds, lowercased for overlap checks.
    pub fn entity_values(&self) -> BTreeSet<String> {
        self.entities
            .values()
            .flatten()
            .map(|v| v.to_lowercase())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
            && self.phones.is_empty()
            && self.urls.is_empty()
            && self.mentions.is_empty()
            && self.entities.values().all(|set| set.is_empty())
    }
}

/// Pairwise similarity between the query identity and one profile.
/// All ratios are integer percentages in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub username_similarity: u8,
    pub bio_similarity: u8,
    pub entity_overlap_count: usize,
}

impl SimilarityResult {
    /// Sum used to rank candidates when electing the canonical profile.
    pub fn combined(&self) -> u16 {
        self.username_similarity as u16 + self.bio_similarity as u16
    }
}

/// One account record for the query on one platform.
///
/// A failed platform is represented by a placeholder record with
/// `collection_success = false` and an `error` kind; analysis stages
/// skip placeholders entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformProfile {
    pub platform: Platform,
    pub username: String,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub url: Option<String>,
    pub followers: Option<u64>,
    pub following: Option<u64>,
    pub posts: Option<u64>,
    pub verified: Option<bool>,
    pub collection_success: bool,
    pub error: Option<ErrorKind>,
    pub evidence: Option<Evidence>,
    pub similarity: Option<SimilarityResult>,
}

impl PlatformProfile {
    /// A successfully collected record; optional fields start unknown.
    pub fn collected(platform: Platform, username: &str) -> Self {
        Self {
            platform,
            username: username.to_string(),
            display_name: None,
            bio: None,
            url: Some(platform.profile_url(username)),
            followers: None,
            following: None,
            posts: None,
            verified: None,
            collection_success: true,
            error: None,
            evidence: None,
            similarity: None,
        }
    }

    /// Placeholder for a platform that could not be collected.
    pub fn failed(platform: Platform, username: &str, kind: ErrorKind) -> Self {
        Self {
            platform,
            username: username.to_string(),
            display_name: None,
            bio: None,
            url: None,
            followers: None,
            following: None,
            posts: None,
            verified: None,
            collection_success: false,
            error: Some(kind),
            evidence: None,
            similarity: None,
        }
    }

    pub fn with_display_name(mut self, display_name: &str) -> Self {
        self.display_name = Some(display_name.to_string());
        self
    }

    pub fn with_bio(mut self, bio: &str) -> Self {
        self.bio = Some(bio.to_string());
        self
    }

    pub fn with_followers(mut self, followers: u64) -> Self {
        self.followers = Some(followers);
        self
    }

    pub fn with_verified(mut self, verified: bool) -> Self {
        self.verified = Some(verified);
        self
    }
}

/// Counts of requested versus successfully collected platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformsAnalyzed {
    pub requested: usize,
    pub succeeded: usize,
}

/// Severity bucket used for flags, verdicts, and the overall risk.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
        }
    }
}

/// A profile suspected of impersonating the canonical identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpersonationFlag {
    pub platform: Platform,
    pub username: String,
    pub risk_level: RiskLevel,
    /// Human-readable explanation of why this profile was flagged.
    pub reason: String,
    /// Detection confidence in `[0.0, 1.0]`.
    pub confidence: f64,
}

/// Evidence category that can recur across profiles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OverlapKind {
    NameTokens,
    Organizations,
    Urls,
    Mentions,
    Emails,
    Phones,
}

/// Evidence category whose values conflicted across profiles.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ContradictionKind {
    Emails,
    Phones,
}

/// Cross-profile overlap and contradiction summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationVerdict {
    /// True when any overlap recurs or any impersonation flag exists.
    pub correlated: bool,
    pub overlaps: BTreeSet<OverlapKind>,
    pub contradictions: BTreeSet<ContradictionKind>,
    /// Strongest impersonation confidence across flags, `0.0` when none.
    pub impersonation_score: f64,
    pub impersonation_level: RiskLevel,
    /// Human-readable findings, most significant first.
    pub flags: Vec<String>,
}

impl Default for CorrelationVerdict {
    fn default() -> Self {
        Self {
            correlated: false,
            overlaps: BTreeSet::new(),
            contradictions: BTreeSet::new(),
            impersonation_score: 0.0,
            impersonation_level: RiskLevel::Low,
            flags: Vec::new(),
        }
    }
}

/// The single aggregated verdict for a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallRisk {
    pub level: RiskLevel,
    /// Composite score in `[0, 100]`.
    pub score: u32,
    /// One line per contributing component.
    pub factors: Vec<String>,
    /// Remediation guidance; never empty.
    pub recommendations: Vec<String>,
    pub pii_exposure: bool,
    pub impersonation_detected: bool,
}

/// Aggregated outcome of one scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub scan_id: Uuid,
    pub query: IdentityQuery,
    /// Records keyed by platform; a failed platform holds exactly one
    /// placeholder record.
    pub profiles_found: BTreeMap<Platform, Vec<PlatformProfile>>,
    /// Successfully collected records across all platforms.
    pub total_profiles_found: usize,
    pub platforms_analyzed: PlatformsAnalyzed,
    pub impersonation_risks: Vec<ImpersonationFlag>,
    pub correlation: CorrelationVerdict,
    pub overall_risk: OverallRisk,
    /// True when the global deadline cut off at least one platform.
    pub partial: bool,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
}

impl ScanResult {
    /// Successfully collected records, in requested-platform order and
    /// collection order within a platform.
    pub fn collected_profiles(&self) -> Vec<&PlatformProfile> {
        let mut out = Vec::new();
        for platform in &self.query.requested_platforms {
            if let Some(records) = self.profiles_found.get(platform) {
                out.extend(records.iter().filter(|p| p.collection_success));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_profile_shape() {
        let profile =
            PlatformProfile::failed(Platform::Reddit, "cristiano", ErrorKind::Timeout);
        assert!(!profile.collection_success);
        assert_eq!(profile.error, Some(ErrorKind::Timeout));
        assert!(profile.evidence.is_none());
        assert!(profile.similarity.is_none());
    }

    #[test]
    fn test_collected_profile_defaults() {
        let profile = PlatformProfile::collected(Platform::Instagram, "cristiano")
            .with_display_name("Cristiano Ronaldo")
            .with_followers(600_000_000)
            .with_verified(true);
        assert!(profile.collection_success);
        assert!(profile.error.is_none());
        assert_eq!(
            profile.url.as_deref(),
            Some("https://www.instagram.com/cristiano/")
        );
    }

    #[test]
    fn test_evidence_contact_pii() {
        let mut evidence = Evidence::default();
        assert!(!evidence.has_contact_pii());
        assert!(evidence.is_empty());

        evidence.urls.insert("https://cr7.example".to_string());
        assert!(!evidence.has_contact_pii());
        assert!(!evidence.is_empty());

        evidence.phones.insert("+15551234567".to_string());
        assert!(evidence.has_contact_pii());
        assert_eq!(evidence.contact_pii_count(), 1);
    }

    #[test]
    fn test_entity_values_lowercased() {
        let mut evidence = Evidence::default();
        evidence
            .entities
            .entry(EntityKind::Organization)
            .or_default()
            .insert("Al Nassr".to_string());
        assert!(evidence.entity_values().contains("al nassr"));
    }

    #[test]
    fn test_risk_level_ordering() {
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
        assert_eq!(RiskLevel::Medium.to_string(), "medium");
    }

    #[test]
    fn test_combined_similarity() {
        let sim = SimilarityResult {
            username_similarity: 80,
            bio_similarity: 50,
            entity_overlap_count: 0,
        };
        assert_eq!(sim.combined(), 130);
    }
}
