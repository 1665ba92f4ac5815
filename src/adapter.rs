//! Collector and extractor adapters.
//!
//! Real platform collectors (browser automation, session management,
//! API clients) live outside this crate; the engine only sees the traits
//! here. [`StaticCollector`] and [`RegexExtractor`] are the bundled
//! implementations used by the demo binary and the test suite.

use crate::error::CollectError;
use crate::model::{Evidence, PlatformProfile};
use crate::platform::Platform;
use anyhow::{Context, Result};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// One platform's collection capability.
#[async_trait]
pub trait CollectorAdapter: Send + Sync {
    /// Look up a candidate username on one platform.
    ///
    /// Returns every matching public record, zero or more. Failures are
    /// typed so the orchestrator can decide retry and containment per
    /// kind; implementations must not panic on unreachable platforms.
    async fn collect(
        &self,
        username: &str,
        platform: Platform,
    ) -> Result<Vec<PlatformProfile>, CollectError>;
}

/// Extracts structured PII and entities from profile text.
///
/// Extraction never fails: unparseable text yields empty evidence.
#[async_trait]
pub trait ExtractorAdapter: Send + Sync {
    async fn extract(&self, text: &str) -> Evidence;
}

/// Explicit platform-to-adapter mapping assembled before a scan.
///
/// A requested platform with no registered adapter settles immediately
/// as a permanent failure; nothing is ever collected implicitly.
#[derive(Default)]
pub struct CollectorSet {
    adapters: HashMap<Platform, Arc<dyn CollectorAdapter>>,
}

impl CollectorSet {
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    pub fn register(mut self, platform: Platform, adapter: Arc<dyn CollectorAdapter>) -> Self {
        debug!(%platform, "Registered collector adapter");
        self.adapters.insert(platform, adapter);
        self
    }

    /// Register one adapter for several platforms at once.
    pub fn register_all(
        mut self,
        platforms: &[Platform],
        adapter: Arc<dyn CollectorAdapter>,
    ) -> Self {
        for platform in platforms {
            self = self.register(*platform, Arc::clone(&adapter));
        }
        self
    }

    pub fn get(&self, platform: Platform) -> Option<Arc<dyn CollectorAdapter>> {
        self.adapters.get(&platform).cloned()
    }

    pub fn platforms(&self) -> Vec<Platform> {
        let mut platforms: Vec<Platform> = self.adapters.keys().copied().collect();
        platforms.sort();
        platforms
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

/// Fixture-backed collector for offline runs, demos, and tests.
///
/// Lookup is a fuzzy handle match: a record is returned when its
/// normalized username contains the candidate or vice versa, which
/// mirrors how platform search treats separator and suffix variants.
#[derive(Default, Clone)]
pub struct StaticCollector {
    profiles: BTreeMap<Platform, Vec<PlatformProfile>>,
}

impl StaticCollector {
    pub fn new() -> Self {
        Self {
            profiles: BTreeMap::new(),
        }
    }

    pub fn with_profiles(mut self, platform: Platform, records: Vec<PlatformProfile>) -> Self {
        self.profiles.entry(platform).or_default().extend(records);
        self
    }

    /// Load fixtures from a JSON file mapping platform names to records.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture file {}", path.display()))?;
        let profiles: BTreeMap<Platform, Vec<PlatformProfile>> = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse fixture file {}", path.display()))?;
        Ok(Self { profiles })
    }

    /// Platforms this fixture set has records for.
    pub fn platforms(&self) -> Vec<Platform> {
        self.profiles.keys().copied().collect()
    }

    fn handle_matches(candidate: &str, record: &str) -> bool {
        let candidate = crate::similarity::normalize_handle(candidate);
        let record = crate::similarity::normalize_handle(record);
        if candidate.is_empty() || record.is_empty() {
            return false;
        }
        record.contains(&candidate) || candidate.contains(&record)
    }
}

#[async_trait]
impl CollectorAdapter for StaticCollector {
    async fn collect(
        &self,
        username: &str,
        platform: Platform,
    ) -> Result<Vec<PlatformProfile>, CollectError> {
        let matches: Vec<PlatformProfile> = self
            .profiles
            .get(&platform)
            .map(|records| {
                records
                    .iter()
                    .filter(|record| Self::handle_matches(username, &record.username))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        debug!(%platform, candidate = username, count = matches.len(), "Fixture lookup");
        Ok(matches)
    }
}

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"\+?[0-9][0-9()\-\s.]{6,}[0-9]").unwrap();
    static ref URL_RE: Regex = Regex::new(r"https?://[^\s]+").unwrap();
    static ref MENTION_RE: Regex =
        Regex::new(r"(?:^|[^A-Za-z0-9._%+-])@([A-Za-z0-9_.]{2,})").unwrap();
}

/// Regex-driven extractor covering emails, phones, URLs, and mentions.
///
/// Entity recognition needs a model-backed adapter and is left empty
/// here; the `entities` map is still part of the contract so external
/// extractors can fill it.
#[derive(Default, Clone, Copy)]
pub struct RegexExtractor;

impl RegexExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ExtractorAdapter for RegexExtractor {
    async fn extract(&self, text: &str) -> Evidence {
        let mut evidence = Evidence::default();

        for m in EMAIL_RE.find_iter(text) {
            evidence.emails.insert(m.as_str().to_lowercase());
        }

        // Numeric URL paths look like phone numbers; match phones against
        // text with the URLs blanked out.
        let without_urls = URL_RE.replace_all(text, " ");
        for m in PHONE_RE.find_iter(&without_urls) {
            if let Some(phone) = normalize_phone(m.as_str()) {
                evidence.phones.insert(phone);
            }
        }

        for m in URL_RE.find_iter(text) {
            let url = m.as_str().trim_end_matches(['.', ',', ')', ';', '!', '?']);
            if !url.is_empty() {
                evidence.urls.insert(url.to_string());
            }
        }

        for caps in MENTION_RE.captures_iter(text) {
            if let Some(handle) = caps.get(1) {
                let handle = handle.as_str().trim_end_matches('.').to_lowercase();
                if handle.len() >= 2 {
                    evidence.mentions.insert(handle);
                }
            }
        }

        evidence
    }
}

/// Digits-only canonical form, keeping a leading `+`. Matches with fewer
/// than eight digits are discarded as number-like noise.
fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 8 || digits.len() > 15 {
        return None;
    }
    if raw.trim_start().starts_with('+') {
        Some(format!("+{}", digits))
    } else {
        Some(digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_registry_register_and_get() {
        let collector = Arc::new(StaticCollector::new());
        let set = CollectorSet::new()
            .register(Platform::Instagram, collector.clone())
            .register_all(&[Platform::Twitter, Platform::Reddit], collector);

        assert_eq!(set.len(), 3);
        assert!(set.get(Platform::Instagram).is_some());
        assert!(set.get(Platform::Facebook).is_none());
        assert_eq!(
            set.platforms(),
            vec![Platform::Instagram, Platform::Twitter, Platform::Reddit]
        );
    }

    #[tokio::test]
    async fn test_static_collector_fuzzy_match() {
        let collector = StaticCollector::new().with_profiles(
            Platform::Instagram,
            vec![
                PlatformProfile::collected(Platform::Instagram, "cristiano"),
                PlatformProfile::collected(Platform::Instagram, "cristiano_ronaldo_official"),
                PlatformProfile::collected(Platform::Instagram, "quartzwren"),
            ],
        );

        let found = collector
            .collect("cristiano.ronaldo", Platform::Instagram)
            .await
            .unwrap();
        let usernames: Vec<&str> = found.iter().map(|p| p.username.as_str()).collect();
        assert_eq!(usernames, vec!["cristiano", "cristiano_ronaldo_official"]);
    }

    #[tokio::test]
    async fn test_static_collector_unknown_platform_is_empty() {
        let collector = StaticCollector::new();
        let found = collector
            .collect("cristiano", Platform::Reddit)
            .await
            .unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_regex_extractor_finds_pii() {
        let extractor = RegexExtractor::new();
        let evidence = extractor
            .extract(
                "Bookings: Booking@CR7Management.com or +1 (555) 123-4567.\n\
                 More at https://cr7.example/press. Managed by @gestifute.",
            )
            .await;

        assert!(evidence.emails.contains("booking@cr7management.com"));
        assert!(evidence.phones.contains("+15551234567"));
        assert!(evidence.urls.contains("https://cr7.example/press"));
        assert!(evidence.mentions.contains("gestifute"));
        assert!(evidence.entities.is_empty());
    }

    #[tokio::test]
    async fn test_regex_extractor_skips_short_numbers() {
        let extractor = RegexExtractor::new();
        let evidence = extractor.extract("Since 1985, top 100 in 2003.").await;
        assert!(evidence.phones.is_empty());
        assert!(!evidence.has_contact_pii());
    }

    #[tokio::test]
    async fn test_numeric_url_path_is_not_a_phone() {
        let extractor = RegexExtractor::new();
        let evidence = extractor
            .extract("https://www.facebook.com/profile.php?id=100044251802925")
            .await;
        assert!(evidence.phones.is_empty());
        assert_eq!(evidence.urls.len(), 1);
    }

    #[tokio::test]
    async fn test_regex_extractor_empty_text() {
        let extractor = RegexExtractor::new();
        let evidence = extractor.extract("").await;
        assert!(evidence.is_empty());
    }

    #[test]
    fn test_fixture_file_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.json");
        std::fs::write(
            &path,
            r#"{"instagram":[{"platform":"instagram","username":"cristiano","collection_success":true}]}"#,
        )
        .unwrap();

        let collector = StaticCollector::from_file(&path).unwrap();
        assert_eq!(collector.platforms(), vec![Platform::Instagram]);

        let found =
            tokio_test::block_on(collector.collect("cristiano", Platform::Instagram)).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].username, "cristiano");
    }

    #[test]
    fn test_fixture_file_missing_is_an_error() {
        assert!(StaticCollector::from_file("/nonexistent/profiles.json").is_err());
    }

    #[test]
    fn test_handle_matching_rules() {
        assert!(StaticCollector::handle_matches("cristiano.ronaldo", "cristiano"));
        assert!(StaticCollector::handle_matches(
            "cristiano.ronaldo",
            "cristiano_ronaldo_official"
        ));
        assert!(!StaticCollector::handle_matches("cristiano.ronaldo", "quartzwren"));
        assert!(!StaticCollector::handle_matches("", "anything"));
    }
}
