//! Scan orchestration.
//!
//! Fans collection out across platforms as independent tasks, contains
//! every per-platform failure, and runs the analysis stages (extraction,
//! similarity, impersonation, correlation, risk) over whatever settled.
//! A single platform can never take the scan down with it.

use crate::adapter::{CollectorAdapter, CollectorSet, ExtractorAdapter};
use crate::config::ScanOptions;
use crate::correlate;
use crate::error::{ErrorKind, ScanError};
use crate::identity::{IdentifierType, IdentityQuery};
use crate::impersonation;
use crate::model::{PlatformProfile, PlatformsAnalyzed, ScanResult};
use crate::platform::Platform;
use crate::risk;
use crate::similarity;
use chrono::Utc;
use futures_util::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Orchestrates one scan end to end.
///
/// Collection runs one spawned task per requested platform, each bounded
/// by the per-attempt timeout and the retry budget. Remaining tasks are
/// cut off when the global deadline expires, aborted, and recorded as
/// timeouts; the result is then marked partial. All downstream stages
/// are pure and run only after every platform has settled.
pub struct ScanEngine {
    collectors: CollectorSet,
    extractor: Arc<dyn ExtractorAdapter>,
    options: ScanOptions,
}

impl ScanEngine {
    pub fn new(collectors: CollectorSet, extractor: Arc<dyn ExtractorAdapter>) -> Self {
        Self {
            collectors,
            extractor,
            options: ScanOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Validate a raw identifier and run a scan for it.
    pub async fn scan_identifier(
        &self,
        raw: &str,
        hint: Option<IdentifierType>,
        platforms: &[Platform],
    ) -> Result<ScanResult, ScanError> {
        let query = IdentityQuery::new(raw, hint, platforms)?;
        Ok(self.scan(query).await)
    }

    /// Run a scan for an already-normalized query.
    ///
    /// Infallible by construction: platform failures degrade to
    /// placeholder records instead of surfacing here.
    #[tracing::instrument(skip(self, query), fields(username = %query.derived_username))]
    pub async fn scan(&self, query: IdentityQuery) -> ScanResult {
        let scan_id = Uuid::new_v4();
        let started_at = Utc::now();
        let clock = Instant::now();
        info!(
            %scan_id,
            identifier_type = %query.identifier_type,
            platforms = query.requested_platforms.len(),
            "Starting profile scan"
        );

        let (mut profiles_found, partial) = self.collect_all(&query).await;

        self.extract_evidence(&mut profiles_found).await;

        for records in profiles_found.values_mut() {
            for profile in records.iter_mut() {
                if profile.collection_success {
                    profile.similarity = Some(similarity::score(&query, profile));
                }
            }
        }

        let ordered = ordered_collected(&query, &profiles_found);
        let impersonation_risks = impersonation::detect(
            &query,
            &ordered,
            self.options.high_similarity_threshold,
        );
        let correlation = correlate::correlate(
            &ordered,
            &impersonation_risks,
            self.options.max_correlation_flags,
        );
        let overall_risk = risk::aggregate(
            &ordered,
            &impersonation_risks,
            &correlation,
            &self.options.risk_weights,
        );

        let total_profiles_found = ordered.len();
        let succeeded = profiles_found
            .values()
            .filter(|records| records.iter().all(|p| p.collection_success))
            .count();
        let platforms_analyzed = PlatformsAnalyzed {
            requested: query.requested_platforms.len(),
            succeeded,
        };

        let completed_at = Utc::now();
        let duration_ms = clock.elapsed().as_millis() as u64;
        info!(
            %scan_id,
            profiles = total_profiles_found,
            score = overall_risk.score,
            level = %overall_risk.level,
            partial,
            duration_ms,
            "Scan complete"
        );

        ScanResult {
            scan_id,
            query,
            profiles_found,
            total_profiles_found,
            platforms_analyzed,
            impersonation_risks,
            correlation,
            overall_risk,
            partial,
            started_at,
            completed_at,
            duration_ms,
        }
    }

    /// Fan out one collection task per platform and wait for all of them
    /// to settle, within the global deadline.
    async fn collect_all(
        &self,
        query: &IdentityQuery,
    ) -> (BTreeMap<Platform, Vec<PlatformProfile>>, bool) {
        let mut settled: BTreeMap<Platform, Vec<PlatformProfile>> = BTreeMap::new();
        let mut pending: Vec<(Platform, JoinHandle<Vec<PlatformProfile>>)> = Vec::new();

        for &platform in &query.requested_platforms {
            match self.collectors.get(platform) {
                Some(adapter) => {
                    let handle = tokio::spawn(collect_platform(
                        adapter,
                        query.derived_username.clone(),
                        platform,
                        self.options.per_platform_timeout,
                        self.options.retry_limit,
                    ));
                    pending.push((platform, handle));
                }
                None => {
                    warn!(%platform, "No collector registered; settling as permanent failure");
                    settled.insert(
                        platform,
                        vec![PlatformProfile::failed(
                            platform,
                            &query.derived_username,
                            ErrorKind::Permanent,
                        )],
                    );
                }
            }
        }

        let deadline = Instant::now() + self.options.global_deadline;
        let mut partial = false;
        for (platform, handle) in pending {
            let abort = handle.abort_handle();
            let remaining = deadline.duration_since(Instant::now());
            match timeout(remaining, handle).await {
                Ok(Ok(records)) => {
                    settled.insert(platform, records);
                }
                Ok(Err(join_error)) => {
                    // A panicking collector is contained like any failure.
                    warn!(%platform, error = %join_error, "Collector task aborted");
                    settled.insert(
                        platform,
                        vec![PlatformProfile::failed(
                            platform,
                            &query.derived_username,
                            ErrorKind::Permanent,
                        )],
                    );
                }
                Err(_) => {
                    abort.abort();
                    warn!(%platform, "Global deadline expired; cutting platform off");
                    partial = true;
                    settled.insert(
                        platform,
                        vec![PlatformProfile::failed(
                            platform,
                            &query.derived_username,
                            ErrorKind::Timeout,
                        )],
                    );
                }
            }
        }

        (settled, partial)
    }

    /// Run the extractor over every successful record's public text,
    /// concurrently, and attach the evidence.
    async fn extract_evidence(
        &self,
        profiles_found: &mut BTreeMap<Platform, Vec<PlatformProfile>>,
    ) {
        let mut jobs: Vec<(Platform, usize)> = Vec::new();
        let mut futures = Vec::new();
        for (platform, records) in profiles_found.iter() {
            for (idx, profile) in records.iter().enumerate() {
                if profile.collection_success {
                    let text = profile_text(profile);
                    let extractor = Arc::clone(&self.extractor);
                    jobs.push((*platform, idx));
                    futures.push(async move { extractor.extract(&text).await });
                }
            }
        }

        let results = join_all(futures).await;
        for ((platform, idx), evidence) in jobs.into_iter().zip(results) {
            if let Some(profile) = profiles_found
                .get_mut(&platform)
                .and_then(|records| records.get_mut(idx))
            {
                debug!(
                    %platform,
                    username = %profile.username,
                    pii_items = evidence.contact_pii_count(),
                    "Evidence extracted"
                );
                profile.evidence = Some(evidence);
            }
        }
    }
}

/// One platform's collection loop: bounded attempts, transient-only
/// retries, and a typed placeholder when the platform cannot be read.
async fn collect_platform(
    adapter: Arc<dyn CollectorAdapter>,
    username: String,
    platform: Platform,
    attempt_timeout: Duration,
    retry_limit: u32,
) -> Vec<PlatformProfile> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match timeout(attempt_timeout, adapter.collect(&username, platform)).await {
            Ok(Ok(mut records)) => {
                // Returned records are successful collections by contract.
                for record in records.iter_mut() {
                    record.platform = platform;
                    record.collection_success = true;
                    record.error = None;
                }
                debug!(%platform, count = records.len(), attempt, "Platform collection settled");
                return records;
            }
            Ok(Err(error)) => {
                if error.is_retryable() && attempt <= retry_limit {
                    debug!(%platform, attempt, %error, "Transient failure; retrying");
                    continue;
                }
                warn!(%platform, attempt, %error, "Platform collection failed");
                return vec![PlatformProfile::failed(platform, &username, error.kind())];
            }
            Err(_) => {
                warn!(
                    %platform,
                    attempt,
                    timeout_ms = attempt_timeout.as_millis() as u64,
                    "Platform collection attempt timed out"
                );
                return vec![PlatformProfile::failed(platform, &username, ErrorKind::Timeout)];
            }
        }
    }
}

/// Profile text the extractor sees: display name, bio, and profile URL.
fn profile_text(profile: &PlatformProfile) -> String {
    let mut parts: Vec<&str> = Vec::new();
    if let Some(display_name) = profile.display_name.as_deref() {
        parts.push(display_name);
    }
    if let Some(bio) = profile.bio.as_deref() {
        parts.push(bio);
    }
    if let Some(url) = profile.url.as_deref() {
        parts.push(url);
    }
    parts.join("\n")
}

/// Successful records in requested-platform order, then collection order.
fn ordered_collected<'a>(
    query: &IdentityQuery,
    profiles_found: &'a BTreeMap<Platform, Vec<PlatformProfile>>,
) -> Vec<&'a PlatformProfile> {
    let mut ordered = Vec::new();
    for platform in &query.requested_platforms {
        if let Some(records) = profiles_found.get(platform) {
            ordered.extend(records.iter().filter(|p| p.collection_success));
        }
    }
    ordered
}
