//! socioscope: social-profile exposure and impersonation scanning.
//!
//! Discovers publicly visible social-media profiles for one identity (a
//! name, username, or email), correlates them across platforms, and
//! scores the privacy exposure (leaked contact PII) and impersonation
//! risk of what it finds.
//!
//! Collection is the only effectful stage and runs behind the
//! [`CollectorAdapter`] trait, one concurrent task per platform with
//! per-attempt timeouts, transient-only retries, and a global deadline.
//! Everything downstream (extraction, similarity, impersonation
//! detection, correlation, risk aggregation) is pure and deterministic,
//! so the same settled profiles always produce the same verdict.
//!
//! ```no_run
//! use socioscope::{
//!     CollectorSet, IdentityQuery, Platform, RegexExtractor, ScanEngine, StaticCollector,
//! };
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let fixtures = Arc::new(StaticCollector::from_file("fixtures/profiles.json")?);
//! let collectors = CollectorSet::new()
//!     .register_all(&[Platform::Instagram, Platform::Twitter], fixtures);
//! let engine = ScanEngine::new(collectors, Arc::new(RegexExtractor::new()));
//!
//! let query = IdentityQuery::new(
//!     "Cristiano Ronaldo",
//!     None,
//!     &[Platform::Instagram, Platform::Twitter],
//! )?;
//! let result = engine.scan(query).await;
//! println!("risk: {} ({})", result.overall_risk.score, result.overall_risk.level);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod correlate;
pub mod error;
pub mod identity;
pub mod impersonation;
pub mod model;
pub mod platform;
pub mod risk;
pub mod scan;
pub mod similarity;

pub use adapter::{
    CollectorAdapter, CollectorSet, ExtractorAdapter, RegexExtractor, StaticCollector,
};
pub use config::{RiskWeights, ScanOptions};
pub use error::{CollectError, ErrorKind, ScanError};
pub use identity::{IdentifierType, IdentityQuery};
pub use model::{
    CorrelationVerdict, Evidence, ImpersonationFlag, OverallRisk, PlatformProfile,
    PlatformsAnalyzed, RiskLevel, ScanResult, SimilarityResult,
};
pub use platform::Platform;
pub use scan::ScanEngine;
