//! Identifier normalization.
//!
//! Classifies raw caller input as a name, username, or email and derives
//! the candidate username that collectors will look up on each platform.

use crate::error::ScanError;
use crate::platform::Platform;
use crate::similarity;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[^@\s]+@[^@\s]+\.[A-Za-z]{2,}$").unwrap();
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9._]+$").unwrap();
}

/// Usernames longer than this are treated as free-form names; no major
/// platform allows handles this long.
const MAX_USERNAME_LEN: usize = 30;

/// How the raw identifier was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierType {
    Name,
    Username,
    Email,
}

impl fmt::Display for IdentifierType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierType::Name => write!(f, "name"),
            IdentifierType::Username => write!(f, "username"),
            IdentifierType::Email => write!(f, "email"),
        }
    }
}

/// The normalized identity a scan searches for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityQuery {
    /// Caller input after whitespace/`@` trimming.
    pub raw_input: String,
    pub identifier_type: IdentifierType,
    /// Candidate username collectors will look up.
    pub derived_username: String,
    /// Alternate handles for the same identity. Callers add real aliases
    /// ("CR7") via [`IdentityQuery::with_aliases`].
    pub aliases: Vec<String>,
    /// Organizations, locations, or other entities known to belong to the
    /// identity, used for evidence overlap scoring.
    pub known_entities: BTreeSet<String>,
    /// Platforms to search, deduplicated, in caller order.
    pub requested_platforms: Vec<Platform>,
}

impl IdentityQuery {
    /// Normalize and classify a raw identifier.
    ///
    /// `hint` overrides auto-classification when the caller already knows
    /// what they typed. Empty input is rejected here so the orchestrator
    /// never spawns collectors for a blank query.
    pub fn new(
        raw: &str,
        hint: Option<IdentifierType>,
        platforms: &[Platform],
    ) -> Result<Self, ScanError> {
        let trimmed = raw.trim().trim_start_matches('@').trim();
        if trimmed.is_empty() {
            return Err(ScanError::InvalidIdentifier(
                "identifier is empty".to_string(),
            ));
        }

        let identifier_type = hint.unwrap_or_else(|| classify(trimmed));
        let derived_username = derive_username(trimmed, identifier_type);
        let aliases = default_aliases(trimmed, identifier_type, &derived_username);

        let mut requested_platforms = Vec::new();
        for platform in platforms {
            if !requested_platforms.contains(platform) {
                requested_platforms.push(*platform);
            }
        }

        Ok(Self {
            raw_input: trimmed.to_string(),
            identifier_type,
            derived_username,
            aliases,
            known_entities: BTreeSet::new(),
            requested_platforms,
        })
    }

    pub fn with_aliases<I>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        for alias in aliases {
            let alias = alias.trim().trim_start_matches('@').to_lowercase();
            if !alias.is_empty() && !self.aliases.contains(&alias) {
                self.aliases.push(alias);
            }
        }
        self
    }

    pub fn with_known_entities<I>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.known_entities
            .extend(entities.into_iter().map(|e| e.trim().to_lowercase()));
        self
    }

    /// Lowercased tokens from the raw input and aliases, compared against
    /// profile bios during similarity scoring.
    pub fn name_tokens(&self) -> BTreeSet<String> {
        let mut tokens = similarity::tokenize(&self.raw_input);
        for alias in &self.aliases {
            tokens.extend(similarity::tokenize(alias));
        }
        tokens
    }
}

fn classify(input: &str) -> IdentifierType {
    if EMAIL_RE.is_match(input) {
        IdentifierType::Email
    } else if USERNAME_RE.is_match(input) && input.len() <= MAX_USERNAME_LEN {
        IdentifierType::Username
    } else {
        IdentifierType::Name
    }
}

fn derive_username(input: &str, identifier_type: IdentifierType) -> String {
    match identifier_type {
        IdentifierType::Email => input
            .split('@')
            .next()
            .unwrap_or(input)
            .to_lowercase(),
        IdentifierType::Username => input.to_lowercase(),
        IdentifierType::Name => input
            .split_whitespace()
            .map(|part| part.to_lowercase())
            .collect::<Vec<_>>()
            .join("."),
    }
}

fn default_aliases(
    input: &str,
    identifier_type: IdentifierType,
    derived: &str,
) -> Vec<String> {
    match identifier_type {
        // Underscore variant of a multi-word name; platforms disagree on
        // separator conventions.
        IdentifierType::Name => {
            let underscored = input
                .split_whitespace()
                .map(|part| part.to_lowercase())
                .collect::<Vec<_>>()
                .join("_");
            if underscored != derived {
                vec![underscored]
            } else {
                Vec::new()
            }
        }
        IdentifierType::Username | IdentifierType::Email => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_email() {
        let query = IdentityQuery::new("CR7.fan@example.com", None, &[]).unwrap();
        assert_eq!(query.identifier_type, IdentifierType::Email);
        assert_eq!(query.derived_username, "cr7.fan");
    }

    #[test]
    fn test_classify_username() {
        let query = IdentityQuery::new("Cristiano_R7", None, &[]).unwrap();
        assert_eq!(query.identifier_type, IdentifierType::Username);
        assert_eq!(query.derived_username, "cristiano_r7");
    }

    #[test]
    fn test_classify_name() {
        let query = IdentityQuery::new("Cristiano Ronaldo", None, &[]).unwrap();
        assert_eq!(query.identifier_type, IdentifierType::Name);
        assert_eq!(query.derived_username, "cristiano.ronaldo");
        assert_eq!(query.aliases, vec!["cristiano_ronaldo".to_string()]);
    }

    #[test]
    fn test_hyphenated_input_is_a_name() {
        // Only alphanumerics, `.`, and `_` are username-legal.
        let query = IdentityQuery::new("Jean-Pierre", None, &[]).unwrap();
        assert_eq!(query.identifier_type, IdentifierType::Name);
        assert_eq!(query.derived_username, "jean-pierre");
        assert!(query.aliases.is_empty());
    }

    #[test]
    fn test_overlong_handle_is_a_name() {
        let long = "a".repeat(MAX_USERNAME_LEN + 1);
        let query = IdentityQuery::new(&long, None, &[]).unwrap();
        assert_eq!(query.identifier_type, IdentifierType::Name);
    }

    #[test]
    fn test_hint_overrides_classification() {
        let query =
            IdentityQuery::new("cristiano", Some(IdentifierType::Name), &[]).unwrap();
        assert_eq!(query.identifier_type, IdentifierType::Name);
        assert_eq!(query.derived_username, "cristiano");
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(matches!(
            IdentityQuery::new("   ", None, &[]),
            Err(ScanError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            IdentityQuery::new("@", None, &[]),
            Err(ScanError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn test_leading_at_stripped() {
        let query = IdentityQuery::new("@cristiano", None, &[]).unwrap();
        assert_eq!(query.raw_input, "cristiano");
        assert_eq!(query.identifier_type, IdentifierType::Username);
    }

    #[test]
    fn test_platforms_deduplicated_in_order() {
        let query = IdentityQuery::new(
            "cristiano",
            None,
            &[
                Platform::Twitter,
                Platform::Instagram,
                Platform::Twitter,
                Platform::Reddit,
            ],
        )
        .unwrap();
        assert_eq!(
            query.requested_platforms,
            vec![Platform::Twitter, Platform::Instagram, Platform::Reddit]
        );
    }

    #[test]
    fn test_name_tokens_include_aliases() {
        let query = IdentityQuery::new("Cristiano Ronaldo", None, &[])
            .unwrap()
            .with_aliases(vec!["CR7fan".to_string()]);
        let tokens = query.name_tokens();
        assert!(tokens.contains("cristiano"));
        assert!(tokens.contains("ronaldo"));
        assert!(tokens.contains("cr7fan"));
    }
}
