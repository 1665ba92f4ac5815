//! Supported social platforms.

use crate::error::ScanError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A social platform the engine can be asked to search.
///
/// The set is closed on purpose: collectors, profile URL templates, and
/// fixtures are all keyed by this enum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Instagram,
    Facebook,
    Linkedin,
    Twitter,
    Tiktok,
    Reddit,
}

impl Platform {
    /// Every supported platform, in canonical order.
    pub const ALL: [Platform; 6] = [
        Platform::Instagram,
        Platform::Facebook,
        Platform::Linkedin,
        Platform::Twitter,
        Platform::Tiktok,
        Platform::Reddit,
    ];

    /// Public profile URL for a username on this platform.
    pub fn profile_url(&self, username: &str) -> String {
        match self {
            Platform::Instagram => format!("https://www.instagram.com/{}/", username),
            Platform::Facebook => format!("https://www.facebook.com/{}", username),
            Platform::Linkedin => format!("https://www.linkedin.com/in/{}/", username),
            Platform::Twitter => format!("https://x.com/{}", username),
            Platform::Tiktok => format!("https://www.tiktok.com/@{}", username),
            Platform::Reddit => format!("https://www.reddit.com/user/{}/", username),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Linkedin => "linkedin",
            Platform::Twitter => "twitter",
            Platform::Tiktok => "tiktok",
            Platform::Reddit => "reddit",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Platform {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "instagram" | "ig" => Ok(Platform::Instagram),
            "facebook" | "fb" => Ok(Platform::Facebook),
            "linkedin" => Ok(Platform::Linkedin),
            "twitter" | "x" => Ok(Platform::Twitter),
            "tiktok" => Ok(Platform::Tiktok),
            "reddit" => Ok(Platform::Reddit),
            other => Err(ScanError::UnknownPlatform(other.to_string())),
        }
    }
}
