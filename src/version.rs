//! Feature version numbers
//!
//! Registries number their features with dotted versions such as `1.0`,
//! `4.6` or `3.2.1`. These are normalized onto [`semver::Version`] so that
//! ordering is numeric per component (`1.10 > 1.9`).

use semver::Version;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::BindError;

/// A dotted feature version with one to three numeric components
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FeatureVersion {
    /// Numeric version used for ordering
    version: Version,
    /// Number of components written in the source (`1.0` has two)
    components: usize,
}

impl FeatureVersion {
    /// Create a version from explicit components
    pub fn new(major: u64, minor: u64) -> Self {
        Self {
            version: Version::new(major, minor, 0),
            components: 2,
        }
    }

    /// Parse a dotted version string (a leading `v` is accepted)
    pub fn parse(version_str: &str) -> Result<Self, BindError> {
        let trimmed = version_str.trim();
        let trimmed = trimmed.strip_prefix('v').unwrap_or(trimmed);

        let parts = trimmed
            .split('.')
            .map(|part| part.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| BindError::InvalidVersion(version_str.to_string()))?;

        let version = match parts.as_slice() {
            [major] => Version::new(*major, 0, 0),
            [major, minor] => Version::new(*major, *minor, 0),
            [major, minor, patch] => Version::new(*major, *minor, *patch),
            _ => return Err(BindError::InvalidVersion(version_str.to_string())),
        };

        Ok(Self {
            version,
            components: parts.len(),
        })
    }

    pub fn major(&self) -> u64 {
        self.version.major
    }

    pub fn minor(&self) -> u64 {
        self.version.minor
    }
}

impl fmt::Display for FeatureVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.components {
            1 => write!(f, "{}", self.version.major),
            2 => write!(f, "{}.{}", self.version.major, self.version.minor),
            _ => write!(f, "{}", self.version),
        }
    }
}

impl FromStr for FeatureVersion {
    type Err = BindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FeatureVersion {
    type Error = BindError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FeatureVersion> for String {
    fn from(value: FeatureVersion) -> Self {
        value.to_string()
    }
}

impl PartialEq for FeatureVersion {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for FeatureVersion {}

impl PartialOrd for FeatureVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FeatureVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.version.cmp(&other.version)
    }
}
