//! Module versions and version constraints
//!
//! Versions are dotted numeric strings (`2`, `2.1`, `1.10.3`). Two versions are
//! compared segment by segment from the left, the shorter one padded with
//! zeros, so `2` == `2.0` == `2.0.0`.
//!
//! A constraint is written `[+|-]<version>`: `+2.0` means "2.0 or newer",
//! `-2.0` means "2.0 or older" and a bare `2.0` requires exactly that version.
//! An absent or empty constraint accepts any version.

use crate::plugin::error::{PluginError, PluginResult};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A parsed dotted numeric version
#[derive(Debug, Clone, Eq)]
pub struct Version {
    segments: Vec<u64>,
}

impl Version {
    pub fn segments(&self) -> &[u64] {
        &self.segments
    }
}

impl FromStr for Version {
    type Err = PluginError;

    fn from_str(s: &str) -> PluginResult<Self> {
        let trimmed = s.trim();
        let invalid = |reason: &str| PluginError::InvalidVersion {
            version: s.to_string(),
            reason: reason.to_string(),
        };

        if trimmed.is_empty() {
            return Err(invalid("empty version"));
        }

        let segments = trimmed
            .split('.')
            .map(|segment| {
                segment
                    .parse::<u64>()
                    .map_err(|_| invalid(&format!("segment '{}' is not a number", segment)))
            })
            .collect::<PluginResult<Vec<u64>>>()?;

        Ok(Self { segments })
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.segments.len().max(other.segments.len());
        (0..len)
            .map(|i| {
                let a = self.segments.get(i).copied().unwrap_or(0);
                let b = other.segments.get(i).copied().unwrap_or(0);
                a.cmp(&b)
            })
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.segments.iter().map(|s| s.to_string()).collect();
        write!(f, "{}", parts.join("."))
    }
}

/// Compare two version strings; `None` if either is malformed
pub fn compare_versions(a: &str, b: &str) -> Option<Ordering> {
    let a = a.parse::<Version>().ok()?;
    let b = b.parse::<Version>().ok()?;
    Some(a.cmp(&b))
}

/// A version requirement attached to a dependency
///
/// The raw text is kept so that display and equality reflect what the
/// manifest declared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum VersionConstraint {
    #[default]
    Any,
    Exact(String),
    AtLeast(String),
    AtMost(String),
}

impl VersionConstraint {
    /// Parse an optional constraint string; blank means `Any`
    pub fn parse(spec: Option<&str>) -> Self {
        let spec = match spec.map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => return VersionConstraint::Any,
        };

        if let Some(rest) = spec.strip_prefix('+') {
            VersionConstraint::AtLeast(rest.trim().to_string())
        } else if let Some(rest) = spec.strip_prefix('-') {
            VersionConstraint::AtMost(rest.trim().to_string())
        } else {
            VersionConstraint::Exact(spec.to_string())
        }
    }

    /// Check a candidate version against this constraint
    ///
    /// Malformed candidates or constraint versions never satisfy anything but `Any`.
    pub fn is_satisfied_by(&self, candidate: &str) -> bool {
        let (wanted, accept): (&str, fn(Ordering) -> bool) = match self {
            VersionConstraint::Any => return true,
            VersionConstraint::Exact(v) => (v.as_str(), |o| o == Ordering::Equal),
            VersionConstraint::AtLeast(v) => (v.as_str(), |o| o != Ordering::Less),
            VersionConstraint::AtMost(v) => (v.as_str(), |o| o != Ordering::Greater),
        };

        match compare_versions(candidate, wanted) {
            Some(ordering) => accept(ordering),
            None => {
                log::debug!(
                    "Version '{}' not comparable with constraint '{}'",
                    candidate,
                    self
                );
                false
            }
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, VersionConstraint::Any)
    }

    /// The constraint as it would be written in a manifest, `None` for `Any`
    pub fn as_spec(&self) -> Option<String> {
        match self {
            VersionConstraint::Any => None,
            VersionConstraint::Exact(v) => Some(v.clone()),
            VersionConstraint::AtLeast(v) => Some(format!("+{}", v)),
            VersionConstraint::AtMost(v) => Some(format!("-{}", v)),
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_spec() {
            Some(spec) => write!(f, "{}", spec),
            None => write!(f, "<any>"),
        }
    }
}

/// True if `candidate` complies with the optional constraint `spec`
pub fn complies(candidate: &str, spec: Option<&str>) -> bool {
    VersionConstraint::parse(spec).is_satisfied_by(candidate)
}
