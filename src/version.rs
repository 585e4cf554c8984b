//! Configuration-language version numbers.
//!
//! Keyword entries in `spec.md` carry a `required_version` packed as
//! `major<<8 | minor`. [`Version`] gives that packing a name and an
//! ordering so version gates (`spec.md` §4.F) are a plain comparison.

use std::fmt;
use std::str::FromStr;

/// A `major.minor` configuration-language version, ordered numerically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    major: u8,
    minor: u8,
}

impl Version {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Unpack a `major<<8 | minor` word, the representation `spec.md` §3
    /// uses for `KeywordEntry::required_version`.
    pub const fn from_packed(packed: u16) -> Self {
        Self {
            major: (packed >> 8) as u8,
            minor: (packed & 0xff) as u8,
        }
    }

    pub const fn packed(self) -> u16 {
        ((self.major as u16) << 8) | self.minor as u16
    }

    pub const fn major(self) -> u8 {
        self.major
    }

    pub const fn minor(self) -> u8 {
        self.minor
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Error returned when a `"major.minor"` string fails to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseVersionError(pub String);

impl fmt::Display for ParseVersionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid version string: {:?}", self.0)
    }
}

impl std::error::Error for ParseVersionError {}

impl FromStr for Version {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, '.');
        let major = parts.next().unwrap_or("");
        let minor = parts.next().unwrap_or("0");
        let major: u8 = major.parse().map_err(|_| ParseVersionError(s.to_string()))?;
        let minor: u8 = minor.parse().map_err(|_| ParseVersionError(s.to_string()))?;
        Ok(Self { major, minor })
    }
}

impl<'de> serde::Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl serde::Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// The legacy version assumed when no `@version` pragma has appeared yet
/// and no `Config` override is supplied (`spec.md` §4.I, §9 open question b).
pub const DEFAULT_LEGACY_VERSION: Version = Version::new(3, 0);
