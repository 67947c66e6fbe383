//! Risk levels and ratings
//!
//! Ratings are written and parsed in the badge format used by the risk
//! cells, e.g. `"High (6)"`. The level alone drives the cell colours.

use std::fmt;
use std::str::FromStr;

use serde::de::{Deserializer, Error as DeError};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Qualitative risk level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// All levels, most severe first. Order matters for text detection:
    /// "Critical" contains no other level name but a scan must prefer the
    /// severest match when several names appear.
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Critical,
        RiskLevel::High,
        RiskLevel::Medium,
        RiskLevel::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }

    /// Background fill for a risk badge cell.
    pub fn fill_hex(&self) -> &'static str {
        match self {
            RiskLevel::Critical | RiskLevel::High => "FF0000",
            RiskLevel::Medium => "FFFF00",
            RiskLevel::Low => "00FF00",
        }
    }

    /// Text colour that stays readable on top of `fill_hex`.
    pub fn text_hex(&self) -> &'static str {
        match self {
            RiskLevel::Critical | RiskLevel::High => "FFFFFF",
            _ => "000000",
        }
    }

    /// Find the level named in free text, preferring the severest match.
    /// Used when re-colouring reused rows whose badge cells carry arbitrary
    /// template text.
    pub fn detect(text: &str) -> Option<RiskLevel> {
        RiskLevel::ALL
            .into_iter()
            .find(|level| text.contains(level.as_str()))
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Low" => Ok(RiskLevel::Low),
            "Medium" => Ok(RiskLevel::Medium),
            "High" => Ok(RiskLevel::High),
            "Critical" => Ok(RiskLevel::Critical),
            other => Err(ModelError::BadRating(other.to_string())),
        }
    }
}

/// Risk rating as printed in badge cells: level plus numeric score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskRating {
    pub level: RiskLevel,
    pub score: u8,
}

impl RiskRating {
    pub fn new(level: RiskLevel, score: u8) -> Self {
        Self { level, score }
    }

    /// Compact form used in control headers, e.g. "High-6".
    pub fn compact(&self) -> String {
        format!("{}-{}", self.level, self.score)
    }
}

impl fmt::Display for RiskRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.level, self.score)
    }
}

impl FromStr for RiskRating {
    type Err = ModelError;

    /// Parses `"High (6)"` and tolerates missing whitespace: `"High(6)"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ModelError::BadRating(s.to_string());
        let open = s.find('(').ok_or_else(bad)?;
        let close = s.rfind(')').ok_or_else(bad)?;
        if close <= open {
            return Err(bad());
        }
        let level: RiskLevel = s[..open].trim().parse()?;
        let score: u8 = s[open + 1..close].trim().parse().map_err(|_| bad())?;
        Ok(RiskRating { level, score })
    }
}

impl Serialize for RiskRating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RiskRating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
