//! Regions
//!
//! The jurisdiction whose emergency number applies to the session. The
//! selected region is only an input to future requests; changing it never
//! relabels messages that were already exchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Supported jurisdictions
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// United Kingdom
    #[default]
    #[serde(rename = "UK")]
    Uk,
    /// United States
    #[serde(rename = "US")]
    Us,
    /// European Union
    #[serde(rename = "EU")]
    Eu,
}

/// Returned when a string does not name a supported region
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown region '{0}' (expected UK, US or EU)")]
pub struct UnknownRegion(pub String);

impl Region {
    /// Emergency number used when a response omits one
    pub const FALLBACK_EMERGENCY_NUMBER: &'static str = "999";

    /// All regions in selector order
    #[must_use]
    pub fn all() -> [Region; 3] {
        [Region::Uk, Region::Us, Region::Eu]
    }

    /// Wire code
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Region::Uk => "UK",
            Region::Us => "US",
            Region::Eu => "EU",
        }
    }

    /// Emergency telephone number for this jurisdiction
    #[must_use]
    pub fn emergency_number(&self) -> &'static str {
        match self {
            Region::Uk => "999",
            Region::Us => "911",
            Region::Eu => "112",
        }
    }

    /// Selector label, e.g. "UK (999)"
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({})", self.code(), self.emergency_number())
    }

    /// The next region in selector order, wrapping around
    #[must_use]
    pub fn next(&self) -> Region {
        match self {
            Region::Uk => Region::Us,
            Region::Us => Region::Eu,
            Region::Eu => Region::Uk,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UK" => Ok(Region::Uk),
            "US" => Ok(Region::Us),
            "EU" => Ok(Region::Eu),
            _ => Err(UnknownRegion(s.to_string())),
        }
    }
}
