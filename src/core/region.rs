//! Azure regions accepted by the multiplayer backend.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PfmpError;

/// A region multiplayer servers can be deployed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AzureRegion {
    AustraliaEast,
    AustraliaSoutheast,
    BrazilSouth,
    CentralUs,
    EastAsia,
    EastUs,
    EastUs2,
    JapanEast,
    JapanWest,
    NorthCentralUs,
    NorthEurope,
    SouthCentralUs,
    SoutheastAsia,
    WestEurope,
    WestUs,
    SouthAfricaNorth,
    WestCentralUs,
    KoreaCentral,
    FranceCentral,
    WestUs2,
    CentralIndia,
    UaeNorth,
    UkSouth,
    SwedenCentral,
}

impl AzureRegion {
    /// All known regions.
    pub const ALL: &'static [Self] = &[
        Self::AustraliaEast,
        Self::AustraliaSoutheast,
        Self::BrazilSouth,
        Self::CentralUs,
        Self::EastAsia,
        Self::EastUs,
        Self::EastUs2,
        Self::JapanEast,
        Self::JapanWest,
        Self::NorthCentralUs,
        Self::NorthEurope,
        Self::SouthCentralUs,
        Self::SoutheastAsia,
        Self::WestEurope,
        Self::WestUs,
        Self::SouthAfricaNorth,
        Self::WestCentralUs,
        Self::KoreaCentral,
        Self::FranceCentral,
        Self::WestUs2,
        Self::CentralIndia,
        Self::UaeNorth,
        Self::UkSouth,
        Self::SwedenCentral,
    ];

    /// Wire name of the region.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AustraliaEast => "AustraliaEast",
            Self::AustraliaSoutheast => "AustraliaSoutheast",
            Self::BrazilSouth => "BrazilSouth",
            Self::CentralUs => "CentralUs",
            Self::EastAsia => "EastAsia",
            Self::EastUs => "EastUs",
            Self::EastUs2 => "EastUs2",
            Self::JapanEast => "JapanEast",
            Self::JapanWest => "JapanWest",
            Self::NorthCentralUs => "NorthCentralUs",
            Self::NorthEurope => "NorthEurope",
            Self::SouthCentralUs => "SouthCentralUs",
            Self::SoutheastAsia => "SoutheastAsia",
            Self::WestEurope => "WestEurope",
            Self::WestUs => "WestUs",
            Self::SouthAfricaNorth => "SouthAfricaNorth",
            Self::WestCentralUs => "WestCentralUs",
            Self::KoreaCentral => "KoreaCentral",
            Self::FranceCentral => "FranceCentral",
            Self::WestUs2 => "WestUs2",
            Self::CentralIndia => "CentralIndia",
            Self::UaeNorth => "UaeNorth",
            Self::UkSouth => "UkSouth",
            Self::SwedenCentral => "SwedenCentral",
        }
    }
}

impl fmt::Display for AzureRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AzureRegion {
    type Err = PfmpError;

    /// Case-insensitive; the backend itself reports names in mixed case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| PfmpError::InvalidRegion(trimmed.to_string()))
    }
}

impl Serialize for AzureRegion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AzureRegion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Clap value parser for region arguments.
///
/// # Errors
/// Returns the unknown region name.
pub fn parse_region(s: &str) -> std::result::Result<AzureRegion, String> {
    s.parse().map_err(|e: PfmpError| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("eastus".parse::<AzureRegion>().unwrap(), AzureRegion::EastUs);
        assert_eq!("EASTUS2".parse::<AzureRegion>().unwrap(), AzureRegion::EastUs2);
        assert_eq!(" WestEurope ".parse::<AzureRegion>().unwrap(), AzureRegion::WestEurope);
    }

    #[test]
    fn rejects_unknown_region() {
        let err = "Atlantis".parse::<AzureRegion>().unwrap_err();
        assert!(matches!(err, PfmpError::InvalidRegion(ref r) if r == "Atlantis"));
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&AzureRegion::NorthEurope).unwrap();
        assert_eq!(json, "\"NorthEurope\"");
        let back: AzureRegion = serde_json::from_str("\"northeurope\"").unwrap();
        assert_eq!(back, AzureRegion::NorthEurope);
    }

    #[test]
    fn every_region_round_trips_through_display() {
        for region in AzureRegion::ALL {
            assert_eq!(region.to_string().parse::<AzureRegion>().unwrap(), *region);
        }
    }
}
