//! Mutually exclusive command-line selectors.
//!
//! Each selector is built from its raw flags and fails with an
//! "exactly one of" error unless exactly one flag was given.

use crate::core::api::ApiClient;
use crate::core::models::{BuildSummary, GetBuildResponse};
use crate::core::region::AzureRegion;
use crate::error::{PfmpError, Result};

/// Which builds `build list` shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildListSelector {
    /// Builds whose name contains the text (case-insensitive).
    Name(String),
    /// A single build by id.
    Id(String),
    /// Every build.
    All,
}

impl BuildListSelector {
    /// # Errors
    /// Returns `InvalidArgument` unless exactly one of the three is given.
    pub fn from_flags(name: Option<String>, id: Option<String>, all: bool) -> Result<Self> {
        match (non_blank(name), non_blank(id), all) {
            (Some(name), None, false) => Ok(Self::Name(name)),
            (None, Some(id), false) => Ok(Self::Id(id)),
            (None, None, true) => Ok(Self::All),
            _ => Err(PfmpError::exactly_one_of(&["--name", "--id", "--all"])),
        }
    }
}

/// How a server command names its build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildRef {
    Name(String),
    Id(String),
}

impl BuildRef {
    /// # Errors
    /// Returns `InvalidArgument` unless exactly one of name and id is given.
    pub fn from_flags(name: Option<String>, id: Option<String>) -> Result<Self> {
        match (non_blank(name), non_blank(id)) {
            (Some(name), None) => Ok(Self::Name(name)),
            (None, Some(id)) => Ok(Self::Id(id)),
            _ => Err(PfmpError::exactly_one_of(&["--build-name", "--build-id"])),
        }
    }

    /// Resolve to a build id, listing every build when given a name.
    ///
    /// # Errors
    /// Returns `BuildNotFound`/`AmbiguousBuildName` for names that do not
    /// match exactly one build, or the API error of the listing.
    pub async fn resolve(&self, client: &mut ApiClient) -> Result<String> {
        match self {
            Self::Id(id) => Ok(id.clone()),
            Self::Name(name) => {
                let builds = client.list_build_summaries(true).await?;
                let id = unique_build_id(&builds, name)?;
                tracing::debug!(name, build_id = %id, "resolved build name");
                Ok(id)
            }
        }
    }
}

/// Which regions `server list` covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionSelection {
    Regions(Vec<AzureRegion>),
    /// Every region the build is deployed to.
    AllRegions,
}

impl RegionSelection {
    /// # Errors
    /// Returns `InvalidArgument` unless exactly one of the two is given.
    pub fn from_flags(regions: Vec<AzureRegion>, all_regions: bool) -> Result<Self> {
        match (regions.is_empty(), all_regions) {
            (false, false) => Ok(Self::Regions(dedup(regions))),
            (true, true) => Ok(Self::AllRegions),
            _ => Err(PfmpError::exactly_one_of(&["--region", "--all-regions"])),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn dedup(regions: Vec<AzureRegion>) -> Vec<AzureRegion> {
    let mut out = Vec::with_capacity(regions.len());
    for region in regions {
        if !out.contains(&region) {
            out.push(region);
        }
    }
    out
}

/// Builds whose name contains `name`, ignoring case.
#[must_use]
pub fn builds_matching<'a>(builds: &'a [BuildSummary], name: &str) -> Vec<&'a BuildSummary> {
    let needle = name.to_lowercase();
    builds
        .iter()
        .filter(|b| b.build_name.to_lowercase().contains(&needle))
        .collect()
}

/// The id of the single build matching `name`.
///
/// # Errors
/// `BuildNotFound` for no match, `AmbiguousBuildName` for several.
pub fn unique_build_id(builds: &[BuildSummary], name: &str) -> Result<String> {
    match builds_matching(builds, name).as_slice() {
        [] => Err(PfmpError::BuildNotFound {
            name: name.to_string(),
        }),
        [build] => Ok(build.build_id.clone()),
        many => Err(PfmpError::AmbiguousBuildName {
            name: name.to_string(),
            count: many.len(),
        }),
    }
}

/// Regions a build is configured for, in order, without duplicates.
///
/// Region names this tool does not know are skipped with a warning.
#[must_use]
pub fn build_regions(build: &GetBuildResponse) -> Vec<AzureRegion> {
    let parsed = build
        .region_configurations
        .iter()
        .filter_map(|rc| match rc.region.parse::<AzureRegion>() {
            Ok(region) => Some(region),
            Err(_) => {
                tracing::warn!(region = %rc.region, build_id = %build.build_id, "skipping unknown region");
                None
            }
        })
        .collect();
    dedup(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::BuildRegion;

    fn summary(id: &str, name: &str) -> BuildSummary {
        BuildSummary {
            build_id: id.to_string(),
            build_name: name.to_string(),
            creation_time: None,
            metadata: Default::default(),
        }
    }

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    #[test]
    fn build_list_requires_exactly_one() {
        assert_eq!(
            BuildListSelector::from_flags(s("alpha"), None, false).unwrap(),
            BuildListSelector::Name("alpha".to_string())
        );
        assert_eq!(
            BuildListSelector::from_flags(None, s("id-1"), false).unwrap(),
            BuildListSelector::Id("id-1".to_string())
        );
        assert_eq!(
            BuildListSelector::from_flags(None, None, true).unwrap(),
            BuildListSelector::All
        );

        let rejected = [
            (None, None, false),
            (s("alpha"), s("id-1"), false),
            (s("alpha"), None, true),
            (None, s("id-1"), true),
            (s("alpha"), s("id-1"), true),
        ];
        for (name, id, all) in rejected {
            let err = BuildListSelector::from_flags(name, id, all).unwrap_err();
            assert!(err.to_string().contains("exactly one of --name, --id, --all"));
        }
    }

    #[test]
    fn blank_values_count_as_missing() {
        assert!(BuildListSelector::from_flags(s("  "), None, false).is_err());
        assert_eq!(
            BuildRef::from_flags(s(""), s("id-1")).unwrap(),
            BuildRef::Id("id-1".to_string())
        );
    }

    #[test]
    fn build_ref_requires_exactly_one() {
        assert!(BuildRef::from_flags(None, None).is_err());
        assert!(BuildRef::from_flags(s("a"), s("b")).is_err());
        assert_eq!(
            BuildRef::from_flags(s("a"), None).unwrap(),
            BuildRef::Name("a".to_string())
        );
    }

    #[test]
    fn region_selection_requires_exactly_one() {
        assert!(RegionSelection::from_flags(Vec::new(), false).is_err());
        assert!(RegionSelection::from_flags(vec![AzureRegion::EastUs], true).is_err());
        assert_eq!(
            RegionSelection::from_flags(Vec::new(), true).unwrap(),
            RegionSelection::AllRegions
        );
        assert_eq!(
            RegionSelection::from_flags(
                vec![AzureRegion::EastUs, AzureRegion::WestUs, AzureRegion::EastUs],
                false
            )
            .unwrap(),
            RegionSelection::Regions(vec![AzureRegion::EastUs, AzureRegion::WestUs])
        );
    }

    #[test]
    fn name_matching_is_case_insensitive_substring() {
        let builds = vec![
            summary("1", "Alpha-Server"),
            summary("2", "beta"),
            summary("3", "alphabet"),
        ];
        let ids: Vec<_> = builds_matching(&builds, "ALPHA")
            .iter()
            .map(|b| b.build_id.as_str())
            .collect();
        assert_eq!(ids, vec!["1", "3"]);

        assert_eq!(unique_build_id(&builds, "BETA").unwrap(), "2");
        assert!(matches!(
            unique_build_id(&builds, "gamma"),
            Err(PfmpError::BuildNotFound { .. })
        ));
        assert!(matches!(
            unique_build_id(&builds, "alpha"),
            Err(PfmpError::AmbiguousBuildName { count: 2, .. })
        ));
    }

    #[test]
    fn build_regions_dedups_and_skips_unknown() {
        let mut build = GetBuildResponse::from(summary("1", "alpha"));
        build.region_configurations = ["WestUs", "Mars", "EastUs", "westus"]
            .iter()
            .map(|r| BuildRegion {
                region: (*r).to_string(),
                standby_servers: 0,
                max_servers: 1,
                status: None,
            })
            .collect();
        assert_eq!(
            build_regions(&build),
            vec![AzureRegion::WestUs, AzureRegion::EastUs]
        );
    }
}
