//! Wire models for the multiplayer backend.
//!
//! Request and response bodies use PascalCase field names. Responses are
//! wrapped in an [`ApiEnvelope`]; only the `data` payload is modelled per
//! operation. Unknown fields are ignored so new backend fields never break
//! decoding.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::region::AzureRegion;
use crate::error::PfmpError;

/// Free-form string metadata attached to builds and assets.
pub type Metadata = BTreeMap<String, String>;

// =============================================================================
// Envelope
// =============================================================================

/// Response envelope shared by every backend call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    pub code: u16,
    #[serde(default)]
    pub status: String,
    pub data: Option<T>,
    pub error: Option<String>,
    pub error_code: Option<i64>,
    pub error_message: Option<String>,
    pub error_details: Option<BTreeMap<String, Vec<String>>>,
}

/// Payload of calls that return nothing useful (deletes, untag).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Empty {}

/// Types that carry a page of results and a continuation token.
pub trait Page {
    type Item;

    /// Split into this page's items and the token for the next page.
    fn into_parts(self) -> (Vec<Self::Item>, Option<String>);
}

// =============================================================================
// Authentication
// =============================================================================

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetEntityTokenRequest {}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetEntityTokenResponse {
    pub entity_token: String,
    pub token_expiration: Option<DateTime<Utc>>,
}

// =============================================================================
// Builds
// =============================================================================

/// Transport protocol of a game port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Protocol {
    #[serde(rename = "TCP")]
    Tcp,
    #[serde(rename = "UDP")]
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp => f.write_str("TCP"),
            Self::Udp => f.write_str("UDP"),
        }
    }
}

/// A port exposed by game servers of a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Port {
    pub name: String,
    pub num: u16,
    pub protocol: Protocol,
}

impl FromStr for Port {
    type Err = PfmpError;

    /// `name:number[:tcp|udp]`, protocol defaults to UDP.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            PfmpError::InvalidArgument(format!(
                "port '{s}' must look like name:number[:tcp|udp]"
            ))
        };
        let mut parts = s.split(':');
        let name = parts.next().filter(|n| !n.is_empty()).ok_or_else(invalid)?;
        let num = parts
            .next()
            .and_then(|n| n.parse::<u16>().ok())
            .ok_or_else(invalid)?;
        let protocol = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            None | Some("udp") => Protocol::Udp,
            Some("tcp") => Protocol::Tcp,
            Some(_) => return Err(invalid()),
        };
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self {
            name: name.to_string(),
            num,
            protocol,
        })
    }
}

/// Per-region capacity requested for a build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BuildRegionParams {
    pub region: AzureRegion,
    pub standby_servers: u32,
    pub max_servers: u32,
}

impl FromStr for BuildRegionParams {
    type Err = PfmpError;

    /// `Region:standby:max`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || {
            PfmpError::InvalidArgument(format!(
                "region configuration '{s}' must look like Region:standby:max"
            ))
        };
        let parts: Vec<&str> = s.split(':').collect();
        let [region, standby, max] = parts.as_slice() else {
            return Err(invalid());
        };
        let region: AzureRegion = region.parse()?;
        let standby_servers: u32 = standby.parse().map_err(|_| invalid())?;
        let max_servers: u32 = max.parse().map_err(|_| invalid())?;
        if standby_servers > max_servers {
            return Err(PfmpError::InvalidArgument(format!(
                "region configuration '{s}': standby servers exceed max servers"
            )));
        }
        Ok(Self {
            region,
            standby_servers,
            max_servers,
        })
    }
}

/// An uploaded asset mounted into a build's containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssetReferenceParams {
    pub file_name: String,
    pub mount_path: String,
}

impl FromStr for AssetReferenceParams {
    type Err = PfmpError;

    /// `file_name:mount_path`; the mount path may itself contain `:`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((file, mount)) if !file.is_empty() && !mount.is_empty() => Ok(Self {
                file_name: file.to_string(),
                mount_path: mount.to_string(),
            }),
            _ => Err(PfmpError::InvalidArgument(format!(
                "asset reference '{s}' must look like file_name:mount_path"
            ))),
        }
    }
}

/// A certificate installed into a build's containers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GameCertificateReferenceParams {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gsdk_alias: Option<String>,
}

impl FromStr for GameCertificateReferenceParams {
    type Err = PfmpError;

    /// `name[:gsdk_alias]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, alias) = match s.split_once(':') {
            Some((name, alias)) => (name, Some(alias.to_string())),
            None => (s, None),
        };
        if name.is_empty() {
            return Err(PfmpError::InvalidArgument(
                "certificate reference name cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            name: name.to_string(),
            gsdk_alias: alias.filter(|a| !a.is_empty()),
        })
    }
}

/// Container flavor of a managed build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContainerFlavor {
    #[default]
    ManagedWindowsServerCore,
    ManagedWindowsServerCorePreview,
    CustomLinux,
}

impl FromStr for ContainerFlavor {
    type Err = PfmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "managedwindowsservercore" => Ok(Self::ManagedWindowsServerCore),
            "managedwindowsservercorepreview" => Ok(Self::ManagedWindowsServerCorePreview),
            "customlinux" => Ok(Self::CustomLinux),
            _ => Err(PfmpError::InvalidArgument(format!(
                "unknown container flavor '{s}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateBuildWithManagedContainerRequest {
    pub build_name: String,
    pub container_flavor: ContainerFlavor,
    pub game_asset_references: Vec<AssetReferenceParams>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub game_certificate_references: Vec<GameCertificateReferenceParams>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,
    pub multiplayer_server_count_per_vm: u32,
    pub ports: Vec<Port>,
    pub region_configurations: Vec<BuildRegionParams>,
    pub start_multiplayer_server_command: String,
    pub vm_size: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateBuildWithManagedContainerResponse {
    pub build_id: Option<String>,
    pub build_name: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
}

/// Short description of a build, as returned by list calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct BuildSummary {
    pub build_id: String,
    #[serde(default)]
    pub build_name: String,
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListBuildSummariesRequest {
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListBuildSummariesResponse {
    #[serde(default)]
    pub build_summaries: Vec<BuildSummary>,
    pub skip_token: Option<String>,
}

impl Page for ListBuildSummariesResponse {
    type Item = BuildSummary;

    fn into_parts(self) -> (Vec<BuildSummary>, Option<String>) {
        (self.build_summaries, self.skip_token)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BuildIdRequest {
    pub build_id: String,
}

/// Region configuration as reported for an existing build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct BuildRegion {
    /// Kept as text: region names reported by the backend may be newer than [`AzureRegion`].
    pub region: String,
    #[serde(default)]
    pub standby_servers: u32,
    #[serde(default)]
    pub max_servers: u32,
    pub status: Option<String>,
}

/// Full description of a build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct GetBuildResponse {
    pub build_id: String,
    #[serde(default)]
    pub build_name: String,
    pub build_status: Option<String>,
    pub container_flavor: Option<String>,
    pub creation_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub metadata: Metadata,
    pub multiplayer_server_count_per_vm: Option<u32>,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub region_configurations: Vec<BuildRegion>,
    pub start_multiplayer_server_command: Option<String>,
    pub vm_size: Option<String>,
}

impl From<BuildSummary> for GetBuildResponse {
    fn from(summary: BuildSummary) -> Self {
        Self {
            build_id: summary.build_id,
            build_name: summary.build_name,
            build_status: None,
            container_flavor: None,
            creation_time: summary.creation_time,
            metadata: summary.metadata,
            multiplayer_server_count_per_vm: None,
            ports: Vec::new(),
            region_configurations: Vec::new(),
            start_multiplayer_server_command: None,
            vm_size: None,
        }
    }
}

// =============================================================================
// Assets
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetAssetUploadUrlRequest {
    pub file_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetAssetUploadUrlResponse {
    pub asset_upload_url: String,
    pub file_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileNameRequest {
    pub file_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct AssetSummary {
    pub file_name: String,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PageRequest {
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListAssetSummariesResponse {
    #[serde(default)]
    pub asset_summaries: Vec<AssetSummary>,
    pub skip_token: Option<String>,
}

impl Page for ListAssetSummariesResponse {
    type Item = AssetSummary;

    fn into_parts(self) -> (Vec<AssetSummary>, Option<String>) {
        (self.asset_summaries, self.skip_token)
    }
}

// =============================================================================
// Certificates
// =============================================================================

/// Certificate upload payload.
#[derive(Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Certificate {
    pub name: String,
    pub base64_encoded_value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("name", &self.name)
            .field("base64_encoded_value", &format_args!("<{} chars>", self.base64_encoded_value.len()))
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UploadCertificateRequest {
    pub game_certificate: Certificate,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct CertificateSummary {
    pub name: String,
    pub thumbprint: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListCertificateSummariesResponse {
    #[serde(default)]
    pub certificate_summaries: Vec<CertificateSummary>,
    pub skip_token: Option<String>,
}

impl Page for ListCertificateSummariesResponse {
    type Item = CertificateSummary;

    fn into_parts(self) -> (Vec<CertificateSummary>, Option<String>) {
        (self.certificate_summaries, self.skip_token)
    }
}

// =============================================================================
// Container images
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListContainerImagesResponse {
    #[serde(default)]
    pub images: Vec<String>,
    pub skip_token: Option<String>,
}

impl Page for ListContainerImagesResponse {
    type Item = String;

    fn into_parts(self) -> (Vec<String>, Option<String>) {
        (self.images, self.skip_token)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ImageNameRequest {
    pub image_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListContainerImageTagsResponse {
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UntagContainerImageRequest {
    pub image_name: String,
    pub tag: String,
}

// =============================================================================
// Servers
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RequestMultiplayerServerRequest {
    pub build_id: String,
    pub preferred_regions: Vec<AzureRegion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_cookie: Option<String>,
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct RequestMultiplayerServerResponse {
    pub build_id: Option<String>,
    pub fqdn: Option<String>,
    #[serde(rename = "IPV4Address")]
    pub ipv4_address: Option<String>,
    pub last_state_transition_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ports: Vec<Port>,
    pub region: Option<String>,
    pub server_id: Option<String>,
    pub session_id: Option<String>,
    pub state: Option<String>,
    pub vm_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListMultiplayerServersRequest {
    pub build_id: String,
    pub region: AzureRegion,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct MultiplayerServerSummary {
    pub server_id: Option<String>,
    pub session_id: Option<String>,
    pub state: Option<String>,
    pub region: Option<String>,
    pub vm_id: Option<String>,
    pub last_state_transition_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListMultiplayerServersResponse {
    #[serde(default)]
    pub multiplayer_server_summaries: Vec<MultiplayerServerSummary>,
    pub skip_token: Option<String>,
}

impl Page for ListMultiplayerServersResponse {
    type Item = MultiplayerServerSummary;

    fn into_parts(self) -> (Vec<MultiplayerServerSummary>, Option<String>) {
        (self.multiplayer_server_summaries, self.skip_token)
    }
}

/// Whether the title may host multiplayer servers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TitleMultiplayerServerEnabledStatus {
    Initializing,
    Enabled,
    Disabled,
}

impl fmt::Display for TitleMultiplayerServerEnabledStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Initializing => "Initializing",
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TitleEnabledStatusResponse {
    pub status: Option<TitleMultiplayerServerEnabledStatus>,
}

// =============================================================================
// QoS
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct QosServer {
    pub region: Option<String>,
    pub server_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListQosServersResponse {
    #[serde(default)]
    pub qos_servers: Vec<QosServer>,
}

// =============================================================================
// Command results
// =============================================================================

/// Where the active title credentials came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CredentialOrigin {
    Environment,
    Store,
}

/// Entity token state as shown by `title show` and `title token`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenStatus {
    pub refresh_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_expiration: Option<DateTime<Utc>>,
    /// Whether the token will be reused without a refresh.
    pub fresh: bool,
    /// Whether this invocation fetched the token.
    pub refreshed: bool,
}

/// Configured title and token cache state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleStatus {
    pub title_id: String,
    pub origin: CredentialOrigin,
    pub base_url: String,
    /// Where stored credentials live.
    pub store: String,
    pub token: Option<TokenStatus>,
}

/// Confirmation of a create or delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResult {
    pub action: String,
    pub target: String,
}

impl ActionResult {
    pub fn new(action: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            target: target.into(),
        }
    }
}

/// Result of `asset add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetUploadResult {
    pub asset_name: String,
    pub bytes: u64,
    /// Zero when uploaded in a single request.
    pub blocks: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: Metadata,
}

/// Result of `server enable`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableResult {
    pub status: TitleMultiplayerServerEnabledStatus,
    pub elapsed_seconds: u64,
}

/// Tags of one container image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageTags {
    pub image_name: String,
    pub tags: Vec<String>,
}

// =============================================================================
// Robot output
// =============================================================================

/// Top-level JSON envelope for `--json` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RobotOutput<T> {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub command: String,
    pub data: T,
}

impl<T> RobotOutput<T> {
    /// Create a new robot output envelope.
    pub fn new(command: impl Into<String>, data: T) -> Self {
        Self {
            schema_version: "pfmp.v1".to_string(),
            generated_at: Utc::now(),
            command: command.into(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_parsing() {
        let port: Port = "game:7777".parse().unwrap();
        assert_eq!(port.num, 7777);
        assert_eq!(port.protocol, Protocol::Udp);

        let port: Port = "query:27015:TCP".parse().unwrap();
        assert_eq!(port.protocol, Protocol::Tcp);

        assert!("game".parse::<Port>().is_err());
        assert!("game:99999".parse::<Port>().is_err());
        assert!("game:1:icmp".parse::<Port>().is_err());
        assert!(":1".parse::<Port>().is_err());
    }

    #[test]
    fn region_params_parsing() {
        let params: BuildRegionParams = "eastus:1:5".parse().unwrap();
        assert_eq!(params.region, AzureRegion::EastUs);
        assert_eq!(params.standby_servers, 1);
        assert_eq!(params.max_servers, 5);

        assert!("EastUs:6:5".parse::<BuildRegionParams>().is_err());
        assert!("EastUs:1".parse::<BuildRegionParams>().is_err());
        assert!(matches!(
            "Atlantis:1:2".parse::<BuildRegionParams>(),
            Err(PfmpError::InvalidRegion(_))
        ));
    }

    #[test]
    fn asset_reference_keeps_windows_mount_path() {
        let asset: AssetReferenceParams = "server.zip:C:\\Assets".parse().unwrap();
        assert_eq!(asset.file_name, "server.zip");
        assert_eq!(asset.mount_path, "C:\\Assets");
        assert!("server.zip".parse::<AssetReferenceParams>().is_err());
    }

    #[test]
    fn certificate_reference_alias_is_optional() {
        let cert: GameCertificateReferenceParams = "tls".parse().unwrap();
        assert_eq!(cert.gsdk_alias, None);
        let cert: GameCertificateReferenceParams = "tls:gsdk".parse().unwrap();
        assert_eq!(cert.gsdk_alias.as_deref(), Some("gsdk"));
    }

    #[test]
    fn create_build_request_uses_pascal_case() {
        let request = CreateBuildWithManagedContainerRequest {
            build_name: "alpha".to_string(),
            container_flavor: ContainerFlavor::ManagedWindowsServerCore,
            game_asset_references: vec!["a.zip:C:\\Assets".parse().unwrap()],
            game_certificate_references: Vec::new(),
            metadata: Metadata::new(),
            multiplayer_server_count_per_vm: 2,
            ports: vec!["game:7777".parse().unwrap()],
            region_configurations: vec!["EastUs:1:3".parse().unwrap()],
            start_multiplayer_server_command: "C:\\Assets\\server.exe".to_string(),
            vm_size: "Standard_D2_v2".to_string(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["BuildName"], "alpha");
        assert_eq!(json["ContainerFlavor"], "ManagedWindowsServerCore");
        assert_eq!(json["Ports"][0]["Protocol"], "UDP");
        assert_eq!(json["RegionConfigurations"][0]["Region"], "EastUs");
        assert!(json.get("GameCertificateReferences").is_none());
        assert!(json.get("Metadata").is_none());
    }

    #[test]
    fn envelope_decodes_error_fields() {
        let body = r#"{"code":400,"status":"BadRequest","error":"InvalidParams","errorCode":1000,
            "errorMessage":"Invalid input parameters","errorDetails":{"BuildId":["The BuildId field is required."]}}"#;
        let envelope: ApiEnvelope<Empty> = serde_json::from_str(body).unwrap();
        assert_eq!(envelope.code, 400);
        assert_eq!(envelope.error.as_deref(), Some("InvalidParams"));
        assert_eq!(envelope.error_code, Some(1000));
        assert!(envelope.data.is_none());
        assert_eq!(envelope.error_details.unwrap()["BuildId"].len(), 1);
    }

    #[test]
    fn certificate_debug_hides_secrets() {
        let cert = Certificate {
            name: "tls".to_string(),
            base64_encoded_value: "c2VjcmV0".to_string(),
            password: Some("hunter2".to_string()),
        };
        let debug = format!("{cert:?}");
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("c2VjcmV0"));
    }

    #[test]
    fn server_response_reads_ipv4_field() {
        let body = r#"{"BuildId":"b","IPV4Address":"10.0.0.1","Ports":[{"Name":"game","Num":30000,"Protocol":"UDP"}],"State":"Active"}"#;
        let response: RequestMultiplayerServerResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.ipv4_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(response.ports[0].num, 30000);
    }
}
