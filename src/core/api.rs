//! Multiplayer backend client.
//!
//! Every operation is a `POST` of a JSON body to
//! `{base}/MultiplayerServer/{Operation}` carrying the entity token. The
//! token comes from a [`TokenCache`] that is refreshed with the title's
//! secret key when stale, and persisted between invocations when a cache
//! file is attached.

use std::marker::PhantomData;
use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::core::http::{classify_send_error, snippet};
use crate::core::models::{
    ApiEnvelope, AssetSummary, BuildIdRequest, BuildSummary, Certificate, CertificateSummary,
    CreateBuildWithManagedContainerRequest, CreateBuildWithManagedContainerResponse, Empty,
    FileNameRequest, GetAssetUploadUrlRequest, GetAssetUploadUrlResponse, GetBuildResponse,
    GetEntityTokenRequest, GetEntityTokenResponse, ImageNameRequest, ListAssetSummariesResponse,
    ListBuildSummariesRequest, ListBuildSummariesResponse, ListCertificateSummariesResponse,
    ListContainerImageTagsResponse, ListContainerImagesResponse, ListMultiplayerServersRequest,
    ListMultiplayerServersResponse, ListQosServersResponse, MultiplayerServerSummary, NameRequest,
    Page, PageRequest, QosServer, RequestMultiplayerServerRequest,
    RequestMultiplayerServerResponse, TitleEnabledStatusResponse, UntagContainerImageRequest,
    UploadCertificateRequest,
};
use crate::core::pagination::{PageSource, collect_pages};
use crate::core::region::AzureRegion;
use crate::core::token::{CachedToken, FetchedToken, TokenCache};
use crate::error::{ENTITY_TOKEN_OPERATION, PfmpError, Result};
use crate::storage::credentials::TitleCredentials;
use crate::storage::token_cache::TokenCacheFile;

/// Default suffix appended to the title id to form the API host.
pub const DEFAULT_PRODUCTION_ENVIRONMENT_URL: &str = ".playfabapi.com";
/// Default page size for list operations.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

const SECRET_KEY_HEADER: &str = "X-SecretKey";
const ENTITY_TOKEN_HEADER: &str = "X-EntityToken";

/// Base URL for a title.
///
/// A configured value that already carries a scheme is used verbatim;
/// otherwise it is a host suffix appended to the title id.
#[must_use]
pub fn base_url_for(title_id: &str, production_environment_url: &str) -> String {
    let configured = production_environment_url.trim().trim_end_matches('/');
    if configured.starts_with("http://") || configured.starts_with("https://") {
        configured.to_string()
    } else {
        format!("https://{title_id}{configured}")
    }
}

/// Client for the multiplayer server API of one title.
pub struct ApiClient {
    http: Client,
    base_url: String,
    credentials: TitleCredentials,
    tokens: TokenCache,
    token_file: Option<TokenCacheFile>,
    timeout: Duration,
    page_size: u32,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("credentials", &self.credentials)
            .field("tokens", &self.tokens)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    #[must_use]
    pub fn new(
        http: Client,
        base_url: impl Into<String>,
        credentials: TitleCredentials,
        timeout: Duration,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            credentials,
            tokens: TokenCache::new(),
            token_file: None,
            timeout,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Load the token cache from `file` and write it back on every refresh.
    #[must_use]
    pub fn with_token_file(mut self, file: TokenCacheFile) -> Self {
        self.tokens = file.load();
        self.token_file = Some(file);
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn credentials(&self) -> &TitleCredentials {
        &self.credentials
    }

    /// Cached token, stale or not.
    #[must_use]
    pub const fn cached_token(&self) -> Option<&CachedToken> {
        self.tokens.token()
    }

    /// A usable entity token, refreshed if stale.
    ///
    /// # Errors
    /// Returns the token endpoint's error if a refresh was needed and failed.
    pub async fn entity_token(&mut self) -> Result<String> {
        let Self {
            http,
            base_url,
            credentials,
            tokens,
            timeout,
            ..
        } = &mut *self;
        let (http, base_url, timeout) = (&*http, base_url.as_str(), *timeout);
        let secret_key = credentials.secret_key.as_str();
        let (token, refreshed) = tokens
            .ensure_token(&credentials.title_id, move || {
                fetch_entity_token(http, base_url, secret_key, timeout)
            })
            .await?;
        if refreshed {
            self.persist_tokens();
        }
        Ok(token)
    }

    /// Drop the cached token and fetch a new one.
    ///
    /// # Errors
    /// Returns the token endpoint's error.
    pub async fn refresh_token(&mut self) -> Result<CachedToken> {
        self.tokens.reset();
        self.persist_tokens();
        self.entity_token().await?;
        self.tokens
            .token()
            .cloned()
            .ok_or_else(|| PfmpError::Other(anyhow::anyhow!("token cache empty after refresh")))
    }

    fn persist_tokens(&self) {
        if let Some(file) = &self.token_file {
            if let Err(e) = file.save(&self.tokens) {
                tracing::warn!(path = %file.path().display(), error = %e, "failed to persist token cache");
            }
        }
    }

    /// Call `operation` with `request` and decode the `data` payload.
    ///
    /// # Errors
    /// Returns `Api` for error envelopes, `ParseResponse` for undecodable
    /// bodies and `Network`/`Timeout` for transport failures.
    pub async fn call<Req, Resp>(&mut self, operation: &str, request: &Req) -> Result<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let token = self.entity_token().await?;
        let url = format!("{}/MultiplayerServer/{operation}", self.base_url);
        tracing::debug!(operation, "calling multiplayer API");
        let builder = self
            .http
            .post(url)
            .header(ENTITY_TOKEN_HEADER, token)
            .timeout(self.timeout)
            .json(request);
        send_and_unwrap(builder, operation, self.timeout).await
    }

    /// Run a paginated list operation.
    ///
    /// `request` builds the body for a page from the page size and the
    /// continuation token.
    ///
    /// # Errors
    /// Returns the first failing page's error.
    pub async fn list<Req, Resp, F>(
        &mut self,
        operation: &'static str,
        all: bool,
        request: F,
    ) -> Result<Vec<Resp::Item>>
    where
        Req: Serialize,
        Resp: DeserializeOwned + Page,
        F: FnMut(u32, Option<String>) -> Req,
    {
        let mut listing = Listing {
            client: self,
            operation,
            request,
            types: PhantomData::<fn(Req) -> Resp>,
        };
        collect_pages(&mut listing, all).await
    }

    // =========================================================================
    // Builds
    // =========================================================================

    pub async fn create_build_with_managed_container(
        &mut self,
        request: &CreateBuildWithManagedContainerRequest,
    ) -> Result<CreateBuildWithManagedContainerResponse> {
        self.call("CreateBuildWithManagedContainer", request).await
    }

    pub async fn list_build_summaries(&mut self, all: bool) -> Result<Vec<BuildSummary>> {
        self.list::<_, ListBuildSummariesResponse, _>(
            "ListBuildSummariesV2",
            all,
            |page_size, skip_token| ListBuildSummariesRequest {
                page_size,
                skip_token,
            },
        )
        .await
    }

    pub async fn get_build(&mut self, build_id: &str) -> Result<GetBuildResponse> {
        self.call(
            "GetBuild",
            &BuildIdRequest {
                build_id: build_id.to_string(),
            },
        )
        .await
    }

    pub async fn delete_build(&mut self, build_id: &str) -> Result<()> {
        let _: Empty = self
            .call(
                "DeleteBuild",
                &BuildIdRequest {
                    build_id: build_id.to_string(),
                },
            )
            .await?;
        Ok(())
    }

    // =========================================================================
    // Assets
    // =========================================================================

    pub async fn get_asset_upload_url(
        &mut self,
        file_name: &str,
    ) -> Result<GetAssetUploadUrlResponse> {
        self.call(
            "GetAssetUploadUrl",
            &GetAssetUploadUrlRequest {
                file_name: file_name.to_string(),
            },
        )
        .await
    }

    pub async fn delete_asset(&mut self, file_name: &str) -> Result<()> {
        let _: Empty = self
            .call(
                "DeleteAsset",
                &FileNameRequest {
                    file_name: file_name.to_string(),
                },
            )
            .await?;
        Ok(())
    }

    pub async fn list_asset_summaries(&mut self, all: bool) -> Result<Vec<AssetSummary>> {
        self.list::<_, ListAssetSummariesResponse, _>("ListAssetSummaries", all, page_request)
            .await
    }

    // =========================================================================
    // Certificates
    // =========================================================================

    pub async fn upload_certificate(&mut self, certificate: Certificate) -> Result<()> {
        let _: Empty = self
            .call(
                "UploadCertificate",
                &UploadCertificateRequest {
                    game_certificate: certificate,
                },
            )
            .await?;
        Ok(())
    }

    pub async fn delete_certificate(&mut self, name: &str) -> Result<()> {
        let _: Empty = self
            .call(
                "DeleteCertificate",
                &NameRequest {
                    name: name.to_string(),
                },
            )
            .await?;
        Ok(())
    }

    pub async fn list_certificate_summaries(
        &mut self,
        all: bool,
    ) -> Result<Vec<CertificateSummary>> {
        self.list::<_, ListCertificateSummariesResponse, _>(
            "ListCertificateSummaries",
            all,
            page_request,
        )
        .await
    }

    // =========================================================================
    // Container images
    // =========================================================================

    pub async fn list_container_images(&mut self, all: bool) -> Result<Vec<String>> {
        self.list::<_, ListContainerImagesResponse, _>("ListContainerImages", all, page_request)
            .await
    }

    pub async fn list_container_image_tags(&mut self, image_name: &str) -> Result<Vec<String>> {
        let response: ListContainerImageTagsResponse = self
            .call(
                "ListContainerImageTags",
                &ImageNameRequest {
                    image_name: image_name.to_string(),
                },
            )
            .await?;
        Ok(response.tags)
    }

    pub async fn untag_container_image(&mut self, image_name: &str, tag: &str) -> Result<()> {
        let _: Empty = self
            .call(
                "UntagContainerImage",
                &UntagContainerImageRequest {
                    image_name: image_name.to_string(),
                    tag: tag.to_string(),
                },
            )
            .await?;
        Ok(())
    }

    // =========================================================================
    // Servers
    // =========================================================================

    pub async fn request_multiplayer_server(
        &mut self,
        request: &RequestMultiplayerServerRequest,
    ) -> Result<RequestMultiplayerServerResponse> {
        self.call("RequestMultiplayerServer", request).await
    }

    pub async fn list_multiplayer_servers(
        &mut self,
        build_id: &str,
        region: AzureRegion,
        all: bool,
    ) -> Result<Vec<MultiplayerServerSummary>> {
        self.list::<_, ListMultiplayerServersResponse, _>(
            "ListMultiplayerServers",
            all,
            |page_size, skip_token| ListMultiplayerServersRequest {
                build_id: build_id.to_string(),
                region,
                page_size,
                skip_token,
            },
        )
        .await
    }

    pub async fn enable_multiplayer_servers_for_title(
        &mut self,
    ) -> Result<TitleEnabledStatusResponse> {
        self.call("EnableMultiplayerServersForTitle", &Empty {})
            .await
    }

    pub async fn title_enabled_status(&mut self) -> Result<TitleEnabledStatusResponse> {
        self.call("GetTitleEnabledForMultiplayerServersStatus", &Empty {})
            .await
    }

    // =========================================================================
    // QoS
    // =========================================================================

    pub async fn list_qos_servers(&mut self) -> Result<Vec<QosServer>> {
        let response: ListQosServersResponse =
            self.call("ListQosServersForTitle", &Empty {}).await?;
        Ok(response.qos_servers)
    }
}

const fn page_request(page_size: u32, skip_token: Option<String>) -> PageRequest {
    PageRequest {
        page_size,
        skip_token,
    }
}

/// Adapts one list operation of an [`ApiClient`] to [`PageSource`].
struct Listing<'a, Req, Resp, F> {
    client: &'a mut ApiClient,
    operation: &'static str,
    request: F,
    types: PhantomData<fn(Req) -> Resp>,
}

impl<Req, Resp, F> PageSource for Listing<'_, Req, Resp, F>
where
    Req: Serialize,
    Resp: DeserializeOwned + Page,
    F: FnMut(u32, Option<String>) -> Req,
{
    type Page = Resp;

    async fn fetch_page(&mut self, skip_token: Option<String>) -> Result<Resp> {
        let body = (self.request)(self.client.page_size, skip_token);
        self.client.call(self.operation, &body).await
    }
}

/// Exchange the title's secret key for an entity token.
///
/// # Errors
/// Returns `Api` (categorised as an authentication failure) if the key is
/// rejected, or a transport error.
pub async fn fetch_entity_token(
    http: &Client,
    base_url: &str,
    secret_key: &str,
    timeout: Duration,
) -> Result<FetchedToken> {
    let builder = http
        .post(format!("{base_url}/Authentication/GetEntityToken"))
        .header(SECRET_KEY_HEADER, secret_key)
        .timeout(timeout)
        .json(&GetEntityTokenRequest::default());
    let response: GetEntityTokenResponse =
        send_and_unwrap(builder, ENTITY_TOKEN_OPERATION, timeout).await?;
    Ok(FetchedToken {
        entity_token: response.entity_token,
        server_expiration: response.token_expiration,
    })
}

async fn send_and_unwrap<Resp: DeserializeOwned>(
    builder: reqwest::RequestBuilder,
    operation: &str,
    timeout: Duration,
) -> Result<Resp> {
    let response = builder
        .send()
        .await
        .map_err(|e| classify_send_error(&e, timeout))?;
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| classify_send_error(&e, timeout))?;
    unwrap_envelope(operation, status.as_u16(), &body)
}

/// Decode a response envelope, turning error envelopes into `Api` errors.
///
/// A missing `data` field decodes as an empty object.
///
/// # Errors
/// Returns `Api` for error envelopes or non-JSON error bodies, and
/// `ParseResponse` when a successful body cannot be decoded.
pub fn unwrap_envelope<Resp: DeserializeOwned>(
    operation: &str,
    http_status: u16,
    body: &str,
) -> Result<Resp> {
    let envelope: ApiEnvelope<serde_json::Value> = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if http_status >= 400 => {
            return Err(PfmpError::Api {
                operation: operation.to_string(),
                http_status,
                error: format!("HTTP {http_status}"),
                error_code: None,
                message: snippet(body),
                details: None,
            });
        }
        Err(e) => {
            return Err(PfmpError::ParseResponse(format!(
                "{operation}: {e}: {}",
                snippet(body)
            )));
        }
    };

    if envelope.error.is_some() || envelope.code >= 400 || http_status >= 400 {
        let details = envelope.error_details.filter(|d| !d.is_empty()).map(|d| {
            d.iter()
                .map(|(field, messages)| format!("{field}: {}", messages.join(" ")))
                .collect::<Vec<_>>()
                .join("; ")
        });
        let error = envelope
            .error
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| envelope.status.clone());
        return Err(PfmpError::Api {
            operation: operation.to_string(),
            http_status: if envelope.code >= 400 {
                envelope.code
            } else {
                http_status
            },
            error,
            error_code: envelope.error_code,
            message: envelope.error_message.unwrap_or_default(),
            details,
        });
    }

    let data = envelope
        .data
        .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()));
    serde_json::from_value(data)
        .map_err(|e| PfmpError::ParseResponse(format!("{operation}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_suffix_and_verbatim() {
        assert_eq!(
            base_url_for("ABCD", DEFAULT_PRODUCTION_ENVIRONMENT_URL),
            "https://ABCD.playfabapi.com"
        );
        assert_eq!(
            base_url_for("ABCD", "http://127.0.0.1:8080/"),
            "http://127.0.0.1:8080"
        );
        assert_eq!(
            base_url_for("ABCD", ".example.test"),
            "https://ABCD.example.test"
        );
    }

    #[test]
    fn error_envelope_becomes_api_error() {
        let body = r#"{"code":400,"status":"BadRequest","error":"BuildNotFound","errorCode":2001,
            "errorMessage":"Build not found","errorDetails":{"BuildId":["unknown id"]}}"#;
        let err = unwrap_envelope::<Empty>("GetBuild", 400, body).unwrap_err();
        match err {
            PfmpError::Api {
                operation,
                http_status,
                error,
                error_code,
                message,
                details,
            } => {
                assert_eq!(operation, "GetBuild");
                assert_eq!(http_status, 400);
                assert_eq!(error, "BuildNotFound");
                assert_eq!(error_code, Some(2001));
                assert_eq!(message, "Build not found");
                assert_eq!(details.as_deref(), Some("BuildId: unknown id"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_data_decodes_as_empty() {
        let body = r#"{"code":200,"status":"OK"}"#;
        let _: Empty = unwrap_envelope("DeleteBuild", 200, body).unwrap();
    }

    #[test]
    fn non_json_error_body_is_api_error() {
        let err = unwrap_envelope::<Empty>("GetBuild", 502, "<html>bad gateway</html>").unwrap_err();
        assert!(matches!(err, PfmpError::Api { http_status: 502, .. }));
    }

    #[test]
    fn undecodable_success_body_is_parse_error() {
        let err = unwrap_envelope::<Empty>("GetBuild", 200, "not json").unwrap_err();
        assert!(matches!(err, PfmpError::ParseResponse(_)));
    }

    #[test]
    fn data_payload_is_unwrapped() {
        let body = r#"{"code":200,"status":"OK","data":{"Tags":["v1","v2"]}}"#;
        let tags: ListContainerImageTagsResponse =
            unwrap_envelope("ListContainerImageTags", 200, body).unwrap();
        assert_eq!(tags.tags, vec!["v1", "v2"]);
    }
}
